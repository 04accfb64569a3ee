//! Configuration module for embedbridge.
//!
//! Handles loading provider settings from TOML.

mod settings;

pub use settings::{EmbeddingSettings, ProviderKind, Settings};
