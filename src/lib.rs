//! Embedbridge - one embedding contract over many providers
//!
//! A library that turns batches of text into numeric vectors through remote
//! (or local) embedding services, hiding each vendor's wire format and
//! credential lifecycle behind [`EmbeddingProvider`].
//!
//! # Overview
//!
//! - Every backend is one [`EmbeddingAdapter`](embedding::EmbeddingAdapter)
//!   driven by an [`AdapterProfile`](embedding::AdapterProfile)
//! - Responses are located by ordered extraction rules and coerced to `f64`
//! - Credentials range from static keys to refreshed OAuth tokens, self-signed
//!   JWTs and TC3 request signatures
//! - Blocking by default; [`AsyncEmbedder`] runs calls on tokio's blocking pool
//!
//! # Architecture
//!
//! - `config` - Provider settings loaded from TOML
//! - `transport` - HTTP request/response boundary
//! - `credentials` - Authorization strategies
//! - `embedding` - Provider contract, extraction, coercion and the adapter
//! - `providers` - Per-vendor profiles and the settings registry
//! - `error` - Error kinds shared by every layer
//!
//! # Example
//!
//! ```rust,no_run
//! use embedbridge::config::Settings;
//! use embedbridge::{build_provider, EmbeddingProvider};
//!
//! fn main() -> embedbridge::Result<()> {
//!     let settings = Settings::load()?;
//!     let provider = build_provider(&settings.embedding)?;
//!
//!     let vectors = provider.embed_documents(vec!["first", "second"].into())?;
//!     println!("{} vectors from {}", vectors.len(), provider.name());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod credentials;
pub mod embedding;
pub mod error;
pub mod providers;
pub mod transport;

pub use embedding::{AsyncEmbedder, AsyncEmbeddingProvider, Embedding, EmbeddingProvider, TextInputs};
pub use error::{ErrorKind, ProviderError, Result};
pub use providers::build_provider;
