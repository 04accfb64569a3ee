//! The embedding provider contract.
//!
//! Calling code depends only on [`EmbeddingProvider`] (or its async twin
//! [`AsyncEmbeddingProvider`]). Concrete backends are [`EmbeddingAdapter`]s
//! assembled by the constructors in [`crate::providers`].

mod adapter;
pub mod coerce;
pub mod extract;

pub use adapter::{AdapterProfile, EmbeddingAdapter, EndpointPlan, LegacyEndpoint, RequestShape};
pub use extract::ExtractionRule;

use crate::error::{ErrorKind, ProviderError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// One embedding vector. Dimensionality is whatever the backend returns.
pub type Embedding = Vec<f64>;

/// Ordered input texts with missing entries already dropped.
///
/// Output vectors align with this filtered sequence, not with the caller's
/// original positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInputs(Vec<String>);

impl TextInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for TextInputs {
    fn from(texts: Vec<String>) -> Self {
        Self(texts)
    }
}

impl From<&[String]> for TextInputs {
    fn from(texts: &[String]) -> Self {
        Self(texts.to_vec())
    }
}

impl From<Vec<&str>> for TextInputs {
    fn from(texts: Vec<&str>) -> Self {
        texts.into_iter().map(Some).collect()
    }
}

impl From<&[&str]> for TextInputs {
    fn from(texts: &[&str]) -> Self {
        texts.iter().copied().map(Some).collect()
    }
}

impl<const N: usize> From<[&str; N]> for TextInputs {
    fn from(texts: [&str; N]) -> Self {
        texts.into_iter().map(Some).collect()
    }
}

impl From<Vec<Option<String>>> for TextInputs {
    fn from(texts: Vec<Option<String>>) -> Self {
        texts.into_iter().collect()
    }
}

impl From<Vec<Option<&str>>> for TextInputs {
    fn from(texts: Vec<Option<&str>>) -> Self {
        texts.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<Option<S>> for TextInputs {
    fn from_iter<I: IntoIterator<Item = Option<S>>>(iter: I) -> Self {
        Self(iter.into_iter().flatten().map(Into::into).collect())
    }
}

/// Trait for turning a batch of texts into a batch of vectors.
///
/// Implementors supply [`embed_batch`](Self::embed_batch); the provided
/// methods handle the empty short circuit and the one-vector-per-input check.
pub trait EmbeddingProvider: Send + Sync {
    /// Display name of the backend, used in error messages.
    fn name(&self) -> &str;

    /// Model identifier sent to the backend.
    fn model(&self) -> &str;

    /// Embed a non-empty batch. Called only by [`embed_documents`](Self::embed_documents).
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Embed every text, in order. Empty input returns immediately without
    /// touching the backend.
    fn embed_documents(&self, texts: TextInputs) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.embed_batch(texts.as_slice())?;
        if vectors.len() != texts.len() {
            return Err(ProviderError::missing_vector(format!(
                "{} returned {} vectors for {} inputs",
                self.name(),
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }

    /// Embed a single text. Returns an empty vector if the backend produced
    /// nothing for it.
    fn embed_query(&self, text: &str) -> Result<Embedding> {
        let vectors = self.embed_documents(TextInputs::from(vec![text.to_string()]))?;
        Ok(vectors.into_iter().next().unwrap_or_default())
    }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        (**self).embed_batch(texts)
    }
}

/// Async form of the contract.
#[async_trait]
pub trait AsyncEmbeddingProvider: Send + Sync {
    async fn embed_documents(&self, texts: TextInputs) -> Result<Vec<Embedding>>;

    async fn embed_query(&self, text: &str) -> Result<Embedding>;
}

/// Runs a synchronous provider on tokio's blocking pool.
///
/// There is no second code path: each call moves the whole sync call onto a
/// worker and awaits it.
#[derive(Clone)]
pub struct AsyncEmbedder {
    inner: Arc<dyn EmbeddingProvider>,
}

impl AsyncEmbedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { inner: provider }
    }

    /// The wrapped synchronous provider.
    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner
    }

    async fn run<T, F>(&self, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn EmbeddingProvider) -> Result<T> + Send + 'static,
    {
        let provider = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || call(provider.as_ref()))
            .await
            .map_err(|e| {
                ProviderError::with_source(ErrorKind::Runtime, "embedding worker failed", e)
            })?
    }
}

impl From<Box<dyn EmbeddingProvider>> for AsyncEmbedder {
    fn from(provider: Box<dyn EmbeddingProvider>) -> Self {
        Self::new(Arc::from(provider))
    }
}

#[async_trait]
impl AsyncEmbeddingProvider for AsyncEmbedder {
    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_documents(&self, texts: TextInputs) -> Result<Vec<Embedding>> {
        debug!(provider = self.inner.name(), "Offloading embedding batch");
        self.run(move |provider| provider.embed_documents(texts)).await
    }

    #[instrument(skip(self, text))]
    async fn embed_query(&self, text: &str) -> Result<Embedding> {
        let text = text.to_string();
        self.run(move |provider| provider.embed_query(&text)).await
    }
}
