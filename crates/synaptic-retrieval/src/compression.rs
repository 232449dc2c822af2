use std::sync::Arc;

use async_trait::async_trait;
use synaptic_core::SynapticError;

use crate::{Document, Retriever};

/// Trait for compressing, filtering or reordering a set of documents based on a query.
#[async_trait]
pub trait DocumentCompressor: Send + Sync {
    async fn compress_documents(
        &self,
        documents: Vec<Document>,
        query: &str,
    ) -> Result<Vec<Document>, SynapticError>;
}

/// A retriever that retrieves documents from a base retriever and then
/// passes them through a [`DocumentCompressor`].
pub struct ContextualCompressionRetriever {
    base: Arc<dyn Retriever>,
    compressor: Arc<dyn DocumentCompressor>,
}

impl ContextualCompressionRetriever {
    pub fn new(base: Arc<dyn Retriever>, compressor: Arc<dyn DocumentCompressor>) -> Self {
        Self { base, compressor }
    }
}

#[async_trait]
impl Retriever for ContextualCompressionRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>, SynapticError> {
        let docs = self.base.retrieve(query, top_k).await?;
        self.compressor.compress_documents(docs, query).await
    }
}
