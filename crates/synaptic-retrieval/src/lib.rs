mod compression;

pub use compression::{ContextualCompressionRetriever, DocumentCompressor};

use std::collections::HashSet;

use async_trait::async_trait;
use synaptic_core::SynapticError;

pub use synaptic_core::{Document, Retriever};

/// A simple retriever that stores documents in memory and scores them by term overlap with the query.
#[derive(Debug, Clone)]
pub struct InMemoryRetriever {
    documents: Vec<Document>,
}

impl InMemoryRetriever {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl Retriever for InMemoryRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>, SynapticError> {
        let query_terms = tokenize(query);
        let mut scored: Vec<(usize, &Document)> = self
            .documents
            .iter()
            .map(|doc| {
                let terms = tokenize(&doc.content);
                let score = query_terms.intersection(&terms).count();
                (score, doc)
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored
            .into_iter()
            .filter(|(score, _)| *score > 0)
            .take(top_k)
            .map(|(_, doc)| doc.clone())
            .collect())
    }
}

fn tokenize(input: &str) -> HashSet<String> {
    input
        .split_whitespace()
        .map(|term| term.to_ascii_lowercase())
        .collect()
}
