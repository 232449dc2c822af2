//! Cohere integration for Synaptic.
//!
//! This crate provides three clients for the [Cohere API](https://docs.cohere.com/reference/about):
//!
//! - [`CohereEmbeddings`] implements [`Embeddings`](synaptic_core::Embeddings) over the Embed API.
//! - [`CohereLlm`] implements [`Llm`](synaptic_core::Llm) over the Generate API.
//! - [`CohereReranker`] reorders documents by relevance to a query over the Rerank API.
//!
//! Every config stores its API key as a [`SecretString`], which prints as
//! `**********` and is only readable through
//! [`SecretString::expose_secret`]. Keys are passed to `new` or read from the
//! `COHERE_API_KEY` environment variable with `from_env`.
//!
//! When the `retrieval` feature is enabled, `CohereReranker` also implements
//! the [`DocumentCompressor`](synaptic_retrieval::DocumentCompressor) trait,
//! making it usable with
//! [`ContextualCompressionRetriever`](synaptic_retrieval::ContextualCompressionRetriever).
//!
//! # Example
//!
//! ```rust,no_run
//! use synaptic_cohere::{CohereReranker, CohereRerankerConfig};
//! use synaptic_core::Document;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CohereRerankerConfig::new("your-api-key")
//!     .with_top_n(3);
//! let reranker = CohereReranker::new(config);
//!
//! let docs = vec![
//!     Document::new("1", "Rust is a systems programming language"),
//!     Document::new("2", "Python is great for data science"),
//! ];
//!
//! let reranked = reranker.rerank("systems programming", docs, None).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod embeddings;
mod llm;
mod reranker;

pub use client::{resolve_api_key, CohereTruncate, COHERE_API_KEY_ENV, DEFAULT_CLIENT_NAME};
pub use embeddings::{CohereEmbeddings, CohereEmbeddingsConfig, CohereInputType};
pub use llm::{CohereLlm, CohereLlmConfig};
pub use reranker::{CohereReranker, CohereRerankerConfig};

// Re-export core types for convenience.
pub use synaptic_core::{Document, SecretString};
