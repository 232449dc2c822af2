//! Cohere Embeddings implementation using the native Cohere v2 API.
//!
//! Unlike the OpenAI-compatible endpoint, this implementation supports Cohere's
//! `input_type` parameter, which is required for optimal retrieval performance:
//! use `search_document` when embedding documents and `search_query` when embedding queries.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use synaptic_core::{Embeddings, SecretString, SynapticError};
use synaptic_models::{HttpBackend, ProviderBackend, ProviderResponse};

use crate::client::{
    check_status, provider_request, resolve_api_key, CohereTruncate, DEFAULT_CLIENT_NAME,
};

/// Input type for Cohere embeddings.
///
/// Using the correct input type is important for retrieval quality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CohereInputType {
    /// For embedding documents to be stored in a vector database.
    SearchDocument,
    /// For embedding queries used to search the vector database.
    SearchQuery,
    /// For classification tasks.
    Classification,
    /// For clustering tasks.
    Clustering,
}

impl CohereInputType {
    pub fn as_str(&self) -> &str {
        match self {
            CohereInputType::SearchDocument => "search_document",
            CohereInputType::SearchQuery => "search_query",
            CohereInputType::Classification => "classification",
            CohereInputType::Clustering => "clustering",
        }
    }
}

/// Configuration for [`CohereEmbeddings`].
#[derive(Debug, Clone)]
pub struct CohereEmbeddingsConfig {
    pub api_key: SecretString,
    /// Model name (default: `"embed-english-v3.0"`).
    pub model: String,
    /// Input type for document embedding (default: `SearchDocument`).
    pub input_type: CohereInputType,
    /// Query input type (default: `SearchQuery`).
    pub query_input_type: CohereInputType,
    /// Left to the server when unset.
    pub truncate: Option<CohereTruncate>,
    /// Base URL (default: `"https://api.cohere.ai/v2"`).
    pub base_url: String,
    pub client_name: String,
}

impl CohereEmbeddingsConfig {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "embed-english-v3.0".to_string(),
            input_type: CohereInputType::SearchDocument,
            query_input_type: CohereInputType::SearchQuery,
            truncate: None,
            base_url: "https://api.cohere.ai/v2".to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
        }
    }

    /// Build a config whose API key comes from `COHERE_API_KEY`.
    pub fn from_env() -> Result<Self, SynapticError> {
        Ok(Self::new(resolve_api_key(None)?))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_input_type(mut self, input_type: CohereInputType) -> Self {
        self.input_type = input_type;
        self
    }

    pub fn with_query_input_type(mut self, input_type: CohereInputType) -> Self {
        self.query_input_type = input_type;
        self
    }

    pub fn with_truncate(mut self, truncate: CohereTruncate) -> Self {
        self.truncate = Some(truncate);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = client_name.into();
        self
    }
}

/// Embeddings backed by the Cohere Embed API.
///
/// Supports all Cohere embedding models including `embed-english-v3.0` (1024-dim)
/// and `embed-multilingual-v3.0` (1024-dim).
pub struct CohereEmbeddings {
    config: CohereEmbeddingsConfig,
    backend: Arc<dyn ProviderBackend>,
}

impl CohereEmbeddings {
    pub fn new(config: CohereEmbeddingsConfig) -> Self {
        Self::with_backend(config, Arc::new(HttpBackend::new()))
    }

    pub fn with_backend(config: CohereEmbeddingsConfig, backend: Arc<dyn ProviderBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &CohereEmbeddingsConfig {
        &self.config
    }

    pub fn api_key(&self) -> &SecretString {
        &self.config.api_key
    }

    async fn embed_with_type(
        &self,
        texts: &[&str],
        input_type: &CohereInputType,
    ) -> Result<Vec<Vec<f32>>, SynapticError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut body = json!({
            "model": self.config.model,
            "texts": texts,
            "input_type": input_type.as_str(),
            "embedding_types": ["float"],
        });
        if let Some(truncate) = self.config.truncate {
            body["truncate"] = json!(truncate.as_str());
        }

        tracing::debug!(
            model = %self.config.model,
            input_type = input_type.as_str(),
            count = texts.len(),
            "Cohere embed request"
        );

        let request = provider_request(
            &self.config.base_url,
            "embed",
            &self.config.api_key,
            &self.config.client_name,
            body,
        );
        let response = self.backend.send(request).await?;
        let embeddings = parse_response(&response)?;

        if embeddings.len() != texts.len() {
            return Err(SynapticError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }
}

impl fmt::Debug for CohereEmbeddings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CohereEmbeddings")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn parse_response(resp: &ProviderResponse) -> Result<Vec<Vec<f32>>, SynapticError> {
    check_status(resp, "embed", SynapticError::Embedding)?;

    let float_embeddings = resp.body["embeddings"]["float"]
        .as_array()
        .ok_or_else(|| SynapticError::Embedding("missing embeddings.float".to_string()))?;

    let mut result = Vec::with_capacity(float_embeddings.len());
    for embedding in float_embeddings {
        let vec = embedding
            .as_array()
            .ok_or_else(|| SynapticError::Embedding("embedding is not array".to_string()))?
            .iter()
            .map(|v| {
                v.as_f64().map(|x| x as f32).ok_or_else(|| {
                    SynapticError::Embedding("embedding component is not a number".to_string())
                })
            })
            .collect::<Result<Vec<f32>, _>>()?;
        result.push(vec);
    }

    Ok(result)
}

#[async_trait]
impl Embeddings for CohereEmbeddings {
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SynapticError> {
        self.embed_with_type(texts, &self.config.input_type).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, SynapticError> {
        let mut results = self
            .embed_with_type(&[text], &self.config.query_input_type)
            .await?;
        results
            .pop()
            .ok_or_else(|| SynapticError::Embedding("empty response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = CohereEmbeddingsConfig::new("test-key");
        assert_eq!(config.model, "embed-english-v3.0");
        assert_eq!(config.input_type, CohereInputType::SearchDocument);
        assert_eq!(config.query_input_type, CohereInputType::SearchQuery);
        assert_eq!(config.truncate, None);
        assert_eq!(config.base_url, "https://api.cohere.ai/v2");
    }

    #[test]
    fn config_builder() {
        let config = CohereEmbeddingsConfig::new("key")
            .with_model("embed-multilingual-v3.0")
            .with_input_type(CohereInputType::Clustering)
            .with_truncate(CohereTruncate::End);
        assert_eq!(config.model, "embed-multilingual-v3.0");
        assert_eq!(config.input_type, CohereInputType::Clustering);
        assert_eq!(config.truncate, Some(CohereTruncate::End));
    }

    #[test]
    fn parse_rejects_non_numeric_component() {
        let resp = ProviderResponse::ok(json!({"embeddings": {"float": [[0.5, "x", 0.1]]}}));
        let err = parse_response(&resp).unwrap_err();
        assert!(matches!(err, SynapticError::Embedding(ref m) if m.contains("not a number")));
    }

    #[test]
    fn parse_rejects_non_array_embedding() {
        let resp = ProviderResponse::ok(json!({"embeddings": {"float": ["nope"]}}));
        let err = parse_response(&resp).unwrap_err();
        assert!(matches!(err, SynapticError::Embedding(ref m) if m.contains("not array")));
    }
}
