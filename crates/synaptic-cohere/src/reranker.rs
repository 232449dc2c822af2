use std::fmt;
use std::sync::Arc;

use serde_json::json;
use synaptic_core::{Document, SecretString, SynapticError};
use synaptic_models::{HttpBackend, ProviderBackend, ProviderResponse};

use crate::client::{check_status, provider_request, resolve_api_key, DEFAULT_CLIENT_NAME};

/// Configuration for [`CohereReranker`].
#[derive(Debug, Clone)]
pub struct CohereRerankerConfig {
    pub api_key: SecretString,
    /// Model name (default: `"rerank-v3.5"`).
    pub model: String,
    /// Number of documents to return; `None` returns all of them.
    pub top_n: Option<usize>,
    /// Long documents are truncated to this many tokens by the server.
    pub max_tokens_per_doc: Option<u32>,
    /// Base URL (default: `"https://api.cohere.ai/v2"`).
    pub base_url: String,
    pub client_name: String,
}

impl CohereRerankerConfig {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "rerank-v3.5".to_string(),
            top_n: None,
            max_tokens_per_doc: None,
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

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }

    pub fn with_max_tokens_per_doc(mut self, max_tokens: u32) -> Self {
        self.max_tokens_per_doc = Some(max_tokens);
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

/// Reranker using the Cohere Rerank API.
///
/// Returned documents carry their score in `metadata["relevance_score"]`.
pub struct CohereReranker {
    config: CohereRerankerConfig,
    backend: Arc<dyn ProviderBackend>,
}

impl CohereReranker {
    pub fn new(config: CohereRerankerConfig) -> Self {
        Self::with_backend(config, Arc::new(HttpBackend::new()))
    }

    pub fn with_backend(config: CohereRerankerConfig, backend: Arc<dyn ProviderBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &CohereRerankerConfig {
        &self.config
    }

    pub fn api_key(&self) -> &SecretString {
        &self.config.api_key
    }

    /// Rerank `documents` by relevance to `query`, most relevant first.
    ///
    /// `top_n` overrides the configured limit for this call.
    pub async fn rerank(
        &self,
        query: &str,
        documents: Vec<Document>,
        top_n: Option<usize>,
    ) -> Result<Vec<Document>, SynapticError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let mut body = json!({
            "model": self.config.model,
            "query": query,
            "documents": texts,
        });
        if let Some(n) = top_n.or(self.config.top_n) {
            body["top_n"] = json!(n);
        }
        if let Some(max_tokens) = self.config.max_tokens_per_doc {
            body["max_tokens_per_doc"] = json!(max_tokens);
        }

        tracing::debug!(
            model = %self.config.model,
            count = documents.len(),
            "Cohere rerank request"
        );

        let request = provider_request(
            &self.config.base_url,
            "rerank",
            &self.config.api_key,
            &self.config.client_name,
            body,
        );
        let response = self.backend.send(request).await?;
        let ranked = parse_response(&response)?;

        Ok(ranked
            .into_iter()
            .filter_map(|(idx, score)| {
                let mut doc = documents.get(idx)?.clone();
                doc.metadata
                    .insert("relevance_score".to_string(), json!(score));
                Some(doc)
            })
            .collect())
    }
}

impl fmt::Debug for CohereReranker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CohereReranker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// `(index, relevance_score)` pairs in server order.
fn parse_response(resp: &ProviderResponse) -> Result<Vec<(usize, f64)>, SynapticError> {
    check_status(resp, "rerank", SynapticError::Retriever)?;

    // Response: {"results": [{"index": 0, "relevance_score": 0.9}]}
    let results = resp.body["results"]
        .as_array()
        .ok_or_else(|| SynapticError::Retriever("missing 'results' field".to_string()))?;

    Ok(results
        .iter()
        .filter_map(|item| {
            let idx = item["index"].as_u64()? as usize;
            let score = item["relevance_score"].as_f64()?;
            Some((idx, score))
        })
        .collect())
}

#[cfg(feature = "retrieval")]
#[async_trait::async_trait]
impl synaptic_retrieval::DocumentCompressor for CohereReranker {
    async fn compress_documents(
        &self,
        documents: Vec<Document>,
        query: &str,
    ) -> Result<Vec<Document>, SynapticError> {
        self.rerank(query, documents, None).await
    }
}
