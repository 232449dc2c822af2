//! Text completion backed by the Cohere Generate API.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use synaptic_core::{
    enforce_stop_tokens, Generation, Llm, LlmResult, SecretString, SynapticError, TokenUsage,
};
use synaptic_models::{HttpBackend, ProviderBackend, ProviderResponse};

use crate::client::{
    check_status, provider_request, resolve_api_key, CohereTruncate, DEFAULT_CLIENT_NAME,
};

/// Configuration for [`CohereLlm`].
///
/// Generation parameters are all optional; unset ones are left to the
/// server and never sent (see [`CohereLlmConfig::default_params`]).
#[derive(Debug, Clone)]
pub struct CohereLlmConfig {
    pub api_key: SecretString,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Top-k sampling.
    pub k: Option<u32>,
    /// Top-p (nucleus) sampling. A float on the wire, so `4` is sent as `4.0`.
    pub p: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,
    pub truncate: Option<CohereTruncate>,
    /// Default stop sequences, used when a call does not pass its own.
    pub stop: Option<Vec<String>>,
    /// Base URL (default: `"https://api.cohere.ai/v1"`).
    pub base_url: String,
    pub client_name: String,
}

impl CohereLlmConfig {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            model: None,
            temperature: None,
            max_tokens: None,
            k: None,
            p: None,
            frequency_penalty: None,
            presence_penalty: None,
            truncate: None,
            stop: None,
            base_url: "https://api.cohere.ai/v1".to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
        }
    }

    /// Build a config whose API key comes from `COHERE_API_KEY`.
    pub fn from_env() -> Result<Self, SynapticError> {
        Ok(Self::new(resolve_api_key(None)?))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_k(mut self, k: u32) -> Self {
        self.k = Some(k);
        self
    }

    pub fn with_p(mut self, p: f64) -> Self {
        self.p = Some(p);
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f64) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn with_presence_penalty(mut self, penalty: f64) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    pub fn with_truncate(mut self, truncate: CohereTruncate) -> Self {
        self.truncate = Some(truncate);
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
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

    /// The generation parameters that were explicitly set, keyed by their API names.
    ///
    /// A config built with only an API key projects to an empty map.
    pub fn default_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(ref model) = self.model {
            params.insert("model".to_string(), json!(model));
        }
        if let Some(max_tokens) = self.max_tokens {
            params.insert("max_tokens".to_string(), json!(max_tokens));
        }
        if let Some(temperature) = self.temperature {
            params.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(k) = self.k {
            params.insert("k".to_string(), json!(k));
        }
        if let Some(p) = self.p {
            params.insert("p".to_string(), json!(p));
        }
        if let Some(penalty) = self.frequency_penalty {
            params.insert("frequency_penalty".to_string(), json!(penalty));
        }
        if let Some(penalty) = self.presence_penalty {
            params.insert("presence_penalty".to_string(), json!(penalty));
        }
        if let Some(truncate) = self.truncate {
            params.insert("truncate".to_string(), json!(truncate.as_str()));
        }
        params
    }
}

/// Completion model backed by the Cohere Generate API.
pub struct CohereLlm {
    config: CohereLlmConfig,
    backend: Arc<dyn ProviderBackend>,
}

impl CohereLlm {
    pub fn new(config: CohereLlmConfig) -> Self {
        Self::with_backend(config, Arc::new(HttpBackend::new()))
    }

    pub fn with_backend(config: CohereLlmConfig, backend: Arc<dyn ProviderBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &CohereLlmConfig {
        &self.config
    }

    pub fn api_key(&self) -> &SecretString {
        &self.config.api_key
    }

    /// See [`CohereLlmConfig::default_params`].
    pub fn default_params(&self) -> Map<String, Value> {
        self.config.default_params()
    }
}

impl fmt::Debug for CohereLlm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CohereLlm")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Llm for CohereLlm {
    async fn generate(
        &self,
        prompt: &str,
        stop: Option<&[String]>,
    ) -> Result<LlmResult, SynapticError> {
        let stop = stop.or(self.config.stop.as_deref());

        let mut body = self.config.default_params();
        body.insert("prompt".to_string(), json!(prompt));
        if let Some(stop) = stop {
            body.insert("stop_sequences".to_string(), json!(stop));
        }

        tracing::debug!(
            model = self.config.model.as_deref().unwrap_or("<server default>"),
            prompt_len = prompt.len(),
            "Cohere generate request"
        );

        let request = provider_request(
            &self.config.base_url,
            "generate",
            &self.config.api_key,
            &self.config.client_name,
            Value::Object(body),
        );
        let response = self.backend.send(request).await?;
        let mut result = parse_response(&response)?;

        if let Some(stop) = stop {
            for generation in &mut result.generations {
                generation.text = enforce_stop_tokens(&generation.text, stop);
            }
        }
        Ok(result)
    }
}

fn parse_response(resp: &ProviderResponse) -> Result<LlmResult, SynapticError> {
    check_status(resp, "generate", SynapticError::Model)?;

    let generations = resp.body["generations"]
        .as_array()
        .ok_or_else(|| SynapticError::Parsing("missing 'generations' field".to_string()))?
        .iter()
        .map(|g| Generation {
            text: g["text"].as_str().unwrap_or_default().to_string(),
            finish_reason: g["finish_reason"].as_str().map(str::to_string),
        })
        .collect();

    Ok(LlmResult {
        generations,
        usage: parse_usage(&resp.body["meta"]["billed_units"]),
    })
}

fn parse_usage(billed: &Value) -> Option<TokenUsage> {
    if billed.is_null() {
        return None;
    }
    let input_tokens = token_count(&billed["input_tokens"]);
    let output_tokens = token_count(&billed["output_tokens"]);
    Some(TokenUsage {
        input_tokens,
        output_tokens,
        total_tokens: input_tokens.saturating_add(output_tokens),
    })
}

/// Counts beyond `u32::MAX` clamp to `u32::MAX`.
fn token_count(value: &Value) -> u32 {
    value
        .as_u64()
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}
