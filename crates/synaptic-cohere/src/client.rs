//! Pieces shared by the Cohere clients: API key resolution, the truncation
//! setting, and request/response plumbing over a [`ProviderBackend`](synaptic_models::ProviderBackend).

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use synaptic_core::{SecretString, SynapticError};
use synaptic_models::{ProviderRequest, ProviderResponse};

/// Environment variable consulted when no API key is passed explicitly.
pub const COHERE_API_KEY_ENV: &str = "COHERE_API_KEY";

/// Sent as `X-Client-Name` so Cohere can attribute traffic.
pub const DEFAULT_CLIENT_NAME: &str = "synaptic";

/// Resolve the Cohere API key: `explicit` if given, else `COHERE_API_KEY`.
///
/// Fails with [`SynapticError::Config`] when neither is available.
pub fn resolve_api_key(explicit: Option<String>) -> Result<SecretString, SynapticError> {
    SecretString::resolve(explicit, COHERE_API_KEY_ENV)
}

/// How the API shortens inputs that exceed the model's context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CohereTruncate {
    /// Reject over-length inputs with an error.
    None,
    /// Drop tokens from the start of the input.
    Start,
    /// Drop tokens from the end of the input.
    End,
}

impl CohereTruncate {
    pub fn as_str(&self) -> &str {
        match self {
            CohereTruncate::None => "NONE",
            CohereTruncate::Start => "START",
            CohereTruncate::End => "END",
        }
    }
}

impl fmt::Display for CohereTruncate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CohereTruncate {
    type Err = SynapticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(CohereTruncate::None),
            "START" => Ok(CohereTruncate::Start),
            "END" => Ok(CohereTruncate::End),
            other => Err(SynapticError::Validation(format!(
                "unknown truncate mode '{other}', expected NONE, START or END"
            ))),
        }
    }
}

pub(crate) fn provider_request(
    base_url: &str,
    path: &str,
    api_key: &SecretString,
    client_name: &str,
    body: Value,
) -> ProviderRequest {
    ProviderRequest {
        url: format!("{}/{path}", base_url.trim_end_matches('/')),
        headers: vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", api_key.expose_secret()),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("X-Client-Name".to_string(), client_name.to_string()),
        ],
        body,
    }
}

/// Map non-2xx responses to errors; 429 is always [`SynapticError::RateLimit`].
pub(crate) fn check_status(
    resp: &ProviderResponse,
    endpoint: &str,
    wrap: fn(String) -> SynapticError,
) -> Result<(), SynapticError> {
    if resp.status == 429 {
        tracing::warn!(endpoint, "Cohere rate limit reached");
        return Err(SynapticError::RateLimit(format!(
            "Cohere {endpoint}: {}",
            resp.error_message()
        )));
    }
    if !resp.is_success() {
        tracing::warn!(endpoint, status = resp.status, "Cohere API error");
        return Err(wrap(format!(
            "Cohere {endpoint} API error ({}): {}",
            resp.status,
            resp.error_message()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truncate_wire_names() {
        assert_eq!(CohereTruncate::None.as_str(), "NONE");
        assert_eq!(CohereTruncate::Start.as_str(), "START");
        assert_eq!(CohereTruncate::End.to_string(), "END");
    }

    #[test]
    fn truncate_parses_case_insensitively() {
        assert_eq!("START".parse::<CohereTruncate>().unwrap(), CohereTruncate::Start);
        assert_eq!("end".parse::<CohereTruncate>().unwrap(), CohereTruncate::End);
        assert_eq!("None".parse::<CohereTruncate>().unwrap(), CohereTruncate::None);
    }

    #[test]
    fn truncate_rejects_unknown() {
        let err = "MIDDLE".parse::<CohereTruncate>().unwrap_err();
        assert!(matches!(err, SynapticError::Validation(_)));
    }

    #[test]
    fn request_carries_bearer_and_client_name() {
        let key = SecretString::new("k-123");
        let req = provider_request("https://api.cohere.ai/v2/", "embed", &key, "me", json!({}));
        assert_eq!(req.url, "https://api.cohere.ai/v2/embed");
        assert_eq!(req.header("Authorization"), Some("Bearer k-123"));
        assert_eq!(req.header("X-Client-Name"), Some("me"));
    }

    #[test]
    fn status_mapping() {
        let ok = ProviderResponse::ok(json!({}));
        assert!(check_status(&ok, "embed", SynapticError::Embedding).is_ok());

        let limited = ProviderResponse {
            status: 429,
            body: json!({"message": "slow down"}),
        };
        let err = check_status(&limited, "embed", SynapticError::Embedding).unwrap_err();
        assert!(matches!(err, SynapticError::RateLimit(ref m) if m.contains("slow down")));

        let bad = ProviderResponse {
            status: 400,
            body: json!({"message": "invalid model"}),
        };
        let err = check_status(&bad, "embed", SynapticError::Embedding).unwrap_err();
        assert!(matches!(err, SynapticError::Embedding(ref m) if m.contains("(400)")));
    }
}
