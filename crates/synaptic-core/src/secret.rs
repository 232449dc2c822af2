use std::fmt;

use secrecy::ExposeSecret;

use crate::SynapticError;

/// What every [`SecretString`] renders as, regardless of the value it holds.
pub const MASK: &str = "**********";

/// A credential that never shows up in `Display` or `Debug` output.
///
/// The plaintext is zeroized on drop and can only be read back through
/// [`SecretString::expose_secret`].
///
/// ```
/// use synaptic_core::SecretString;
///
/// let key = SecretString::new("secret-api-key");
/// assert_eq!(key.to_string(), "**********");
/// assert_eq!(format!("{key:?}"), "**********");
/// assert_eq!(key.expose_secret(), "secret-api-key");
/// ```
pub struct SecretString(secrecy::SecretString);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(secrecy::SecretString::from(value.into()))
    }

    /// Read the secret from environment variable `var`.
    ///
    /// An unset or empty variable is a [`SynapticError::Config`].
    pub fn from_env(var: &str) -> Result<Self, SynapticError> {
        match std::env::var(var) {
            Ok(value) if !value.is_empty() => Ok(Self::new(value)),
            _ => Err(SynapticError::Config(format!(
                "{var} environment variable is not set"
            ))),
        }
    }

    /// Use `explicit` when given, otherwise fall back to environment variable `var`.
    pub fn resolve(explicit: Option<String>, var: &str) -> Result<Self, SynapticError> {
        match explicit {
            Some(value) => Ok(Self::new(value)),
            None => Self::from_env(var),
        }
    }

    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose_secret())
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_has_fixed_length() {
        assert_eq!(MASK.len(), 10);
        assert!(MASK.chars().all(|c| c == '*'));
    }

    #[test]
    fn display_and_debug_are_masked() {
        let long = "x".repeat(200);
        for value in ["", "k", "secret-api-key", long.as_str()] {
            let secret = SecretString::new(value);
            assert_eq!(secret.to_string(), MASK);
            assert_eq!(format!("{secret:?}"), MASK);
            assert_eq!(format!("{secret:#?}"), MASK);
        }
    }

    #[test]
    fn expose_returns_plaintext() {
        let secret = SecretString::from("secret-api-key".to_string());
        assert_eq!(secret.expose_secret(), "secret-api-key");
    }

    #[test]
    fn clone_keeps_value() {
        let secret = SecretString::new("abc");
        let cloned = secret.clone();
        assert_eq!(cloned.expose_secret(), "abc");
    }

    #[test]
    fn masked_inside_derived_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Holder {
            key: SecretString,
        }
        let out = format!(
            "{:?}",
            Holder {
                key: SecretString::new("super-secret")
            }
        );
        assert!(!out.contains("super-secret"));
        assert!(out.contains(MASK));
    }

    #[test]
    fn resolve_prefers_explicit_value() {
        temp_env::with_var("SYNAPTIC_TEST_SECRET_A", Some("from-env"), || {
            let secret =
                SecretString::resolve(Some("explicit".to_string()), "SYNAPTIC_TEST_SECRET_A")
                    .unwrap();
            assert_eq!(secret.expose_secret(), "explicit");
        });
    }

    #[test]
    fn resolve_falls_back_to_env() {
        temp_env::with_var("SYNAPTIC_TEST_SECRET_B", Some("from-env"), || {
            let secret = SecretString::resolve(None, "SYNAPTIC_TEST_SECRET_B").unwrap();
            assert_eq!(secret.expose_secret(), "from-env");
        });
    }

    #[test]
    fn missing_env_is_config_error() {
        temp_env::with_var_unset("SYNAPTIC_TEST_SECRET_C", || {
            let err = SecretString::resolve(None, "SYNAPTIC_TEST_SECRET_C").unwrap_err();
            assert!(matches!(err, SynapticError::Config(_)));
            assert!(err.to_string().contains("SYNAPTIC_TEST_SECRET_C"));
        });
    }

    #[test]
    fn empty_env_is_config_error() {
        temp_env::with_var("SYNAPTIC_TEST_SECRET_D", Some(""), || {
            let err = SecretString::from_env("SYNAPTIC_TEST_SECRET_D").unwrap_err();
            assert!(matches!(err, SynapticError::Config(_)));
        });
    }
}
