use crate::attempt::CallTimeouts;
use crate::error::{ApiError, StatusCode};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 50051;

/// PEM-encoded TLS material for a secure channel.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialMaterial {
    pub root_certs: Option<String>,
    pub private_key: Option<String>,
    pub certificate_chain: Option<String>,
}

impl CredentialMaterial {
    fn validate(&self) -> Result<(), ApiError> {
        match (&self.private_key, &self.certificate_chain) {
            (Some(_), None) => {
                Err(ApiError::config("credential_material.private_key requires certificate_chain"))
            }
            (None, Some(_)) => {
                Err(ApiError::config("credential_material.certificate_chain requires private_key"))
            }
            _ => Ok(()),
        }
    }
}

/// Recognized client options, as read from TOML or built in code.
///
/// Either `endpoint` (`"host:port"`) or `host`/`port` may be set, never both.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub endpoint: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub secure: bool,
    pub credential_material: Option<CredentialMaterial>,
    pub api_key: Option<String>,
    pub channel_options: BTreeMap<String, JsonValue>,
    pub per_call_deadline_ms: Option<u64>,
    pub client_side_timeout_ms: Option<u64>,
    pub retries_enabled: bool,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub retry_jitter_fraction: f64,
    pub retryable_status_codes: Vec<StatusCode>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            endpoint: None,
            host: None,
            port: None,
            secure: false,
            credential_material: None,
            api_key: None,
            channel_options: BTreeMap::new(),
            per_call_deadline_ms: None,
            client_side_timeout_ms: None,
            retries_enabled: retry.enabled,
            max_retries: retry.max_retries,
            initial_backoff_ms: duration_ms(retry.initial_backoff),
            max_backoff_ms: duration_ms(retry.max_backoff),
            backoff_multiplier: retry.backoff_multiplier,
            retry_jitter_fraction: retry.jitter_fraction,
            retryable_status_codes: retry.retryable_status_codes.into_iter().collect(),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl ClientConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ApiError> {
        toml::from_str(raw)
            .map_err(|err| ApiError::config(format!("invalid client config: {err}")))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ApiError::config(format!("failed to read client config {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Validates the options and freezes them for the lifetime of a client.
    pub fn build(self) -> Result<ClientOptions, ApiError> {
        let endpoint = self.resolve_endpoint()?;

        if let Some(credentials) = &self.credential_material {
            if !self.secure {
                return Err(ApiError::config("credential_material requires secure = true"));
            }
            credentials.validate()?;
        }
        if self.api_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
            return Err(ApiError::config("api_key must not be empty when set"));
        }

        let per_call_deadline = positive_ms("per_call_deadline_ms", self.per_call_deadline_ms)?;
        let client_side_timeout =
            positive_ms("client_side_timeout_ms", self.client_side_timeout_ms)?;

        let retry_policy = RetryPolicy {
            enabled: self.retries_enabled,
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            backoff_multiplier: self.backoff_multiplier,
            jitter_fraction: self.retry_jitter_fraction,
            retryable_status_codes: self.retryable_status_codes.into_iter().collect(),
        };
        retry_policy.validate()?;

        Ok(ClientOptions {
            endpoint,
            secure: self.secure,
            credential_material: self.credential_material,
            api_key: self.api_key,
            channel_options: self.channel_options,
            timeouts: CallTimeouts { per_call_deadline, client_side_timeout },
            retry_policy,
        })
    }

    fn resolve_endpoint(&self) -> Result<String, ApiError> {
        match (&self.endpoint, &self.host, self.port) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(ApiError::config(
                "endpoint cannot be combined with host or port",
            )),
            (Some(endpoint), None, None) => {
                let endpoint = endpoint.trim();
                if endpoint.is_empty() {
                    return Err(ApiError::config("endpoint must not be empty"));
                }
                Ok(endpoint.to_owned())
            }
            (None, host, port) => {
                let host = host.as_deref().map(str::trim).unwrap_or(DEFAULT_HOST);
                if host.is_empty() {
                    return Err(ApiError::config("host must not be empty"));
                }
                Ok(format!("{host}:{}", port.unwrap_or(DEFAULT_PORT)))
            }
        }
    }
}

fn positive_ms(field: &str, value: Option<u64>) -> Result<Option<Duration>, ApiError> {
    match value {
        Some(0) => Err(ApiError::config(format!("{field} must be greater than zero when set"))),
        other => Ok(other.map(Duration::from_millis)),
    }
}

/// Validated, immutable client options.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    endpoint: String,
    secure: bool,
    credential_material: Option<CredentialMaterial>,
    api_key: Option<String>,
    channel_options: BTreeMap<String, JsonValue>,
    timeouts: CallTimeouts,
    retry_policy: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: format!("{DEFAULT_HOST}:{DEFAULT_PORT}"),
            secure: false,
            credential_material: None,
            api_key: None,
            channel_options: BTreeMap::new(),
            timeouts: CallTimeouts::default(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl ClientOptions {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn credential_material(&self) -> Option<&CredentialMaterial> {
        self.credential_material.as_ref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn channel_options(&self) -> &BTreeMap<String, JsonValue> {
        &self.channel_options
    }

    pub fn timeouts(&self) -> CallTimeouts {
        self.timeouts
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}
