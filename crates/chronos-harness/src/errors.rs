use std::time::Duration;

use crate::model::ProviderId;

/// Errors returned by a provider adapter before they are normalized for
/// callers of the transformation client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Provider returned an application-level failure (HTTP status, auth, quota).
    #[error("provider error ({provider}): {message}")]
    Provider {
        provider: ProviderId,
        message: String,
        status_code: Option<u16>,
    },
    /// The request never reached the provider or the connection broke.
    #[error("transport error ({provider}): {message}")]
    Transport {
        provider: ProviderId,
        message: String,
    },
    /// Provider answered, but the payload had no usable content.
    #[error("protocol error ({provider}): {message}")]
    Protocol {
        provider: ProviderId,
        message: String,
    },
}

impl ProviderError {
    /// Creates a provider-level error.
    pub fn provider(
        provider: impl Into<ProviderId>,
        message: impl Into<String>,
        status_code: Option<u16>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            status_code,
        }
    }

    /// Creates a transport-level error.
    pub fn transport(provider: impl Into<ProviderId>, message: impl Into<String>) -> Self {
        Self::Transport {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Creates a protocol-level error.
    pub fn protocol(provider: impl Into<ProviderId>, message: impl Into<String>) -> Self {
        Self::Protocol {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Returns the provider associated with this error.
    pub fn provider_id(&self) -> &ProviderId {
        match self {
            Self::Provider { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Protocol { provider, .. } => provider,
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Provider { message, .. }
            | Self::Transport { message, .. }
            | Self::Protocol { message, .. } => message,
        }
    }

    /// Transport failures, rate limiting and 5xx responses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Provider { status_code, .. } => {
                matches!(status_code, Some(429) | Some(500..=599))
            }
            Self::Protocol { .. } => false,
        }
    }
}

/// Coarse failure category that survives the orchestrator boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformErrorKind {
    /// Transport failure reaching the external service.
    Network,
    /// Service reached but returned no usable image content.
    Service,
    /// An attempt exceeded its time budget.
    Timeout,
    /// Client was misconfigured or the input was rejected locally.
    Config,
}

impl TransformErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Service => "service",
            Self::Timeout => "timeout",
            Self::Config => "config",
        }
    }
}

/// Failure of a single transformation call, after retries.
///
/// `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("{message}")]
    Network {
        provider: ProviderId,
        message: String,
    },
    #[error("{message}")]
    Service {
        provider: ProviderId,
        message: String,
        status_code: Option<u16>,
    },
    #[error("transformation timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error(transparent)]
    Harness(#[from] HarnessError),
}

impl TransformError {
    /// Creates a service error carrying only a message.
    pub fn service(provider: impl Into<ProviderId>, message: impl Into<String>) -> Self {
        Self::Service {
            provider: provider.into(),
            message: message.into(),
            status_code: None,
        }
    }

    /// Creates a network error.
    pub fn network(provider: impl Into<ProviderId>, message: impl Into<String>) -> Self {
        Self::Network {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> TransformErrorKind {
        match self {
            Self::Network { .. } => TransformErrorKind::Network,
            Self::Service { .. } => TransformErrorKind::Service,
            Self::Timeout(_) => TransformErrorKind::Timeout,
            Self::Harness(_) => TransformErrorKind::Config,
        }
    }
}

impl From<ProviderError> for TransformError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::Transport { provider, message } => Self::Network { provider, message },
            ProviderError::Provider {
                provider,
                message,
                status_code,
            } => Self::Service {
                provider,
                message,
                status_code,
            },
            ProviderError::Protocol { provider, message } => Self::Service {
                provider,
                message,
                status_code: None,
            },
        }
    }
}

/// Configuration and input errors raised outside a transformation call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HarnessError {
    /// Invalid harness/provider configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid caller input.
    #[error("validation error: {0}")]
    Validation(String),
    /// Requested provider is not registered in the harness.
    #[error("provider not found: {provider}")]
    ProviderNotFound { provider: ProviderId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_collapse_to_network_kind() {
        let err: TransformError =
            ProviderError::transport("gemini", "Gemini request failed: reset").into();
        assert_eq!(err.kind(), TransformErrorKind::Network);
        assert_eq!(err.to_string(), "Gemini request failed: reset");
    }

    #[test]
    fn protocol_and_status_errors_collapse_to_service_kind() {
        let missing: TransformError =
            ProviderError::protocol("gemini", "Could not find image in model response.").into();
        assert_eq!(missing.kind(), TransformErrorKind::Service);
        assert_eq!(missing.to_string(), "Could not find image in model response.");

        let denied: TransformError =
            ProviderError::provider("gemini", "PERMISSION_DENIED: bad key", Some(403)).into();
        assert!(matches!(
            denied,
            TransformError::Service {
                status_code: Some(403),
                ..
            }
        ));
    }

    #[test]
    fn retryable_classification() {
        assert!(ProviderError::transport("gemini", "x").is_retryable());
        assert!(ProviderError::provider("gemini", "x", Some(429)).is_retryable());
        assert!(ProviderError::provider("gemini", "x", Some(503)).is_retryable());
        assert!(!ProviderError::provider("gemini", "x", Some(400)).is_retryable());
        assert!(!ProviderError::protocol("gemini", "x").is_retryable());
    }

    #[test]
    fn timeout_message_names_budget() {
        let err = TransformError::Timeout(Duration::from_secs(30));
        assert_eq!(err.kind(), TransformErrorKind::Timeout);
        assert_eq!(err.to_string(), "transformation timed out after 30s");
    }
}
