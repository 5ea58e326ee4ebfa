//! Error types for the Amoveo client

use thiserror::Error;

/// Main error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout waiting for {operation}")]
    Timeout { operation: String },

    #[error("HTTP error status {status} from {service}")]
    Http { service: String, status: u16 },

    #[error("Node replied with error: {0}")]
    Node(String),

    #[error("Inconsistent chain data: {0}")]
    DecodeInconsistency(String),

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Transaction rejected by node: {reason}")]
    Rejected { reason: String },

    #[error("Transaction {hash} not found")]
    NotFound { hash: String },
}

impl ClientError {
    /// Check if the error came from the wire rather than the data on it
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_) | ClientError::Timeout { .. } | ClientError::Http { .. }
        )
    }

    /// Check if the error is the expected "no record yet" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// Check if the remote node refused a submitted transaction
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Rejected { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout {
                operation: err
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "request".to_string()),
            }
        } else if let Some(status) = err.status() {
            ClientError::Http {
                service: err
                    .url()
                    .and_then(|u| u.host_str().map(String::from))
                    .unwrap_or_else(|| "remote".to_string()),
                status: status.as_u16(),
            }
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::Rejected {
            reason: "nonce too low".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Transaction rejected by node: nonce too low"
        );

        let err = ClientError::NotFound {
            hash: "abc".to_string(),
        };
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_error_classification() {
        assert!(ClientError::Transport("reset".into()).is_transport());
        assert!(ClientError::Timeout {
            operation: "height".into()
        }
        .is_transport());
        assert!(!ClientError::NotFound { hash: "x".into() }.is_transport());
        assert!(ClientError::NotFound { hash: "x".into() }.is_not_found());
        assert!(ClientError::Rejected {
            reason: "bad sig".into()
        }
        .is_rejection());
    }
}
