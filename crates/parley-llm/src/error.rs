use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Upstream rejected credentials (401): {body}")]
    Unauthorized { body: String },

    #[error("Upstream rate limit exceeded (429): {body}")]
    RateLimited { body: String },

    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Upstream transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("Invalid client configuration: {0}")]
    Configuration(String),
}

impl UpstreamError {
    /// Classify a non-success HTTP status returned by the endpoint
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => Self::Unauthorized { body },
            429 => Self::RateLimited { body },
            _ => Self::Status { status, body },
        }
    }

    /// HTTP status reported by the endpoint, if it answered at all
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::RateLimited { .. } => Some(429),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(
            UpstreamError::from_status(401, String::new()),
            UpstreamError::Unauthorized { .. }
        ));
        assert!(matches!(
            UpstreamError::from_status(429, String::new()),
            UpstreamError::RateLimited { .. }
        ));
        assert!(matches!(
            UpstreamError::from_status(503, "busy".to_string()),
            UpstreamError::Status { status: 503, .. }
        ));
    }

    #[test]
    fn test_upstream_status() {
        assert_eq!(UpstreamError::from_status(404, String::new()).upstream_status(), Some(404));
        assert_eq!(UpstreamError::Timeout(Duration::from_secs(30)).upstream_status(), None);
        assert!(UpstreamError::Timeout(Duration::from_secs(30)).is_timeout());
    }
}
