//! The single error kind of the dashboard.
//!
//! Every failure on the way to a snapshot (or a trigger report) collapses
//! into [`FetchError`]. Callers log it and carry on; nothing here is fatal.

/// Network, status or parse failure on a backend call.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection refused, timeout, reset, body read failure.
    #[error("transport error on {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// The backend answered with something other than 200.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The body was not the expected JSON shape.
    #[error("malformed body from {endpoint}: {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend answered 200 but reported `status: "Error"`.
    #[error("backend rejected trade cycle: {message}")]
    Rejected { message: String },
}

impl FetchError {
    pub fn transport(endpoint: &str, err: impl std::fmt::Display) -> Self {
        FetchError::Transport {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }

    /// Short machine-friendly tag for log records.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "transport",
            FetchError::Status { .. } => "status",
            FetchError::Parse { .. } => "parse",
            FetchError::Rejected { .. } => "rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FetchError::Status {
            endpoint: "/api/stats".into(),
            status: 503,
        };
        assert_eq!(err.to_string(), "/api/stats returned HTTP 503");
        assert_eq!(err.kind(), "status");
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = FetchError::Parse {
            endpoint: "/api/stats".into(),
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_transport_helper() {
        let err = FetchError::transport("/api/trade", "connection refused");
        assert!(err.to_string().contains("connection refused"));
    }
}
