use std::time::Duration;

use thiserror::Error;

/// A call against the tracking service that did not produce usable data.
#[derive(Debug, Error)]
pub enum UpstreamQueryError {
    #[error("{operation} failed: {status} {body}")]
    Status {
        operation: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{operation} timed out after {}s", .timeout.as_secs())]
    Timeout {
        operation: String,
        timeout: Duration,
    },
    #[error("{operation} request failed")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to decode {operation} response (response text: {body})")]
    Decode {
        operation: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl UpstreamQueryError {
    /// Whether a batch may drop the failing item and carry on.
    ///
    /// Error statuses and timeouts are per-item. Transport and decode
    /// failures point at the service or the session as a whole (a sign-in
    /// page instead of JSON, a refused connection) and abort the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Timeout { .. })
    }
}

/// One hypothesis could not be fetched.
#[derive(Debug, Error)]
#[error("failed to fetch child {id}")]
pub struct ChildFetchError {
    pub id: u64,
    #[source]
    pub source: UpstreamQueryError,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template '{0}' not found")]
    TemplateMissing(String),
    #[error("PDF engine failed: {0}")]
    Pdf(String),
    #[error("{format} renderer produced no output; refusing to write an empty file")]
    EmptyOutput { format: String },
}

#[derive(Debug, Error)]
pub enum SchemaValidationError {
    #[error("OKR data validation failed at {path}: {message}")]
    Invalid { path: String, message: String },
    #[error("failed to load schema {path}: {reason}")]
    Load { path: String, reason: String },
    #[error("failed to compile schema: {0}")]
    Compile(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_embeds_status_and_body() {
        let err = UpstreamQueryError::Status {
            operation: "WIQL query".into(),
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: "TF400813: not authorized".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("TF400813"));
    }

    #[test]
    fn timeout_error_names_duration() {
        let err = UpstreamQueryError::Timeout {
            operation: "fetch work item 7".into(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "fetch work item 7 timed out after 30s");
    }

    fn decode_error(body: &str) -> UpstreamQueryError {
        UpstreamQueryError::Decode {
            operation: "fetch work item 5".into(),
            body: body.into(),
            source: serde_json::from_str::<serde_json::Value>(body).unwrap_err(),
        }
    }

    #[test]
    fn only_status_and_timeout_are_recoverable() {
        let status = UpstreamQueryError::Status {
            operation: "fetch work item 5".into(),
            status: reqwest::StatusCode::NOT_FOUND,
            body: String::new(),
        };
        let timeout = UpstreamQueryError::Timeout {
            operation: "fetch work item 5".into(),
            timeout: Duration::from_secs(1),
        };
        assert!(status.is_recoverable());
        assert!(timeout.is_recoverable());
        assert!(!decode_error("<html>sign in</html>").is_recoverable());
    }

    #[test]
    fn decode_error_keeps_response_text() {
        let msg = decode_error("<html>sign in</html>").to_string();
        assert!(msg.contains("<html>sign in</html>"), "{msg}");
    }

    #[test]
    fn child_fetch_error_names_child() {
        let err = ChildFetchError {
            id: 42,
            source: UpstreamQueryError::Status {
                operation: "fetch work item 42".into(),
                status: reqwest::StatusCode::NOT_FOUND,
                body: String::new(),
            },
        };
        assert!(err.to_string().starts_with("failed to fetch child 42"));
    }
}
