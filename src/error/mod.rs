//! Crate-wide error taxonomy.
//!
//! Validation and admission errors surface synchronously to the caller;
//! execution-time downstream failures are captured into the request record
//! and reported as a normal `failed` result instead of propagating.

use thiserror::Error;

/// Errors produced by the parameterization and admission pipeline.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Uploaded bytes are not valid structured data at all.
    #[error("Upload is not valid JSON: {0}")]
    ParseFailure(String),
    /// Upload parsed, but the graph shape is wrong (e.g. no `nodes` array).
    #[error("Malformed workflow graph: {0}")]
    GraphFormat(String),
    /// An app-required parameter key is missing, null, or empty.
    #[error("Missing required parameter: {0}")]
    MissingRequiredParam(String),
    /// Sliding-window rate limit exceeded for the app. Retry later.
    #[error("Rate limit exceeded for app: {0}")]
    RateLimited(String),
    /// Concurrency limit reached for the app. Retry later.
    #[error("Concurrency limit reached for app: {0}")]
    ConcurrencyLimited(String),
    /// Downstream generation service unreachable or returned non-2xx.
    #[error("Upstream generation service unavailable: {0}")]
    UpstreamUnavailable(String),
    /// Duplicate unique key at the storage layer (e.g. checksum race).
    #[error("Storage conflict: {0}")]
    StorageConflict(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FlowError {
    /// Stable machine-readable code, used by the streaming error event.
    pub fn code(&self) -> &'static str {
        match self {
            FlowError::ParseFailure(_) => "parse_failure",
            FlowError::GraphFormat(_) => "graph_format",
            FlowError::MissingRequiredParam(_) => "missing_required_param",
            FlowError::RateLimited(_) => "rate_limited",
            FlowError::ConcurrencyLimited(_) => "concurrency_limited",
            FlowError::UpstreamUnavailable(_) => "upstream_unavailable",
            FlowError::StorageConflict(_) => "storage_conflict",
            FlowError::Storage(_) => "storage",
            FlowError::NotFound(_) => "not_found",
            FlowError::Internal(_) => "internal",
        }
    }

    /// Whether the caller may retry without changing the request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FlowError::RateLimited(_)
                | FlowError::ConcurrencyLimited(_)
                | FlowError::UpstreamUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            FlowError::ParseFailure("bad byte".into()).to_string(),
            "Upload is not valid JSON: bad byte"
        );
        assert_eq!(
            FlowError::GraphFormat("no nodes".into()).to_string(),
            "Malformed workflow graph: no nodes"
        );
        assert_eq!(
            FlowError::MissingRequiredParam("prompt_text".into()).to_string(),
            "Missing required parameter: prompt_text"
        );
        assert_eq!(
            FlowError::RateLimited("app1".into()).to_string(),
            "Rate limit exceeded for app: app1"
        );
        assert_eq!(
            FlowError::ConcurrencyLimited("app1".into()).to_string(),
            "Concurrency limit reached for app: app1"
        );
        assert_eq!(
            FlowError::StorageConflict("checksum".into()).to_string(),
            "Storage conflict: checksum"
        );
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(FlowError::RateLimited("a".into()).code(), "rate_limited");
        assert_eq!(
            FlowError::ConcurrencyLimited("a".into()).code(),
            "concurrency_limited"
        );
        assert_eq!(
            FlowError::MissingRequiredParam("k".into()).code(),
            "missing_required_param"
        );
        assert_eq!(
            FlowError::UpstreamUnavailable("down".into()).code(),
            "upstream_unavailable"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(FlowError::RateLimited("a".into()).is_retryable());
        assert!(FlowError::ConcurrencyLimited("a".into()).is_retryable());
        assert!(FlowError::UpstreamUnavailable("x".into()).is_retryable());
        assert!(!FlowError::GraphFormat("x".into()).is_retryable());
        assert!(!FlowError::MissingRequiredParam("k".into()).is_retryable());
    }
}
