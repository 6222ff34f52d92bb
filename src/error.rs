//! Error types shared by data sources and view-models.

use thiserror::Error;

/// Failure of a single page fetch or publish request.
///
/// Errors are terminal for the trigger that caused them: nothing retries,
/// and the paged list is left exactly as it was before the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The transport (or its simulation) failed.
    #[error("fetch failed: {reason}")]
    Failed { reason: String },

    /// Pages and limits are 1-based and must be non-zero.
    #[error("invalid page request (page {page}, limit {limit})")]
    InvalidRequest { page: u32, limit: u32 },
}

impl FetchError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_reason() {
        let err = FetchError::failed("connection reset");
        assert_eq!(err.to_string(), "fetch failed: connection reset");
    }

    #[test]
    fn display_includes_page_and_limit() {
        let err = FetchError::InvalidRequest { page: 0, limit: 10 };
        assert_eq!(err.to_string(), "invalid page request (page 0, limit 10)");
    }
}
