/// Page status definitions for reporting crawl outcomes
///
/// Every page and script the crawler fetches ends in exactly one of these
/// statuses. They drive logging and the end-of-run statistics.
use std::fmt;

/// Represents the outcome of fetching one page or script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageStatus {
    // ===== Success =====
    /// Fetched with a 2xx status and its text was scanned
    Processed,

    // ===== Errors =====
    /// Server answered 404 or 410
    DeadLink,

    /// Server answered with another non-success status
    HttpError,

    /// Could not be reached (connection refused, DNS failure, timeout)
    Unreachable,

    /// Fetch failed for other reasons (redirect loop, unreadable body, etc.)
    Failed,
}

impl PageStatus {
    /// Returns true if this represents a successful fetch
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// Short machine-friendly name used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::DeadLink => "dead_link",
            Self::HttpError => "http_error",
            Self::Unreachable => "unreachable",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible page statuses
    pub fn all() -> [Self; 5] {
        [
            Self::Processed,
            Self::DeadLink,
            Self::HttpError,
            Self::Unreachable,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
