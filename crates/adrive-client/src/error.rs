//! Client error types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, DriveError>;

/// Client errors
#[derive(Error, Debug)]
pub enum DriveError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote returned 404 for a request. Recoverable: path resolution
    /// uses this as a control-flow signal before falling back to a scan.
    #[error("failed to request \"{url}\", got \"404\"")]
    NotFound { url: String },

    /// A name scan of a parent folder found no matching child
    #[error("can't find \"{name}\", kind: \"{kind}\" under \"{parent}\"")]
    NodeNotFound {
        name: String,
        kind: String,
        parent: String,
    },

    /// The remote returned a non-2xx status other than 404
    #[error("failed to request \"{url}\", got \"{status}\"")]
    RequestFailed { url: String, status: u16 },

    /// Rejected before any network call (root-sentinel operation,
    /// disallowed upload format)
    #[error("{0}")]
    Validation(String),

    /// Response body could not be parsed into the expected shape.
    /// Carries the raw body for diagnosis.
    #[error("failed to parse response \"{body}\": {message}")]
    ParseResponse { message: String, body: String },

    /// Response was parseable but missing a field the protocol requires
    /// (e.g. an empty part list when parts were expected)
    #[error("{0}")]
    InvalidResponse(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive synthesis error
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A lower-level error annotated with the operating path or node
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<DriveError>,
    },
}

impl DriveError {
    /// Wrap this error with contextual information as it rises
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check if this is a "not found" error, looking through context wrappers
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::NodeNotFound { .. } => true,
            Self::Context { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let err = DriveError::NotFound {
            url: "https://api.example.com/v2/file/get_by_path".to_string(),
        };
        assert!(err.is_not_found());

        let wrapped = err.context("failed to find node of \"/a/b\"");
        assert!(wrapped.is_not_found());
        assert!(
            wrapped
                .to_string()
                .starts_with("failed to find node of \"/a/b\"")
        );

        let err = DriveError::RequestFailed {
            url: "https://api.example.com/v2/file/list".to_string(),
            status: 500,
        };
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_scan_miss_is_not_found() {
        let err = DriveError::NodeNotFound {
            name: "report.txt".to_string(),
            kind: "file".to_string(),
            parent: "docs".to_string(),
        };
        assert!(err.is_not_found());
    }
}
