use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("timed out after {secs}s fetching {url}")]
    Timeout { url: String, secs: u64 },
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("search form [name='{name}'] not found on {url}")]
    FormNotFound { name: String, url: String },
    #[error("bad structural path {path}: {reason}")]
    Selector { path: String, reason: String },
    #[error("no parcel found (id={id:?}, site address={site_address:?})")]
    NoParcel { id: String, site_address: String },
    #[error("configuration: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

impl ScrapeError {
    /// Stable short code reported to callers alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            ScrapeError::Http { .. } => "1",
            ScrapeError::Status { .. } => "1.2",
            ScrapeError::Timeout { .. } => "1.3",
            ScrapeError::FormNotFound { .. } => "1.1",
            ScrapeError::InvalidUrl { .. } => "2",
            ScrapeError::NoParcel { .. } => "10",
            ScrapeError::Selector { .. } => "20",
            ScrapeError::Config(_) => "30",
            ScrapeError::Io(_) => "40",
        }
    }

    /// The URL or value the error is about, if any.
    pub fn object(&self) -> String {
        match self {
            ScrapeError::Http { url, .. }
            | ScrapeError::Status { url, .. }
            | ScrapeError::Timeout { url, .. }
            | ScrapeError::InvalidUrl { url, .. }
            | ScrapeError::FormNotFound { url, .. } => url.clone(),
            ScrapeError::Selector { path, .. } => path.clone(),
            ScrapeError::NoParcel { id, .. } => id.clone(),
            _ => String::new(),
        }
    }
}

/// JSON body printed for a fatal error.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: String,
    pub object: String,
}

impl From<&ScrapeError> for ErrorBody {
    fn from(err: &ScrapeError) -> Self {
        ErrorBody {
            message: err.to_string(),
            code: err.code().to_string(),
            object: err.object(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_carries_code_and_object() {
        let err = ScrapeError::Status {
            url: "http://www.bcpa.net/RecInfo.asp".into(),
            status: 500,
        };
        let body = ErrorBody::from(&err);
        assert_eq!(body.code, "1.2");
        assert_eq!(body.object, "http://www.bcpa.net/RecInfo.asp");
        assert!(body.message.contains("HTTP 500"));
    }
}
