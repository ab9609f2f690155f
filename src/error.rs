use thiserror::Error;

/// HTTP layer failures
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Response decode error: {0}")]
    Decode(String),
}

/// WeChat Pay SDK error types
#[derive(Debug, Error)]
pub enum WechatPayError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required parameter: {0}")]
    MissingParam(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Signature verification failed: {0}")]
    Signature(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl From<reqwest::Error> for WechatPayError {
    fn from(error: reqwest::Error) -> Self {
        WechatPayError::Http(HttpError::Reqwest(error))
    }
}

impl WechatPayError {
    /// Build a decode error that keeps the offending body for diagnostics.
    pub(crate) fn decode(body: &[u8], source: serde_json::Error) -> Self {
        WechatPayError::Http(HttpError::Decode(format!(
            "{} (body: {})",
            source,
            String::from_utf8_lossy(body)
        )))
    }

    /// Returns `true` for errors raised before any request left the process.
    pub fn is_validation(&self) -> bool {
        matches!(self, WechatPayError::MissingParam(_))
    }
}
