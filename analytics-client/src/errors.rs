//! Errors returned by the analytics client

use thiserror::Error;

/// Error type for the analytics client
#[derive(Debug, Error)]
pub enum AnalyticsClientError {
    /// Error building the request URL
    #[error("error building request URL: {0}")]
    UrlBuild(String),
    /// Error sending the HTTP request
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success status code
    #[error("request failed with status {0}: {1}")]
    StatusCode(u16, String),
    /// The response body could not be deserialized
    #[error("serde error: {0}")]
    Serde(String),
    /// The GraphQL response carried errors
    #[error("GraphQL query failed: {0}")]
    GraphQl(String),
}

impl AnalyticsClientError {
    /// Create a new URL build error
    #[allow(clippy::needless_pass_by_value)]
    pub fn url_build<T: ToString>(msg: T) -> Self {
        Self::UrlBuild(msg.to_string())
    }

    /// Create a new serde error
    #[allow(clippy::needless_pass_by_value)]
    pub fn serde<T: ToString>(msg: T) -> Self {
        Self::Serde(msg.to_string())
    }
}
