use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("request failed: HTTP {status}: {body}")]
    RequestFailed { status: u16, body: String },
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("config error: {0}")]
    ConfigError(String),
    #[error("timeout")]
    Timeout,
}

pub type ClientResult<T> = Result<T, ClientError>;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Body of an `activity:query` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityQuery {
    pub page_size: u32,
    /// e.g. `time >= "2022-09-15T00:00:00-05:00"`
    pub filter: Option<String>,
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            filter: None,
        }
    }
}

#[async_trait]
pub trait ActivityClient: Send + Sync {
    /// Fetches the first page of activity for the authenticated user.
    ///
    /// Records are returned raw, in wire field order, for the decoder.
    async fn query_activity(&self, query: &ActivityQuery) -> ClientResult<Vec<serde_json::Value>>;
}
