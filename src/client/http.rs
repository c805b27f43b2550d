use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{ActivityClient, ActivityQuery, ClientError, ClientResult};

pub const DEFAULT_ENDPOINT: &str = "https://driveactivity.googleapis.com";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    activities: Vec<serde_json::Value>,
    next_page_token: Option<String>,
}

/// Drive Activity v2 over HTTPS with a bearer token.
pub struct HttpActivityClient {
    http: reqwest::Client,
    query_url: Url,
    access_token: String,
}

impl HttpActivityClient {
    pub fn new(http: reqwest::Client, endpoint: &str, access_token: String) -> ClientResult<Self> {
        let query_url = Url::parse(endpoint)
            .and_then(|base| base.join("/v2/activity:query"))
            .map_err(|e| ClientError::ConfigError(format!("invalid endpoint {}: {}", endpoint, e)))?;

        Ok(Self {
            http,
            query_url,
            access_token,
        })
    }

    pub fn query_url(&self) -> &Url {
        &self.query_url
    }
}

#[async_trait]
impl ActivityClient for HttpActivityClient {
    async fn query_activity(&self, query: &ActivityQuery) -> ClientResult<Vec<serde_json::Value>> {
        let body = QueryRequest {
            page_size: query.page_size,
            filter: query.filter.as_deref(),
        };
        tracing::info!(page_size = query.page_size, filter = ?query.filter, "Querying drive activity");

        let response = self
            .http
            .post(self.query_url.clone())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        let text = response.text().await.map_err(http_error)?;
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Activity query failed");
            return Err(status_error(status, text));
        }

        let parsed: QueryResponse = serde_json::from_str(&text)
            .map_err(|e| ClientError::ParseError(format!("invalid query response: {}", e)))?;

        tracing::info!(count = parsed.activities.len(), "Activity query returned");
        if parsed.next_page_token.is_some() {
            tracing::debug!("More activity is available; only the first page is reported");
        }

        Ok(parsed.activities)
    }
}

fn http_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else if e.is_connect() {
        ClientError::ConnectionError(e.to_string())
    } else if e.is_decode() {
        ClientError::ParseError(e.to_string())
    } else {
        ClientError::RequestFailed {
            status: e.status().map_or(0, |s| s.as_u16()),
            body: e.to_string(),
        }
    }
}

fn status_error(status: StatusCode, body: String) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized(body),
        _ => ClientError::RequestFailed {
            status: status.as_u16(),
            body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubEndpoint;

    const QUERY_PATH: &str = "/v2/activity:query";

    #[test]
    fn query_url_is_built_from_endpoint() {
        let client = HttpActivityClient::new(reqwest::Client::new(), DEFAULT_ENDPOINT, "t".into())
            .expect("client");
        assert_eq!(
            client.query_url().as_str(),
            "https://driveactivity.googleapis.com/v2/activity:query"
        );
    }

    #[test]
    fn invalid_endpoint_is_config_error() {
        let result = HttpActivityClient::new(reqwest::Client::new(), "not a url", "t".into());
        assert!(matches!(result, Err(ClientError::ConfigError(_))));
    }

    #[tokio::test]
    async fn query_sends_page_size_and_bearer_token() {
        let endpoint = StubEndpoint::spawn(
            QUERY_PATH,
            StatusCode::OK,
            r#"{"activities": [{"timestamp": "t1"}, {"timestamp": "t2"}], "nextPageToken": "n"}"#,
        )
        .await;
        let client = HttpActivityClient::new(reqwest::Client::new(), &endpoint.base_url, "tok-1".into())
            .expect("client");

        let activities = client
            .query_activity(&ActivityQuery::default())
            .await
            .expect("query");
        let request = endpoint.single_request();

        assert_eq!(activities.len(), 2);
        assert_eq!(request.authorization.as_deref(), Some("Bearer tok-1"));
        assert_eq!(request.body, r#"{"pageSize":20}"#);
    }

    #[tokio::test]
    async fn query_includes_filter_when_set() {
        let endpoint = StubEndpoint::spawn(QUERY_PATH, StatusCode::OK, "{}").await;
        let client = HttpActivityClient::new(reqwest::Client::new(), &endpoint.base_url, "tok".into())
            .expect("client");
        let query = ActivityQuery {
            page_size: 5,
            filter: Some("detail.action_detail_case:CREATE".into()),
        };

        let activities = client.query_activity(&query).await.expect("query");

        assert!(activities.is_empty());
        assert_eq!(
            endpoint.single_request().body,
            r#"{"pageSize":5,"filter":"detail.action_detail_case:CREATE"}"#
        );
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let endpoint = StubEndpoint::spawn(
            QUERY_PATH,
            StatusCode::FORBIDDEN,
            r#"{"error": {"code": 403, "message": "Drive Activity API has not been used"}}"#,
        )
        .await;
        let client = HttpActivityClient::new(reqwest::Client::new(), &endpoint.base_url, "tok".into())
            .expect("client");

        let err = client
            .query_activity(&ActivityQuery::default())
            .await
            .unwrap_err();

        match err {
            ClientError::RequestFailed { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("has not been used"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unauthorized_status_is_distinguished() {
        let endpoint = StubEndpoint::spawn(QUERY_PATH, StatusCode::UNAUTHORIZED, "{}").await;
        let client = HttpActivityClient::new(reqwest::Client::new(), &endpoint.base_url, "stale".into())
            .expect("client");

        let err = client
            .query_activity(&ActivityQuery::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Unauthorized(_)));
    }
}
