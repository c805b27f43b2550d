use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{AuthError, AuthResult, ClientSecrets, DEFAULT_TOKEN_URI};

/// Tokens within this margin of expiry are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 10;

/// Authorized-user credential, in the same JSON layout Google's client
/// libraries write, so an existing `token.json` keeps working.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredToken {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    /// Fields we do not use (`account`, `universe_domain`), kept on rewrite.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Successful response from the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

impl StoredToken {
    pub(crate) fn from_grant(
        secrets: &ClientSecrets,
        response: TokenResponse,
        requested_scopes: &[String],
        now: DateTime<Utc>,
    ) -> Self {
        let scopes = granted_scopes(response.scope.as_deref(), requested_scopes);
        Self {
            token: Some(response.access_token),
            refresh_token: response.refresh_token,
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes,
            expiry: response.expires_in.map(|secs| now + Duration::seconds(secs)),
            extra: serde_json::Map::new(),
        }
    }

    /// Applies a refresh response. The refresh token is only replaced when
    /// the endpoint issued a new one.
    pub(crate) fn refreshed(&self, response: TokenResponse, now: DateTime<Utc>) -> Self {
        let mut token = self.clone();
        token.token = Some(response.access_token);
        token.expiry = response.expires_in.map(|secs| now + Duration::seconds(secs));
        if let Some(refresh_token) = response.refresh_token {
            token.refresh_token = Some(refresh_token);
        }
        if let Some(scope) = response.scope.as_deref() {
            token.scopes = granted_scopes(Some(scope), &self.scopes);
        }
        token
    }

    pub fn access_token(&self) -> AuthResult<&str> {
        self.token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingAccessToken)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_some_and(|expiry| now + Duration::seconds(EXPIRY_SKEW_SECS) >= expiry)
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.access_token().is_ok() && !self.is_expired_at(now)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// A file written without a scope list is assumed to cover what we ask for.
    pub fn covers(&self, requested: &[String]) -> bool {
        self.scopes.is_empty() || requested.iter().all(|scope| self.scopes.contains(scope))
    }
}

fn granted_scopes(granted: Option<&str>, fallback: &[String]) -> Vec<String> {
    match granted {
        Some(scope) if !scope.trim().is_empty() => {
            scope.split_whitespace().map(str::to_string).collect()
        }
        _ => fallback.to_vec(),
    }
}

/// Form POST to a token endpoint.
pub(crate) async fn request_token(
    http: &reqwest::Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> AuthResult<TokenResponse> {
    let response = http.post(token_uri).form(form).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(err) => match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error,
            },
            Err(_) => body,
        };
        return Err(AuthError::TokenEndpoint {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|source| AuthError::Json {
        path: token_uri.to_string(),
        source,
    })
}
