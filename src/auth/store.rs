use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;

use super::token::request_token;
use super::{AuthError, AuthResult, StoredToken};

/// Where the cached credential lives and how it is renewed.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `Ok(None)` when nothing has been cached yet.
    async fn load(&self) -> AuthResult<Option<StoredToken>>;

    async fn refresh(&self, token: &StoredToken) -> AuthResult<StoredToken>;

    async fn persist(&self, token: &StoredToken) -> AuthResult<()>;
}

/// Token cache in a JSON file, refreshed against the token's own `token_uri`.
pub struct FileCredentialStore {
    path: PathBuf,
    http: reqwest::Client,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>, http: reqwest::Client) -> Self {
        Self {
            path: path.into(),
            http,
        }
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> AuthResult<Option<StoredToken>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No cached token");
                return Ok(None);
            }
            Err(source) => {
                return Err(AuthError::Io {
                    path: self.display(),
                    source,
                })
            }
        };

        let token = serde_json::from_str(&content).map_err(|source| AuthError::Json {
            path: self.display(),
            source,
        })?;
        Ok(Some(token))
    }

    async fn refresh(&self, token: &StoredToken) -> AuthResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::NoRefreshToken)?;

        tracing::info!(token_uri = %token.token_uri, "Refreshing access token");
        let response = request_token(
            &self.http,
            &token.token_uri,
            &[
                ("client_id", token.client_id.as_str()),
                ("client_secret", token.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ],
        )
        .await?;

        Ok(token.refreshed(response, Utc::now()))
    }

    async fn persist(&self, token: &StoredToken) -> AuthResult<()> {
        let json = serde_json::to_string(token).map_err(|source| AuthError::Json {
            path: self.display(),
            source,
        })?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| AuthError::Io {
                path: self.display(),
                source,
            })?;
        tracing::info!(path = %self.path.display(), "Saved credentials");
        Ok(())
    }
}
