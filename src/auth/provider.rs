use chrono::Utc;

use super::{AuthResult, AuthorizationFlow, CredentialStore, StoredToken};

/// Resolves a usable credential: cached, refreshed, or freshly authorized.
pub struct CredentialProvider<S, F> {
    store: S,
    flow: F,
    scopes: Vec<String>,
}

impl<S: CredentialStore, F: AuthorizationFlow> CredentialProvider<S, F> {
    pub fn new(store: S, flow: F, scopes: Vec<String>) -> Self {
        Self {
            store,
            flow,
            scopes,
        }
    }

    pub async fn credential(&self) -> AuthResult<StoredToken> {
        let cached = self
            .store
            .load()
            .await?
            .filter(|token| token.covers(&self.scopes));

        let token = match cached {
            Some(token) if token.is_valid_at(Utc::now()) => {
                tracing::debug!("Using cached credentials");
                return Ok(token);
            }
            Some(token) if token.is_expired_at(Utc::now()) && token.can_refresh() => {
                self.store.refresh(&token).await?
            }
            _ => {
                tracing::info!("No usable cached credentials, authorizing");
                self.flow.authorize(&self.scopes).await?
            }
        };

        self.store.persist(&token).await?;
        Ok(token)
    }
}
