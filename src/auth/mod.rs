//! OAuth2 credentials for the activity API.
//!
//! A cached authorized-user token is loaded from disk, refreshed when it has
//! expired, or obtained through the installed-app authorization-code flow on
//! a loopback redirect. Whatever comes out is written back for the next run.

mod flow;
mod pkce;
mod provider;
mod secrets;
mod store;
mod token;

use thiserror::Error;

pub use flow::{AuthorizationFlow, InstalledAppFlow};
pub use pkce::Pkce;
pub use provider::CredentialProvider;
pub use secrets::ClientSecrets;
pub use store::{CredentialStore, FileCredentialStore};
pub use token::StoredToken;

pub const DRIVE_ACTIVITY_SCOPE: &str = "https://www.googleapis.com/auth/drive.activity";
pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: invalid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid client secrets: {0}")]
    InvalidClientSecrets(String),
    #[error("token endpoint returned HTTP {status}: {message}")]
    TokenEndpoint { status: u16, message: String },
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no refresh token available")]
    NoRefreshToken,
    #[error("credential has no access token")]
    MissingAccessToken,
    #[error("authorization denied: {0}")]
    Denied(String),
    #[error("authorization redirect state did not match")]
    StateMismatch,
    #[error("malformed authorization redirect: {0}")]
    BadRedirect(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
