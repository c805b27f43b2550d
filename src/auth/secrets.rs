use std::path::Path;

use serde::Deserialize;

use super::{AuthError, AuthResult, DEFAULT_AUTH_URI, DEFAULT_TOKEN_URI};

/// OAuth client registration, as downloaded from the cloud console.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ClientSecrets {
    /// Accepts both `installed` and `web` client types, preferring `installed`.
    pub fn from_json(path: &str, content: &str) -> AuthResult<Self> {
        let file: SecretsFile = serde_json::from_str(content).map_err(|source| AuthError::Json {
            path: path.to_string(),
            source,
        })?;
        file.installed.or(file.web).ok_or_else(|| {
            AuthError::InvalidClientSecrets(format!(
                "{} has neither an \"installed\" nor a \"web\" section",
                path
            ))
        })
    }

    pub fn load(path: &Path) -> AuthResult<Self> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| AuthError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&display, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installed_client_is_read() {
        let secrets = ClientSecrets::from_json(
            "credentials.json",
            r#"{"installed": {
                "client_id": "id.apps.googleusercontent.com",
                "project_id": "p",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "client_secret": "s3cret",
                "redirect_uris": ["http://localhost"]
            }}"#,
        )
        .expect("parse");

        assert_eq!(secrets.client_id, "id.apps.googleusercontent.com");
        assert_eq!(secrets.client_secret, "s3cret");
    }

    #[test]
    fn web_client_gets_default_uris() {
        let secrets = ClientSecrets::from_json(
            "credentials.json",
            r#"{"web": {"client_id": "id", "client_secret": "s"}}"#,
        )
        .expect("parse");

        assert_eq!(secrets.auth_uri, DEFAULT_AUTH_URI);
        assert_eq!(secrets.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn other_client_types_are_rejected() {
        let err = ClientSecrets::from_json("credentials.json", r#"{"service_account": {}}"#).unwrap_err();
        assert!(matches!(err, AuthError::InvalidClientSecrets(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ClientSecrets::load(&dir.path().join("credentials.json")).unwrap_err();
        assert!(matches!(err, AuthError::Io { .. }));
    }
}
