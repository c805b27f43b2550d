use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

use super::token::request_token;
use super::{AuthError, AuthResult, ClientSecrets, Pkce, StoredToken};

const LOOPBACK_HOST: &str = "127.0.0.1";
const SUCCESS_PAGE: &str = "Authorization complete. You can close this window.";
const FAILURE_PAGE: &str = "Authorization failed. Check the terminal for details.";

/// Obtains a brand-new credential when nothing usable is cached.
#[async_trait]
pub trait AuthorizationFlow: Send + Sync {
    async fn authorize(&self, scopes: &[String]) -> AuthResult<StoredToken>;
}

/// Authorization-code flow with PKCE for installed apps, with the redirect
/// caught on a loopback listener.
pub struct InstalledAppFlow {
    secrets_path: PathBuf,
    http: reqwest::Client,
    port: u16,
    open_browser: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Redirect {
    Code(String),
    Denied(String),
    /// Anything without a code or an error, e.g. a bare reload.
    Ignored,
}

/// Shared with the redirect handler; the sender is taken by the first
/// request that settles the flow.
struct RedirectState {
    expected_state: String,
    outcome: Mutex<Option<oneshot::Sender<AuthResult<String>>>>,
}

impl InstalledAppFlow {
    pub fn new(secrets_path: impl Into<PathBuf>, http: reqwest::Client) -> Self {
        Self {
            secrets_path: secrets_path.into(),
            http,
            port: 0,
            open_browser: true,
        }
    }

    /// Port 0 picks an ephemeral port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    pub fn authorization_url(
        secrets: &ClientSecrets,
        redirect_uri: &str,
        scopes: &[String],
        state: &str,
        pkce: &Pkce,
    ) -> AuthResult<Url> {
        let scope = scopes.join(" ");
        Url::parse_with_params(
            &secrets.auth_uri,
            &[
                ("response_type", "code"),
                ("client_id", secrets.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("scope", scope.as_str()),
                ("state", state),
                ("code_challenge", pkce.code_challenge.as_str()),
                ("code_challenge_method", Pkce::METHOD),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| AuthError::InvalidClientSecrets(format!("auth_uri {}: {}", secrets.auth_uri, e)))
    }

    async fn exchange_code(
        &self,
        secrets: &ClientSecrets,
        code: &str,
        redirect_uri: &str,
        pkce: &Pkce,
        scopes: &[String],
    ) -> AuthResult<StoredToken> {
        let response = request_token(
            &self.http,
            &secrets.token_uri,
            &[
                ("code", code),
                ("client_id", secrets.client_id.as_str()),
                ("client_secret", secrets.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("code_verifier", pkce.code_verifier.as_str()),
                ("grant_type", "authorization_code"),
            ],
        )
        .await?;

        Ok(StoredToken::from_grant(secrets, response, scopes, Utc::now()))
    }
}

#[async_trait]
impl AuthorizationFlow for InstalledAppFlow {
    async fn authorize(&self, scopes: &[String]) -> AuthResult<StoredToken> {
        let secrets = ClientSecrets::load(&self.secrets_path)?;

        let listener = TcpListener::bind((LOOPBACK_HOST, self.port))
            .await
            .map_err(loopback_error)?;
        let port = listener.local_addr().map_err(loopback_error)?.port();
        let redirect_uri = format!("http://{}:{}/", LOOPBACK_HOST, port);
        let state = uuid::Uuid::new_v4().simple().to_string();
        let pkce = Pkce::generate();
        let url = Self::authorization_url(&secrets, &redirect_uri, scopes, &state, &pkce)?;

        tracing::info!(%redirect_uri, "Starting interactive authorization");
        if self.open_browser {
            if let Err(e) = open_browser(url.as_str()) {
                tracing::warn!("Could not open a browser: {}", e);
            }
        }
        eprintln!("Please visit this URL to authorize this application: {}", url);

        let code = wait_for_redirect(listener, &state).await?;
        tracing::info!("Authorization code received, exchanging for tokens");

        self.exchange_code(&secrets, &code, &redirect_uri, &pkce, scopes)
            .await
    }
}

/// Serves the loopback redirect until one request carries a code or an error.
async fn wait_for_redirect(listener: TcpListener, expected_state: &str) -> AuthResult<String> {
    let (outcome_tx, outcome_rx) = oneshot::channel();
    let state = Arc::new(RedirectState {
        expected_state: expected_state.to_string(),
        outcome: Mutex::new(Some(outcome_tx)),
    });
    let router = Router::new()
        .route("/", get(redirect_handler))
        .with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let served = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;
        if let Err(e) = served {
            tracing::warn!("Redirect listener stopped: {}", e);
        }
    });

    let outcome = outcome_rx
        .await
        .map_err(|_| AuthError::BadRedirect("redirect listener stopped before a response".into()));
    let _ = shutdown_tx.send(());
    outcome?
}

async fn redirect_handler(
    State(state): State<Arc<RedirectState>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, &'static str) {
    let (status, page, outcome) = match parse_redirect(&params, &state.expected_state) {
        Ok(Redirect::Ignored) => return (StatusCode::NOT_FOUND, ""),
        Ok(Redirect::Code(code)) => (StatusCode::OK, SUCCESS_PAGE, Ok(code)),
        Ok(Redirect::Denied(reason)) => (StatusCode::OK, FAILURE_PAGE, Err(AuthError::Denied(reason))),
        Err(e) => (StatusCode::BAD_REQUEST, FAILURE_PAGE, Err(e)),
    };
    tracing::debug!(status = status.as_u16(), "Redirect request");

    let sender = state
        .outcome
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(sender) = sender {
        let _ = sender.send(outcome);
    }
    (status, page)
}

fn parse_redirect(params: &HashMap<String, String>, expected_state: &str) -> AuthResult<Redirect> {
    if let Some(error) = params.get("error") {
        return Ok(Redirect::Denied(error.clone()));
    }
    let Some(code) = params.get("code") else {
        return Ok(Redirect::Ignored);
    };
    if params.get("state").map(String::as_str) != Some(expected_state) {
        return Err(AuthError::StateMismatch);
    }
    Ok(Redirect::Code(code.clone()))
}

fn loopback_error(source: std::io::Error) -> AuthError {
    AuthError::Io {
        path: "loopback redirect listener".to_string(),
        source,
    }
}

fn open_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = Command::new("rundll32");
        command.args(["url.dll,FileProtocolHandler", url]);
        command
    };

    #[cfg(target_os = "macos")]
    let mut command = {
        let mut command = Command::new("open");
        command.arg(url);
        command
    };

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let mut command = {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    };

    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}
