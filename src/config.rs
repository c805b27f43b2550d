use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::client::{DEFAULT_ENDPOINT, DEFAULT_PAGE_SIZE};

const DEFAULT_CREDENTIALS: &str = "credentials.json";
const DEFAULT_TOKEN: &str = "token.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug, Default)]
#[command(name = "drive-activity", about = "Print recent Google Drive activity as a flat report")]
pub struct Cli {
    /// OAuth client secrets file, read only when authorizing
    #[arg(long, env = "DRIVE_ACTIVITY_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Cached token file
    #[arg(long, env = "DRIVE_ACTIVITY_TOKEN")]
    pub token: Option<PathBuf>,

    /// Number of activities to request
    #[arg(long, env = "DRIVE_ACTIVITY_PAGE_SIZE")]
    pub page_size: Option<u32>,

    /// Activity filter, e.g. time >= "2022-09-15T00:00:00-05:00"
    #[arg(long, env = "DRIVE_ACTIVITY_FILTER")]
    pub filter: Option<String>,

    /// Loopback port for the authorization redirect (0 = any free port)
    #[arg(long, env = "DRIVE_ACTIVITY_REDIRECT_PORT")]
    pub redirect_port: Option<u16>,

    /// Print the authorization URL without opening a browser
    #[arg(long)]
    pub no_browser: bool,

    /// HTTP timeout in seconds
    #[arg(long, env = "DRIVE_ACTIVITY_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Drive Activity API base URL
    #[arg(long, env = "DRIVE_ACTIVITY_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Log file path
    #[arg(long, env = "DRIVE_ACTIVITY_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub credentials: Option<PathBuf>,
    pub token: Option<PathBuf>,
    pub page_size: Option<u32>,
    pub filter: Option<String>,
    pub redirect_port: Option<u16>,
    pub open_browser: Option<bool>,
    pub timeout: Option<u64>,
    pub endpoint: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFile {
    /// Loads `<config dir>/drive-activity/config.toml`. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match dirs::config_dir() {
            Some(config_dir) => Self::load_from(&config_dir.join("drive-activity").join("config.toml")),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Effective settings: flags and env first, then the config file, then defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub credentials: PathBuf,
    pub token: PathBuf,
    pub page_size: u32,
    pub filter: Option<String>,
    pub redirect_port: u16,
    pub open_browser: bool,
    pub timeout: Duration,
    pub endpoint: String,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(cli: Cli, file: Option<ConfigFile>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            credentials: cli
                .credentials
                .or(file.credentials)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS)),
            token: cli
                .token
                .or(file.token)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN)),
            page_size: cli.page_size.or(file.page_size).unwrap_or(DEFAULT_PAGE_SIZE),
            filter: cli.filter.or(file.filter),
            redirect_port: cli.redirect_port.or(file.redirect_port).unwrap_or(0),
            open_browser: !cli.no_browser && file.open_browser.unwrap_or(true),
            timeout: Duration::from_secs(
                cli.timeout.or(file.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            endpoint: cli
                .endpoint
                .or(file.endpoint)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            log_file: cli.log_file.or(file.log_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_flags_or_file() {
        let settings = Settings::resolve(Cli::default(), None);

        assert_eq!(settings.credentials, PathBuf::from("credentials.json"));
        assert_eq!(settings.token, PathBuf::from("token.json"));
        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.redirect_port, 0);
        assert!(settings.open_browser);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.endpoint, "https://driveactivity.googleapis.com");
        assert!(settings.filter.is_none());
    }

    #[test]
    fn flags_override_file() {
        let cli = Cli::parse_from(["drive-activity", "--page-size", "5", "--no-browser"]);
        let file = ConfigFile {
            page_size: Some(50),
            token: Some(PathBuf::from("/var/lib/drive-activity/token.json")),
            ..ConfigFile::default()
        };

        let settings = Settings::resolve(cli, Some(file));

        assert_eq!(settings.page_size, 5);
        assert_eq!(settings.token, PathBuf::from("/var/lib/drive-activity/token.json"));
        assert!(!settings.open_browser);
    }

    #[test]
    fn config_file_is_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "page_size = 10\nfilter = 'time >= \"2022-09-15T00:00:00-05:00\"'\nopen_browser = false\n",
        )
        .expect("write");

        let file = ConfigFile::load_from(&path).expect("config").expect("present");
        let settings = Settings::resolve(Cli::default(), Some(file));

        assert_eq!(settings.page_size, 10);
        assert_eq!(
            settings.filter.as_deref(),
            Some("time >= \"2022-09-15T00:00:00-05:00\"")
        );
        assert!(!settings.open_browser);
    }

    #[test]
    fn invalid_config_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = 'many'").expect("write");

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: ref p, .. } if *p == path));
        assert!(err.to_string().starts_with("invalid config "));
    }

    #[test]
    fn missing_config_is_absent() {
        let dir = tempfile::tempdir().expect("tempdir");

        assert!(ConfigFile::load_from(&dir.path().join("config.toml"))
            .expect("missing file is not an error")
            .is_none());
    }
}
