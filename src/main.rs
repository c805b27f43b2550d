use clap::Parser;
use color_eyre::eyre::Result;

use drive_activity::auth::{CredentialProvider, FileCredentialStore, InstalledAppFlow, DRIVE_ACTIVITY_SCOPE};
use drive_activity::client::{ActivityQuery, HttpActivityClient};
use drive_activity::config::{Cli, ConfigFile, Settings};
use drive_activity::report;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    // The subscriber depends on the resolved settings, so config problems go to stderr
    let file = ConfigFile::load().unwrap_or_else(|e| {
        eprintln!("warning: ignoring config file: {e}");
        None
    });
    let settings = Settings::resolve(cli, file);

    // Set up logging; stdout is reserved for the report
    if let Some(ref log_file) = settings.log_file {
        let file = std::fs::File::create(log_file)?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    run(settings).await
}

async fn run(settings: Settings) -> Result<()> {
    let http = reqwest::Client::builder()
        .timeout(settings.timeout)
        .user_agent(concat!("drive-activity/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let store = FileCredentialStore::new(&settings.token, http.clone());
    let flow = InstalledAppFlow::new(&settings.credentials, http.clone())
        .with_port(settings.redirect_port)
        .with_browser(settings.open_browser);
    let provider = CredentialProvider::new(store, flow, vec![DRIVE_ACTIVITY_SCOPE.to_string()]);

    let credential = provider.credential().await?;
    let client = HttpActivityClient::new(http, &settings.endpoint, credential.access_token()?.to_string())?;

    let query = ActivityQuery {
        page_size: settings.page_size,
        filter: settings.filter.clone(),
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::report_activity(&client, &query, &mut out).await?;

    Ok(())
}
