use airbot_core::config::Settings;
use airbot_core::opendata::OpenDataClient;
use airbot_core::store::AirStateStore;
use airbot_db::PgAirStateStore;
use anyhow::Result;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod scheduler;

#[derive(Debug, Parser)]
#[command(name = "airbot-worker")]
#[command(about = "Periodically imports the EPA air-quality feed", version)]
struct Args {
    /// Run a single refresh and exit.
    #[arg(long)]
    once: bool,
    /// Seconds between refreshes; overrides AIRBOT_REFRESH_INTERVAL_SECS.
    #[arg(long)]
    interval_secs: Option<u64>,
}

#[derive(Clone)]
pub struct WorkerState {
    pub store: Arc<dyn AirStateStore>,
    pub opendata: OpenDataClient,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let args = Args::parse();
    let settings = Settings::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(2)
        .connect(&settings.database_url)
        .await?;
    airbot_db::migrate(&db).await?;

    let client = reqwest::Client::builder()
        .timeout(settings.http_timeout)
        .build()?;

    let state = WorkerState {
        store: Arc::new(PgAirStateStore::new(db)),
        opendata: OpenDataClient::new(client, settings.opendata_url.clone()),
    };

    if args.once {
        return match scheduler::run_once(&state).await {
            Some(_) => Ok(()),
            None => Err(anyhow::anyhow!("air state refresh failed")),
        };
    }

    let period = args
        .interval_secs
        .map(Duration::from_secs)
        .unwrap_or(settings.refresh_interval);
    info!(period_secs = period.as_secs(), "worker starting");

    let shutdown = scheduler::shutdown_on(tokio::signal::ctrl_c());
    scheduler::run_every(&state, period, shutdown).await;

    Ok(())
}
