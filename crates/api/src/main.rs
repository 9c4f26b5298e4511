use airbot_core::config::Settings;
use airbot_core::line::LineClient;
use airbot_core::opendata::OpenDataClient;
use airbot_db::PgAirStateStore;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

mod error;
mod middleware;
mod routes;
mod state;

use crate::state::{AirSite, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let settings = Settings::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&settings.database_url)
        .await?;
    airbot_db::migrate(&db).await?;

    let client = reqwest::Client::builder()
        .timeout(settings.http_timeout)
        .build()?;

    let state = AppState {
        store: Arc::new(PgAirStateStore::new(db)),
        line: LineClient::new(client.clone(), &settings.line),
        opendata: OpenDataClient::new(client, settings.opendata_url.clone()),
        air_site: AirSite {
            county: settings.air_county.clone(),
            site: settings.air_site.clone(),
        },
    };

    let app = routes::app(state);

    let addr: SocketAddr = settings.api_bind.parse()?;

    info!(%addr, "starting api");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
