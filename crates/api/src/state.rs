use airbot_core::line::LineClient;
use airbot_core::opendata::OpenDataClient;
use airbot_core::store::AirStateStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AirStateStore>,
    pub line: LineClient,
    pub opendata: OpenDataClient,
    pub air_site: AirSite,
}

/// Monitoring site reported by the `air` command.
#[derive(Debug, Clone)]
pub struct AirSite {
    pub county: String,
    pub site: String,
}
