use axum::{routing::get, Router};

use crate::state::AppState;

pub const GREETING: &str = "Line Bot Test!";

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(home)).with_state(state)
}

async fn home() -> &'static str {
    GREETING
}
