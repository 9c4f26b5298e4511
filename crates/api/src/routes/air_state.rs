use airbot_core::jobs::refresh::refresh_air_state;
use axum::{extract::State, routing::get, Router};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

/// Called by the scheduler; not meant for users.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/update/airState", get(update_air_state).post(update_air_state))
        .with_state(state)
}

pub async fn update_air_state(State(state): State<AppState>) -> AppResult<()> {
    refresh_air_state(&state.opendata, state.store.as_ref())
        .await
        .map_err(|_| AppError::Internal)?;
    Ok(())
}
