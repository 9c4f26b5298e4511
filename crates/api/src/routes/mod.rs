pub mod air_state;
pub mod callback;
pub mod health;
pub mod home;

use axum::{middleware::from_fn, Router};

use crate::error::AppError;
use crate::middleware::request_id::request_id;
use crate::state::AppState;

pub fn bot_router(state: AppState) -> Router {
    Router::new()
        .merge(home::router(state.clone()))
        .merge(callback::router(state.clone()))
        .merge(air_state::router(state))
}

pub fn health_router(state: AppState) -> Router {
    health::router(state)
}

/// Full application with middleware, as served by `main`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health_router(state.clone()))
        .merge(bot_router(state))
        .fallback(|| async { AppError::NotFound })
        .layer(from_fn(request_id))
}
