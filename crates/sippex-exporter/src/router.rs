//! Axum router wiring.
//!
//! Exposes a single `GET /metrics` route. `HEAD` is routed away from the
//! scrape handler so it cannot drain queues without returning a body.

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/metrics",
            get(ops::metrics)
                .head(ops::not_found)
                .fallback(ops::not_found),
        )
        .fallback(ops::not_found)
        .with_state(state)
}
