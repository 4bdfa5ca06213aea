//! Operational HTTP endpoints.
//!
//! - `/metrics` : type declarations + drained samples, plain text
//! - anything else : 404, empty body

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.scrape();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        body,
    )
        .into_response()
}

pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
