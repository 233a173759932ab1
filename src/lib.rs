pub mod alerts;
pub mod config;
pub mod contact;
pub mod dispatch;
pub mod error;
pub mod fragments;
pub mod html;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod views;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::{AppState, SharedState};

pub fn build_app(config: Config) -> (Router, SharedState) {
    let state: SharedState = Arc::new(AppState::from_config(config));
    (router(state.clone()), state)
}

pub fn router(state: SharedState) -> Router {
    let static_dir = state.config.site_dir.join("static");
    let max_body_size = state.config.max_body_size;

    Router::new()
        .merge(routes::contact_routes())
        .merge(views::view_routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .route("/health", axum::routing::get(health))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
