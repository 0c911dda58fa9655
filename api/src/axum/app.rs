use axum::Router;
use buddy::{config::AmadeusConfig, Amadeus};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{axum::state, http::routes};

pub fn create(config: AmadeusConfig) -> Router {
    router(state::create(Arc::new(Amadeus::new(config))))
}

pub fn router(state: state::AppState) -> Router {
    Router::new()
        .merge(routes::mount())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
