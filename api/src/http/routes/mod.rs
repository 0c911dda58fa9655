use axum::{routing::get, Json, Router};
use std::env;

mod flights;

use crate::axum::state::AppState;

pub fn mount() -> Router<AppState> {
    Router::new()
        .merge(flights::mount())
        .route("/version", get(version))
}

#[derive(serde::Serialize)]
struct BuddyVersion {
    semver: String,
    rev: Option<String>,
    compile_time: String,
}

#[allow(clippy::unused_async)]
async fn version() -> Json<BuddyVersion> {
    Json(BuddyVersion {
        rev: env::var("GIT_REV").ok(),
        semver: env!("CARGO_PKG_VERSION").to_string(),
        compile_time: env!("STATIC_BUILD_DATE").to_string(),
    })
}
