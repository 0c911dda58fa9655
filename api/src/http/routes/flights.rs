use axum::{routing::get, Router};

use crate::{axum::state::AppState, http::controllers::FlightController};

pub fn mount() -> Router<AppState> {
    Router::new().route("/api/flight-offers", get(FlightController::search))
}
