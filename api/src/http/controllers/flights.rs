use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use buddy::{FlightOffer, FlightQuery, Search};
use tracing::{debug, error, info};

use crate::axum::{
    errors::{ApiError, ApiResult},
    state::AppState,
};

const MAX_OFFERS: usize = 5;

#[derive(Debug, serde::Deserialize)]
pub struct SearchParams {
    origin: Option<String>,
    destination: Option<String>,
    departure_date: Option<String>,
}

impl SearchParams {
    fn into_query(self) -> ApiResult<FlightQuery> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        match (
            present(self.origin),
            present(self.destination),
            present(self.departure_date),
        ) {
            (Some(origin), Some(destination), Some(departure_date)) => {
                Ok(FlightQuery::new(origin, destination, departure_date))
            }
            _ => Err(ApiError::ClientError(
                "origin, destination, and departure_date are required".to_string(),
            )),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct SearchResponse {
    best_offers: Vec<FlightOffer>,
}

pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<SearchResponse>> {
    info!("Received request for flight offers");

    let Query(params) = params.map_err(|rejection| {
        info!("Malformed query string: {rejection}");
        ApiError::ClientError(rejection.to_string())
    })?;
    debug!("Parameters received: {params:?}");

    let query = params.into_query().map_err(|err| {
        info!("Missing parameters");
        err
    })?;

    match state.flights.search(&query).await {
        Search::Found(offers) => {
            let best_offers = offers.into_iter().take(MAX_OFFERS).collect::<Vec<_>>();
            debug!("Returning {} flight offers", best_offers.len());

            Ok(Json(SearchResponse { best_offers }))
        }
        Search::Failed { reason } => {
            error!("Error fetching flight offers: {reason}");

            Err(ApiError::UpstreamError)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use buddy::FlightSearch;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::axum::{app, state};

    struct StubFlights {
        offers: usize,
        calls: AtomicUsize,
    }

    impl StubFlights {
        fn returning(offers: usize) -> Arc<Self> {
            Arc::new(Self {
                offers,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl FlightSearch for StubFlights {
        async fn search(&self, query: &FlightQuery) -> Search {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(query.adults, 1);

            Search::Found(
                (0..self.offers)
                    .map(|i| {
                        serde_json::from_value(json!({
                            "id": i.to_string(),
                            "itineraries": [],
                            "price": { "currency": "EUR", "grandTotal": "100.00" },
                            "oneWay": false
                        }))
                        .unwrap()
                    })
                    .collect(),
            )
        }
    }

    struct FailingFlights;

    #[async_trait]
    impl FlightSearch for FailingFlights {
        async fn search(&self, _: &FlightQuery) -> Search {
            Search::failed("token endpoint returned 401 Unauthorized")
        }
    }

    fn router_with(flights: Arc<dyn FlightSearch>) -> Router {
        app::router(state::create(flights))
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn returns_at_most_five_offers() {
        let flights = StubFlights::returning(8);

        let (status, body) = get(
            router_with(flights.clone()),
            "/api/flight-offers?origin=JFK&destination=LAX&departure_date=2024-12-25",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["best_offers"].as_array().unwrap().len(), 5);
        assert_eq!(body["best_offers"][0]["id"], "0");
        assert_eq!(body["best_offers"][0]["oneWay"], false);
        assert_eq!(flights.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejects_missing_origin() {
        let flights = StubFlights::returning(8);

        let (status, body) = get(
            router_with(flights.clone()),
            "/api/flight-offers?destination=LAX&departure_date=2024-12-25",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "origin, destination, and departure_date are required"
        );
        assert_eq!(flights.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejects_blank_parameters() {
        let (status, body) = get(
            router_with(StubFlights::returning(1)),
            "/api/flight-offers?origin=JFK&destination=&departure_date=2024-12-25",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("error").is_some());
    }

    #[test]
    fn blank_parameter_is_a_client_error() {
        let params = SearchParams {
            origin: Some("JFK".to_string()),
            destination: Some("  ".to_string()),
            departure_date: Some("2024-12-25".to_string()),
        };

        assert_eq!(
            params.into_query(),
            Err(ApiError::ClientError(
                "origin, destination, and departure_date are required".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn rejects_repeated_parameter_as_json() {
        let flights = StubFlights::returning(1);

        let (status, body) = get(
            router_with(flights.clone()),
            "/api/flight-offers?origin=JFK&origin=BOS&destination=LAX&departure_date=2024-12-25",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("origin"));
        assert_eq!(flights.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reports_upstream_failure_as_server_error() {
        let (status, body) = get(
            router_with(Arc::new(FailingFlights)),
            "/api/flight-offers?origin=JFK&destination=LAX&departure_date=2024-12-25",
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "error": "An error occurred while fetching flight offers" })
        );
    }

    #[tokio::test]
    async fn returns_empty_list_when_no_offers_exist() {
        let (status, body) = get(
            router_with(StubFlights::returning(0)),
            "/api/flight-offers?origin=JFK&destination=LAX&departure_date=2024-12-25",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "best_offers": [] }));
    }

    #[tokio::test]
    async fn reports_version() {
        let (status, body) = get(router_with(StubFlights::returning(0)), "/version").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["semver"], env!("CARGO_PKG_VERSION"));
    }
}
