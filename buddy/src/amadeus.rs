use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    config::AmadeusConfig,
    flights::{FlightOffer, FlightQuery, FlightSearch, Search},
};

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";

#[derive(Debug, Error)]
pub enum AmadeusError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("token response did not contain an access token")]
    MissingToken,
}

/// A short-lived bearer credential. Never logged.
#[derive(Clone)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OffersResponse {
    #[serde(default)]
    data: Vec<FlightOffer>,
}

/// Client for the Amadeus self-service flight APIs.
#[derive(Debug, Clone)]
pub struct Amadeus {
    client: Client,
    config: AmadeusConfig,
}

impl Amadeus {
    #[must_use]
    pub fn new(config: AmadeusConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Exchanges the client credentials for a bearer token.
    ///
    /// Every call performs a fresh round trip; tokens are not cached.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-2xx statuses, or a response without `access_token`.
    pub async fn acquire_token(&self) -> Result<Token, AmadeusError> {
        let endpoint = TOKEN_PATH;
        let response = self
            .client
            .post(format!("{}{endpoint}", self.config.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|source| AmadeusError::Request { endpoint, source })?;

        debug!("Token response status: {}", response.status());
        let response = check_status(endpoint, response).await?;

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|source| AmadeusError::Request { endpoint, source })?
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(AmadeusError::MissingToken)?;

        info!("Token fetched successfully.");

        Ok(Token(token))
    }

    /// Searches flight offers with an already acquired token.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-2xx statuses, or an undecodable body.
    pub async fn flight_offers(
        &self,
        token: &Token,
        query: &FlightQuery,
    ) -> Result<Vec<FlightOffer>, AmadeusError> {
        let endpoint = FLIGHT_OFFERS_PATH;
        let adults = query.adults.to_string();
        let response = self
            .client
            .get(format!("{}{endpoint}", self.config.base_url))
            .bearer_auth(token.secret())
            .query(&[
                ("originLocationCode", query.origin.as_str()),
                ("destinationLocationCode", query.destination.as_str()),
                ("departureDate", query.departure_date.as_str()),
                ("adults", adults.as_str()),
            ])
            .send()
            .await
            .map_err(|source| AmadeusError::Request { endpoint, source })?;

        info!("Flight API response status: {}", response.status());
        let response = check_status(endpoint, response).await?;

        let offers = response
            .json::<OffersResponse>()
            .await
            .map_err(|source| AmadeusError::Request { endpoint, source })?
            .data;

        debug!("Received {} flight offers", offers.len());

        Ok(offers)
    }
}

async fn check_status(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, AmadeusError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    Err(AmadeusError::Status {
        endpoint,
        status,
        body,
    })
}

#[async_trait]
impl FlightSearch for Amadeus {
    async fn search(&self, query: &FlightQuery) -> Search {
        let token = match self.acquire_token().await {
            Ok(token) => token,
            Err(err) => {
                error!("Error fetching Amadeus token: {err}");
                return Search::failed(err);
            }
        };

        match self.flight_offers(&token, query).await {
            Ok(offers) => Search::Found(offers),
            Err(err) => {
                error!("Error calling flight API: {err}");
                Search::failed(err)
            }
        }
    }
}
