use std::fmt::{self, Display};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const NOT_AVAILABLE: &str = "N/A";

/// Parameters of a one-way flight offer search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub adults: u8,
}

impl FlightQuery {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure_date: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            departure_date: departure_date.into(),
            adults: 1,
        }
    }
}

/// A priced itinerary as returned by the flight offers API.
///
/// Fields this crate does not read are kept in `extra` so offers can be
/// relayed to API clients untouched. A partial offer still decodes, so one
/// malformed entry does not sink the whole response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    pub id: String,
    #[serde(default)]
    pub itineraries: Vec<Itinerary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    #[serde(default)]
    pub duration: String,
    pub segments: Vec<Segment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub carrier_code: String,
    pub number: String,
    pub departure: Stop,
    pub arrival: Stop,
    #[serde(default)]
    pub duration: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub iata_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
    pub at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub currency: String,
    pub grand_total: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of a flight search. A failed search is never reported as "no offers".
#[derive(Debug, Clone)]
pub enum Search {
    Found(Vec<FlightOffer>),
    Failed { reason: String },
}

impl Search {
    pub fn failed(reason: impl Display) -> Self {
        Self::Failed {
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Collapses the outcome into a plain list, treating failures as empty.
    #[must_use]
    pub fn into_offers(self) -> Vec<FlightOffer> {
        match self {
            Self::Found(offers) => offers,
            Self::Failed { .. } => Vec::new(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlightSearch: Send + Sync {
    async fn search(&self, query: &FlightQuery) -> Search;
}

impl Stop {
    fn terminal(&self) -> &str {
        self.terminal.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Flight {} {} from {} (Terminal {}) to {} (Terminal {})",
            self.carrier_code,
            self.number,
            self.departure.iata_code,
            self.departure.terminal(),
            self.arrival.iata_code,
            self.arrival.terminal(),
        )?;
        writeln!(
            f,
            "Departure: {} - Arrival: {}",
            self.departure.at, self.arrival.at
        )?;
        writeln!(f, "Duration: {}", self.duration)
    }
}

impl Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Duration: {}", self.duration)?;

        for segment in &self.segments {
            write!(f, "{segment}")?;
        }

        Ok(())
    }
}

impl Display for FlightOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Flight Offer ID: {}", self.id)?;

        for itinerary in &self.itineraries {
            write!(f, "{itinerary}")?;
        }

        match &self.price {
            Some(price) => writeln!(f, "Price: {} {}", price.grand_total, price.currency),
            None => writeln!(f, "Price: {NOT_AVAILABLE}"),
        }
    }
}

/// Renders a search outcome as a chat reply.
#[must_use]
pub fn format_search(search: &Search) -> String {
    match search {
        Search::Failed { .. } => {
            "Sorry, I couldn't reach the flight search service right now. Please try again later."
                .to_string()
        }
        Search::Found(offers) if offers.is_empty() => {
            "I couldn't find any flight offers for that route and date.".to_string()
        }
        Search::Found(offers) => format_offers(offers),
    }
}

#[must_use]
pub fn format_offers(offers: &[FlightOffer]) -> String {
    let mut response = String::from("Here are the best flight options I found:\n\n");

    for offer in offers {
        response.push_str(&offer.to_string());
        response.push('\n');
    }

    response
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;

    pub fn offer_json(id: &str) -> Value {
        json!({
            "type": "flight-offer",
            "id": id,
            "numberOfBookableSeats": 4,
            "itineraries": [{
                "duration": "PT6H10M",
                "segments": [{
                    "carrierCode": "B6",
                    "number": "623",
                    "departure": { "iataCode": "JFK", "terminal": "5", "at": "2024-12-25T07:00:00" },
                    "arrival": { "iataCode": "LAX", "at": "2024-12-25T10:10:00" },
                    "duration": "PT6H10M"
                }]
            }],
            "price": { "currency": "EUR", "total": "199.40", "grandTotal": "199.40" }
        })
    }

    pub fn offer(id: &str) -> FlightOffer {
        serde_json::from_value(offer_json(id)).unwrap()
    }

    #[test]
    fn renders_missing_terminal_as_placeholder() {
        let rendered = format_offers(&[offer("1")]);

        assert!(rendered.contains("from JFK (Terminal 5) to LAX (Terminal N/A)"));
    }

    #[test]
    fn renders_offer_block() {
        let rendered = format_offers(&[offer("42")]);

        assert_eq!(
            rendered,
            "Here are the best flight options I found:\n\n\
             Flight Offer ID: 42\n\
             Total Duration: PT6H10M\n\
             Flight B6 623 from JFK (Terminal 5) to LAX (Terminal N/A)\n\
             Departure: 2024-12-25T07:00:00 - Arrival: 2024-12-25T10:10:00\n\
             Duration: PT6H10M\n\
             Price: 199.40 EUR\n\n"
        );
    }

    #[test]
    fn keeps_unknown_fields_when_reserialized() {
        let value = serde_json::to_value(offer("7")).unwrap();

        assert_eq!(value, offer_json("7"));
    }

    #[test]
    fn decodes_offer_without_price_or_itineraries() {
        let offers: Vec<FlightOffer> = serde_json::from_value(json!([
            offer_json("1"),
            { "type": "flight-offer", "id": "2" }
        ]))
        .unwrap();

        assert_eq!(offers.len(), 2);
        assert!(offers[1].price.is_none());
        assert!(offers[1].itineraries.is_empty());
        assert_eq!(
            offers[1].to_string(),
            "Flight Offer ID: 2\nPrice: N/A\n"
        );
        assert_eq!(
            serde_json::to_value(&offers[1]).unwrap(),
            json!({ "type": "flight-offer", "id": "2", "itineraries": [] })
        );
    }

    #[test]
    fn distinguishes_failure_from_empty_results() {
        let failed = format_search(&Search::failed("token endpoint returned 401"));
        let empty = format_search(&Search::Found(vec![]));

        assert_ne!(failed, empty);
        assert!(failed.contains("couldn't reach"));
        assert!(empty.contains("couldn't find any"));
    }

    #[test]
    fn failed_search_collapses_to_empty_list() {
        let search = Search::failed("boom");

        assert!(search.is_failed());
        assert!(search.into_offers().is_empty());
    }
}
