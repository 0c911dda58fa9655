use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::flights::FlightQuery;

pub const FLIGHT_TRIGGER: &str = "flight options";

const DEFAULT_ORIGIN: &str = "NYC";
const DEFAULT_DESTINATION: &str = "LAX";
const DEFAULT_DEPARTURE_DATE: &str = "2024-12-25";

// All-caps words that read as airport codes but almost never are one.
const COMMON_WORDS: &[&str] = &[
    "ALL", "AND", "ANY", "ARE", "BUT", "CAN", "FOR", "GET", "HOW", "NOT", "NOW", "ONE", "OUT",
    "THE", "TWO", "WHO", "WHY", "YOU",
];

lazy_static! {
    static ref IATA_RE: Regex = Regex::new(r"\b[A-Z]{3}\b").unwrap();
    static ref FROM_RE: Regex = Regex::new(r"(?i:\bfrom)\s+([A-Z]{3})\b").unwrap();
    static ref TO_RE: Regex = Regex::new(r"(?i:\bto)\s+([A-Z]{3})\b").unwrap();
    static ref DATE_RE: Regex = Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap();
}

fn is_airport(code: &str) -> bool {
    !COMMON_WORDS.contains(&code)
}

fn code_after<'a>(re: &Regex, question: &'a str) -> Option<&'a str> {
    re.captures_iter(question)
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str())
        .find(|code| is_airport(code))
}

#[must_use]
pub fn is_flight_request(question: &str) -> bool {
    question.to_lowercase().contains(FLIGHT_TRIGGER)
}

/// Builds a flight query from a question containing the trigger phrase.
///
/// Codes following "from" and "to" win. Otherwise airports are the first
/// distinct upper-case three-letter words that are not common English words.
/// The date is the first valid `YYYY-MM-DD`. Anything not found falls back to
/// a fixed default, which is logged.
#[must_use]
pub fn flight_request(question: &str) -> Option<FlightQuery> {
    if !is_flight_request(question) {
        return None;
    }

    let from = code_after(&FROM_RE, question);
    let to = code_after(&TO_RE, question);

    let mut codes = Vec::<&str>::new();
    for code in IATA_RE.find_iter(question).map(|m| m.as_str()) {
        if is_airport(code) && !codes.contains(&code) && Some(code) != from && Some(code) != to {
            codes.push(code);
        }
    }
    let mut rest = codes.into_iter();
    let origin = from.or_else(|| rest.next());
    let destination = to.or_else(|| rest.next());

    let date = DATE_RE
        .find_iter(question)
        .map(|m| m.as_str())
        .find(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());

    let mut defaulted = Vec::new();
    let mut pick = |value: Option<&str>, default: &'static str, name: &'static str| {
        value.map_or_else(
            || {
                defaulted.push(name);
                default.to_string()
            },
            ToString::to_string,
        )
    };

    let query = FlightQuery::new(
        pick(origin, DEFAULT_ORIGIN, "origin"),
        pick(destination, DEFAULT_DESTINATION, "destination"),
        pick(date, DEFAULT_DEPARTURE_DATE, "departure date"),
    );

    if !defaulted.is_empty() {
        warn!(
            "Could not extract {} from the question, using defaults: {query:?}",
            defaulted.join(", ")
        );
    }

    Some(query)
}
