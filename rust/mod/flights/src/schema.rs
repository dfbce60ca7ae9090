//! Search form inputs and their translation to backend requests.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use skyfare_client::{FlightPriceRequest, PredictRequest, SEARCH_CURRENCY};
use validator::{Validate, ValidationError};

// ── Dates ───────────────────────────────────────────────────────────

/// Parse a form date: RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (UTC) or
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn instant<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    let s = String::deserialize(d)?;
    parse_instant(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s)))
}

fn optional_instant<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(d)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => parse_instant(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
    }
}

fn date_part(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

fn time_part(dt: &DateTime<Utc>) -> String {
    dt.format("%H:%M:%S").to_string()
}

// ── Shared ──────────────────────────────────────────────────────────

/// An airport picked from the destination suggestions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub airport: String,
    #[serde(default)]
    pub iata: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DestinationQuery {
    pub q: String,
}

// ── Flight prices ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    Round,
    Oneway,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::Round => "round",
            TripType::Oneway => "oneway",
        }
    }
}

/// The flight price search form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearch {
    pub trip_type: TripType,
    pub from: Place,
    pub to: Place,
    #[serde(deserialize_with = "instant")]
    pub depart_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "optional_instant")]
    pub return_date: Option<DateTime<Utc>>,
    pub adults: String,
    pub children: String,
    pub infants: String,
}

impl FlightSearch {
    /// Body for `POST /flight-prices`. `return_date` is sent only for round
    /// trips that have one.
    pub fn to_request(&self) -> FlightPriceRequest {
        let return_date = match (self.trip_type, &self.return_date) {
            (TripType::Round, Some(date)) => Some(date_part(date)),
            _ => None,
        };
        FlightPriceRequest {
            trip_type: self.trip_type.as_str().to_string(),
            departure_id: self.from.iata.clone(),
            arrival_id: self.to.iata.clone(),
            outbound_date: date_part(&self.depart_date),
            return_date,
            currency: SEARCH_CURRENCY.to_string(),
            adults: self.adults.clone(),
            children: self.children.clone(),
            infants_on_lap: self.infants.clone(),
        }
    }
}

// ── Prediction ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stops {
    #[serde(rename = "direct")]
    Direct,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
}

impl Stops {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stops::Direct => "direct",
            Stops::One => "1",
            Stops::Two => "2",
        }
    }
}

fn departure_required(place: &Place) -> Result<(), ValidationError> {
    if place.airport.is_empty() {
        return Err(ValidationError::new("required").with_message("Departure city is required".into()));
    }
    Ok(())
}

fn arrival_required(place: &Place) -> Result<(), ValidationError> {
    if place.airport.is_empty() {
        return Err(ValidationError::new("required").with_message("Arrival city is required".into()));
    }
    Ok(())
}

/// The price prediction form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PredictionSearch {
    #[serde(default)]
    #[validate(custom(function = "departure_required"))]
    pub from: Place,
    #[serde(default)]
    #[validate(custom(function = "arrival_required"))]
    pub to: Place,
    #[serde(default, deserialize_with = "optional_instant")]
    #[serde(rename = "departDate")]
    #[validate(required(message = "Departure date is required"))]
    pub depart_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_instant")]
    #[serde(rename = "arriveDate")]
    #[validate(required(message = "Return date is required"))]
    pub arrive_date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(required(message = "Required"))]
    pub stops: Option<Stops>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Airline is required"))]
    pub airline: String,
}

impl PredictionSearch {
    /// Body for `POST /prediction`, or None while a date or the stops are
    /// missing.
    pub fn to_predict_request(&self) -> Option<PredictRequest> {
        let depart = self.depart_date.as_ref()?;
        let arrive = self.arrive_date.as_ref()?;
        let stops = self.stops?;
        Some(PredictRequest {
            departure_date: date_part(depart),
            departure_time: time_part(depart),
            arrival_date: date_part(arrive),
            arrival_time: time_part(arrive),
            departure_city: format!("{} {}", self.from.iata, self.from.airport),
            arrival_city: format!("{} {}", self.to.iata, self.to.airport),
            stops: stops.as_str().to_string(),
            airline: self.airline.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use auth::action::parse_input;
    use serde_json::json;

    use super::*;

    fn search(trip: &str, return_date: Option<&str>) -> FlightSearch {
        let mut input = json!({
            "tripType": trip,
            "from": {"airport": "Sydney Kingsford Smith", "iata": "SYD"},
            "to": {"airport": "Melbourne", "iata": "MEL"},
            "departDate": "2025-03-01T00:00:00.000Z",
            "adults": "2",
            "children": "1",
            "infants": "0"
        });
        if let Some(date) = return_date {
            input["returnDate"] = json!(date);
        }
        parse_input(input).unwrap()
    }

    #[test]
    fn oneway_omits_return_date() {
        let body = serde_json::to_value(search("oneway", Some("2025-03-08")).to_request()).unwrap();
        assert!(body.get("return_date").is_none());
        assert_eq!(body["trip_type"], "oneway");
        assert_eq!(body["outbound_date"], "2025-03-01");
        assert_eq!(body["currency"], "AUD");
        assert_eq!(body["infants_on_lap"], "0");
        assert_eq!(body["departure_id"], "SYD");
    }

    #[test]
    fn round_includes_return_date() {
        let body = serde_json::to_value(search("round", Some("2025-03-08")).to_request()).unwrap();
        assert_eq!(body["return_date"], "2025-03-08");

        let without = serde_json::to_value(search("round", None).to_request()).unwrap();
        assert!(without.get("return_date").is_none());
    }

    #[test]
    fn unknown_trip_type_rejected() {
        let errors = parse_input::<FlightSearch>(json!({"tripType": "multi"})).unwrap_err();
        assert!(errors.contains_key("_errors"));
    }

    #[test]
    fn predict_body_formatting() {
        let input: PredictionSearch = parse_input(json!({
            "from": {"airport": "Sydney Kingsford Smith", "iata": "SYD"},
            "to": {"airport": "Melbourne", "iata": "MEL"},
            "departDate": "2025-03-01T08:30:00Z",
            "arriveDate": "2025-03-01T10:05:09+00:00",
            "stops": "1",
            "airline": "Qantas"
        }))
        .unwrap();

        let req = input.to_predict_request().unwrap();
        assert_eq!(req.departure_date, "2025-03-01");
        assert_eq!(req.departure_time, "08:30:00");
        assert_eq!(req.arrival_time, "10:05:09");
        assert_eq!(req.departure_city, "SYD Sydney Kingsford Smith");
        assert_eq!(req.arrival_city, "MEL Melbourne");
        assert_eq!(req.stops, "1");
    }

    #[test]
    fn predict_messages() {
        let errors = parse_input::<PredictionSearch>(json!({"stops": "direct"})).unwrap_err();
        assert_eq!(errors["from"], vec!["Departure city is required"]);
        assert_eq!(errors["to"], vec!["Arrival city is required"]);
        assert_eq!(errors["airline"], vec!["Airline is required"]);
        assert_eq!(errors["departDate"], vec!["Departure date is required"]);
        assert_eq!(errors["arriveDate"], vec!["Return date is required"]);
    }

    #[test]
    fn stops_is_required() {
        let errors = parse_input::<PredictionSearch>(json!({
            "from": {"airport": "Sydney Kingsford Smith", "iata": "SYD"},
            "to": {"airport": "Melbourne", "iata": "MEL"},
            "departDate": "2025-03-01T08:30:00Z",
            "arriveDate": "2025-03-01T10:05:09Z",
            "airline": "Qantas"
        }))
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["stops"], vec!["Required"]);

        let bad = parse_input::<PredictionSearch>(json!({"stops": "3"})).unwrap_err();
        assert!(bad.contains_key("_errors"));
    }

    #[test]
    fn form_dates() {
        let local = parse_instant("2025-03-01T14:30").unwrap();
        assert_eq!(time_part(&local), "14:30:00");
        let plain = parse_instant("2025-03-01").unwrap();
        assert_eq!(date_part(&plain), "2025-03-01");
        let offset = parse_instant("2025-03-01T01:00:00+10:00").unwrap();
        assert_eq!(date_part(&offset), "2025-02-28");
        assert!(parse_instant("next tuesday").is_none());
    }
}
