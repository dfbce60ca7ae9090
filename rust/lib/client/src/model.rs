//! Wire types exchanged with the backend API.

use serde::{Deserialize, Serialize};

// ── Identity ────────────────────────────────────────────────────────

/// A user as owned by the identity API.
///
/// `password` is accepted when decoding backend responses but is never
/// serialized, so it cannot leak into an action result or a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    /// Name shown in the navbar: first name when known, else the username.
    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

/// Returned by sign-in and sign-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

impl LoginResult {
    pub fn tokens(&self) -> TokenPair {
        TokenPair {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// Access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshTokenBody<'a> {
    pub refresh_token: &'a str,
}

// ── Destinations ────────────────────────────────────────────────────

/// An airport as returned by the destination search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub country_code: String,
    pub region_name: String,
    pub iata: String,
    pub icao: String,
    pub airport: String,
    pub latitude: f64,
    pub longitude: f64,
}

// ── Flight prices ───────────────────────────────────────────────────

/// Outbound body of `POST /flight-prices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPriceRequest {
    pub trip_type: String,
    pub departure_id: String,
    pub arrival_id: String,
    pub outbound_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub currency: String,
    pub adults: String,
    pub children: String,
    pub infants_on_lap: String,
}

/// Currency every price search is made in.
pub const SEARCH_CURRENCY: &str = "AUD";

/// Aggregator result set. Decoded structurally; every nested field is
/// lenient because the aggregator omits fields freely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightPriceResponse {
    #[serde(default)]
    pub search_metadata: SearchMetadata,
    #[serde(default)]
    pub search_parameters: SearchParameters,
    #[serde(default)]
    pub best_flights: Vec<Itinerary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_flights: Option<Vec<Itinerary>>,
    #[serde(default)]
    pub airports: Vec<AirportGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_insights: Option<serde_json::Value>,
}

impl FlightPriceResponse {
    /// Best flights followed by the other flights.
    pub fn itineraries(&self) -> impl Iterator<Item = &Itinerary> {
        self.best_flights
            .iter()
            .chain(self.other_flights.iter().flatten())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchMetadata {
    pub id: String,
    pub status: String,
    pub json_endpoint: String,
    pub created_at: String,
    pub processed_at: String,
    pub google_flights_url: String,
    pub total_time_taken: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParameters {
    pub engine: String,
    pub departure_id: String,
    pub arrival_id: String,
    pub outbound_date: String,
    pub return_date: Option<String>,
    pub currency: String,
}

/// One bookable option: a sequence of legs with a total price.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Itinerary {
    pub flights: Vec<FlightLeg>,
    pub total_duration: u32,
    pub carbon_emissions: Option<CarbonEmissions>,
    pub price: Option<f64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub airline_logo: String,
    pub extensions: Vec<String>,
    pub departure_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightLeg {
    pub departure_airport: LegAirport,
    pub arrival_airport: LegAirport,
    pub duration: u32,
    pub airplane: String,
    pub airline: String,
    pub airline_logo: String,
    pub travel_class: String,
    pub flight_number: String,
    pub legroom: String,
    pub extensions: Vec<String>,
    pub often_delayed_by_over_30_min: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LegAirport {
    pub name: String,
    pub id: String,
    pub time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonEmissions {
    pub this_flight: f64,
    pub typical_for_this_route: f64,
    pub difference_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AirportGroup {
    pub departure: Vec<AirportDetail>,
    pub arrival: Vec<AirportDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AirportDetail {
    pub airport: AirportRef,
    pub city: String,
    pub country: String,
    pub country_code: String,
    pub image: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AirportRef {
    pub id: String,
    pub name: String,
}

// ── Prediction ──────────────────────────────────────────────────────

/// Outbound body of `POST /prediction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub departure_date: String,
    pub departure_time: String,
    pub arrival_date: String,
    pub arrival_time: String,
    pub departure_city: String,
    pub arrival_city: String,
    pub stops: String,
    pub airline: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predictions: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartsData {
    #[serde(default)]
    pub price_distribution: Vec<PriceBucket>,
    #[serde(default)]
    pub price_trend: Vec<MonthlyPrice>,
    #[serde(default)]
    pub seasonal_analysis: Vec<SeasonalDemand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBucket {
    pub range: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPrice {
    pub month: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalDemand {
    pub month: String,
    pub demand: f64,
    pub price: f64,
}
