//! Destination, airline and flight price actions.

use auth::schema::NoInput;
use auth::{auth_action, ActionResult, AuthState};
use serde_json::Value;
use skyfare_client::{Destination, FlightPriceResponse, TokenPair};
use skyfare_core::ServiceError;

use crate::schema::{DestinationQuery, FlightSearch};

pub async fn destinations(state: &AuthState, tokens: Option<TokenPair>, input: Value) -> ActionResult<Vec<Destination>> {
    auth_action("destinations", &state.validator, tokens, input, move |query: DestinationQuery, session| async move {
        let found = state.client.search_destinations(&session, &query.q).await?;
        Ok::<_, ServiceError>(found)
    })
    .await
}

pub async fn airlines(state: &AuthState, tokens: Option<TokenPair>, input: Value) -> ActionResult<Vec<String>> {
    auth_action("airlines", &state.validator, tokens, input, move |_: NoInput, session| async move {
        let airlines = state.client.airlines(&session).await?;
        Ok::<_, ServiceError>(airlines)
    })
    .await
}

pub async fn flight_prices(
    state: &AuthState,
    tokens: Option<TokenPair>,
    input: Value,
) -> ActionResult<FlightPriceResponse> {
    auth_action("flight-prices", &state.validator, tokens, input, move |search: FlightSearch, session| async move {
        let request = search.to_request();
        tracing::debug!(
            from = %request.departure_id,
            to = %request.arrival_id,
            trip = %request.trip_type,
            "searching flight prices"
        );
        let prices = state.client.flight_prices(&session, &request).await?;
        Ok::<_, ServiceError>(prices)
    })
    .await
}
