//! Typed endpoint methods.

use serde::Serialize;

use crate::model::*;
use crate::{ApiClient, ApiError, ApiRequest, BearerCredential};

impl ApiClient {
    // ── Auth ──

    pub async fn sign_in<B: Serialize + ?Sized>(&self, credentials: &B) -> Result<LoginResult, ApiError> {
        self.call_anonymous(ApiRequest::post("/auth/signIn").json(credentials)?)
            .await
    }

    pub async fn sign_up<B: Serialize + ?Sized>(&self, profile: &B) -> Result<LoginResult, ApiError> {
        self.call_anonymous(ApiRequest::post("/auth/signUp").json(profile)?)
            .await
    }

    /// Current user for the bearer token.
    pub async fn me<C: BearerCredential + ?Sized>(&self, credential: &C) -> Result<User, ApiError> {
        self.call(ApiRequest::get("/auth/me"), credential).await
    }

    /// Trade `refresh_token` for a new pair, authenticated by the current
    /// (possibly stale) access token.
    pub async fn refresh_token<C: BearerCredential + ?Sized>(
        &self,
        credential: &C,
        refresh_token: &str,
    ) -> Result<TokenPair, ApiError> {
        let req = ApiRequest::post("/auth/refreshToken").json(&RefreshTokenBody { refresh_token })?;
        self.call(req, credential).await
    }

    // ── Users ──

    pub async fn get_user<C: BearerCredential + ?Sized>(&self, credential: &C, id: &str) -> Result<User, ApiError> {
        self.call(ApiRequest::get(format!("/user/{}", id)), credential)
            .await
    }

    pub async fn update_user<C, B>(&self, credential: &C, id: &str, patch: &B) -> Result<User, ApiError>
    where
        C: BearerCredential + ?Sized,
        B: Serialize + ?Sized,
    {
        let req = ApiRequest::put(format!("/user/{}", id)).json(patch)?;
        self.call(req, credential).await
    }

    // ── Flight prices ──

    pub async fn search_destinations<C: BearerCredential + ?Sized>(
        &self,
        credential: &C,
        query: &str,
    ) -> Result<Vec<Destination>, ApiError> {
        let req = ApiRequest::get("/flight-prices/destinations/search").query("q", query);
        self.call(req, credential).await
    }

    pub async fn airlines<C: BearerCredential + ?Sized>(&self, credential: &C) -> Result<Vec<String>, ApiError> {
        self.call(ApiRequest::get("/flight-prices/airlines"), credential)
            .await
    }

    pub async fn flight_prices<C: BearerCredential + ?Sized>(
        &self,
        credential: &C,
        request: &FlightPriceRequest,
    ) -> Result<FlightPriceResponse, ApiError> {
        self.call(ApiRequest::post("/flight-prices").json(request)?, credential)
            .await
    }

    // ── Prediction ──

    pub async fn predict<C: BearerCredential + ?Sized>(
        &self,
        credential: &C,
        request: &PredictRequest,
    ) -> Result<Prediction, ApiError> {
        self.call(ApiRequest::post("/prediction").json(request)?, credential)
            .await
    }

    pub async fn chart_data<C: BearerCredential + ?Sized>(&self, credential: &C) -> Result<ChartsData, ApiError> {
        self.call(ApiRequest::get("/prediction/charts/data"), credential)
            .await
    }
}
