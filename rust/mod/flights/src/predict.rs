//! Price prediction action.

use auth::{auth_action, ActionResult, AuthState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skyfare_client::{MonthlyPrice, PriceBucket, SeasonalDemand, TokenPair};
use skyfare_core::ServiceError;

use crate::schema::PredictionSearch;

/// Presentation values shown next to every prediction.
pub const CONFIDENCE: u32 = 92;
pub const PRICE_CHANGE: f64 = 5.2;
pub const LAST_UPDATED: &str = "2 hours ago";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictStatistics {
    pub predicted_price: f64,
    pub confidence: u32,
    pub price_change: f64,
    pub last_updated: String,
}

/// Prediction plus the chart series for the results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResults {
    pub statistics: PredictStatistics,
    pub trend_data: Vec<MonthlyPrice>,
    pub distribution_data: Vec<PriceBucket>,
    pub seasonality_data: Vec<SeasonalDemand>,
}

pub async fn predict(state: &AuthState, tokens: Option<TokenPair>, input: Value) -> ActionResult<PredictResults> {
    auth_action("predict", &state.validator, tokens, input, move |search: PredictionSearch, session| async move {
        let request = search
            .to_predict_request()
            .ok_or_else(|| ServiceError::Validation("Departure date is required".into()))?;

        let prediction = state.client.predict(&session, &request).await?;
        let charts = state.client.chart_data(&session).await?;

        Ok::<_, ServiceError>(PredictResults {
            statistics: PredictStatistics {
                predicted_price: prediction.predictions,
                confidence: CONFIDENCE,
                price_change: PRICE_CHANGE,
                last_updated: LAST_UPDATED.to_string(),
            },
            trend_data: charts.price_trend,
            distribution_data: charts.price_distribution,
            seasonality_data: charts.seasonal_analysis,
        })
    })
    .await
}
