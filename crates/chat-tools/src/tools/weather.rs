//! Weather tool using the Open-Meteo API.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolContext};

const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Weather tool that fetches the forecast for a coordinate from Open-Meteo.
///
/// Open-Meteo is free and requires no API key. The forecast JSON is handed
/// to the model unchanged.
///
/// # Parameters
///
/// - `latitude` (required): Decimal degrees, -90 to 90.
/// - `longitude` (required): Decimal degrees, -180 to 180.
///
/// # Examples
///
/// ```json
/// {"latitude": 52.52, "longitude": 13.41}
/// ```
pub struct GetWeather {
    client: reqwest::Client,
    base_url: String,
}

impl GetWeather {
    /// Create a new weather tool.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: OPEN_METEO_URL.to_string(),
        }
    }

    /// Point the tool at another Open-Meteo compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn forecast_url(&self, latitude: f64, longitude: f64) -> Result<Url, ToolError> {
        Url::parse_with_params(
            &self.base_url,
            &[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", "temperature_2m".to_string()),
                ("hourly", "temperature_2m".to_string()),
                ("daily", "sunrise,sunset".to_string()),
                ("timezone", "auto".to_string()),
            ],
        )
        .map_err(|e| ToolError::ExecutionFailed(format!("Invalid weather URL: {}", e)))
    }

    async fn fetch_forecast(&self, latitude: f64, longitude: f64) -> Result<Value, ToolError> {
        let url = self.forecast_url(latitude, longitude)?;
        debug!("Fetching weather from: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Weather API returned status {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

impl Default for GetWeather {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

fn check_range(name: &str, value: f64, limit: f64) -> Result<f64, ToolError> {
    if value.is_finite() && value.abs() <= limit {
        Ok(value)
    } else {
        Err(ToolError::InvalidParameter {
            name: name.to_string(),
            reason: format!("must be between -{limit} and {limit}"),
        })
    }
}

#[async_trait]
impl Tool for GetWeather {
    fn name(&self) -> &str {
        "getWeather"
    }

    fn description(&self) -> &str {
        "Get the current weather at a location"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "latitude": {"type": "number"},
                "longitude": {"type": "number"}
            },
            "required": ["latitude", "longitude"]
        })
    }

    async fn execute(&self, _ctx: &ToolContext, args: ToolArgs) -> Result<Value, ToolError> {
        let latitude = check_range("latitude", args.get_f64("latitude")?, 90.0)?;
        let longitude = check_range("longitude", args.get_f64("longitude")?, 180.0)?;

        debug!(latitude, longitude, "Getting weather");

        self.fetch_forecast(latitude, longitude)
            .await
            .inspect_err(|e| warn!("Weather fetch failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context;
    use mock_model::EchoModel;

    #[test]
    fn test_forecast_url() {
        let url = GetWeather::default().forecast_url(52.52, 13.41).unwrap();
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert!(url.as_str().starts_with(OPEN_METEO_URL));
        assert!(query.contains(&("latitude".to_string(), "52.52".to_string())));
        assert!(query.contains(&("daily".to_string(), "sunrise,sunset".to_string())));
    }

    #[tokio::test]
    async fn test_missing_and_invalid_coordinates() {
        let (ctx, _reader) = test_context(EchoModel::new()).await;
        let weather = GetWeather::default();

        let result = weather
            .execute(&ctx, ToolArgs::from_value(json!({"latitude": 1.0})).unwrap())
            .await;
        assert!(matches!(result, Err(ToolError::MissingParameter(ref p)) if p == "longitude"));

        let result = weather
            .execute(
                &ctx,
                ToolArgs::from_value(json!({"latitude": 91.0, "longitude": 0.0})).unwrap(),
            )
            .await;
        assert!(matches!(result, Err(ToolError::InvalidParameter { ref name, .. }) if name == "latitude"));
    }

    // Integration test that requires network access
    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_weather_fetch() {
        let (ctx, _reader) = test_context(EchoModel::new()).await;
        let result = GetWeather::default()
            .execute(
                &ctx,
                ToolArgs::from_value(json!({"latitude": 52.52, "longitude": 13.41})).unwrap(),
            )
            .await
            .unwrap();
        assert!(result.get("current").is_some());
    }
}
