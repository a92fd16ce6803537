use crate::config::OpenWeatherMapConfig;
use crate::datasources::WeatherProvider;
use crate::error::{PitchWatchError, Result};
use crate::models::Location;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    config: OpenWeatherMapConfig,
}

// OpenWeatherMap API response structures
#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    weather: Vec<OwmWeather>,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    id: u32,
    #[allow(dead_code)]
    #[serde(default)]
    main: String,
}

impl OpenWeatherMapClient {
    pub fn new(config: OpenWeatherMapConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { client, config }
    }

    async fn fetch_current(&self, location: &Location) -> Result<OwmCurrentResponse> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}",
            API_BASE_URL, location.latitude, location.longitude, self.config.api_key
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            PitchWatchError::WeatherUnavailable(format!("OpenWeatherMap: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PitchWatchError::WeatherUnavailable(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            PitchWatchError::WeatherUnavailable(format!(
                "Failed to parse OpenWeatherMap response: {}",
                e
            ))
        })
    }

    /// Test connection to OpenWeatherMap API
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!(
            "{}/weather?lat=0&lon=0&appid={}",
            API_BASE_URL, self.config.api_key
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            PitchWatchError::WeatherUnavailable(format!("OpenWeatherMap: {}", e))
        })?;

        Ok(response.status().is_success())
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapClient {
    async fn is_raining_now(&self, location: &Location) -> Result<bool> {
        let current = self.fetch_current(location).await?;
        Ok(current.weather.iter().any(|w| is_rain_code(w.id)))
    }
}

/// OpenWeatherMap condition ids in the 5xx range are rain. Drizzle (3xx),
/// thunderstorms (2xx) and snow (6xx) are deliberately not counted.
fn is_rain_code(id: u32) -> bool {
    (500..=531).contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> OpenWeatherMapConfig {
        OpenWeatherMapConfig {
            api_key: "test_key".to_string(),
            enabled: true,
        }
    }

    #[test]
    fn client_creation() {
        let client = OpenWeatherMapClient::new(sample_config());
        assert!(client.config.enabled);
    }

    #[test]
    fn rain_codes_are_5xx_only() {
        assert!(is_rain_code(500)); // light rain
        assert!(is_rain_code(521)); // shower rain
        assert!(is_rain_code(531));

        assert!(!is_rain_code(200)); // thunderstorm
        assert!(!is_rain_code(300)); // drizzle
        assert!(!is_rain_code(600)); // snow
        assert!(!is_rain_code(800)); // clear
        assert!(!is_rain_code(804)); // overcast
    }

    #[test]
    fn current_response_parses() {
        let body = r#"{"weather":[{"id":501,"main":"Rain"}],"main":{"temp":280.3}}"#;
        let parsed: OwmCurrentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.weather.len(), 1);
        assert!(is_rain_code(parsed.weather[0].id));
    }
}
