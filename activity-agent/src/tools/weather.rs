// Weather lookup against the OpenWeatherMap current-weather endpoint

use super::{string_arg, Tool, ToolCallError, ToolOutput};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

pub struct WeatherLookup {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    weather: Vec<Condition>,
    main: Readings,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Readings {
    temp: f64,
}

impl WeatherLookup {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }

    pub async fn fetch(&self, city: &str) -> ToolOutput {
        let Some(api_key) = self.api_key.as_deref() else {
            return ToolOutput::Failure("OPENWEATHERMAP_API_KEY is not configured.".to_string());
        };

        info!("Weather: looking up {}", city);
        let resp = match self
            .http
            .get(&self.endpoint)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Weather request for {} failed: {}", city, e);
                return ToolOutput::Failure(format!(
                    "could not reach the weather service for '{}': {}",
                    city, e
                ));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("Weather service responded {} for {}", status, city);
            return ToolOutput::Failure(format!("{}, {}", status.as_u16(), body));
        }

        match resp.json::<CurrentWeather>().await {
            Ok(current) => {
                let description = current
                    .weather
                    .first()
                    .map(|c| c.description.as_str())
                    .unwrap_or("unknown conditions");
                ToolOutput::Text(format!(
                    "The current weather in {} is {} with a temperature of {}\u{b0}C.",
                    city, description, current.main.temp
                ))
            }
            Err(e) => ToolOutput::Failure(format!(
                "unexpected weather payload for '{}': {}",
                city, e
            )),
        }
    }
}

#[async_trait]
impl Tool for WeatherLookup {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Return the current weather in the given city using OpenWeatherMap."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "Name of the city, e.g. Madrid"
                }
            },
            "required": ["city"]
        })
    }

    async fn call(&self, args: &Value) -> Result<ToolOutput, ToolCallError> {
        let city = string_arg(self.name(), args, "city")?;
        Ok(self.fetch(city).await)
    }
}
