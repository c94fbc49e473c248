use anyhow::Result;
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::http_client::get_json;
use crate::venues::Coordinate;

pub const DAILY_VARIABLES: &str = "temperature_2m_max,temperature_2m_min,temperature_2m_mean,\
precipitation_sum,rain_sum,snowfall_sum,wind_speed_10m_max,wind_gusts_10m_max";

/// Source of daily weather observations at a coordinate.
pub trait WeatherFeed {
    fn daily(&self, at: Coordinate, start: NaiveDate, end: NaiveDate) -> Result<Value>;
}

/// Open-Meteo historical archive client. Temperatures in °F, wind in mph.
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl WeatherFeed for OpenMeteoClient {
    fn daily(&self, at: Coordinate, start: NaiveDate, end: NaiveDate) -> Result<Value> {
        let query = [
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
            ("daily", DAILY_VARIABLES.to_string()),
            ("temperature_unit", "fahrenheit".to_string()),
            ("wind_speed_unit", "mph".to_string()),
            ("timezone", "auto".to_string()),
        ];
        get_json(&self.client, &self.base_url, &query, None)
    }
}
