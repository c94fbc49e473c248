use anyhow::Result;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::http_client::get_json;

/// Source of game results and per-team box scores for one season.
pub trait GameFeed {
    fn games(&self, year: i32, team: &str) -> Result<Value>;
    fn team_stats(&self, year: i32, team: &str) -> Result<Value>;
}

/// College Football Data API client.
pub struct CfbdClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CfbdClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        get_json(&self.client, &url, query, Some(&self.api_key))
    }
}

impl GameFeed for CfbdClient {
    fn games(&self, year: i32, team: &str) -> Result<Value> {
        self.get(
            "/games",
            &[("year", year.to_string()), ("team", team.to_string())],
        )
    }

    fn team_stats(&self, year: i32, team: &str) -> Result<Value> {
        self.get(
            "/games/teams",
            &[
                ("year", year.to_string()),
                ("seasonType", "regular".to_string()),
                ("team", team.to_string()),
            ],
        )
    }
}
