use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use serde_json::Value;

const REQUEST_TIMEOUT_SECS: u64 = 20;
const ERROR_BODY_PREVIEW: usize = 200;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("gridiron_weather/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")
    })
}

/// One blocking GET that must come back 2xx with a JSON body.
pub fn get_json(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
    bearer: Option<&str>,
) -> Result<Value> {
    let mut req = client.get(url).query(query);
    if let Some(token) = bearer {
        req = req.bearer_auth(token);
    }

    let resp = req
        .send()
        .with_context(|| format!("request to {url} failed"))?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
        return Err(anyhow!("http {} from {}: {}", status, url, preview));
    }
    serde_json::from_str::<Value>(body.trim()).with_context(|| format!("invalid json from {url}"))
}
