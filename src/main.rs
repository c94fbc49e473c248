use anyhow::{Context, Result};
use tracing::{info, warn};

use gridiron_weather::cfbd::CfbdClient;
use gridiron_weather::config::{self, PipelineConfig};
use gridiron_weather::http_client::http_client;
use gridiron_weather::ingest::{self, IngestPlan};
use gridiron_weather::logging;
use gridiron_weather::report;
use gridiron_weather::store::Store;
use gridiron_weather::weather::OpenMeteoClient;

/// Full run: load every configured season, then write all reports.
fn main() -> Result<()> {
    config::load_dotenv();
    logging::init_logging();

    let mut config = PipelineConfig::from_env()?;
    if let Some(db) = config::parse_db_path_arg() {
        config.db_path = db;
    }
    let store = Store::open(&config.db_path).context("unable to open football db")?;

    match config.require_api_key() {
        Ok(api_key) => {
            let client = http_client()?.clone();
            let games = CfbdClient::new(client.clone(), config.cfbd_base_url.clone(), api_key);
            let weather = OpenMeteoClient::new(client, config.weather_base_url.clone());
            let summary = ingest::ingest_seasons(
                &store,
                &games,
                &weather,
                &config.venues,
                &IngestPlan::from_config(&config),
            )?;
            info!(
                seasons = summary.seasons_succeeded,
                of = summary.seasons_total,
                inserted = summary.rows_inserted(),
                errors = summary.errors.len(),
                "ingest finished"
            );
        }
        Err(err) => warn!(error = %err, "skipping ingest, reporting on stored games only"),
    }

    let summary = report::generate_reports(&store, &config.venues, &config.output_dir)?;
    println!("DB: {}", config.db_path.display());
    println!("Games reported: {}", summary.records);
    println!("Report: {}", summary.report_path.display());
    for chart in &summary.charts {
        println!("Chart: {}", chart.display());
    }
    for err in &summary.errors {
        println!(" - {err}");
    }
    Ok(())
}
