use anyhow::{Context, Result};

use gridiron_weather::cfbd::CfbdClient;
use gridiron_weather::config::{self, PipelineConfig};
use gridiron_weather::http_client::http_client;
use gridiron_weather::ingest::{self, IngestPlan};
use gridiron_weather::logging;
use gridiron_weather::store::Store;
use gridiron_weather::weather::OpenMeteoClient;

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init_logging();

    let mut config = PipelineConfig::from_env()?;
    if let Some(db) = config::parse_db_path_arg() {
        config.db_path = db;
    }
    let api_key = config.require_api_key()?.to_string();

    let client = http_client()?.clone();
    let games = CfbdClient::new(client.clone(), config.cfbd_base_url.clone(), api_key);
    let weather = OpenMeteoClient::new(client, config.weather_base_url.clone());

    let store = Store::open(&config.db_path).context("unable to open football db")?;
    let summary = ingest::ingest_seasons(
        &store,
        &games,
        &weather,
        &config.venues,
        &IngestPlan::from_config(&config),
    )?;

    println!("Ingest complete for {}", summary.team);
    println!("DB: {}", config.db_path.display());
    println!(
        "Seasons: {}/{}",
        summary.seasons_succeeded, summary.seasons_total
    );
    println!("Games seen: {}", summary.games_seen());
    println!("Rows inserted: {}", summary.rows_inserted());
    for season in &summary.per_season {
        println!(
            "season {}: games={} stats={} weather={} new_games={}",
            season.season,
            season.games,
            season.with_stats,
            season.with_weather,
            season.results_inserted
        );
    }
    if let Some(latest) = summary.latest_game_date {
        println!("Latest game: {latest}");
    }
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(8) {
            println!(" - {err}");
        }
    }

    Ok(())
}
