use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{debug, info, warn};

use crate::cfbd::GameFeed;
use crate::config::PipelineConfig;
use crate::extract::{parse_game_results, parse_team_stats, parse_weather_daily};
use crate::merge::merge_records;
use crate::model::{DerivedRecord, GameResult, WeatherObservation};
use crate::store::Store;
use crate::venues::VenueTable;
use crate::weather::WeatherFeed;

/// What one ingest pass needs to know beyond its collaborators.
#[derive(Debug, Clone)]
pub struct IngestPlan {
    pub team: String,
    /// Newest first.
    pub seasons: Vec<i32>,
    pub weather_enabled: bool,
    pub season_pause: Duration,
}

impl IngestPlan {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            team: config.team.clone(),
            seasons: config.seasons(),
            weather_enabled: config.weather_enabled,
            season_pause: config.season_pause,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeasonSummary {
    pub season: i32,
    pub games: usize,
    pub with_stats: usize,
    pub with_weather: usize,
    pub results_inserted: usize,
    pub stats_inserted: usize,
    pub weather_inserted: usize,
}

#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub db_path: Option<PathBuf>,
    pub team: String,
    pub seasons_total: usize,
    pub seasons_succeeded: usize,
    pub per_season: Vec<SeasonSummary>,
    pub latest_game_date: Option<String>,
    pub errors: Vec<String>,
}

impl IngestSummary {
    pub fn rows_inserted(&self) -> usize {
        self.per_season
            .iter()
            .map(|s| s.results_inserted + s.stats_inserted + s.weather_inserted)
            .sum()
    }

    pub fn games_seen(&self) -> usize {
        self.per_season.iter().map(|s| s.games).sum()
    }
}

/// Fetches, merges and stores every season in `plan`. Fetch failures are logged
/// and recorded; only storage errors abort the run.
pub fn ingest_seasons<G: GameFeed, W: WeatherFeed>(
    store: &Store,
    games: &G,
    weather: &W,
    venues: &VenueTable,
    plan: &IngestPlan,
) -> Result<IngestSummary> {
    if plan.seasons.is_empty() {
        return Err(anyhow!("no seasons to ingest for {}", plan.team));
    }

    let run_id = store.begin_run(&plan.team, plan.seasons.len())?;
    let mut per_season = Vec::with_capacity(plan.seasons.len());
    let mut seasons_succeeded = 0usize;
    let mut errors: Vec<String> = Vec::new();

    for (idx, season) in plan.seasons.iter().copied().enumerate() {
        if idx > 0 && !plan.season_pause.is_zero() {
            thread::sleep(plan.season_pause);
        }
        info!(season, team = %plan.team, "fetching season");

        let results = match games.games(season, &plan.team) {
            Ok(payload) => parse_game_results(&payload, &plan.team),
            Err(err) => {
                warn!(season, error = %err, "game results fetch failed");
                errors.push(format!("season {season} games: {err:#}"));
                per_season.push(SeasonSummary {
                    season,
                    ..SeasonSummary::default()
                });
                continue;
            }
        };
        seasons_succeeded += 1;

        let stats = match games.team_stats(season, &plan.team) {
            Ok(payload) => parse_team_stats(&payload, &plan.team),
            Err(err) => {
                warn!(season, error = %err, "team stats fetch failed");
                errors.push(format!("season {season} stats: {err:#}"));
                Vec::new()
            }
        };

        let observations = if plan.weather_enabled {
            collect_weather(store, weather, venues, &results, &mut errors)?
        } else {
            Vec::new()
        };

        let merged = merge_records(&results, &stats, &observations, venues);
        let summary = persist_season(store, season, &merged)?;
        info!(
            season,
            games = summary.games,
            with_stats = summary.with_stats,
            with_weather = summary.with_weather,
            inserted = summary.results_inserted,
            "season stored"
        );
        per_season.push(summary);
    }

    let summary = IngestSummary {
        db_path: store.path().map(|p| p.to_path_buf()),
        team: plan.team.clone(),
        seasons_total: plan.seasons.len(),
        seasons_succeeded,
        per_season,
        latest_game_date: store.latest_game_date()?.map(|d| d.to_string()),
        errors,
    };
    store.finish_run(
        run_id,
        summary.seasons_succeeded,
        summary.rows_inserted(),
        &summary.errors,
    )?;
    Ok(summary)
}

/// Weather for each game whose venue is known. Already-stored days are read
/// back instead of refetched.
fn collect_weather<W: WeatherFeed>(
    store: &Store,
    feed: &W,
    venues: &VenueTable,
    results: &[GameResult],
    errors: &mut Vec<String>,
) -> Result<Vec<WeatherObservation>> {
    let mut out = Vec::new();
    for game in results {
        let Some(at) = venues.resolve(game) else {
            debug!(game_id = game.game_id, opponent = %game.opponent, "no venue coordinate, skipping weather");
            continue;
        };
        let location = at.location_key();

        if let Some(stored) = store.find_weather(game.date, &location)? {
            debug!(game_id = game.game_id, %location, "weather already stored");
            out.push(stored);
            continue;
        }

        match feed.daily(at, game.date, game.date) {
            Ok(payload) => {
                let day = parse_weather_daily(&payload, &location)
                    .into_iter()
                    .find(|obs| obs.date == game.date);
                match day {
                    Some(obs) => out.push(obs),
                    None => warn!(game_id = game.game_id, date = %game.date, "weather response had no matching day"),
                }
            }
            Err(err) => {
                warn!(game_id = game.game_id, error = %err, "weather fetch failed");
                errors.push(format!("weather {} @ {location}: {err:#}", game.date));
            }
        }
    }
    Ok(out)
}

fn persist_season(store: &Store, season: i32, merged: &[DerivedRecord]) -> Result<SeasonSummary> {
    let mut summary = SeasonSummary {
        season,
        games: merged.len(),
        ..SeasonSummary::default()
    };
    for record in merged {
        if store.upsert_game_result(&record.result)? {
            summary.results_inserted += 1;
        }
        if let Some(stats) = &record.stats {
            summary.with_stats += 1;
            if store.upsert_game_stats(stats)? {
                summary.stats_inserted += 1;
            }
        }
        if let Some(obs) = &record.weather {
            summary.with_weather += 1;
            if store.upsert_weather(obs)? {
                summary.weather_inserted += 1;
            }
        }
    }
    Ok(summary)
}
