use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde_json::{Value, json};

use gridiron_weather::aggregate::{
    self, CompletionTier, TemperatureTier, Tier, WindTier,
};
use gridiron_weather::cfbd::GameFeed;
use gridiron_weather::ingest::{IngestPlan, ingest_seasons};
use gridiron_weather::report::{self, REPORT_FILE};
use gridiron_weather::store::Store;
use gridiron_weather::venues::{Coordinate, DEFAULT_HOME, VenueTable};
use gridiron_weather::weather::WeatherFeed;

#[derive(Default)]
struct FakeGames {
    games: HashMap<i32, Value>,
    stats: HashMap<i32, Value>,
}

impl GameFeed for FakeGames {
    fn games(&self, year: i32, _team: &str) -> Result<Value> {
        self.games
            .get(&year)
            .cloned()
            .ok_or_else(|| anyhow!("http 500 Internal Server Error for /games?year={year}"))
    }

    fn team_stats(&self, year: i32, _team: &str) -> Result<Value> {
        self.stats
            .get(&year)
            .cloned()
            .ok_or_else(|| anyhow!("http 500 Internal Server Error for /games/teams?year={year}"))
    }
}

/// Serves `(max wind mph, mean temp °F)` per location key.
#[derive(Default)]
struct FakeWeather {
    days: HashMap<String, (f64, f64)>,
    calls: Cell<usize>,
}

impl WeatherFeed for FakeWeather {
    fn daily(&self, at: Coordinate, start: NaiveDate, _end: NaiveDate) -> Result<Value> {
        self.calls.set(self.calls.get() + 1);
        let (wind, temp) = self
            .days
            .get(&at.location_key())
            .copied()
            .ok_or_else(|| anyhow!("no weather for {}", at.location_key()))?;
        Ok(json!({"daily": {
            "time": [start.format("%Y-%m-%d").to_string()],
            "temperature_2m_mean": [temp],
            "wind_speed_10m_max": [wind]
        }}))
    }
}

fn plan(seasons: &[i32]) -> IngestPlan {
    IngestPlan {
        team: "Michigan".to_string(),
        seasons: seasons.to_vec(),
        weather_enabled: true,
        season_pause: Duration::ZERO,
    }
}

fn rivalry_feeds() -> (FakeGames, FakeWeather) {
    let mut games = FakeGames::default();
    games.games.insert(
        2023,
        json!([{
            "id": 1, "start_date": "2023-11-25T17:00:00.000Z",
            "home_team": "Michigan", "away_team": "Ohio State",
            "home_points": 30, "away_points": 24
        }]),
    );
    games.stats.insert(
        2023,
        json!([{
            "id": 1,
            "teams": [{"school": "Michigan", "stats": [
                {"category": "rushingAttempts", "stat": "39"},
                {"category": "completionAttempts", "stat": "18-29"}
            ]}]
        }]),
    );
    let mut weather = FakeWeather::default();
    weather
        .days
        .insert(DEFAULT_HOME.location_key(), (14.0, 31.5));
    (games, weather)
}

fn temp_output_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "gridiron_weather_{name}_{}",
        std::process::id()
    ));
    fs::remove_dir_all(&dir).ok();
    dir
}

#[test]
fn rivalry_game_flows_into_buckets() {
    let store = Store::open_in_memory().unwrap();
    let venues = VenueTable::default();
    let (games, weather) = rivalry_feeds();

    let summary = ingest_seasons(&store, &games, &weather, &venues, &plan(&[2023])).unwrap();
    assert_eq!(summary.seasons_succeeded, 1);
    assert!(summary.errors.is_empty());
    assert_eq!(summary.latest_game_date.as_deref(), Some("2023-11-25"));

    let results = store.load_game_results().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].game_id, 1);
    assert!(results[0].is_home);
    assert_eq!(results[0].opponent, "Ohio State");
    assert_eq!(results[0].total_points, Some(30));

    let stats = store.load_game_stats().unwrap();
    assert_eq!(stats[0].completed, Some(18));
    assert_eq!(stats[0].attempted, Some(29));

    let records = store.load_derived_records(&venues).unwrap();
    assert_eq!(records.len(), 1);
    let pct = records[0].completion_percentage().unwrap();
    assert!((pct - 62.07).abs() < 0.01);
    assert_eq!(CompletionTier::classify(pct), CompletionTier::From61To70);
    assert_eq!(
        WindTier::classify(records[0].max_wind_speed().unwrap()),
        WindTier::Moderate
    );

    let by_wind = aggregate::completion_by_wind(&records);
    let moderate = &by_wind.rows[1];
    assert_eq!(moderate.tier, WindTier::Moderate);
    assert_eq!(moderate.games, 1);
    assert!((moderate.mean(0) - 62.07).abs() < 0.01);

    let by_completion = aggregate::points_by_completion(&records);
    assert_eq!(by_completion.rows[2].tier.label(), "61-70");
    assert_eq!(by_completion.rows[2].mean(0), 30.0);

    let by_temp = aggregate::points_by_temperature(&records);
    assert_eq!(by_temp.rows[0].tier, TemperatureTier::Cold);
    assert_eq!(by_temp.rows[0].games, 1);
}

#[test]
fn rerun_is_idempotent_and_reuses_weather() {
    let store = Store::open_in_memory().unwrap();
    let venues = VenueTable::default();
    let (games, weather) = rivalry_feeds();

    let first = ingest_seasons(&store, &games, &weather, &venues, &plan(&[2023])).unwrap();
    assert_eq!(first.rows_inserted(), 3);
    assert_eq!(weather.calls.get(), 1);

    let second = ingest_seasons(&store, &games, &weather, &venues, &plan(&[2023])).unwrap();
    assert_eq!(second.rows_inserted(), 0);
    assert_eq!(second.per_season[0].with_weather, 1);
    assert_eq!(weather.calls.get(), 1);

    assert_eq!(store.load_game_results().unwrap().len(), 1);
    assert_eq!(store.load_game_stats().unwrap().len(), 1);
    assert_eq!(store.load_weather().unwrap().len(), 1);
    assert_eq!(store.run_count().unwrap(), 2);
}

#[test]
fn failed_season_does_not_stop_the_run() {
    let store = Store::open_in_memory().unwrap();
    let venues = VenueTable::default();
    let (mut games, weather) = rivalry_feeds();
    let payload = games.games.remove(&2023).unwrap();
    games.games.insert(2022, payload);

    let summary =
        ingest_seasons(&store, &games, &weather, &venues, &plan(&[2023, 2022])).unwrap();
    assert_eq!(summary.seasons_total, 2);
    assert_eq!(summary.seasons_succeeded, 1);
    // 2023 games failed; 2022 games loaded but 2022 stats failed.
    assert_eq!(summary.errors.len(), 2);
    assert!(summary.errors[0].contains("season 2023 games"));
    assert!(summary.errors[1].contains("season 2022 stats"));

    assert_eq!(store.load_game_results().unwrap().len(), 1);
    assert!(store.load_game_stats().unwrap().is_empty());
}

#[test]
fn unknown_opponents_get_no_weather() {
    let store = Store::open_in_memory().unwrap();
    let venues = VenueTable::default();
    let mut games = FakeGames::default();
    games.games.insert(
        2023,
        json!([
            {"id": 10, "start_date": "2023-09-02T16:00:00.000Z",
             "home_team": "Nowhere Tech", "away_team": "Michigan",
             "home_points": 3, "away_points": 30},
            {"id": 11, "start_date": "2023-11-18T20:30:00.000Z",
             "home_team": "Maryland", "away_team": "Michigan",
             "home_points": 24, "away_points": 31}
        ]),
    );
    games.stats.insert(
        2023,
        json!([
            {"id": 10, "teams": [{"school": "Michigan", "stats": [
                {"category": "rushingAttempts", "stat": "30"},
                {"category": "completionAttempts", "stat": "20-25"}
            ]}]},
            {"id": 11, "teams": [{"school": "Michigan", "stats": [
                {"category": "rushingAttempts", "stat": "35"},
                {"category": "completionAttempts", "stat": "10-20"}
            ]}]}
        ]),
    );
    let maryland = Coordinate::new(38.9869, -76.9426);
    let mut weather = FakeWeather::default();
    weather.days.insert(maryland.location_key(), (22.0, 55.0));

    let summary = ingest_seasons(&store, &games, &weather, &venues, &plan(&[2023])).unwrap();
    assert!(summary.errors.is_empty());
    assert_eq!(weather.calls.get(), 1);
    assert_eq!(summary.per_season[0].with_weather, 1);

    let records = store.load_derived_records(&venues).unwrap();
    assert_eq!(records.len(), 2);

    let mix = aggregate::play_mix_by_wind(&records);
    let counted: usize = mix.rows.iter().map(|r| r.games).sum();
    assert_eq!(counted, 1);
    assert_eq!(mix.rows[2].tier, WindTier::High);
    assert!((mix.rows[2].mean(0) - 20.0 / 55.0 * 100.0).abs() < 1e-9);

    // Completion does not need weather, so both games count there.
    let by_completion = aggregate::points_by_completion(&records);
    let counted: usize = by_completion.rows.iter().map(|r| r.games).sum();
    assert_eq!(counted, 2);
}

#[test]
fn weather_can_be_disabled() {
    let store = Store::open_in_memory().unwrap();
    let venues = VenueTable::default();
    let (games, weather) = rivalry_feeds();
    let mut plan = plan(&[2023]);
    plan.weather_enabled = false;

    let summary = ingest_seasons(&store, &games, &weather, &venues, &plan).unwrap();
    assert_eq!(weather.calls.get(), 0);
    assert_eq!(summary.per_season[0].with_weather, 0);
    assert!(store.load_weather().unwrap().is_empty());
}

#[test]
fn empty_plan_is_an_error() {
    let store = Store::open_in_memory().unwrap();
    let (games, weather) = rivalry_feeds();
    let result = ingest_seasons(&store, &games, &weather, &VenueTable::default(), &plan(&[]));
    assert!(result.is_err());
}

#[test]
fn reports_and_charts_are_written() {
    let store = Store::open_in_memory().unwrap();
    let venues = VenueTable::default();
    let (games, weather) = rivalry_feeds();
    ingest_seasons(&store, &games, &weather, &venues, &plan(&[2023])).unwrap();

    let dir = temp_output_dir("reports");
    let summary = report::generate_reports(&store, &venues, &dir).unwrap();
    assert_eq!(summary.records, 1);
    assert!(summary.errors.is_empty());
    assert_eq!(summary.charts.len(), 8);
    for chart in &summary.charts {
        assert!(chart.exists());
    }
    for stem in [
        "average_rushing_passing_by_wind",
        "average_points_by_temperature",
        "average_completion_by_wind",
        "completion_avg_total_points",
    ] {
        assert!(dir.join(format!("{stem}.png")).exists());
        assert!(dir.join(format!("{stem}.xlsx")).exists());
    }

    let text = fs::read_to_string(dir.join(REPORT_FILE)).unwrap();
    assert!(text.contains("Average Rushing and Passing Percentage by Wind Speed"));
    assert!(text.contains("Total Points Based on Temperature"));
    assert!(text.contains("Completion Percentage Based on Wind Speed"));
    assert!(text.contains("Average Score Per Completion Percentage Range"));
    assert!(text.contains("Moderate Wind\t1\t62.07%"));
    assert!(text.contains("61-70\t1\t30.00"));
    assert!(text.contains("2023-11-25\t1\tHome\t30\t31.5°F"));
    assert!(text.contains("2023-11-25\tHome\tOhio State\t62.07%\t14.0 mph"));

    fs::remove_dir_all(&dir).ok();
}
