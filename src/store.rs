use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::merge::weather_for;
use crate::model::{DerivedRecord, GameResult, GameStats, WeatherObservation};
use crate::venues::VenueTable;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The local football database. Owns a single connection for its lifetime;
/// every write is its own auto-committed statement.
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).ok();
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.create_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        let store = Self { conn, path: None };
        store.create_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn create_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS game_results (
                    game_id INTEGER PRIMARY KEY,
                    game_date TEXT NOT NULL,
                    home_away TEXT NOT NULL,
                    opponent TEXT NOT NULL,
                    total_points INTEGER NULL,
                    inserted_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_game_results_date ON game_results(game_date);

                -- game_id refers to game_results; not enforced.
                CREATE TABLE IF NOT EXISTS game_stats (
                    game_id INTEGER PRIMARY KEY,
                    rushing_attempts INTEGER NULL,
                    pass_attempts INTEGER NULL,
                    completed INTEGER NULL,
                    attempted INTEGER NULL,
                    rushing_yards INTEGER NULL,
                    passing_yards INTEGER NULL,
                    inserted_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS weather_data (
                    weather_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    obs_date TEXT NOT NULL,
                    location TEXT NOT NULL,
                    max_temperature REAL NULL,
                    min_temperature REAL NULL,
                    mean_temperature REAL NULL,
                    precipitation_sum REAL NULL,
                    rain_sum REAL NULL,
                    snowfall_sum REAL NULL,
                    max_wind_speed REAL NULL,
                    max_wind_gust REAL NULL,
                    UNIQUE(obs_date, location)
                );

                CREATE TABLE IF NOT EXISTS ingest_runs (
                    run_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    started_at TEXT NOT NULL,
                    finished_at TEXT NULL,
                    team TEXT NOT NULL,
                    seasons_total INTEGER NOT NULL,
                    seasons_succeeded INTEGER NOT NULL,
                    rows_inserted INTEGER NOT NULL,
                    errors_json TEXT NOT NULL
                );
                "#,
            )
            .context("create sqlite schema")?;
        Ok(())
    }

    /// Inserts the game unless its id is already stored. Returns whether a row
    /// was written; existing rows are never touched.
    pub fn upsert_game_result(&self, game: &GameResult) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                r#"
                INSERT INTO game_results (
                    game_id, game_date, home_away, opponent, total_points, inserted_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(game_id) DO NOTHING
                "#,
                params![
                    game.game_id,
                    game.date.format(DATE_FORMAT).to_string(),
                    game.home_away_label(),
                    game.opponent,
                    game.total_points,
                    Utc::now().to_rfc3339(),
                ],
            )
            .with_context(|| format!("insert game result {}", game.game_id))?;
        Ok(changed > 0)
    }

    pub fn upsert_game_stats(&self, stats: &GameStats) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                r#"
                INSERT INTO game_stats (
                    game_id, rushing_attempts, pass_attempts, completed, attempted,
                    rushing_yards, passing_yards, inserted_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(game_id) DO NOTHING
                "#,
                params![
                    stats.game_id,
                    stats.rushing_attempts,
                    stats.pass_attempts,
                    stats.completed,
                    stats.attempted,
                    stats.rushing_yards,
                    stats.passing_yards,
                    Utc::now().to_rfc3339(),
                ],
            )
            .with_context(|| format!("insert game stats {}", stats.game_id))?;
        Ok(changed > 0)
    }

    pub fn upsert_weather(&self, obs: &WeatherObservation) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                r#"
                INSERT OR IGNORE INTO weather_data (
                    obs_date, location, max_temperature, min_temperature, mean_temperature,
                    precipitation_sum, rain_sum, snowfall_sum, max_wind_speed, max_wind_gust
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    obs.date.format(DATE_FORMAT).to_string(),
                    obs.location,
                    obs.max_temperature,
                    obs.min_temperature,
                    obs.mean_temperature,
                    obs.precipitation_sum,
                    obs.rain_sum,
                    obs.snowfall_sum,
                    obs.max_wind_speed,
                    obs.max_wind_gust,
                ],
            )
            .with_context(|| format!("insert weather {} @ {}", obs.date, obs.location))?;
        Ok(changed > 0)
    }

    pub fn find_weather(
        &self,
        date: NaiveDate,
        location: &str,
    ) -> Result<Option<WeatherObservation>> {
        self.conn
            .query_row(
                &format!("{WEATHER_SELECT} WHERE obs_date = ?1 AND location = ?2"),
                params![date.format(DATE_FORMAT).to_string(), location],
                weather_from_row,
            )
            .optional()
            .context("query weather row")
    }

    pub fn load_game_results(&self) -> Result<Vec<GameResult>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT game_id, game_date, home_away, opponent, total_points
                FROM game_results
                ORDER BY game_date DESC, game_id ASC
                "#,
            )
            .context("prepare load game results")?;
        let rows = stmt
            .query_map([], |row| game_result_from_row(row, 0))
            .context("query game results")?;
        collect_rows(rows, "decode game result row")
    }

    pub fn load_game_stats(&self) -> Result<Vec<GameStats>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STATS_SELECT} ORDER BY game_id ASC"))
            .context("prepare load game stats")?;
        let rows = stmt
            .query_map([], |row| game_stats_from_row(row, 0))
            .context("query game stats")?;
        collect_rows(rows, "decode game stats row")
    }

    pub fn load_weather(&self) -> Result<Vec<WeatherObservation>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{WEATHER_SELECT} ORDER BY obs_date DESC, location ASC"))
            .context("prepare load weather")?;
        let rows = stmt
            .query_map([], weather_from_row)
            .context("query weather")?;
        collect_rows(rows, "decode weather row")
    }

    /// Every stored game joined with its stats and with the weather at the venue
    /// `venues` resolves for it.
    pub fn load_derived_records(&self, venues: &VenueTable) -> Result<Vec<DerivedRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT
                    r.game_id, r.game_date, r.home_away, r.opponent, r.total_points,
                    s.game_id, s.rushing_attempts, s.pass_attempts, s.completed, s.attempted,
                    s.rushing_yards, s.passing_yards
                FROM game_results AS r
                LEFT JOIN game_stats AS s ON s.game_id = r.game_id
                ORDER BY r.game_date DESC, r.game_id ASC
                "#,
            )
            .context("prepare derived records query")?;
        let rows = stmt
            .query_map([], |row| {
                let result = game_result_from_row(row, 0)?;
                let stats = match row.get::<_, Option<i64>>(5)? {
                    Some(_) => Some(game_stats_from_row(row, 5)?),
                    None => None,
                };
                Ok((result, stats))
            })
            .context("query derived records")?;
        let joined = collect_rows(rows, "decode derived record row")?;

        let weather = self.load_weather()?;
        Ok(joined
            .into_iter()
            .map(|(result, stats)| {
                let weather = weather_for(&result, &weather, venues).cloned();
                DerivedRecord {
                    result,
                    stats,
                    weather,
                }
            })
            .collect())
    }

    pub fn latest_game_date(&self) -> Result<Option<NaiveDate>> {
        let raw = self
            .conn
            .query_row("SELECT MAX(game_date) FROM game_results", [], |row| {
                row.get::<_, Option<String>>(0)
            })
            .context("query latest game date")?;
        Ok(raw.and_then(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT).ok()))
    }

    pub fn begin_run(&self, team: &str, seasons_total: usize) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO ingest_runs(started_at, finished_at, team, seasons_total, seasons_succeeded, rows_inserted, errors_json)
                 VALUES (?1, NULL, ?2, ?3, 0, 0, '[]')",
                params![Utc::now().to_rfc3339(), team, seasons_total as i64],
            )
            .context("insert ingest run")?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn finish_run(
        &self,
        run_id: i64,
        seasons_succeeded: usize,
        rows_inserted: usize,
        errors: &[String],
    ) -> Result<()> {
        let errors_json = serde_json::to_string(errors).unwrap_or_else(|_| "[]".to_string());
        self.conn
            .execute(
                "UPDATE ingest_runs
                 SET finished_at = ?1, seasons_succeeded = ?2, rows_inserted = ?3, errors_json = ?4
                 WHERE run_id = ?5",
                params![
                    Utc::now().to_rfc3339(),
                    seasons_succeeded as i64,
                    rows_inserted as i64,
                    errors_json,
                    run_id
                ],
            )
            .context("update ingest run")?;
        Ok(())
    }

    pub fn run_count(&self) -> Result<usize> {
        let n = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM ingest_runs WHERE finished_at IS NOT NULL",
                [],
                |row| row.get::<_, i64>(0),
            )
            .context("count ingest runs")?;
        Ok(usize::try_from(n).unwrap_or_default())
    }
}

const STATS_SELECT: &str = r#"
    SELECT game_id, rushing_attempts, pass_attempts, completed, attempted,
           rushing_yards, passing_yards
    FROM game_stats
"#;

const WEATHER_SELECT: &str = r#"
    SELECT obs_date, location, max_temperature, min_temperature, mean_temperature,
           precipitation_sum, rain_sum, snowfall_sum, max_wind_speed, max_wind_gust
    FROM weather_data
"#;

fn game_result_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<GameResult> {
    Ok(GameResult {
        game_id: row.get(base)?,
        date: date_column(row, base + 1)?,
        is_home: row.get::<_, String>(base + 2)? == "Home",
        opponent: row.get(base + 3)?,
        total_points: row.get(base + 4)?,
    })
}

fn game_stats_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<GameStats> {
    Ok(GameStats {
        game_id: row.get(base)?,
        rushing_attempts: row.get(base + 1)?,
        pass_attempts: row.get(base + 2)?,
        completed: row.get(base + 3)?,
        attempted: row.get(base + 4)?,
        rushing_yards: row.get(base + 5)?,
        passing_yards: row.get(base + 6)?,
    })
}

fn weather_from_row(row: &Row<'_>) -> rusqlite::Result<WeatherObservation> {
    Ok(WeatherObservation {
        date: date_column(row, 0)?,
        location: row.get(1)?,
        max_temperature: row.get(2)?,
        min_temperature: row.get(3)?,
        mean_temperature: row.get(4)?,
        precipitation_sum: row.get(5)?,
        rain_sum: row.get(6)?,
        snowfall_sum: row.get(7)?,
        max_wind_speed: row.get(8)?,
        max_wind_gust: row.get(9)?,
    })
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
    what: &'static str,
) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context(what)?);
    }
    Ok(out)
}
