use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::venues::{Coordinate, DEFAULT_HOME, VenueTable};

pub const DEFAULT_CFBD_BASE_URL: &str = "https://api.collegefootballdata.com";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
const DEFAULT_TEAM: &str = "Michigan";
const DEFAULT_SEASON_START: i32 = 2024;
const DEFAULT_SEASON_END: i32 = 2015;
const DEFAULT_SEASON_PAUSE_SECS: u64 = 1;
const APP_DIR: &str = "gridiron_weather";
const DB_FILE: &str = "football_stats.sqlite";

/// Everything the pipeline and the reports need, resolved once at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api_key: Option<String>,
    pub cfbd_base_url: String,
    pub weather_base_url: String,
    pub team: String,
    pub season_start: i32,
    pub season_end: i32,
    pub weather_enabled: bool,
    pub season_pause: Duration,
    pub db_path: PathBuf,
    pub output_dir: PathBuf,
    pub venues: VenueTable,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let season_start = parse_or(get("SEASON_START"), DEFAULT_SEASON_START, "SEASON_START")?;
        let season_end = parse_or(get("SEASON_END"), DEFAULT_SEASON_END, "SEASON_END")?;
        let pause_secs = parse_or(
            get("SEASON_PAUSE_SECS"),
            DEFAULT_SEASON_PAUSE_SECS,
            "SEASON_PAUSE_SECS",
        )?;

        let home = Coordinate::new(
            parse_or(get("HOME_LATITUDE"), DEFAULT_HOME.latitude, "HOME_LATITUDE")?,
            parse_or(get("HOME_LONGITUDE"), DEFAULT_HOME.longitude, "HOME_LONGITUDE")?,
        );
        let venues = match get("VENUE_TABLE_PATH") {
            Some(path) => VenueTable::load(home, &PathBuf::from(path))?,
            None => VenueTable::default().with_home(home),
        };

        let db_path = get("FOOTBALL_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);
        let output_dir = get("REPORT_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("reports"));

        Ok(Self {
            api_key: get("CFBD_API_KEY"),
            cfbd_base_url: get("CFBD_BASE_URL")
                .unwrap_or_else(|| DEFAULT_CFBD_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            weather_base_url: get("WEATHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
            team: get("TRACKED_TEAM").unwrap_or_else(|| DEFAULT_TEAM.to_string()),
            season_start,
            season_end,
            weather_enabled: get("WEATHER_ENABLED").map(|v| truthy(&v)).unwrap_or(true),
            season_pause: Duration::from_secs(pause_secs),
            db_path,
            output_dir,
            venues,
        })
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| anyhow!("CFBD_API_KEY is not set"))
    }

    /// Seasons to load, newest first. Both ends are inclusive.
    pub fn seasons(&self) -> Vec<i32> {
        let lo = self.season_start.min(self.season_end);
        let hi = self.season_start.max(self.season_end);
        (lo..=hi).rev().collect()
    }
}

pub fn default_db_path() -> PathBuf {
    app_data_dir()
        .map(|dir| dir.join(DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DB_FILE))
}

fn app_data_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_DATA_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".local").join("share").join(APP_DIR))
}

/// `--db <path>` or `--db=<path>` from the process arguments.
pub fn parse_db_path_arg() -> Option<PathBuf> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}

/// Loads `.env.local` then `.env`; earlier files win.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T, key: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v.parse::<T>().with_context(|| format!("invalid {key}: {v}")),
        None => Ok(default),
    }
}

fn truthy(raw: &str) -> bool {
    let t = raw.trim().to_ascii_lowercase();
    !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
}
