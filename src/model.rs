use chrono::NaiveDate;

/// One game of the tracked team, as reported by the game source.
#[derive(Debug, Clone, PartialEq)]
pub struct GameResult {
    pub game_id: i64,
    pub date: NaiveDate,
    pub is_home: bool,
    pub opponent: String,
    /// The tracked team's score. Absent for games the source has not scored yet.
    pub total_points: Option<i64>,
}

impl GameResult {
    pub fn home_away_label(&self) -> &'static str {
        if self.is_home { "Home" } else { "Away" }
    }
}

/// Box-score numbers for the tracked team in one game.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameStats {
    pub game_id: i64,
    pub rushing_attempts: Option<i64>,
    pub pass_attempts: Option<i64>,
    pub completed: Option<i64>,
    pub attempted: Option<i64>,
    pub rushing_yards: Option<i64>,
    pub passing_yards: Option<i64>,
}

impl GameStats {
    pub fn completion_percentage(&self) -> Option<f64> {
        let (Some(completed), Some(attempted)) = (self.completed, self.attempted) else {
            return None;
        };
        Some(completion_percentage(completed, attempted))
    }

    /// Share of offensive plays that were passes and runs, in percent.
    pub fn play_mix(&self) -> Option<PlayMix> {
        let (Some(passes), Some(rushes)) = (self.pass_attempts, self.rushing_attempts) else {
            return None;
        };
        let total = passes.checked_add(rushes)?;
        if passes == 0 || total <= 0 {
            return Some(PlayMix::default());
        }
        Some(PlayMix {
            pass_pct: passes as f64 / total as f64 * 100.0,
            rush_pct: rushes as f64 / total as f64 * 100.0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayMix {
    pub pass_pct: f64,
    pub rush_pct: f64,
}

/// Daily weather at one venue. Unique per (date, location).
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    pub date: NaiveDate,
    pub location: String,
    pub max_temperature: Option<f64>,
    pub min_temperature: Option<f64>,
    pub mean_temperature: Option<f64>,
    pub precipitation_sum: Option<f64>,
    pub rain_sum: Option<f64>,
    pub snowfall_sum: Option<f64>,
    pub max_wind_speed: Option<f64>,
    pub max_wind_gust: Option<f64>,
}

impl WeatherObservation {
    pub fn empty(date: NaiveDate, location: impl Into<String>) -> Self {
        Self {
            date,
            location: location.into(),
            max_temperature: None,
            min_temperature: None,
            mean_temperature: None,
            precipitation_sum: None,
            rain_sum: None,
            snowfall_sum: None,
            max_wind_speed: None,
            max_wind_gust: None,
        }
    }
}

/// A game joined with its stats and weather. Only ever built in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRecord {
    pub result: GameResult,
    pub stats: Option<GameStats>,
    pub weather: Option<WeatherObservation>,
}

impl DerivedRecord {
    pub fn game_id(&self) -> i64 {
        self.result.game_id
    }

    pub fn total_points(&self) -> Option<i64> {
        self.result.total_points
    }

    pub fn max_wind_speed(&self) -> Option<f64> {
        self.weather
            .as_ref()
            .and_then(|w| w.max_wind_speed)
            .filter(|v| v.is_finite())
    }

    pub fn mean_temperature(&self) -> Option<f64> {
        self.weather
            .as_ref()
            .and_then(|w| w.mean_temperature)
            .filter(|v| v.is_finite())
    }

    pub fn completion_percentage(&self) -> Option<f64> {
        self.stats.as_ref().and_then(GameStats::completion_percentage)
    }

    pub fn play_mix(&self) -> Option<PlayMix> {
        self.stats.as_ref().and_then(GameStats::play_mix)
    }
}

/// `100 * completed / attempted`, or 0 when nothing was attempted.
pub fn completion_percentage(completed: i64, attempted: i64) -> f64 {
    if attempted <= 0 {
        return 0.0;
    }
    completed as f64 / attempted as f64 * 100.0
}
