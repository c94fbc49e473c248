//! Turns raw game-source and weather-source payloads into flat records.
//!
//! Nothing here fails loudly: absent fields become `None`, malformed
//! completion strings become zeros, and objects missing their identity are
//! dropped.

use chrono::NaiveDate;
use serde_json::Value;

use crate::model::{GameResult, GameStats, WeatherObservation};

const CAT_RUSHING_ATTEMPTS: &str = "rushingAttempts";
const CAT_COMPLETION_ATTEMPTS: &str = "completionAttempts";
const CAT_RUSHING_YARDS: &str = "rushingYards";
const CAT_PASSING_YARDS: &str = "netPassingYards";

pub fn parse_game_results(payload: &Value, team: &str) -> Vec<GameResult> {
    payload
        .as_array()
        .map(|games| {
            games
                .iter()
                .filter_map(|g| parse_game_result(g, team))
                .collect()
        })
        .unwrap_or_default()
}

pub fn parse_game_result(v: &Value, team: &str) -> Option<GameResult> {
    let game_id = as_i64_any(v.get("id")?)?;
    let date = field(v, "start_date", "startDate")
        .and_then(|d| d.as_str())
        .and_then(parse_calendar_date)?;

    let home_team = field(v, "home_team", "homeTeam")
        .and_then(|x| x.as_str())
        .unwrap_or_default();
    let away_team = field(v, "away_team", "awayTeam")
        .and_then(|x| x.as_str())
        .unwrap_or_default();
    let home_points = field(v, "home_points", "homePoints").and_then(as_i64_any);
    let away_points = field(v, "away_points", "awayPoints").and_then(as_i64_any);

    let is_home = home_team == team;
    let (opponent, total_points) = if is_home {
        (away_team, home_points)
    } else {
        (home_team, away_points)
    };

    Some(GameResult {
        game_id,
        date,
        is_home,
        opponent: opponent.to_string(),
        total_points,
    })
}

pub fn parse_team_stats(payload: &Value, team: &str) -> Vec<GameStats> {
    payload
        .as_array()
        .map(|games| {
            games
                .iter()
                .filter_map(|g| parse_game_stats(g, team))
                .collect()
        })
        .unwrap_or_default()
}

/// Box score for `team` in one game. None when the game has no block for that
/// school (forfeits, partial feeds).
pub fn parse_game_stats(v: &Value, team: &str) -> Option<GameStats> {
    let game_id = as_i64_any(v.get("id")?)?;
    let block = v
        .get("teams")?
        .as_array()?
        .iter()
        .find(|t| t.get("school").and_then(|s| s.as_str()) == Some(team))?;
    let stats = block
        .get("stats")
        .and_then(|s| s.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();

    let (completed, attempted) = match stat_value(stats, CAT_COMPLETION_ATTEMPTS) {
        Some(raw) => {
            let (c, a) = parse_completion_attempts(&value_text(raw));
            (Some(c), Some(a))
        }
        None => (None, None),
    };

    Some(GameStats {
        game_id,
        rushing_attempts: stat_value(stats, CAT_RUSHING_ATTEMPTS).and_then(as_i64_any),
        pass_attempts: attempted,
        completed,
        attempted,
        rushing_yards: stat_value(stats, CAT_RUSHING_YARDS).and_then(as_i64_any),
        passing_yards: stat_value(stats, CAT_PASSING_YARDS).and_then(as_i64_any),
    })
}

/// Splits a `"completed-attempted"` string. Anything that is not exactly two
/// non-negative integers with `completed <= attempted` yields `(0, 0)`.
pub fn parse_completion_attempts(raw: &str) -> (i64, i64) {
    let parts: Vec<&str> = raw.trim().split('-').collect();
    let [completed, attempted] = parts.as_slice() else {
        return (0, 0);
    };
    match (
        completed.trim().parse::<u32>(),
        attempted.trim().parse::<u32>(),
    ) {
        (Ok(c), Ok(a)) if c <= a => (i64::from(c), i64::from(a)),
        _ => (0, 0),
    }
}

/// Reads Open-Meteo's parallel `daily` arrays. Entries missing from a shorter
/// array come back as None.
pub fn parse_weather_daily(payload: &Value, location: &str) -> Vec<WeatherObservation> {
    let Some(daily) = payload.get("daily") else {
        return Vec::new();
    };
    let Some(times) = daily.get("time").and_then(|t| t.as_array()) else {
        return Vec::new();
    };

    let series = |key: &str| -> Vec<Option<f64>> {
        daily
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().map(|x| x.as_f64()).collect())
            .unwrap_or_default()
    };
    let max_temp = series("temperature_2m_max");
    let min_temp = series("temperature_2m_min");
    let mean_temp = series("temperature_2m_mean");
    let precipitation = series("precipitation_sum");
    let rain = series("rain_sum");
    let snowfall = series("snowfall_sum");
    let wind = series("wind_speed_10m_max");
    let gust = series("wind_gusts_10m_max");
    let at = |s: &[Option<f64>], i: usize| s.get(i).copied().flatten();

    let mut out = Vec::with_capacity(times.len());
    for (i, t) in times.iter().enumerate() {
        let Some(date) = t.as_str().and_then(parse_calendar_date) else {
            continue;
        };
        out.push(WeatherObservation {
            date,
            location: location.to_string(),
            max_temperature: at(&max_temp, i),
            min_temperature: at(&min_temp, i),
            mean_temperature: at(&mean_temp, i),
            precipitation_sum: at(&precipitation, i),
            rain_sum: at(&rain, i),
            snowfall_sum: at(&snowfall, i),
            max_wind_speed: at(&wind, i),
            max_wind_gust: at(&gust, i),
        });
    }
    out
}

/// Calendar part of an ISO timestamp such as `2023-11-25T17:00:00.000Z`.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split('T').next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

// The v1 API answers in snake_case, v2 in camelCase.
fn field<'a>(v: &'a Value, snake: &str, camel: &str) -> Option<&'a Value> {
    v.get(snake)
        .filter(|x| !x.is_null())
        .or_else(|| v.get(camel).filter(|x| !x.is_null()))
}

fn stat_value<'a>(stats: &'a [Value], category: &str) -> Option<&'a Value> {
    stats
        .iter()
        .find(|s| s.get("category").and_then(|c| c.as_str()) == Some(category))
        .and_then(|s| s.get("stat"))
        .filter(|s| !s.is_null())
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_i64_any(v: &Value) -> Option<i64> {
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<i64>().ok()
}
