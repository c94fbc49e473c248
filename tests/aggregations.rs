use std::collections::HashSet;

use chrono::NaiveDate;

use gridiron_weather::aggregate::{
    CompletionTier, TemperatureTier, Tier, WindTier, completion_by_wind, play_mix_by_wind,
    points_by_completion, points_by_temperature,
};
use gridiron_weather::model::{DerivedRecord, GameResult, GameStats, WeatherObservation};

fn record(
    id: i64,
    points: Option<i64>,
    completion: Option<(i64, i64)>,
    rushes: Option<i64>,
    wind: Option<f64>,
    temp: Option<f64>,
) -> DerivedRecord {
    let date = NaiveDate::from_ymd_opt(2022, 9, 3).unwrap() + chrono::Duration::days(id * 7);
    let stats = completion.map(|(completed, attempted)| GameStats {
        game_id: id,
        rushing_attempts: rushes,
        pass_attempts: Some(attempted),
        completed: Some(completed),
        attempted: Some(attempted),
        ..GameStats::default()
    });
    let weather = (wind.is_some() || temp.is_some()).then(|| {
        let mut obs = WeatherObservation::empty(date, "42.2808,-83.7430");
        obs.max_wind_speed = wind;
        obs.mean_temperature = temp;
        obs
    });
    DerivedRecord {
        result: GameResult {
            game_id: id,
            date,
            is_home: id % 2 == 0,
            opponent: "Iowa".to_string(),
            total_points: points,
        },
        stats,
        weather,
    }
}

fn sample() -> Vec<DerivedRecord> {
    vec![
        record(1, Some(30), Some((18, 29)), Some(39), Some(14.0), Some(31.5)),
        record(2, Some(45), Some((10, 20)), Some(35), Some(5.0), Some(72.0)),
        record(3, Some(10), Some((15, 20)), Some(40), Some(25.0), Some(40.0)),
        record(4, Some(24), Some((0, 0)), Some(50), Some(20.0), Some(50.0)),
        // no weather at all
        record(5, Some(17), Some((12, 16)), Some(30), None, None),
        // no stats
        record(6, Some(21), None, None, Some(8.0), Some(28.0)),
        // unscored
        record(7, None, Some((20, 30)), Some(30), Some(12.0), Some(60.0)),
        // wind only, no temperature
        record(8, Some(3), Some((9, 10)), Some(20), Some(11.0), None),
    ]
}

#[test]
fn every_tier_is_reported_in_order() {
    let records = sample();
    let wind: Vec<&str> = play_mix_by_wind(&records)
        .rows
        .iter()
        .map(|r| r.tier.label())
        .collect();
    assert_eq!(wind, vec!["Low", "Moderate", "High"]);

    let temp: Vec<TemperatureTier> = points_by_temperature(&records)
        .rows
        .iter()
        .map(|r| r.tier)
        .collect();
    assert_eq!(temp, TemperatureTier::ALL);

    let completion: Vec<&str> = points_by_completion(&records)
        .rows
        .iter()
        .map(|r| r.tier.label())
        .collect();
    assert_eq!(completion, vec!["0-50", "51-60", "61-70", "71-100"]);
}

#[test]
fn records_with_unknown_inputs_are_left_out() {
    let records = sample();

    // Needs wind + stats: 1, 2, 3, 4, 7, 8.
    let mix = play_mix_by_wind(&records);
    assert_eq!(mix.rows.iter().map(|r| r.games).sum::<usize>(), 6);

    // Needs temperature + points: 1, 2, 3, 4, 6.
    let temp = points_by_temperature(&records);
    assert_eq!(temp.rows.iter().map(|r| r.games).sum::<usize>(), 5);
    assert_eq!(temp.games.len(), 5);

    // Needs wind + completion: 1, 2, 3, 4, 7, 8.
    let by_wind = completion_by_wind(&records);
    assert_eq!(by_wind.rows.iter().map(|r| r.games).sum::<usize>(), 6);

    // Needs completion + points: 1, 2, 3, 4, 5, 8.
    let by_completion = points_by_completion(&records);
    assert_eq!(by_completion.rows.iter().map(|r| r.games).sum::<usize>(), 6);
}

#[test]
fn each_record_lands_in_one_tier() {
    let records = sample();

    let by_wind = completion_by_wind(&records);
    for (tier, game) in &by_wind.games {
        assert_eq!(*tier, WindTier::classify(game.wind_mph));
    }
    let known_wind = records
        .iter()
        .filter(|r| r.max_wind_speed().is_some() && r.completion_percentage().is_some())
        .count();
    assert_eq!(by_wind.games.len(), known_wind);
    assert_eq!(
        by_wind.rows.iter().map(|r| r.games).sum::<usize>(),
        known_wind
    );

    let temp = points_by_temperature(&records);
    let ids: Vec<i64> = temp.games.iter().map(|(_, g)| g.game_id).collect();
    let unique: HashSet<i64> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len());
    let known_temp = records
        .iter()
        .filter(|r| r.mean_temperature().is_some() && r.total_points().is_some())
        .count();
    assert_eq!(temp.rows.iter().map(|r| r.games).sum::<usize>(), known_temp);
    for row in &temp.rows {
        let listed = temp.games.iter().filter(|(t, _)| *t == row.tier).count();
        assert_eq!(listed, row.games);
    }
}

#[test]
fn temperature_means_and_boundaries() {
    let temp = points_by_temperature(&sample());
    let cold = &temp.rows[0];
    assert_eq!(cold.tier, TemperatureTier::Cold);
    // 31.5°F (30 pts) and 28°F (21 pts).
    assert_eq!(cold.games, 2);
    assert!((cold.mean(0) - 25.5).abs() < 1e-9);

    let moderate = &temp.rows[1];
    // 40°F (10 pts) and exactly 50°F (24 pts).
    assert_eq!(moderate.games, 2);
    assert!((moderate.mean(0) - 17.0).abs() < 1e-9);

    let warm = &temp.rows[2];
    assert_eq!(warm.games, 1);
    assert_eq!(warm.mean(0), 45.0);
}

#[test]
fn zero_attempts_count_as_zero_percent() {
    let records = vec![record(
        4,
        Some(24),
        Some((0, 0)),
        Some(50),
        Some(20.0),
        Some(50.0),
    )];

    let by_completion = points_by_completion(&records);
    assert_eq!(by_completion.rows[0].tier, CompletionTier::UpTo50);
    assert_eq!(by_completion.rows[0].games, 1);
    assert_eq!(by_completion.rows[0].mean(0), 24.0);

    let mix = play_mix_by_wind(&records);
    let high = &mix.rows[2];
    assert_eq!(high.tier, WindTier::High);
    assert_eq!(high.games, 1);
    // No passes: both shares are reported as 0.
    assert_eq!(high.mean(0), 0.0);
    assert_eq!(high.mean(1), 0.0);
}

#[test]
fn no_records_gives_zero_everywhere() {
    let records: Vec<DerivedRecord> = Vec::new();
    for row in play_mix_by_wind(&records).rows {
        assert_eq!(row.games, 0);
        assert_eq!(row.means, vec![0.0, 0.0]);
    }
    for row in points_by_completion(&records).rows {
        assert_eq!(row.games, 0);
        assert_eq!(row.mean(0), 0.0);
    }
    assert!(completion_by_wind(&records).games.is_empty());
}
