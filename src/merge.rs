use crate::model::{DerivedRecord, GameResult, GameStats, WeatherObservation};
use crate::venues::VenueTable;

/// Joins game results with their stats (by game id) and weather (by date and
/// resolved venue). First match wins; misses leave the field empty.
pub fn merge_records(
    results: &[GameResult],
    stats: &[GameStats],
    weather: &[WeatherObservation],
    venues: &VenueTable,
) -> Vec<DerivedRecord> {
    results
        .iter()
        .map(|result| DerivedRecord {
            result: result.clone(),
            stats: stats.iter().find(|s| s.game_id == result.game_id).cloned(),
            weather: weather_for(result, weather, venues).cloned(),
        })
        .collect()
}

pub fn weather_for<'a>(
    result: &GameResult,
    weather: &'a [WeatherObservation],
    venues: &VenueTable,
) -> Option<&'a WeatherObservation> {
    let location = venues.resolve(result)?.location_key();
    weather
        .iter()
        .find(|w| w.date == result.date && w.location == location)
}
