//! Bucketed averages over stored games.
//!
//! Each pass classifies a record into exactly one tier of a fixed, ordered set
//! and averages one or two values per tier. Records whose classification metric
//! or averaged value is unknown sit in no tier. Empty tiers average to 0.

use chrono::NaiveDate;

use crate::model::DerivedRecord;

pub trait Tier: Copy + Eq + 'static {
    const ALL: &'static [Self];
    fn label(self) -> &'static str;
}

/// Max daily wind speed, mph. 20 mph belongs to `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindTier {
    Low,
    Moderate,
    High,
}

impl WindTier {
    pub fn classify(mph: f64) -> Self {
        if mph < 10.0 {
            WindTier::Low
        } else if mph < 20.0 {
            WindTier::Moderate
        } else {
            WindTier::High
        }
    }
}

impl Tier for WindTier {
    const ALL: &'static [Self] = &[WindTier::Low, WindTier::Moderate, WindTier::High];

    fn label(self) -> &'static str {
        match self {
            WindTier::Low => "Low",
            WindTier::Moderate => "Moderate",
            WindTier::High => "High",
        }
    }
}

/// Mean daily temperature, °F. Both 32 and 50 belong to `Moderate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemperatureTier {
    Cold,
    Moderate,
    Warm,
}

impl TemperatureTier {
    pub fn classify(fahrenheit: f64) -> Self {
        if fahrenheit < 32.0 {
            TemperatureTier::Cold
        } else if fahrenheit <= 50.0 {
            TemperatureTier::Moderate
        } else {
            TemperatureTier::Warm
        }
    }
}

impl Tier for TemperatureTier {
    const ALL: &'static [Self] = &[
        TemperatureTier::Cold,
        TemperatureTier::Moderate,
        TemperatureTier::Warm,
    ];

    fn label(self) -> &'static str {
        match self {
            TemperatureTier::Cold => "Cold",
            TemperatureTier::Moderate => "Moderate",
            TemperatureTier::Warm => "Warm",
        }
    }
}

/// Completion percentage. Upper bounds are inclusive, so 50.0 is `UpTo50`
/// and 50.5 is `From51To60`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionTier {
    UpTo50,
    From51To60,
    From61To70,
    From71To100,
}

impl CompletionTier {
    pub fn classify(pct: f64) -> Self {
        if pct <= 50.0 {
            CompletionTier::UpTo50
        } else if pct <= 60.0 {
            CompletionTier::From51To60
        } else if pct <= 70.0 {
            CompletionTier::From61To70
        } else {
            CompletionTier::From71To100
        }
    }
}

impl Tier for CompletionTier {
    const ALL: &'static [Self] = &[
        CompletionTier::UpTo50,
        CompletionTier::From51To60,
        CompletionTier::From61To70,
        CompletionTier::From71To100,
    ];

    fn label(self) -> &'static str {
        match self {
            CompletionTier::UpTo50 => "0-50",
            CompletionTier::From51To60 => "51-60",
            CompletionTier::From61To70 => "61-70",
            CompletionTier::From71To100 => "71-100",
        }
    }
}

/// Per-tier count and means, in tier order.
#[derive(Debug, Clone, PartialEq)]
pub struct TierRow<T> {
    pub tier: T,
    pub games: usize,
    pub means: Vec<f64>,
}

impl<T> TierRow<T> {
    pub fn mean(&self, idx: usize) -> f64 {
        self.means.get(idx).copied().unwrap_or(0.0)
    }
}

/// Running sums for `N` values per tier.
#[derive(Debug, Clone)]
pub struct Buckets<T: Tier, const N: usize> {
    slots: Vec<(T, usize, [f64; N])>,
}

impl<T: Tier, const N: usize> Default for Buckets<T, N> {
    fn default() -> Self {
        Self {
            slots: T::ALL.iter().map(|t| (*t, 0, [0.0; N])).collect(),
        }
    }
}

impl<T: Tier, const N: usize> Buckets<T, N> {
    pub fn add(&mut self, tier: T, values: [f64; N]) {
        let Some(slot) = self.slots.iter_mut().find(|(t, _, _)| *t == tier) else {
            return;
        };
        slot.1 += 1;
        for (sum, v) in slot.2.iter_mut().zip(values) {
            *sum += v;
        }
    }

    pub fn rows(&self) -> Vec<TierRow<T>> {
        self.slots
            .iter()
            .map(|(tier, count, sums)| TierRow {
                tier: *tier,
                games: *count,
                means: sums
                    .iter()
                    .map(|s| if *count == 0 { 0.0 } else { s / *count as f64 })
                    .collect(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayMixByWind {
    /// Means are `[pass %, rush %]`.
    pub rows: Vec<TierRow<WindTier>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureGame {
    pub date: NaiveDate,
    pub game_id: i64,
    pub home_away: &'static str,
    pub total_points: i64,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointsByTemperature {
    pub rows: Vec<TierRow<TemperatureTier>>,
    pub games: Vec<(TemperatureTier, TemperatureGame)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindCompletionGame {
    pub date: NaiveDate,
    pub home_away: &'static str,
    pub opponent: String,
    pub completion_pct: f64,
    pub wind_mph: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionByWind {
    pub rows: Vec<TierRow<WindTier>>,
    pub games: Vec<(WindTier, WindCompletionGame)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointsByCompletion {
    pub rows: Vec<TierRow<CompletionTier>>,
}

pub fn play_mix_by_wind(records: &[DerivedRecord]) -> PlayMixByWind {
    let mut buckets = Buckets::<WindTier, 2>::default();
    for r in records {
        let (Some(wind), Some(mix)) = (r.max_wind_speed(), r.play_mix()) else {
            continue;
        };
        buckets.add(WindTier::classify(wind), [mix.pass_pct, mix.rush_pct]);
    }
    PlayMixByWind {
        rows: buckets.rows(),
    }
}

pub fn points_by_temperature(records: &[DerivedRecord]) -> PointsByTemperature {
    let mut buckets = Buckets::<TemperatureTier, 1>::default();
    let mut games = Vec::new();
    for r in records {
        let (Some(temp), Some(points)) = (r.mean_temperature(), r.total_points()) else {
            continue;
        };
        let tier = TemperatureTier::classify(temp);
        buckets.add(tier, [points as f64]);
        games.push((
            tier,
            TemperatureGame {
                date: r.result.date,
                game_id: r.game_id(),
                home_away: r.result.home_away_label(),
                total_points: points,
                temperature: temp,
            },
        ));
    }
    PointsByTemperature {
        rows: buckets.rows(),
        games,
    }
}

pub fn completion_by_wind(records: &[DerivedRecord]) -> CompletionByWind {
    let mut buckets = Buckets::<WindTier, 1>::default();
    let mut games = Vec::new();
    for r in records {
        let (Some(wind), Some(pct)) = (r.max_wind_speed(), r.completion_percentage()) else {
            continue;
        };
        let tier = WindTier::classify(wind);
        buckets.add(tier, [pct]);
        games.push((
            tier,
            WindCompletionGame {
                date: r.result.date,
                home_away: r.result.home_away_label(),
                opponent: r.result.opponent.clone(),
                completion_pct: pct,
                wind_mph: wind,
            },
        ));
    }
    CompletionByWind {
        rows: buckets.rows(),
        games,
    }
}

pub fn points_by_completion(records: &[DerivedRecord]) -> PointsByCompletion {
    let mut buckets = Buckets::<CompletionTier, 1>::default();
    for r in records {
        let (Some(pct), Some(points)) = (r.completion_percentage(), r.total_points()) else {
            continue;
        };
        buckets.add(CompletionTier::classify(pct), [points as f64]);
    }
    PointsByCompletion {
        rows: buckets.rows(),
    }
}
