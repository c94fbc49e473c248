use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::model::GameResult;

/// Michigan Stadium, Ann Arbor.
pub const DEFAULT_HOME: Coordinate = Coordinate::new(42.2808, -83.7430);

const DEFAULT_AWAY: &[(&str, f64, f64)] = &[
    ("Rutgers", 40.5018, -74.4479),
    ("Ohio State", 40.0061, -83.0283),
    ("Michigan State", 42.7251, -84.4791),
    ("Iowa", 41.6586, -91.5511),
    ("Florida", 29.6465, -82.3533),
    ("Purdue", 40.4237, -86.9212),
    ("Indiana", 39.1682, -86.5230),
    ("Penn State", 40.7982, -77.8599),
    ("Maryland", 38.9869, -76.9426),
    ("Wisconsin", 43.0753, -89.4081),
    ("Notre Dame", 41.7052, -86.2352),
    ("Northwestern", 42.0565, -87.6753),
    ("Illinois", 40.1020, -88.2272),
    ("Minnesota", 44.9740, -93.2277),
    ("Nebraska", 40.8202, -96.7005),
    ("Washington", 47.6567, -122.3066),
    ("Utah", 40.7649, -111.8421),
];

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Key used for the weather table's `location` column.
    pub fn location_key(&self) -> String {
        format!("{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// A venue file entry: `[lat, lon]` or `{"latitude": .., "longitude": ..}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum VenueEntry {
    Pair([f64; 2]),
    Named(Coordinate),
}

/// Where each game was played: one fixed home venue plus a lookup of away venues
/// by opponent name.
#[derive(Debug, Clone)]
pub struct VenueTable {
    home: Coordinate,
    away: HashMap<String, Coordinate>,
}

impl Default for VenueTable {
    fn default() -> Self {
        let away = DEFAULT_AWAY
            .iter()
            .map(|(name, lat, lon)| (name.to_string(), Coordinate::new(*lat, *lon)))
            .collect();
        Self {
            home: DEFAULT_HOME,
            away,
        }
    }
}

impl VenueTable {
    pub fn new(home: Coordinate, away: HashMap<String, Coordinate>) -> Self {
        Self { home, away }
    }

    /// Reads an away table from a JSON object keyed by opponent name.
    pub fn load(home: Coordinate, path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read venue table {}", path.display()))?;
        Self::from_json(home, &raw)
    }

    pub fn from_json(home: Coordinate, raw: &str) -> Result<Self> {
        let entries: HashMap<String, VenueEntry> =
            serde_json::from_str(raw).context("invalid venue table json")?;
        let mut away = HashMap::with_capacity(entries.len());
        for (name, entry) in entries {
            let (lat, lon) = match entry {
                VenueEntry::Pair([lat, lon]) => (lat, lon),
                VenueEntry::Named(c) => (c.latitude, c.longitude),
            };
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                return Err(anyhow!("venue {name} has out of range coordinate {lat},{lon}"));
            }
            away.insert(name, Coordinate::new(lat, lon));
        }
        Ok(Self::new(home, away))
    }

    pub fn with_home(mut self, home: Coordinate) -> Self {
        self.home = home;
        self
    }

    pub fn home(&self) -> Coordinate {
        self.home
    }

    pub fn away_len(&self) -> usize {
        self.away.len()
    }

    /// Venue of a game. None when an away opponent has no known coordinate.
    pub fn resolve(&self, game: &GameResult) -> Option<Coordinate> {
        if game.is_home {
            return Some(self.home);
        }
        self.away.get(&game.opponent).copied()
    }
}
