//! Room filters and summary statistics for the rooms listing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::room::Room;

/// Which rooms to keep based on [`Room::is_open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Unavailable,
}

/// Listing filters. Every unset field matches all rooms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomFilter {
    pub building: Option<String>,
    pub min_seats: Option<u32>,
    pub availability: Option<Availability>,
    pub features: Vec<String>,
}

impl RoomFilter {
    /// Build a filter from a query string such as
    /// `building=Olin%20Library&capacity=4&features=Whiteboard,Projector`.
    ///
    /// Empty or unparseable values are ignored rather than rejected.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut filter = Self::default();
        let Some(query) = query else {
            return filter;
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "building" => filter.building = Some(value.to_string()),
                "capacity" => filter.min_seats = value.parse().ok(),
                "availability" => {
                    filter.availability = match value {
                        "available" => Some(Availability::Available),
                        "unavailable" => Some(Availability::Unavailable),
                        _ => None,
                    }
                }
                "features" => filter.features.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(String::from),
                ),
                _ => {}
            }
        }
        filter
    }

    pub fn matches(&self, room: &Room) -> bool {
        if let Some(building) = &self.building {
            if &room.building != building {
                return false;
            }
        }
        if let Some(min) = self.min_seats {
            if room.seats < min {
                return false;
            }
        }
        match self.availability {
            Some(Availability::Available) if !room.is_open() => return false,
            Some(Availability::Unavailable) if room.is_open() => return false,
            _ => {}
        }
        room.has_features(&self.features)
    }
}

/// Totals shown above the rooms grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStats {
    /// Open rooms.
    pub available_rooms: usize,
    /// Distinct buildings among open rooms.
    pub library_count: usize,
    /// Seats across open rooms.
    pub total_seats: u64,
}

impl RoomStats {
    pub fn compute<'a>(rooms: impl IntoIterator<Item = &'a Room>) -> Self {
        let mut stats = Self::default();
        let mut buildings = BTreeSet::new();
        for room in rooms.into_iter().filter(|r| r.is_open()) {
            stats.available_rooms += 1;
            stats.total_seats += u64::from(room.seats);
            buildings.insert(room.building.as_str());
        }
        stats.library_count = buildings.len();
        stats
    }
}
