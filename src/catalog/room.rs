//! Room records as stored in `rooms.json`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::libcal::types::scalar_param;
use crate::libcal::RoomIds;

/// Where a room sits inside its building.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomLocation {
    #[serde(deserialize_with = "optional_scalar")]
    pub floor: Option<String>,
    #[serde(deserialize_with = "optional_scalar")]
    pub room_number: Option<String>,
}

/// One bookable room.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// String or number in the source file; always compared as a string.
    #[serde(deserialize_with = "scalar_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub location: Option<RoomLocation>,
    #[serde(default)]
    pub seats: u32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// The room's LibCal page; used as `Referer` for its availability.
    #[serde(default)]
    pub link: Option<String>,
    /// `[lid, gid, eid]`.
    #[serde(default)]
    pub payload: Option<Vec<Value>>,
}

impl Room {
    /// A room counts as open when it has seats and a building.
    pub fn is_open(&self) -> bool {
        self.seats > 0 && !self.building.is_empty()
    }

    pub fn has_features<S: AsRef<str>>(&self, wanted: &[S]) -> bool {
        wanted
            .iter()
            .all(|w| self.features.iter().any(|f| f == w.as_ref()))
    }

    /// The LibCal key from `payload`, if it is well formed.
    pub fn room_ids(&self) -> Option<RoomIds> {
        self.payload.as_deref().and_then(RoomIds::from_payload)
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    scalar_param(&value).ok_or_else(|| serde::de::Error::custom("expected a string or number"))
}

fn optional_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_param(&value))
}
