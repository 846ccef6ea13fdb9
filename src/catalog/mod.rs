//! Read-only room catalog loaded from `rooms.json`.
//!
//! The file is either a bare array of rooms or an object with a `rooms`
//! array. It is read once per runtime build and never written.

pub mod filter;
pub mod room;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub use filter::{Availability, RoomFilter, RoomStats};
pub use room::{Room, RoomLocation};

/// Errors raised while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read room catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid room catalog {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Bare(Vec<Room>),
    Wrapped { rooms: Vec<Room> },
}

/// All rooms, in file order.
#[derive(Debug, Clone, Default)]
pub struct RoomCatalog {
    rooms: Vec<Room>,
}

impl RoomCatalog {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self { rooms }
    }

    /// Load from `path`, or an empty catalog when no path is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let bytes = std::fs::read(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&bytes).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(path = ?path, rooms = catalog.len(), "Room catalog loaded");
        Ok(catalog)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let rooms = match serde_json::from_slice(bytes)? {
            CatalogDocument::Bare(rooms) | CatalogDocument::Wrapped { rooms } => rooms,
        };
        Ok(Self { rooms })
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Look a room up by id, compared as a string.
    pub fn get(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn filter<'a>(&'a self, filter: &'a RoomFilter) -> impl Iterator<Item = &'a Room> + 'a {
        self.rooms.iter().filter(move |r| filter.matches(r))
    }
}
