//! Room catalog endpoints.

use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::catalog::{Room, RoomFilter, RoomStats};
use crate::http::availability::relay;
use crate::http::request::RequestIdExt;
use crate::http::response::error_response;
use crate::http::server::AppState;
use crate::libcal::RoomQuery;

#[derive(Serialize)]
struct RoomListing<'a> {
    rooms: Vec<&'a Room>,
    stats: RoomStats,
}

/// `GET /api/rooms?building=&capacity=&availability=&features=`
pub async fn list_rooms(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let filter = RoomFilter::from_query(query.as_deref());
    let runtime = state.runtime();
    let rooms: Vec<&Room> = runtime.catalog.filter(&filter).collect();
    let stats = RoomStats::compute(rooms.iter().copied());

    tracing::debug!(?filter, matched = rooms.len(), total = runtime.catalog.len(), "Rooms listed");
    Json(RoomListing { rooms, stats }).into_response()
}

/// `GET /api/rooms/{id}`
pub async fn get_room(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let runtime = state.runtime();
    match runtime.catalog.get(&id) {
        Some(room) => Json(room).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Room not found"),
    }
}

/// `GET /api/rooms/{id}/availability`
///
/// Queries LibCal with the room's own `payload` and uses its `link` as referer.
pub async fn room_availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let runtime = state.runtime();
    let Some(room) = runtime.catalog.get(&id) else {
        return error_response(StatusCode::NOT_FOUND, "Room not found");
    };

    let ids = room.room_ids().unwrap_or_else(|| {
        tracing::warn!(room = %room.id, "Room has no usable payload, using default room");
        runtime.default_room.clone()
    });
    let query = RoomQuery {
        ids,
        referer: room.link.clone().filter(|l| !l.is_empty()),
    };

    relay(&runtime, state.clock(), query, headers.request_id())
        .await
        .into_response()
}
