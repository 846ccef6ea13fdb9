//! The availability proxy endpoint.

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
};

use crate::http::request::RequestIdExt;
use crate::http::response::{method_not_allowed, AvailabilityEnvelope, Diagnostics};
use crate::http::server::{AppState, Runtime};
use crate::libcal::dates::local_timestamp;
use crate::libcal::{grid, AvailabilityParams, Clock, DateRange, RoomQuery};

/// `GET|POST /api/post`.
///
/// GET reads `lid`, `gid`, `eid`, `referer`, `link` from the query string;
/// POST reads the same fields, or a positional `payload`, from a JSON body.
pub async fn availability(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let params = match method {
        Method::GET => AvailabilityParams::from_query(query.as_deref()),
        Method::POST => AvailabilityParams::from_body(&body),
        _ => {
            tracing::warn!(method = %method, "Rejected availability request");
            return method_not_allowed();
        }
    };

    let runtime = state.runtime();
    let room_query = params.resolve(&runtime.default_room);
    relay(&runtime, state.clock(), room_query, headers.request_id())
        .await
        .into_response()
}

/// Run one grid query and wrap the outcome.
pub(crate) async fn relay(
    runtime: &Runtime,
    clock: &dyn Clock,
    query: RoomQuery,
    request_id: &str,
) -> AvailabilityEnvelope {
    let now = clock.now();
    let dates = DateRange::today(now, runtime.timezone);
    let mut diagnostics = Diagnostics {
        request_id: request_id.to_string(),
        request_params: query.ids.clone(),
        dates,
        timestamp: local_timestamp(now, runtime.timezone),
        response_size: None,
        slot_count: None,
        content_encoding: None,
    };

    let Some(dates) = dates else {
        tracing::error!(%now, "Cannot compute availability date range");
        return AvailabilityEnvelope::failed("date out of range", diagnostics);
    };

    match runtime.libcal.fetch_grid(&query, &dates).await {
        Ok(reply) => {
            diagnostics.response_size = Some(reply.wire_size);
            diagnostics.slot_count = grid::slot_count(&reply.body);
            diagnostics.content_encoding = Some(reply.encoding.as_str());
            let slots = diagnostics.slot_count;
            tracing::info!(
                lid = %query.ids.lid,
                gid = %query.ids.gid,
                eid = %query.ids.eid,
                start = %dates.start,
                slots = ?slots,
                "Availability relayed"
            );
            AvailabilityEnvelope::ok(reply.body, diagnostics)
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                lid = %query.ids.lid,
                gid = %query.ids.gid,
                eid = %query.ids.eid,
                start = %dates.start,
                "External request failed"
            );
            AvailabilityEnvelope::failed(e.to_string(), diagnostics)
        }
    }
}
