//! Form body for the availability grid endpoint.

use url::form_urlencoded;

use crate::libcal::dates::DateRange;
use crate::libcal::types::RoomIds;

/// Encode the grid request body.
///
/// Field order matches what the LibCal booking page sends.
pub fn grid_form(ids: &RoomIds, dates: &DateRange, page_size: u32) -> String {
    let start = dates.start.format("%Y-%m-%d").to_string();
    let end = dates.end.format("%Y-%m-%d").to_string();
    let page_size = page_size.to_string();

    form_urlencoded::Serializer::new(String::new())
        .append_pair("lid", &ids.lid)
        .append_pair("gid", &ids.gid)
        .append_pair("eid", &ids.eid)
        .append_pair("seat", "0")
        .append_pair("seatId", "0")
        .append_pair("zone", "0")
        .append_pair("start", &start)
        .append_pair("end", &end)
        .append_pair("pageIndex", "0")
        .append_pair("pageSize", &page_size)
        .finish()
}
