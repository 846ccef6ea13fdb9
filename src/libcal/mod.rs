//! LibCal availability subsystem.
//!
//! # Data Flow
//! ```text
//! caller params (JSON body / query string)
//!     → types.rs (resolve lid/gid/eid + referer against defaults)
//!     → dates.rs (today / tomorrow in the configured zone)
//!     → form.rs (x-www-form-urlencoded grid body)
//!     → client.rs (POST with browser headers, buffer reply)
//!     → decode.rs (br / gzip / deflate)
//!     → serde_json::Value
//!     → grid.rs (slot count for diagnostics)
//! ```

pub mod client;
pub mod dates;
pub mod decode;
pub mod form;
pub mod grid;
pub mod types;

pub use client::{GridReply, LibcalClient};
pub use dates::{Clock, DateRange, FixedClock, SystemClock};
pub use decode::ContentEncoding;
pub use types::{AvailabilityParams, LibcalError, RoomIds, RoomQuery};
