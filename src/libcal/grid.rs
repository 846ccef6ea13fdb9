//! Loose inspection of the grid reply.
//!
//! The reply format belongs to LibCal. We only look for the slot list so
//! diagnostics can say how many slots came back.

use serde_json::Value;

/// Number of slots in a grid reply.
///
/// Accepts a bare array, an object with a `slots` array, or an object whose
/// first array-valued field holds the slots.
pub fn slot_count(body: &Value) -> Option<usize> {
    match body {
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => map
            .get("slots")
            .and_then(Value::as_array)
            .or_else(|| map.values().find_map(Value::as_array))
            .map(Vec::len),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sniffs_common_shapes() {
        assert_eq!(slot_count(&json!([1, 2, 3])), Some(3));
        assert_eq!(slot_count(&json!({"slots": [{}, {}], "bookings": [{}]})), Some(2));
        assert_eq!(slot_count(&json!({"isPreCreatedBooking": false, "items": [{}]})), Some(1));
        assert_eq!(slot_count(&json!({"error": "nope"})), None);
        assert_eq!(slot_count(&json!("text")), None);
    }
}
