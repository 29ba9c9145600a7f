// Career tools: job recommendations, learning plans, resume analysis.
// Single-shot backend calls with client-side validation and a per-user
// in-flight guard. All backend calls go through backend_client.

pub mod handlers;
pub mod jobs;
pub mod learning;
pub mod resume;

use serde_json::Value;

/// Removes the envelope's `status` marker, leaving the domain payload.
pub fn strip_envelope(mut value: Value) -> Value {
    if let Some(object) = value.as_object_mut() {
        object.remove("status");
    }
    value
}
