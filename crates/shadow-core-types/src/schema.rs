//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical across the handler, the
//! reconciliation engine and the stores.

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Entity identifiers
pub const FIELD_RECORD_ID: &str = "record_id";
pub const FIELD_NODE_ID: &str = "node_id";
pub const FIELD_RECORD_KIND: &str = "record_kind";
pub const FIELD_MIRROR_KIND: &str = "mirror_kind";

// Reconciliation
pub const FIELD_MODE: &str = "mode";
pub const FIELD_DRY_RUN: &str = "dry_run";
pub const FIELD_ACTION: &str = "action";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_MUTATION: &str = "mutation";
pub const EVENT_SKIPPED: &str = "skipped";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        let events = [
            EVENT_START,
            EVENT_END,
            EVENT_END_ERROR,
            EVENT_MUTATION,
            EVENT_SKIPPED,
        ];
        for (i, a) in events.iter().enumerate() {
            for b in &events[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
