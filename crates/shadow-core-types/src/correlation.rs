//! Correlation types for request tracking and tracing
//!
//! A reconciliation pass or a single CLI invocation carries one
//! `RequestContext`; every log line emitted inside it can be joined on the
//! request id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! correlation_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Generate a new time-ordered id (UUIDv7)
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Wrap an id received from elsewhere (e.g. an env var or a header)
            pub fn from_string(s: String) -> Self {
                Self(s)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

correlation_id!(
    /// Unique identifier for one triggering unit of work (event, pass, invocation)
    RequestId
);

correlation_id!(
    /// Identifier shared by every request spawned from one outer operation
    TraceId
);

/// Context carried through operation boundaries for correlation
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
}

impl RequestContext {
    /// Create a new context with a fresh RequestId
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            trace_id: None,
        }
    }

    /// Derive a child context: fresh request id, same trace
    ///
    /// When the parent has no trace yet its request id becomes the trace.
    pub fn child(&self) -> Self {
        let trace_id = self
            .trace_id
            .clone()
            .unwrap_or_else(|| TraceId::from_string(self.request_id.as_str().to_string()));
        Self {
            request_id: RequestId::new(),
            trace_id: Some(trace_id),
        }
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_generation() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_display_matches_as_str() {
        let id = TraceId::new();
        assert_eq!(format!("{}", id), id.as_str());
    }

    #[test]
    fn test_child_context_inherits_trace() {
        let root = RequestContext::new();
        let child = root.child();

        assert_ne!(child.request_id, root.request_id);
        assert_eq!(
            child.trace_id.as_ref().map(|t| t.as_str()),
            Some(root.request_id.as_str())
        );

        let grandchild = child.child();
        assert_eq!(grandchild.trace_id, child.trace_id);
    }

    #[test]
    fn test_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
