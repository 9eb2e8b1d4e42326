use serde::{Deserialize, Serialize};

/// Options handed to the store when a mirror namespace is registered
///
/// The mirror never interprets these; they exist for the host's display layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MirrorOptions {
    pub label: Option<String>,
    /// Record kinds that may be classified under the mirror's nodes
    #[serde(default)]
    pub consumer_kinds: Vec<String>,
    #[serde(default)]
    pub public: bool,
}

/// Which record kinds mirror into which namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDefinition {
    pub source_kinds: Vec<String>,
    pub mirror_kind: String,
    pub consumer_kinds: Vec<String>,
}

impl RelationshipDefinition {
    pub fn mirrors(&self, record_kind: &str) -> bool {
        self.source_kinds.iter().any(|k| k == record_kind)
    }

    /// Fold a later registration for the same namespace into this one
    pub(crate) fn absorb(&mut self, source_kinds: &[String], consumer_kinds: &[String]) {
        for kind in source_kinds {
            if !self.source_kinds.contains(kind) {
                self.source_kinds.push(kind.clone());
            }
        }
        for kind in consumer_kinds {
            if !self.consumer_kinds.contains(kind) {
                self.consumer_kinds.push(kind.clone());
            }
        }
    }
}
