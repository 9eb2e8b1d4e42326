use serde::{Deserialize, Serialize};

use super::metadata::Metadata;

/// Identifier of a node, unique across namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A classification term mirroring one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub mirror_kind: String,
    pub name: String,
    /// Always set; the store derives one from the name when none is given
    pub slug: String,
    pub metadata: Metadata,
}

impl Node {
    pub fn new(
        id: u64,
        mirror_kind: impl Into<String>,
        name: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        Self {
            id: NodeId(id),
            mirror_kind: mirror_kind.into(),
            name: name.into(),
            slug: slug.into(),
            metadata: Metadata::new(),
        }
    }
}
