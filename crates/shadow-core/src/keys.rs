//! Cross-reference metadata key names
//!
//! Every component derives pointer keys through [`build_meta_key`] so the
//! handler, the reconciliation engine and the stores never disagree on a name.

/// Which side of the edge a pointer lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerType {
    /// Stored on the record, points at its node
    TermId,
    /// Stored on the node, points at its record
    PostId,
}

impl PointerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointerType::TermId => "term_id",
            PointerType::PostId => "post_id",
        }
    }
}

/// Reduce a name to lowercase `[a-z0-9_-]`
pub fn sanitize_key(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| {
            let c = c.to_ascii_lowercase();
            (c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-').then_some(c)
        })
        .collect()
}

/// `shadow_{mirror_kind}_{term_id|post_id}`
pub fn build_meta_key(mirror_kind: &str, pointer: PointerType) -> String {
    format!("shadow_{}_{}", sanitize_key(mirror_kind), pointer.as_str())
}

/// Both pointer keys of one mirror namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaKeys {
    /// Key on the record holding the node id
    pub node_pointer: String,
    /// Key on the node holding the record id
    pub record_pointer: String,
}

impl MetaKeys {
    pub fn for_mirror(mirror_kind: &str) -> Self {
        Self {
            node_pointer: build_meta_key(mirror_kind, PointerType::TermId),
            record_pointer: build_meta_key(mirror_kind, PointerType::PostId),
        }
    }
}
