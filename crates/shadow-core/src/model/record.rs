use serde::{Deserialize, Serialize};

use super::metadata::Metadata;

/// Identifier of a record in the primary collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Publication status of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RecordStatus {
    /// Placeholder created by an editor before the first real save
    AutoDraft,
    #[default]
    Draft,
    Pending,
    Private,
    Publish,
}

impl RecordStatus {
    /// Placeholders never get a mirror node
    pub fn is_placeholder(&self) -> bool {
        matches!(self, RecordStatus::AutoDraft)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::AutoDraft => "auto-draft",
            RecordStatus::Draft => "draft",
            RecordStatus::Pending => "pending",
            RecordStatus::Private => "private",
            RecordStatus::Publish => "publish",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto-draft" => Some(RecordStatus::AutoDraft),
            "draft" => Some(RecordStatus::Draft),
            "pending" => Some(RecordStatus::Pending),
            "private" => Some(RecordStatus::Private),
            "publish" => Some(RecordStatus::Publish),
            _ => None,
        }
    }
}

/// An item in the primary collection
///
/// Owned by the store. The mirror reads `kind`, `title`, `slug` and `status`
/// and only ever writes its node-pointer metadata entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub kind: String,
    pub title: String,
    /// `None` until the host assigns one (drafts)
    pub slug: Option<String>,
    pub status: RecordStatus,
    pub metadata: Metadata,
}

impl Record {
    pub fn new(id: u64, kind: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: RecordId(id),
            kind: kind.into(),
            title: title.into(),
            slug: None,
            status: RecordStatus::default(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        self.slug = (!slug.is_empty()).then_some(slug);
        self
    }

    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }
}
