pub mod metadata;
pub mod node;
pub mod record;
pub mod relationship;

pub use metadata::Metadata;
pub use node::{Node, NodeId};
pub use record::{Record, RecordId, RecordStatus};
pub use relationship::{MirrorOptions, RelationshipDefinition};
