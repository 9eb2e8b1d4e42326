use shadow_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using ShadowError
pub type Result<T> = std::result::Result<T, ShadowError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used by log events, the CLI's
/// error output and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation (fatal to the invocation)
    InvalidInput,
    UnknownKind,
    NotFound,

    // Mutation failures (non-fatal per item)
    DuplicateSlug,
    InvalidName,
    MutationRejected,

    // Integration/IO
    Io,
    Config,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::UnknownKind => "ERR_UNKNOWN_KIND",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::DuplicateSlug => "ERR_DUPLICATE_SLUG",
            ExErrorKind::InvalidName => "ERR_INVALID_NAME",
            ExErrorKind::MutationRejected => "ERR_MUTATION_REJECTED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification used by log events plus optional context about
/// the entity and the request the failure happened in.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    mirror_kind: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            mirror_kind: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_mirror_kind(mut self, mirror_kind: impl Into<String>) -> Self {
        self.mirror_kind = Some(mirror_kind.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn mirror_kind(&self) -> Option<&str> {
        self.mirror_kind.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(mirror_kind) = &self.mirror_kind {
            write!(f, " (mirror_kind: {})", mirror_kind)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for mirror synchronization
///
/// Absence is never an error here: reads return `Ok(None)`. Variants fall in
/// three groups, see [`ShadowError::is_validation`] and
/// [`ShadowError::is_mutation_failure`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShadowError {
    // ===== Validation =====
    /// Record kind was never registered with the store
    #[error("Unknown record kind: {kind}")]
    UnknownRecordKind { kind: String },

    /// Mirror namespace was never registered with the store
    #[error("Unknown mirror kind: {mirror_kind}")]
    UnknownMirrorKind { mirror_kind: String },

    /// A caller-supplied record id does not exist
    #[error("Record not found: {record_id}")]
    RecordNotFound { record_id: u64 },

    /// A caller-supplied node id does not exist in the namespace
    #[error("Node {node_id} not found in {mirror_kind}")]
    NodeNotFound { node_id: u64, mirror_kind: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    // ===== Mutation failures =====
    /// Another node in the namespace already owns the slug
    #[error("Slug '{slug}' already exists in {mirror_kind}")]
    DuplicateSlug { mirror_kind: String, slug: String },

    /// Node name rejected by store validation (e.g. empty)
    #[error("Invalid node name: {reason}")]
    InvalidNodeName { reason: String },

    #[error("Mutation rejected: {reason}")]
    MutationRejected { reason: String },

    // ===== Infrastructure =====
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ShadowError {
    /// Bad kind/namespace names or ids; aborts an invocation before mutating
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ShadowError::UnknownRecordKind { .. }
                | ShadowError::UnknownMirrorKind { .. }
                | ShadowError::RecordNotFound { .. }
                | ShadowError::NodeNotFound { .. }
                | ShadowError::InvalidInput { .. }
        )
    }

    /// Store rejected a create/update; the item is skipped and retried on the
    /// next reconciliation pass
    pub fn is_mutation_failure(&self) -> bool {
        matches!(
            self,
            ShadowError::DuplicateSlug { .. }
                | ShadowError::InvalidNodeName { .. }
                | ShadowError::MutationRejected { .. }
        )
    }
}

/// Conversion from ShadowError to ExError
impl From<ShadowError> for ExError {
    fn from(err: ShadowError) -> Self {
        let message = err.to_string();
        match err {
            ShadowError::UnknownRecordKind { .. } => {
                ExError::new(ExErrorKind::UnknownKind).with_message(message)
            }
            ShadowError::UnknownMirrorKind { mirror_kind } => {
                ExError::new(ExErrorKind::UnknownKind)
                    .with_mirror_kind(mirror_kind)
                    .with_message(message)
            }
            ShadowError::RecordNotFound { record_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(record_id.to_string())
                .with_message(message),
            ShadowError::NodeNotFound {
                node_id,
                mirror_kind,
            } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(node_id.to_string())
                .with_mirror_kind(mirror_kind)
                .with_message(message),
            ShadowError::InvalidInput { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            ShadowError::DuplicateSlug { mirror_kind, .. } => {
                ExError::new(ExErrorKind::DuplicateSlug)
                    .with_mirror_kind(mirror_kind)
                    .with_message(message)
            }
            ShadowError::InvalidNodeName { .. } => {
                ExError::new(ExErrorKind::InvalidName).with_message(message)
            }
            ShadowError::MutationRejected { .. } => {
                ExError::new(ExErrorKind::MutationRejected).with_message(message)
            }
            ShadowError::Persistence { .. } => {
                ExError::new(ExErrorKind::Persistence).with_message(message)
            }
            ShadowError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            ShadowError::Io { .. } => ExError::new(ExErrorKind::Io).with_message(message),
            ShadowError::Config { .. } => {
                ExError::new(ExErrorKind::Config).with_message(message)
            }
            ShadowError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<&ShadowError> for ExError {
    fn from(err: &ShadowError) -> Self {
        err.clone().into()
    }
}

/// Conversion from serde_json::Error to ShadowError
impl From<serde_json::Error> for ShadowError {
    fn from(err: serde_json::Error) -> Self {
        ShadowError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ShadowError {
    fn from(err: std::io::Error) -> Self {
        ShadowError::Io {
            message: err.to_string(),
        }
    }
}
