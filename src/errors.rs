use thiserror::Error;

/// Unified error type for the configuration store.
///
/// Every fallible operation declares its failure modes through these
/// variants rather than relying on panics or opaque boxed errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying key/value medium could not be opened at all
    /// (missing file, permissions, poisoned lock). Fatal for the calling
    /// operation; never retried automatically.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A namespace path that was expected to exist is absent.
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// A record with the given id does not exist under its kind's namespace.
    #[error("{kind} record not found: {id}")]
    NotFound {
        /// Record kind the lookup ran against.
        kind: &'static str,
        /// The id that was requested.
        id: String,
    },

    /// A record with the given id already exists; create refused.
    #[error("{kind} record already exists: {id}")]
    DuplicateId {
        /// Record kind the create ran against.
        kind: &'static str,
        /// The colliding id.
        id: String,
    },

    /// A stored payload could not be decoded into the expected record shape.
    #[error("Malformed {kind} record '{id}': {reason}")]
    MalformedRecord {
        /// Record kind the payload was decoded as.
        kind: &'static str,
        /// The key the payload was stored under.
        id: String,
        /// Decoder diagnostic.
        reason: String,
    },

    /// One or more required namespace segments could not be created.
    /// Recovery is an idempotent retry of `initialize()`.
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// A record violates a data-model invariant at write time
    /// (setting value does not parse under its declared type, duplicate
    /// active setting name).
    #[error("Validation error: {0}")]
    Validation(String),

    /// CLI/application configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short stable tag for the error sink / log context.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "store-unavailable",
            Self::PathNotFound(_) => "path-not-found",
            Self::NotFound { .. } => "not-found",
            Self::DuplicateId { .. } => "duplicate-id",
            Self::MalformedRecord { .. } => "malformed-record",
            Self::InitializationFailed(_) => "initialization-failed",
            Self::Validation(_) => "validation",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
