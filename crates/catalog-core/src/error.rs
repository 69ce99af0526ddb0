use thiserror::Error;

/// What went wrong on the way to (or inside) the search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The resource being created is already there.
    AlreadyExists,
    /// The resource addressed does not exist.
    NotFound,
    /// Connecting or waiting for a response took too long.
    Timeout,
    /// The engine could not be reached at all.
    Unreachable,
    /// The engine answered with a non-success status.
    Rejected { status: u16 },
    /// The engine answered but the body could not be understood.
    Decode,
}

#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind == TransportErrorKind::AlreadyExists
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == TransportErrorKind::NotFound
    }
}

/// Why a single record could not be turned into an engine document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("missing identifier field `_id`")]
    MissingId,
    #[error("unrecognized identifier shape: {0}")]
    UnrecognizedId(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    #[error("Collection {0} already exists.")]
    CollectionExists(String),

    #[error("Record {position} could not be mapped: {source}")]
    Mapping {
        position: usize,
        #[source]
        source: MappingError,
    },

    #[error("Malformed records input at record {position}: {source}")]
    RecordStream {
        position: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Search engine request failed: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, Error>;
