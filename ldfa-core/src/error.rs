use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::hash::Hash256;

/// The error taxonomy of the core: algorithmic/invariant violations are
/// fatal (the caller gets a `Result::Err` and must not retry blindly),
/// I/O failures are fatal but never corrupt previously persisted artifacts
/// (writers always write-to-temp then rename), and a missing cache entry is
/// the one recoverable case, meant to be handled by falling back to a fresh
/// build.
#[derive(Debug, Error)]
pub enum LdfaError {
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<u32>, Vec<u32>),

    #[error("transition in layer {layer} references nonexistent state {target} (layer {layer} has {state_count} states)")]
    InvalidStateId {
        layer: usize,
        target: u32,
        state_count: u32,
    },

    #[error("duplicate node name in move graph: '{0}'")]
    DuplicateNodeName(String),

    #[error("duplicate edge name in move graph: '{0}'")]
    DuplicateEdgeName(String),

    #[error("move graph edge '{edge}' goes from node {from} to node {to}, which is not strictly forward")]
    OutOfOrderEdge {
        edge: String,
        from: usize,
        to: usize,
    },

    #[error("node index {0} does not exist in this move graph")]
    NoSuchNode(usize),

    #[error("no cache entry for '{0}'")]
    CacheMiss(String),

    #[error("no cache entry for content hash {0}")]
    CacheMissHash(Hash256),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("attempted to mutate an already-finalized LDFA builder")]
    AlreadyFinalized,

    #[error("attempted to publish an initial state on a builder that already has one")]
    InitialStateAlreadySet,

    #[error("attempted to query an LDFA builder before its initial state was published")]
    NotYetFinalized,
}

impl LdfaError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LdfaError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LdfaError>;
