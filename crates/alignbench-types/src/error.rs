//! Global error taxonomy for the alignment bench stack.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors spanning frame-model construction, path resolution, snapshot
/// serialisation, and motion-stage faults.
///
/// Construction errors (`DuplicateFrame`, `UnknownFrame`,
/// `UnknownReference`, `CyclicReference`) are fatal to the offending call
/// and leave the model untouched; query errors (`UnknownFrame`,
/// `NoPathFound`) are always surfaced rather than silently defaulting to an
/// identity transform: during hardware alignment a silent identity would
/// report "in sync" while knowing nothing about the relationship.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlignError {
    #[error("frame '{0}' already exists in the model")]
    DuplicateFrame(String),

    #[error("frame '{0}' is not part of the model")]
    UnknownFrame(String),

    #[error("frame '{frame}' refers to unknown reference '{reference}'")]
    UnknownReference { frame: String, reference: String },

    #[error("no link path between '{from}' and '{to}'")]
    NoPathFound { from: String, to: String },

    #[error("re-referencing '{frame}' to '{reference}' would close a reference cycle")]
    CyclicReference { frame: String, reference: String },

    #[error("snapshot serialisation failed: {0}")]
    Serialization(String),

    #[error("stage fault on {stage}: {details}")]
    StageFault { stage: String, details: String },
}
