//! Bulk bootstrap of a [`FrameGraph`] from decoded measurement records.
//!
//! A laser-tracker alignment export yields one record per measured frame.
//! Records usually name their reference explicitly; the ones that don't
//! (legacy exports list bare frame names) pick it up from a
//! [`ReferenceDefaults`] table that the caller assembles for the campaign.
//! The defaults table is an ordinary value passed in by the caller: the
//! one place reference conventions live, instead of a process-global map.

use std::collections::BTreeMap;

use tracing::info;

use alignbench_types::{AlignError, FrameRecord};

use crate::frame::Frame;
use crate::graph::FrameGraph;

/// Campaign-specific table mapping frame names to their conventional
/// reference frame (e.g. every hexapod frame → `"gliso"` at CSL-style
/// benches). An entry mapping a name to itself declares a bootstrap root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceDefaults {
    defaults: BTreeMap<String, String>,
}

impl ReferenceDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration: `with("hexmec", "hexiso")`.
    pub fn with(mut self, frame: impl Into<String>, reference: impl Into<String>) -> Self {
        self.defaults.insert(frame.into(), reference.into());
        self
    }

    /// Look up the default reference for `frame`.
    pub fn get(&self, frame: &str) -> Option<&str> {
        self.defaults.get(frame).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.defaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty()
    }
}

/// Build a [`FrameGraph`] from a batch of records.
///
/// Record order does not matter: insertion retries until every reference
/// is present. Frames whose resolved reference equals their own name
/// become bootstrap roots.
///
/// # Errors
///
/// [`AlignError::UnknownReference`] when a record names no reference and
/// the defaults table has none, or when a reference never materialises;
/// [`AlignError::DuplicateFrame`] for repeated record names. The partially
/// built graph is discarded on error.
pub fn build_graph(
    records: &[FrameRecord],
    defaults: &ReferenceDefaults,
) -> Result<FrameGraph, AlignError> {
    let mut defs = Vec::with_capacity(records.len());
    for record in records {
        let reference = match (&record.reference, defaults.get(&record.name)) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(default)) => default.to_string(),
            (None, None) => {
                return Err(AlignError::UnknownReference {
                    frame: record.name.clone(),
                    reference: "<no default>".to_string(),
                });
            }
        };
        defs.push(Frame::new(&record.name, reference, record.transform));
    }

    let mut graph = FrameGraph::new();
    graph.add_frames_unordered(defs)?;
    info!(frames = graph.len(), "frame model imported");
    Ok(graph)
}
