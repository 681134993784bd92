//! [`ModelSnapshot`] – serialisable image of a whole frame graph.
//!
//! A snapshot is self-contained: the frame list (insertion order, exact
//! quaternion rotations; Euler triples would be lossy at gimbal lock) and
//! the explicitly registered link pairs. Implicit reference links are not
//! stored; restoring re-creates them frame by frame. The surrounding system
//! embeds the snapshot in its persisted setup configuration and hands it
//! back later via [`FrameGraph::restore`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use alignbench_types::AlignError;

use crate::frame::Frame;
use crate::graph::FrameGraph;

/// Persistable image of a [`FrameGraph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub frames: Vec<Frame>,
    pub links: Vec<(String, String)>,
}

impl ModelSnapshot {
    /// Encode as a JSON string for embedding in a setup file.
    pub fn to_json(&self) -> Result<String, AlignError> {
        serde_json::to_string_pretty(self).map_err(|e| AlignError::Serialization(e.to_string()))
    }

    /// Decode from a JSON string produced by [`to_json`][Self::to_json].
    pub fn from_json(raw: &str) -> Result<Self, AlignError> {
        serde_json::from_str(raw).map_err(|e| AlignError::Serialization(e.to_string()))
    }
}

impl FrameGraph {
    /// Capture the whole graph as a [`ModelSnapshot`].
    ///
    /// # Errors
    ///
    /// [`AlignError::Serialization`] when any frame transform contains a
    /// non-finite component; nothing is emitted in that case.
    pub fn snapshot(&self) -> Result<ModelSnapshot, AlignError> {
        let mut frames = Vec::with_capacity(self.len());
        for name in &self.order {
            let frame = &self.frames[name];
            if !frame.transform.is_finite() {
                return Err(AlignError::Serialization(format!(
                    "frame '{name}' has a non-finite transform"
                )));
            }
            frames.push(frame.clone());
        }
        let links = self.explicit_links.iter().cloned().collect();
        Ok(ModelSnapshot { frames, links })
    }

    /// Rebuild a graph behaviourally equivalent to the one captured:
    /// every `get_transform` query answers identically.
    ///
    /// Frames are inserted with repeated passes, so a frame overridden to
    /// reference a later entry restores cleanly.
    ///
    /// # Errors
    ///
    /// [`AlignError::UnknownReference`] / [`AlignError::DuplicateFrame`]
    /// for an inconsistent snapshot, [`AlignError::UnknownFrame`] /
    /// [`AlignError::NoPathFound`] for an unreplayable link.
    pub fn restore(snapshot: &ModelSnapshot) -> Result<FrameGraph, AlignError> {
        let mut graph = FrameGraph::new();
        graph.add_frames_unordered(snapshot.frames.clone())?;
        for (a, b) in &snapshot.links {
            graph.add_link(a, b)?;
        }
        debug!(
            frames = snapshot.frames.len(),
            links = snapshot.links.len(),
            "frame model restored from snapshot"
        );
        Ok(graph)
    }
}
