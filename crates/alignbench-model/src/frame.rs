//! A single named reference frame.

use serde::{Deserialize, Serialize};

use alignbench_types::RigidTransform;

/// One node of the frame graph: a named coordinate system, the name of the
/// reference it is currently defined against, and the transform
/// reference → frame.
///
/// Frames only exist inside a [`FrameGraph`][crate::FrameGraph]; the graph
/// owns them exclusively and keeps their names unique. A frame whose
/// `reference` equals its own `name` is a bootstrap root; its stored
/// transform is the identity by convention and never enters a composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub name: String,
    pub reference: String,
    pub transform: RigidTransform,
}

impl Frame {
    pub fn new(
        name: impl Into<String>,
        reference: impl Into<String>,
        transform: RigidTransform,
    ) -> Self {
        Self {
            name: name.into(),
            reference: reference.into(),
            transform,
        }
    }

    /// True for bootstrap roots (self-referencing frames).
    pub fn is_root(&self) -> bool {
        self.name == self.reference
    }
}
