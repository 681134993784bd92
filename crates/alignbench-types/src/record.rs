//! Raw frame records as delivered by the measurement import layer.

use serde::{Deserialize, Serialize};

use crate::transform::RigidTransform;

/// One already-decoded frame definition from a laser-tracker alignment
/// export.
///
/// The file-format parser lives outside this stack; by the time a record
/// reaches the model it is just a name, an optional reference-frame name,
/// and the measured transform reference → frame. Records without a
/// `reference` pick one up from the reference-defaults table during import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Unique frame name, e.g. `"fpasen"` or `"toumec"`.
    pub name: String,

    /// Name of the frame this record's transform is expressed against.
    /// `None` means "look it up in the import defaults".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Measured pose of the frame in its reference.
    pub transform: RigidTransform,
}

impl FrameRecord {
    /// Convenience constructor used by tests and demo setups.
    pub fn new(
        name: impl Into<String>,
        reference: Option<&str>,
        transform: RigidTransform,
    ) -> Self {
        Self {
            name: name.into(),
            reference: reference.map(str::to_string),
            transform,
        }
    }
}
