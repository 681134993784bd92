//! `alignbench-types` – shared value types for the alignment bench stack.
//!
//! Everything here is a plain immutable value: the rigid-transform algebra
//! used by the frame model, the raw record shape produced by the measurement
//! import layer, and the global [`AlignError`] taxonomy. Higher crates
//! (`alignbench-model`, `alignbench-hal`, `alignbench-cli`) only ever talk to
//! each other through these types.
//!
//! # Modules
//!
//! - [`transform`] – [`Vec3`], [`Quaternion`], [`RigidTransform`]: 3-D
//!   rotation + translation values with composition, inversion, and the
//!   system-wide translation/rotation vector convention (static-XYZ Euler,
//!   degrees).
//! - [`record`] – [`FrameRecord`]: one already-decoded frame definition as
//!   delivered by a laser-tracker export parser.
//! - [`error`] – [`AlignError`]: the shared error enum spanning model
//!   construction, path resolution, serialisation, and stage faults.

pub mod error;
pub mod record;
pub mod transform;

pub use error::AlignError;
pub use record::FrameRecord;
pub use transform::{Quaternion, RigidTransform, Vec3};
