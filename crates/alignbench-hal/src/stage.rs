//! Generic `MotionStage` trait for six-axis positioning hardware.
//!
//! Drivers implement this trait; the commissioning layer only ever talks to
//! the trait, so a hardware proxy can be swapped for the simulator without
//! touching alignment logic.
//!
//! All coordinate vectors use the system convention: flat
//! `[tx, ty, tz, rx, ry, rz]` with translations in millimetres and
//! rotations as static-XYZ Euler degrees, the same shape the frame model's
//! sync check consumes.

use alignbench_types::AlignError;

/// A six-axis motion stage (hexapod or equivalent).
///
/// A stage knows two coordinate systems beyond its fixed machine frame:
/// the *user* frame (where commands are expressed) and the *object* frame
/// (the payload point being positioned). Both are configured from the
/// frame model during commissioning.
pub trait MotionStage {
    /// Stable identifier for this stage, e.g. `"hex_main"`.
    fn id(&self) -> &str;

    /// Pose of the object frame in the user frame.
    ///
    /// This is the vector the frame model's sync check compares against.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::StageFault`] when the controller cannot report
    /// a position.
    fn user_positions(&self) -> Result<[f64; 6], AlignError>;

    /// Pose of the platform in the machine frame.
    fn machine_positions(&self) -> Result<[f64; 6], AlignError>;

    /// Define the user frame (relative to the machine frame) and the
    /// object frame (relative to the platform frame).
    ///
    /// The platform does not move: machine coordinates are invariant
    /// across reconfiguration and user coordinates are re-expressed.
    fn configure_coordinate_systems(
        &mut self,
        usr_translation: [f64; 3],
        usr_rotation: [f64; 3],
        obj_translation: [f64; 3],
        obj_rotation: [f64; 3],
    ) -> Result<(), AlignError>;

    /// Move the object by a relative transform expressed in its current
    /// object frame, the shape produced by the model's
    /// `get_translation_rotation_vectors(probe, target)`.
    fn move_relative(
        &mut self,
        translation: [f64; 3],
        rotation: [f64; 3],
    ) -> Result<(), AlignError>;

    /// True when this driver is a simulator rather than real hardware.
    fn is_simulator(&self) -> bool;
}
