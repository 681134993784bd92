//! In-process motion-stage simulator.
//!
//! [`SimStage`] answers the whole [`MotionStage`] surface with pure
//! transform algebra, letting commissioning sequences and CI run with no
//! controller attached. It tracks three poses: user frame in machine frame,
//! object frame in platform frame, and object frame in user frame (the
//! "user positions" a controller reports).
//!
//! # Example
//!
//! ```rust
//! use alignbench_hal::{MotionStage, SimStage};
//!
//! let mut stage = SimStage::new("hex_sim");
//! stage.move_relative([0.5, 0.0, 0.0], [0.0, 0.0, 0.0]).unwrap();
//! let pos = stage.user_positions().unwrap();
//! assert!((pos[0] - 0.5).abs() < 1e-9);
//! ```

use tracing::{debug, info};

use alignbench_types::{AlignError, RigidTransform};

use crate::stage::MotionStage;

/// Simulated six-axis stage. Moves are instantaneous and always succeed
/// unless the command itself is malformed.
pub struct SimStage {
    id: String,
    /// User frame in the machine frame.
    usr: RigidTransform,
    /// Object frame in the platform frame.
    obj: RigidTransform,
    /// Object frame in the user frame; what the controller reports.
    pose: RigidTransform,
}

impl SimStage {
    /// Create a stage at its zero position with identity user and object
    /// frames.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            usr: RigidTransform::identity(),
            obj: RigidTransform::identity(),
            pose: RigidTransform::identity(),
        }
    }

    /// Platform pose in the machine frame: usr ∘ pose ∘ obj⁻¹.
    fn machine_pose(&self) -> RigidTransform {
        self.usr.compose(self.pose).compose(self.obj.inverse())
    }

    fn check_finite(&self, translation: [f64; 3], rotation: [f64; 3]) -> Result<(), AlignError> {
        let finite = translation.iter().chain(rotation.iter()).all(|v| v.is_finite());
        if finite {
            Ok(())
        } else {
            Err(AlignError::StageFault {
                stage: self.id.clone(),
                details: "non-finite component in commanded vector".to_string(),
            })
        }
    }
}

impl MotionStage for SimStage {
    fn id(&self) -> &str {
        &self.id
    }

    fn user_positions(&self) -> Result<[f64; 6], AlignError> {
        let (t, r) = self.pose.to_vectors();
        Ok([t[0], t[1], t[2], r[0], r[1], r[2]])
    }

    fn machine_positions(&self) -> Result<[f64; 6], AlignError> {
        let (t, r) = self.machine_pose().to_vectors();
        Ok([t[0], t[1], t[2], r[0], r[1], r[2]])
    }

    fn configure_coordinate_systems(
        &mut self,
        usr_translation: [f64; 3],
        usr_rotation: [f64; 3],
        obj_translation: [f64; 3],
        obj_rotation: [f64; 3],
    ) -> Result<(), AlignError> {
        self.check_finite(usr_translation, usr_rotation)?;
        self.check_finite(obj_translation, obj_rotation)?;

        // The platform stays put: capture the machine pose under the old
        // definitions, then re-express it under the new ones.
        let machine = self.machine_pose();
        self.usr = RigidTransform::from_vectors(usr_translation, usr_rotation);
        self.obj = RigidTransform::from_vectors(obj_translation, obj_rotation);
        self.pose = self.usr.inverse().compose(machine).compose(self.obj);
        info!(stage = %self.id, "coordinate systems reconfigured");
        Ok(())
    }

    fn move_relative(
        &mut self,
        translation: [f64; 3],
        rotation: [f64; 3],
    ) -> Result<(), AlignError> {
        self.check_finite(translation, rotation)?;
        let delta = RigidTransform::from_vectors(translation, rotation);
        self.pose = self.pose.compose(delta);
        debug!(stage = %self.id, ?translation, ?rotation, "relative move applied");
        Ok(())
    }

    fn is_simulator(&self) -> bool {
        true
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
