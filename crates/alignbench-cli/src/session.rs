//! Commissioning session state: the frame model plus the stage it drives.

use std::fs;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use alignbench_hal::{MotionStage, SimStage};
use alignbench_model::{
    FrameGraph, ModelSnapshot, ReferenceDefaults, SyncReport, build_graph,
};
use alignbench_types::{AlignError, FrameRecord, RigidTransform};

use crate::config::Config;

/// Setup file wrapper: a model snapshot plus its save timestamp, the shape
/// embedded in the bench's persisted configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct SetupFile {
    pub saved_at: DateTime<Utc>,
    pub model: ModelSnapshot,
}

/// One interactive commissioning session: a frame model, a motion stage
/// (simulator here; a proxy on the real bench), and the tolerances used by
/// sync checks.
pub struct Session {
    pub cfg: Config,
    pub model: FrameGraph,
    pub stage: SimStage,
}

impl Session {
    pub fn new(cfg: Config, model: FrameGraph) -> Self {
        Self {
            cfg,
            model,
            stage: SimStage::new("hex_sim"),
        }
    }

    /// Push the model's user/object frame definitions to the stage
    /// controller so hardware and model speak the same coordinates.
    pub fn configure_stage(&mut self) -> Result<(), AlignError> {
        let usr_parent = self.parent_of(&self.cfg.sync_from)?;
        let obj_parent = self.parent_of(&self.cfg.sync_to)?;
        let (usr_t, usr_r) = self
            .model
            .get_translation_rotation_vectors(&usr_parent, &self.cfg.sync_from)?;
        let (obj_t, obj_r) = self
            .model
            .get_translation_rotation_vectors(&obj_parent, &self.cfg.sync_to)?;
        self.stage
            .configure_coordinate_systems(usr_t, usr_r, obj_t, obj_r)?;
        info!(usr = %self.cfg.sync_from, obj = %self.cfg.sync_to, "stage configured from model");
        Ok(())
    }

    fn parent_of(&self, frame: &str) -> Result<String, AlignError> {
        self.model
            .frame(frame)
            .map(|f| f.reference.clone())
            .ok_or_else(|| AlignError::UnknownFrame(frame.to_string()))
    }

    /// Compare the stage's reported user positions against the model.
    pub fn sync_check(&self) -> Result<SyncReport, AlignError> {
        let measured = self.stage.user_positions()?;
        self.model.is_in_sync(
            &self.cfg.sync_from,
            &self.cfg.sync_to,
            measured,
            self.cfg.atol,
            self.cfg.rtol,
        )
    }

    /// Command a relative move and mirror it into the model so the sync
    /// pair tracks the commanded hardware position.
    ///
    /// The mirrored update rewrites the platform frame (the sync target's
    /// reference): machine-side definitions stay put, the platform carries
    /// the motion.
    pub fn move_relative(&mut self, translation: [f64; 3], rotation: [f64; 3]) -> Result<(), AlignError> {
        self.stage.move_relative(translation, rotation)?;

        let delta = RigidTransform::from_vectors(translation, rotation);
        let from = self.cfg.sync_from.clone();
        let to = self.cfg.sync_to.clone();
        let platform = self.parent_of(&to)?;
        let usr_parent = self.parent_of(&from)?;

        // New platform pose: usr ∘ (pose ∘ delta) ∘ obj⁻¹, all in the
        // platform's reference frame.
        let usr = self.model.get_transform(&usr_parent, &from)?;
        let pose = self.model.get_transform(&from, &to)?;
        let obj = self
            .model
            .frame(&to)
            .ok_or_else(|| AlignError::UnknownFrame(to.clone()))?
            .transform;
        let platform_ref = self.parent_of(&platform)?;
        let new_platform = usr
            .compose(pose.compose(delta))
            .compose(obj.inverse());
        self.model
            .override_frame(&platform, new_platform, &platform_ref)?;
        Ok(())
    }

    /// Move only the stage, leaving the model untouched: simulated
    /// uncommanded drift for exercising the sync check.
    pub fn drift(&mut self, translation: [f64; 3], rotation: [f64; 3]) -> Result<(), AlignError> {
        self.stage.move_relative(translation, rotation)
    }

    /// Write the model snapshot to a timestamped setup file.
    pub fn save_setup(&self, path: &str) -> Result<(), AlignError> {
        let setup = SetupFile {
            saved_at: Utc::now(),
            model: self.model.snapshot()?,
        };
        let raw = serde_json::to_string_pretty(&setup)
            .map_err(|e| AlignError::Serialization(e.to_string()))?;
        fs::write(path, raw).map_err(|e| AlignError::Serialization(e.to_string()))?;
        info!(path = %path, "setup saved");
        Ok(())
    }

    /// Replace the session model with one restored from a setup file.
    pub fn load_setup(&mut self, path: &str) -> Result<DateTime<Utc>, AlignError> {
        let raw = fs::read_to_string(path).map_err(|e| AlignError::Serialization(e.to_string()))?;
        let setup: SetupFile =
            serde_json::from_str(&raw).map_err(|e| AlignError::Serialization(e.to_string()))?;
        self.model = FrameGraph::restore(&setup.model)?;
        info!(path = %path, frames = self.model.len(), "setup loaded");
        Ok(setup.saved_at)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Model bootstrap
// ────────────────────────────────────────────────────────────────────────────

/// Read decoded frame records from a JSON file.
pub fn load_records(path: &str) -> Result<Vec<FrameRecord>, AlignError> {
    let raw = fs::read_to_string(path).map_err(|e| AlignError::Serialization(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| AlignError::Serialization(e.to_string()))
}

/// Reference-defaults table for benches whose exports list bare frame
/// names: every measured frame sits on the bench root `gliso`.
pub fn bench_defaults() -> ReferenceDefaults {
    ReferenceDefaults::new()
        .with("gliso", "gliso")
        .with("hexiso", "gliso")
        .with("fpasen", "gliso")
        .with("fpamec", "gliso")
        .with("toumec", "gliso")
        .with("toul6", "gliso")
        .with("toubip", "gliso")
}

/// Assemble a model from a records file, completing it with the hexapod
/// frames and solid-body links a bare export cannot carry.
pub fn model_from_records(records: &[FrameRecord]) -> Result<FrameGraph, AlignError> {
    let mut model = build_graph(records, &bench_defaults())?;
    complete_hexapod(&mut model)?;
    Ok(model)
}

/// The built-in demo bench: representative measured poses from an
/// engineering-model alignment campaign.
pub fn demo_model() -> Result<FrameGraph, AlignError> {
    let tf = RigidTransform::from_vectors;
    let records = vec![
        FrameRecord::new("gliso", None, RigidTransform::identity()),
        FrameRecord::new("hexiso", None, tf([0.23, 0.136, 230.19], [-0.0073, -0.0152, 0.0339])),
        FrameRecord::new("fpasen", None, tf([0.154, 1.061, 520.39], [-0.0857, -0.0457, -120.17])),
        FrameRecord::new("fpamec", None, tf([0.33, 1.076, 581.63], [-0.0768, -0.0339, -119.72])),
        FrameRecord::new("toumec", None, tf([-0.025, -0.005, 606.37], [-0.0259, 0.0017, -120.16])),
        FrameRecord::new("toul6", None, tf([-0.021, 0.011, 585.0], [-0.0259, 0.0017, -120.16])),
        FrameRecord::new("toubip", None, tf([-0.05, 0.012, 538.08], [-0.0608, -0.0055, -120.15])),
    ];
    model_from_records(&records)
}

/// Add the hexapod frame family on top of the measured frames.
///
/// The machine frame is pinned to the surveyed `hexiso`, the platform
/// starts at machine zero, and the user/object frames are derived so they
/// coincide with the optics they serve (`toul6`, `fpasen`).
fn complete_hexapod(model: &mut FrameGraph) -> Result<(), AlignError> {
    model.add_frame("hexmec", RigidTransform::identity(), "hexiso")?;
    model.add_frame("hexplt", RigidTransform::identity(), "hexmec")?;
    model.add_derived_frame("hexusr", "hexmec", "toul6")?;
    model.add_derived_frame("hexobj", "hexplt", "fpasen")?;
    model.add_derived_frame("hexobusr", "hexusr", "hexobj")?;

    model.add_link("hexiso", "gliso")?;
    model.add_link("hexmec", "hexiso")?;
    model.add_link("hexobj", "hexplt")?;
    model.add_link("hexobj", "hexobusr")?;
    model.add_link("hexusr", "hexmec")?;
    model.add_link("fpasen", "hexobj")?;
    model.add_link("fpasen", "fpamec")?;
    model.add_link("toul6", "hexusr")?;
    model.add_link("toul6", "toumec")?;
    model.add_link("toumec", "gliso")?;
    model.add_link("toubip", "toumec")?;
    Ok(())
}
