//! [`FrameGraph`] – owner of every frame and link on the bench.
//!
//! The graph is built once per commissioning session by a single control
//! sequence: bulk import first, then manual and derived frames, then the
//! explicit links that tie solid bodies together. Queries never mutate, so
//! once construction is done the graph can be shared read-only.
//!
//! Two kinds of edges exist. Adding a frame implicitly links it to its
//! reference; [`add_link`][FrameGraph::add_link] registers additional pairs
//! whose relative transform is directly derivable. Links never store a
//! transform of their own: every edge is evaluated from the current frame
//! definitions at query time, so overriding a frame's definition can never
//! leave a stale copy behind on an edge.
//!
//! # Example
//!
//! ```rust
//! use alignbench_model::FrameGraph;
//! use alignbench_types::RigidTransform;
//!
//! let mut model = FrameGraph::new();
//! model.add_frame("gliso", RigidTransform::identity(), "gliso").unwrap();
//! model
//!     .add_frame(
//!         "hexmec",
//!         RigidTransform::from_vectors([0.23, 0.136, 230.19], [0.0, 0.0, 0.0]),
//!         "gliso",
//!     )
//!     .unwrap();
//!
//! let (trans, _) = model.get_translation_rotation_vectors("gliso", "hexmec").unwrap();
//! assert!((trans[2] - 230.19).abs() < 1e-9);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;

use tracing::{debug, warn};

use alignbench_types::{AlignError, RigidTransform};

use crate::frame::Frame;
use crate::resolver;
use crate::sync::SyncReport;

/// The frame graph: a name-keyed set of [`Frame`]s plus an undirected link
/// set over which transforms between any two connected frames are resolved.
#[derive(Debug, Default)]
pub struct FrameGraph {
    pub(crate) frames: HashMap<String, Frame>,
    /// Insertion order; drives `summary()` and snapshot ordering.
    pub(crate) order: Vec<String>,
    /// Undirected adjacency over all links, implicit and explicit. Ordered
    /// collections keep BFS neighbour expansion deterministic.
    pub(crate) adjacency: BTreeMap<String, BTreeSet<String>>,
    /// Explicitly registered pairs (sorted), kept apart from the implicit
    /// edges so a snapshot can replay them.
    pub(crate) explicit_links: BTreeSet<(String, String)>,
}

impl FrameGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames in the graph.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// True when `name` is a known frame.
    pub fn contains(&self, name: &str) -> bool {
        self.frames.contains_key(name)
    }

    /// Look up a frame by name.
    pub fn frame(&self, name: &str) -> Option<&Frame> {
        self.frames.get(name)
    }

    /// Frame names in insertion order.
    pub fn frame_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    // ────────────────────────────────────────────────────────────────────
    // Construction
    // ────────────────────────────────────────────────────────────────────

    /// Add a frame defined by `transform` relative to `reference`.
    ///
    /// A frame whose `reference` equals its own name is a bootstrap root.
    /// Non-root frames are implicitly linked to their reference.
    ///
    /// # Errors
    ///
    /// [`AlignError::DuplicateFrame`] when `name` already exists,
    /// [`AlignError::UnknownReference`] when the reference is absent. Either
    /// failure leaves the graph untouched.
    pub fn add_frame(
        &mut self,
        name: &str,
        transform: RigidTransform,
        reference: &str,
    ) -> Result<(), AlignError> {
        if self.frames.contains_key(name) {
            return Err(AlignError::DuplicateFrame(name.to_string()));
        }
        if name != reference && !self.frames.contains_key(reference) {
            return Err(AlignError::UnknownReference {
                frame: name.to_string(),
                reference: reference.to_string(),
            });
        }

        self.frames
            .insert(name.to_string(), Frame::new(name, reference, transform));
        self.order.push(name.to_string());
        if name != reference {
            self.insert_edge(name, reference);
        }
        debug!(frame = %name, reference = %reference, "frame added");
        Ok(())
    }

    /// Add `name` as a frame derived from two already-known frames: its
    /// transform is the resolved `parent` → `target` transform and its
    /// stored reference is `parent`.
    ///
    /// This is the idiom for frames that must coincide with a measured
    /// frame while being defined against a stage-local reference (e.g. a
    /// user frame placed on a measured optic).
    ///
    /// # Errors
    ///
    /// [`AlignError::DuplicateFrame`] when `name` exists,
    /// [`AlignError::UnknownFrame`] / [`AlignError::NoPathFound`] when the
    /// parent → target transform cannot be resolved. The graph is untouched
    /// on failure.
    pub fn add_derived_frame(
        &mut self,
        name: &str,
        parent: &str,
        target: &str,
    ) -> Result<(), AlignError> {
        if self.frames.contains_key(name) {
            return Err(AlignError::DuplicateFrame(name.to_string()));
        }
        let transform = self.get_transform(parent, target)?;
        self.add_frame(name, transform, parent)
    }

    /// Register an explicit link between two known frames.
    ///
    /// Idempotent: re-linking an already linked pair (including any pair
    /// already joined by an implicit link) changes nothing. Links widen the
    /// resolver's search space; they never change stored transforms.
    ///
    /// # Errors
    ///
    /// [`AlignError::UnknownFrame`] when either endpoint is missing;
    /// [`AlignError::NoPathFound`] when the two frames share no chain root,
    /// since no transform would be derivable for the edge.
    pub fn add_link(&mut self, a: &str, b: &str) -> Result<(), AlignError> {
        for name in [a, b] {
            if !self.frames.contains_key(name) {
                return Err(AlignError::UnknownFrame(name.to_string()));
            }
        }
        if a == b {
            return Ok(());
        }
        if resolver::chain_root(self, a).0 != resolver::chain_root(self, b).0 {
            return Err(AlignError::NoPathFound {
                from: a.to_string(),
                to: b.to_string(),
            });
        }

        self.insert_edge(a, b);
        let pair = ordered_pair(a, b);
        self.explicit_links.insert(pair);
        debug!(a = %a, b = %b, "link registered");
        Ok(())
    }

    /// Replace the stored transform and reference of an existing frame.
    ///
    /// Used to swap a placeholder definition for one computed from sibling
    /// frames once enough of the bench has been measured. The frame's name
    /// and every link referencing it survive; an implicit link to the new
    /// reference is registered just as a fresh add would.
    ///
    /// # Errors
    ///
    /// [`AlignError::UnknownFrame`] when `name` does not exist,
    /// [`AlignError::UnknownReference`] when the new reference is absent,
    /// [`AlignError::CyclicReference`] when the new reference's chain runs
    /// through `name` (the chain walk would never terminate). Failures
    /// leave the graph untouched.
    pub fn override_frame(
        &mut self,
        name: &str,
        transform: RigidTransform,
        reference: &str,
    ) -> Result<(), AlignError> {
        if !self.frames.contains_key(name) {
            return Err(AlignError::UnknownFrame(name.to_string()));
        }
        if !self.frames.contains_key(reference) {
            return Err(AlignError::UnknownReference {
                frame: name.to_string(),
                reference: reference.to_string(),
            });
        }
        if reference == name || resolver::chain_contains(self, reference, name) {
            return Err(AlignError::CyclicReference {
                frame: name.to_string(),
                reference: reference.to_string(),
            });
        }

        if let Some(frame) = self.frames.get_mut(name) {
            frame.reference = reference.to_string();
            frame.transform = transform;
        }
        self.insert_edge(name, reference);
        debug!(frame = %name, reference = %reference, "frame overridden");
        Ok(())
    }

    pub(crate) fn insert_edge(&mut self, a: &str, b: &str) {
        self.adjacency
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.adjacency
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
    }

    /// Insert a batch of frame definitions whose mutual ordering is
    /// unknown: passes are repeated so a frame may appear before its
    /// reference. Used by bulk import and snapshot restore.
    pub(crate) fn add_frames_unordered(&mut self, defs: Vec<Frame>) -> Result<(), AlignError> {
        let mut pending = defs;
        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for def in pending {
                if def.is_root() || self.frames.contains_key(&def.reference) {
                    self.add_frame(&def.name, def.transform, &def.reference)?;
                } else {
                    deferred.push(def);
                }
            }
            if deferred.len() == before {
                // No progress: the first stuck definition names a reference
                // that neither exists nor ever becomes insertable.
                let stuck = &deferred[0];
                return Err(AlignError::UnknownReference {
                    frame: stuck.name.clone(),
                    reference: stuck.reference.clone(),
                });
            }
            pending = deferred;
        }
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────
    // Queries
    // ────────────────────────────────────────────────────────────────────

    /// Resolve the transform `from` → `to` through the link graph.
    ///
    /// # Errors
    ///
    /// [`AlignError::UnknownFrame`] for a missing endpoint,
    /// [`AlignError::NoPathFound`] when the frames sit in disconnected
    /// components. Never falls back to an identity transform.
    pub fn get_transform(&self, from: &str, to: &str) -> Result<RigidTransform, AlignError> {
        resolver::resolve(self, from, to)
    }

    /// Resolve `from` → `to` and decompose into the system vector
    /// convention (translation mm, static-XYZ Euler degrees).
    pub fn get_translation_rotation_vectors(
        &self,
        from: &str,
        to: &str,
    ) -> Result<([f64; 3], [f64; 3]), AlignError> {
        Ok(self.get_transform(from, to)?.to_vectors())
    }

    /// Compare the resolved `from` → `to` vectors against independently
    /// measured hardware coordinates (flat `[tx, ty, tz, rx, ry, rz]`).
    ///
    /// Closeness is element-wise `|computed − measured| ≤ atol + rtol·|measured|`.
    pub fn is_in_sync(
        &self,
        from: &str,
        to: &str,
        measured: [f64; 6],
        atol: f64,
        rtol: f64,
    ) -> Result<SyncReport, AlignError> {
        let (t, r) = self.get_translation_rotation_vectors(from, to)?;
        let computed = [t[0], t[1], t[2], r[0], r[1], r[2]];
        let report = SyncReport::compare(computed, measured, atol, rtol);
        if !report.in_sync {
            warn!(
                from = %from,
                to = %to,
                deltas = ?report.deltas,
                "model and measured coordinates out of sync"
            );
        }
        Ok(report)
    }

    /// Human-auditable listing of every frame, its reference, and its
    /// transform in the vector convention.
    ///
    /// Ordering is insertion order and float formatting is fixed, so two
    /// summaries of an unmodified graph are textually identical; operators
    /// diff them during commissioning.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Frame model: {} frames, {} explicit links",
            self.order.len(),
            self.explicit_links.len()
        );
        for name in &self.order {
            let frame = &self.frames[name];
            let (t, r) = frame.transform.to_vectors();
            let _ = writeln!(
                out,
                "{:<10} -> {:<10} Trans [{:>12.4e}, {:>12.4e}, {:>12.4e}]   Rot [{:>12.4e}, {:>12.4e}, {:>12.4e}]",
                frame.name, frame.reference, t[0], t[1], t[2], r[0], r[1], r[2]
            );
        }
        out
    }
}

fn ordered_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    fn tf(translation: [f64; 3], rotation_deg: [f64; 3]) -> RigidTransform {
        RigidTransform::from_vectors(translation, rotation_deg)
    }

    fn assert_close(a: RigidTransform, b: RigidTransform, tol: f64) {
        let (ta, ra) = a.to_vectors();
        let (tb, rb) = b.to_vectors();
        for i in 0..3 {
            assert!((ta[i] - tb[i]).abs() < tol, "trans[{i}]: {} vs {}", ta[i], tb[i]);
            assert!((ra[i] - rb[i]).abs() < tol, "rot[{i}]: {} vs {}", ra[i], rb[i]);
        }
    }

    /// Root + two chained stage frames, the commissioning minimum.
    fn bench_chain() -> (FrameGraph, RigidTransform, RigidTransform) {
        let gliso_hexmec = tf([0.23, 0.136, 230.19], [-0.0073, -0.0152, 0.0339]);
        let hexmec_hexusr = tf([-0.389, -0.319, 311.57], [-0.0186, 0.0169, -120.1939]);

        let mut model = FrameGraph::new();
        model
            .add_frame("gliso", RigidTransform::identity(), "gliso")
            .unwrap();
        model.add_frame("hexmec", gliso_hexmec, "gliso").unwrap();
        model.add_frame("hexusr", hexmec_hexusr, "hexmec").unwrap();
        (model, gliso_hexmec, hexmec_hexusr)
    }

    // ── Chain composition ──────────────────────────────────────────────────

    #[test]
    fn chain_resolves_to_composed_transform() {
        let (model, a_b, b_c) = bench_chain();
        let got = model.get_transform("gliso", "hexusr").unwrap();
        assert_close(got, a_b.compose(b_c), TOL);
    }

    #[test]
    fn reverse_query_is_inverse() {
        let (model, a_b, b_c) = bench_chain();
        let forward = a_b.compose(b_c);
        let got = model.get_transform("hexusr", "gliso").unwrap();
        assert_close(got, forward.inverse(), TOL);
    }

    #[test]
    fn three_frame_chain_splits_at_midpoint() {
        let (model, _, _) = bench_chain();
        let a_c = model.get_transform("gliso", "hexusr").unwrap();
        let a_b = model.get_transform("gliso", "hexmec").unwrap();
        let b_c = model.get_transform("hexmec", "hexusr").unwrap();
        assert_close(a_c, a_b.compose(b_c), TOL);
    }

    #[test]
    fn every_connected_pair_is_mutually_inverse() {
        let (model, _, _) = bench_chain();
        for from in ["gliso", "hexmec", "hexusr"] {
            for to in ["gliso", "hexmec", "hexusr"] {
                let fwd = model.get_transform(from, to).unwrap();
                let rev = model.get_transform(to, from).unwrap();
                assert_close(fwd.compose(rev), RigidTransform::identity(), TOL);
            }
        }
    }

    #[test]
    fn same_frame_resolves_to_identity() {
        let (model, _, _) = bench_chain();
        let got = model.get_transform("hexmec", "hexmec").unwrap();
        assert_close(got, RigidTransform::identity(), 1e-12);
    }

    // ── Construction errors leave the graph unmodified ─────────────────────

    #[test]
    fn duplicate_frame_rejected_without_mutation() {
        let (mut model, a_b, _) = bench_chain();
        let err = model
            .add_frame("hexmec", tf([9.0, 9.0, 9.0], [1.0, 2.0, 3.0]), "gliso")
            .unwrap_err();
        assert_eq!(err, AlignError::DuplicateFrame("hexmec".to_string()));
        assert_eq!(model.len(), 3);
        assert_close(model.frame("hexmec").unwrap().transform, a_b, 1e-12);
    }

    #[test]
    fn unknown_reference_rejected_without_mutation() {
        let (mut model, _, _) = bench_chain();
        let err = model
            .add_frame("fpasen", RigidTransform::identity(), "fpamec")
            .unwrap_err();
        assert_eq!(
            err,
            AlignError::UnknownReference {
                frame: "fpasen".to_string(),
                reference: "fpamec".to_string(),
            }
        );
        assert_eq!(model.len(), 3);
        assert!(!model.contains("fpasen"));
    }

    #[test]
    fn link_with_unknown_endpoint_rejected() {
        let (mut model, _, _) = bench_chain();
        let err = model.add_link("hexusr", "toul6").unwrap_err();
        assert_eq!(err, AlignError::UnknownFrame("toul6".to_string()));
    }

    #[test]
    fn query_with_unknown_endpoint_rejected() {
        let (model, _, _) = bench_chain();
        assert_eq!(
            model.get_transform("gliso", "ghost").unwrap_err(),
            AlignError::UnknownFrame("ghost".to_string())
        );
    }

    // ── Links ──────────────────────────────────────────────────────────────

    #[test]
    fn redundant_link_does_not_change_resolution() {
        let (mut model, _, _) = bench_chain();
        let before = model.get_transform("gliso", "hexusr").unwrap();
        model.add_link("gliso", "hexusr").unwrap();
        let after = model.get_transform("gliso", "hexusr").unwrap();
        // Bit-identical, not merely close: sync checks diff raw output.
        assert_eq!(before, after);
    }

    #[test]
    fn add_link_is_idempotent() {
        let (mut model, _, _) = bench_chain();
        model.add_link("gliso", "hexusr").unwrap();
        model.add_link("hexusr", "gliso").unwrap();
        model.add_link("gliso", "hexusr").unwrap();
        assert_eq!(model.explicit_links.len(), 1);
    }

    #[test]
    fn link_across_disconnected_roots_rejected() {
        let mut model = FrameGraph::new();
        model
            .add_frame("gliso", RigidTransform::identity(), "gliso")
            .unwrap();
        model
            .add_frame("bench2", RigidTransform::identity(), "bench2")
            .unwrap();
        model
            .add_frame("toumec", tf([1.0, 0.0, 0.0], [0.0; 3]), "bench2")
            .unwrap();
        let err = model.add_link("gliso", "toumec").unwrap_err();
        assert!(matches!(err, AlignError::NoPathFound { .. }));
    }

    #[test]
    fn disconnected_components_resolve_to_no_path() {
        let mut model = FrameGraph::new();
        model
            .add_frame("gliso", RigidTransform::identity(), "gliso")
            .unwrap();
        model
            .add_frame("hexmec", tf([1.0, 2.0, 3.0], [0.0; 3]), "gliso")
            .unwrap();
        model
            .add_frame("bench2", RigidTransform::identity(), "bench2")
            .unwrap();
        model
            .add_frame("toumec", tf([4.0, 5.0, 6.0], [0.0; 3]), "bench2")
            .unwrap();
        let err = model.get_transform("hexmec", "toumec").unwrap_err();
        assert_eq!(
            err,
            AlignError::NoPathFound {
                from: "hexmec".to_string(),
                to: "toumec".to_string(),
            }
        );
    }

    #[test]
    fn explicit_link_between_siblings_shortens_nothing_but_resolves_identically() {
        // fpasen and fpamec are both measured against gliso; an explicit
        // link makes the pair directly traversable.
        let mut model = FrameGraph::new();
        model
            .add_frame("gliso", RigidTransform::identity(), "gliso")
            .unwrap();
        let gliso_fpasen = tf([0.154, 1.061, 520.39], [-0.0857, -0.0457, -120.17]);
        let gliso_fpamec = tf([0.33, 1.076, 581.63], [-0.0768, -0.0339, -119.72]);
        model.add_frame("fpasen", gliso_fpasen, "gliso").unwrap();
        model.add_frame("fpamec", gliso_fpamec, "gliso").unwrap();

        let via_root = model.get_transform("fpasen", "fpamec").unwrap();
        model.add_link("fpasen", "fpamec").unwrap();
        let direct = model.get_transform("fpasen", "fpamec").unwrap();
        assert_close(direct, gliso_fpasen.inverse().compose(gliso_fpamec), TOL);
        assert_close(via_root, direct, TOL);
    }

    // ── Derived frames and overrides ───────────────────────────────────────

    #[test]
    fn derived_frame_matches_manual_composition() {
        let (mut model, _, _) = bench_chain();
        let gliso_toul6 = tf([-0.025, -0.005, 606.37], [-0.0259, 0.0017, -120.16]);
        model.add_frame("toul6", gliso_toul6, "gliso").unwrap();

        // hexusr2 pinned to toul6 but defined against hexmec.
        model.add_derived_frame("hexusr2", "hexmec", "toul6").unwrap();
        let expected = model
            .get_transform("hexmec", "gliso")
            .unwrap()
            .compose(gliso_toul6);
        assert_close(model.frame("hexusr2").unwrap().transform, expected, TOL);
        assert_eq!(model.frame("hexusr2").unwrap().reference, "hexmec");
    }

    #[test]
    fn derived_frame_requires_resolvable_pair() {
        let (mut model, _, _) = bench_chain();
        model
            .add_frame("island", RigidTransform::identity(), "island")
            .unwrap();
        let err = model.add_derived_frame("d", "hexmec", "island").unwrap_err();
        assert!(matches!(err, AlignError::NoPathFound { .. }));
        assert!(!model.contains("d"));
    }

    #[test]
    fn override_replaces_placeholder_definition() {
        let (mut model, _, _) = bench_chain();
        // Placeholder: hexobj starts as identity on hexmec.
        model
            .add_frame("hexobj", RigidTransform::identity(), "hexmec")
            .unwrap();
        let refined = tf([-0.076, 0.925, 290.2], [-0.0784, -0.0305, -120.2039]);
        model.override_frame("hexobj", refined, "hexusr").unwrap();

        let frame = model.frame("hexobj").unwrap();
        assert_eq!(frame.reference, "hexusr");
        assert_close(frame.transform, refined, 1e-12);

        // The surviving link to the old reference still resolves, now
        // through the fresh definition.
        let via_old_link = model.get_transform("hexmec", "hexobj").unwrap();
        let expected = model
            .get_transform("hexmec", "hexusr")
            .unwrap()
            .compose(refined);
        assert_close(via_old_link, expected, TOL);
    }

    #[test]
    fn override_of_unknown_frame_rejected() {
        let (mut model, _, _) = bench_chain();
        let err = model
            .override_frame("ghost", RigidTransform::identity(), "gliso")
            .unwrap_err();
        assert_eq!(err, AlignError::UnknownFrame("ghost".to_string()));
    }

    #[test]
    fn override_closing_a_reference_cycle_rejected() {
        let (mut model, _, _) = bench_chain();
        // hexmec's chain runs gliso <- hexmec; re-referencing gliso to
        // hexusr (whose chain passes hexmec and gliso) would loop.
        let err = model
            .override_frame("gliso", RigidTransform::identity(), "hexusr")
            .unwrap_err();
        assert!(matches!(err, AlignError::CyclicReference { .. }));
        assert!(model.frame("gliso").unwrap().is_root());
    }

    // ── Summary ────────────────────────────────────────────────────────────

    #[test]
    fn summary_is_stable_across_calls() {
        let (model, _, _) = bench_chain();
        assert_eq!(model.summary(), model.summary());
    }

    #[test]
    fn summary_lists_frames_in_insertion_order() {
        let (model, _, _) = bench_chain();
        let text = model.summary();
        let gliso = text.find("gliso").unwrap();
        let hexmec = text.find("hexmec").unwrap();
        let hexusr = text.find("hexusr").unwrap();
        assert!(gliso < hexmec && hexmec < hexusr, "order lost:\n{text}");
        assert!(text.lines().count() >= 4);
    }

    // ── Sync check ─────────────────────────────────────────────────────────

    #[test]
    fn matching_measurement_reports_in_sync() {
        let (model, _, _) = bench_chain();
        let (t, r) = model
            .get_translation_rotation_vectors("hexmec", "hexusr")
            .unwrap();
        let measured = [t[0], t[1], t[2], r[0], r[1], r[2]];
        let report = model
            .is_in_sync("hexmec", "hexusr", measured, 1e-4, 1e-4)
            .unwrap();
        assert!(report.in_sync);
        assert!(report.deltas.iter().all(|d| d.abs() < 1e-9));
    }

    #[test]
    fn drifted_measurement_reports_out_of_sync_with_deltas() {
        let (model, _, _) = bench_chain();
        let (t, r) = model
            .get_translation_rotation_vectors("hexmec", "hexusr")
            .unwrap();
        // 0.5 mm drift on x: far outside the 1e-4 tolerance.
        let measured = [t[0] + 0.5, t[1], t[2], r[0], r[1], r[2]];
        let report = model
            .is_in_sync("hexmec", "hexusr", measured, 1e-4, 1e-4)
            .unwrap();
        assert!(!report.in_sync);
        assert!((report.deltas[0].abs() - 0.5).abs() < 1e-9);
        assert!(report.deltas[1].abs() < 1e-9);
    }
}
