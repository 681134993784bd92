//! Rigid-transform algebra: translation + unit-quaternion rotation.
//!
//! A [`RigidTransform`] describes the pose of one named frame relative to
//! another. Composition order is fixed once for the whole system: if `a_b`
//! is the pose of frame B in frame A and `b_c` the pose of C in B, then
//! `a_b.compose(b_c)` is the pose of C in A. Every chain the frame model
//! builds relies on that order; getting it backwards yields the inverse of
//! the intended transform, which is why the tests below pin it explicitly.
//!
//! Vector reporting uses one convention everywhere: translations in
//! millimetres as `[x, y, z]`, rotations as static-XYZ Euler angles in
//! degrees (`R = Rz·Ry·Rx`), matching the laser-tracker alignment reports
//! the model is validated against.
//!
//! # Example
//!
//! ```rust
//! use alignbench_types::RigidTransform;
//!
//! let a_b = RigidTransform::from_vectors([1.0, 0.0, 0.0], [0.0, 0.0, 90.0]);
//! let b_c = RigidTransform::from_vectors([1.0, 0.0, 0.0], [0.0, 0.0, 0.0]);
//!
//! // B is 1 mm along A's x axis, yawed 90°; C is 1 mm along B's x axis.
//! let a_c = a_b.compose(b_c);
//! let (t, _) = a_c.to_vectors();
//! assert!((t[0] - 1.0).abs() < 1e-9);
//! assert!((t[1] - 1.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Vec3
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D translation vector (millimetres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Create a new vector.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }

    /// View as a flat `[x, y, z]` triple.
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Build from a flat `[x, y, z]` triple.
    pub fn from_array(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    /// True when every component is a finite number.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quaternion
// ────────────────────────────────────────────────────────────────────────────

/// A unit quaternion representing a 3-D rotation (w, x, y, z convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    /// Create a quaternion. The caller is responsible for providing a unit
    /// quaternion (|q| = 1); use [`normalized`][Self::normalized] when in
    /// doubt.
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation (no rotation).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Hamilton product: compose two rotations, `self` applied first in the
    /// frame-chaining sense used by [`RigidTransform::compose`].
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }

    /// Conjugate (== inverse for a unit quaternion).
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Euclidean norm.
    pub fn norm(self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Rescale to unit norm. Rotations are normalised when built from
    /// Euler vectors and again before matrix decomposition, which keeps
    /// the proper-rotation invariant within tolerance without perturbing
    /// composed chains in between.
    pub fn normalized(self) -> Self {
        let n = self.norm();
        Self::new(self.w / n, self.x / n, self.y / n, self.z / n)
    }

    /// Rotate a vector by this quaternion: p' = q · p · q*.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let p = Self::new(0.0, v.x, v.y, v.z);
        let rotated = self.mul(p).mul(self.conjugate());
        Vec3::new(rotated.x, rotated.y, rotated.z)
    }

    /// True when every component is a finite number.
    pub fn is_finite(self) -> bool {
        self.w.is_finite() && self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// The equivalent 3×3 rotation matrix (row-major).
    fn to_matrix(self) -> [[f64; 3]; 3] {
        let Self { w, x, y, z } = self.normalized();
        [
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - w * z),
                2.0 * (x * z + w * y),
            ],
            [
                2.0 * (x * y + w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - w * x),
            ],
            [
                2.0 * (x * z - w * y),
                2.0 * (y * z + w * x),
                1.0 - 2.0 * (x * x + y * y),
            ],
        ]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RigidTransform
// ────────────────────────────────────────────────────────────────────────────

/// A rigid-body 3-D transform: the pose of one frame relative to another.
///
/// If this value is the pose of frame B in frame A, a point expressed in B
/// converts into A by rotating it with `rotation` and then adding
/// `translation`. Values are immutable; composition and inversion return new
/// transforms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub translation: Vec3,
    pub rotation: Quaternion,
}

impl RigidTransform {
    /// Create a transform from a translation and rotation.
    pub fn new(translation: Vec3, rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// The identity transform (no translation, no rotation).
    pub fn identity() -> Self {
        Self::new(Vec3::zero(), Quaternion::identity())
    }

    /// Compose two transforms: `self` applied first, then `other`.
    ///
    /// If `self` = pose of B in A and `other` = pose of C in B, the result
    /// is the pose of C in A. The raw quaternion product is kept (unit
    /// norm drifts only in the last bits over realistic chain lengths, and
    /// decomposition renormalises) so equivalent resolution routes stay
    /// bit-identical.
    pub fn compose(self, other: Self) -> Self {
        let translation = self.translation.add(self.rotation.rotate(other.translation));
        let rotation = self.rotation.mul(other.rotation);
        Self::new(translation, rotation)
    }

    /// The inverse transform: `t.compose(t.inverse())` is the identity to
    /// within numerical tolerance.
    pub fn inverse(self) -> Self {
        let rotation = self.rotation.conjugate();
        let translation = rotation.rotate(self.translation.neg());
        Self::new(translation, rotation)
    }

    /// Build a transform from the system vector convention: a `[x, y, z]`
    /// translation and static-XYZ Euler angles `[rx, ry, rz]` in degrees.
    pub fn from_vectors(translation: [f64; 3], rotation_deg: [f64; 3]) -> Self {
        let half = |deg: f64| deg.to_radians() / 2.0;
        let (hx, hy, hz) = (half(rotation_deg[0]), half(rotation_deg[1]), half(rotation_deg[2]));
        let qx = Quaternion::new(hx.cos(), hx.sin(), 0.0, 0.0);
        let qy = Quaternion::new(hy.cos(), 0.0, hy.sin(), 0.0);
        let qz = Quaternion::new(hz.cos(), 0.0, 0.0, hz.sin());
        // Static axes applied x, then y, then z: R = Rz·Ry·Rx.
        let rotation = qz.mul(qy).mul(qx).normalized();
        Self::new(Vec3::from_array(translation), rotation)
    }

    /// Decompose into the system vector convention: `([x, y, z],
    /// [rx, ry, rz])` with angles as static-XYZ Euler degrees.
    ///
    /// At gimbal lock (|ry| = 90°) the decomposition pins `rz` to zero so
    /// the result stays deterministic.
    pub fn to_vectors(self) -> ([f64; 3], [f64; 3]) {
        let m = self.rotation.to_matrix();
        let sy = (-m[2][0]).clamp(-1.0, 1.0);
        let ry = sy.asin();

        let (rx, rz) = if sy.abs() < 1.0 - 1e-12 {
            (m[2][1].atan2(m[2][2]), m[1][0].atan2(m[0][0]))
        } else if sy > 0.0 {
            // ry = +90°: only rx − rz is observable; report rz = 0.
            (m[0][1].atan2(m[0][2]), 0.0)
        } else {
            // ry = −90°: only rx + rz is observable; report rz = 0.
            ((-m[0][1]).atan2(-m[0][2]), 0.0)
        };

        (
            self.translation.to_array(),
            [rx.to_degrees(), ry.to_degrees(), rz.to_degrees()],
        )
    }

    /// True when every translation and rotation component is finite.
    pub fn is_finite(self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn assert_vec_close(got: [f64; 3], want: [f64; 3], tol: f64) {
        for i in 0..3 {
            assert!(
                (got[i] - want[i]).abs() < tol,
                "component {i}: got {}, want {}",
                got[i],
                want[i]
            );
        }
    }

    fn assert_identity(t: RigidTransform, tol: f64) {
        let (trans, rot) = t.to_vectors();
        assert_vec_close(trans, [0.0; 3], tol);
        assert_vec_close(rot, [0.0; 3], tol);
    }

    // ── Quaternion ──────────────────────────────────────────────────────────

    #[test]
    fn quaternion_identity_rotate_is_noop() {
        let v = Quaternion::identity().rotate(Vec3::new(1.0, 2.0, 3.0));
        assert_vec_close(v.to_array(), [1.0, 2.0, 3.0], TOL);
    }

    #[test]
    fn quaternion_90deg_yaw_rotates_x_to_y() {
        let q = Quaternion::new(
            std::f64::consts::FRAC_1_SQRT_2,
            0.0,
            0.0,
            std::f64::consts::FRAC_1_SQRT_2,
        );
        let v = q.rotate(Vec3::new(1.0, 0.0, 0.0));
        assert_vec_close(v.to_array(), [0.0, 1.0, 0.0], TOL);
    }

    #[test]
    fn quaternion_conjugate_is_inverse() {
        let q = Quaternion::new(
            std::f64::consts::FRAC_1_SQRT_2,
            0.0,
            0.0,
            std::f64::consts::FRAC_1_SQRT_2,
        );
        let prod = q.mul(q.conjugate());
        assert!((prod.w - 1.0).abs() < TOL);
        assert!(prod.x.abs() < TOL && prod.y.abs() < TOL && prod.z.abs() < TOL);
    }

    #[test]
    fn normalized_restores_unit_norm() {
        let q = Quaternion::new(2.0, 0.0, 0.0, 0.0).normalized();
        assert!((q.norm() - 1.0).abs() < TOL);
        assert!((q.w - 1.0).abs() < TOL);
    }

    // ── Compose / inverse ───────────────────────────────────────────────────

    #[test]
    fn compose_translations_add() {
        let t1 = RigidTransform::from_vectors([1.0, 0.0, 0.0], [0.0; 3]);
        let t2 = RigidTransform::from_vectors([2.0, 0.0, 0.0], [0.0; 3]);
        let (trans, _) = t1.compose(t2).to_vectors();
        assert_vec_close(trans, [3.0, 0.0, 0.0], TOL);
    }

    #[test]
    fn compose_rotates_second_translation() {
        // B is yawed 90° in A; C is 1 mm along B's x, which is A's y.
        let a_b = RigidTransform::from_vectors([0.0; 3], [0.0, 0.0, 90.0]);
        let b_c = RigidTransform::from_vectors([1.0, 0.0, 0.0], [0.0; 3]);
        let (trans, _) = a_b.compose(b_c).to_vectors();
        assert_vec_close(trans, [0.0, 1.0, 0.0], TOL);
    }

    #[test]
    fn compose_with_inverse_is_identity() {
        let t = RigidTransform::from_vectors([12.3, -4.56, 78.9], [10.0, -20.0, 30.0]);
        assert_identity(t.compose(t.inverse()), 1e-9);
        assert_identity(t.inverse().compose(t), 1e-9);
    }

    #[test]
    fn inverse_of_inverse_roundtrips() {
        let t = RigidTransform::from_vectors([0.154, 1.061, 520.39], [-0.0857, -0.0457, -120.17]);
        let back = t.inverse().inverse();
        let (t0, r0) = t.to_vectors();
        let (t1, r1) = back.to_vectors();
        assert_vec_close(t0, t1, 1e-9);
        assert_vec_close(r0, r1, 1e-9);
    }

    #[test]
    fn compose_is_associative() {
        let a = RigidTransform::from_vectors([1.0, 2.0, 3.0], [5.0, 0.0, 0.0]);
        let b = RigidTransform::from_vectors([-4.0, 0.5, 2.0], [0.0, -10.0, 0.0]);
        let c = RigidTransform::from_vectors([0.2, 0.3, -0.4], [0.0, 0.0, 45.0]);
        let left = a.compose(b).compose(c).to_vectors();
        let right = a.compose(b.compose(c)).to_vectors();
        assert_vec_close(left.0, right.0, 1e-9);
        assert_vec_close(left.1, right.1, 1e-9);
    }

    // ── Vector convention ───────────────────────────────────────────────────

    #[test]
    fn identity_decomposes_to_zero_vectors() {
        assert_identity(RigidTransform::identity(), TOL);
    }

    #[test]
    fn euler_axes_apply_in_static_xyz_order() {
        // Static x then z: unit z goes z → −y (Rx 90°) → +x (Rz 90°).
        let t = RigidTransform::from_vectors([0.0; 3], [90.0, 0.0, 90.0]);
        let v = t.rotation.rotate(Vec3::new(0.0, 0.0, 1.0));
        assert_vec_close(v.to_array(), [1.0, 0.0, 0.0], TOL);
    }

    #[test]
    fn vectors_roundtrip_representative_angles() {
        let cases = [
            [0.0, 0.0, 0.0],
            [30.0, 0.0, 0.0],
            [0.0, -45.0, 0.0],
            [0.0, 0.0, 120.0],
            [-0.0857, -0.0457, -120.17],
            [10.0, 89.9, -170.0],
            [-179.0, -89.5, 179.0],
        ];
        for rot in cases {
            let t = RigidTransform::from_vectors([1.0, -2.0, 3.0], rot);
            let (trans, got) = t.to_vectors();
            assert_vec_close(trans, [1.0, -2.0, 3.0], TOL);
            // Compare as rotations, not raw angles, to dodge ±180 aliasing.
            let back = RigidTransform::from_vectors([0.0; 3], got);
            let diff = t.compose(RigidTransform::new(Vec3::zero(), back.rotation.conjugate()));
            let (_, residual) = diff.to_vectors();
            assert_vec_close(residual, [0.0; 3], 1e-6);
        }
    }

    #[test]
    fn gimbal_lock_pins_z_angle_to_zero() {
        let t = RigidTransform::from_vectors([0.0; 3], [25.0, 90.0, 0.0]);
        let (_, rot) = t.to_vectors();
        assert!((rot[1] - 90.0).abs() < 1e-6, "ry: {}", rot[1]);
        assert!(rot[2].abs() < 1e-9, "rz must be pinned, got {}", rot[2]);
        assert!((rot[0] - 25.0).abs() < 1e-6, "rx: {}", rot[0]);
    }

    #[test]
    fn is_finite_rejects_nan_translation() {
        let mut t = RigidTransform::identity();
        assert!(t.is_finite());
        t.translation.z = f64::NAN;
        assert!(!t.is_finite());
    }

    #[test]
    fn serde_roundtrip_preserves_exact_components() {
        let t = RigidTransform::from_vectors([0.154, 1.061, 520.39], [-0.0857, -0.0457, -120.17]);
        let json = serde_json::to_string(&t).unwrap();
        let back: RigidTransform = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
