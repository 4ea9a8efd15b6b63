//! Forward and inverse kinematics of the P-R-R SCARA arm.
//!
//! Joint vector `[d1, θ₂, θ₃]`: prismatic Z, shoulder, elbow. Distances
//! in meters, angles in radians. The inverse always picks the elbow-down
//! branch (non-negative sin θ₃).

use crate::float_types::Real;
use crate::planner::{CartSample, Flag, Trajectory};
use nalgebra::{Matrix3, Point3};

pub mod differentiate;

pub use differentiate::{JointDynamics, differentiate};

/// A cartesian sample mapped to joint space; flag and velocity ride along.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointSample {
    pub d1: Real,
    pub th2: Real,
    pub th3: Real,
    pub flag: Flag,
    pub v: Real,
}

/// Forward kinematics: joints to tool position.
pub fn forward(q: [Real; 3], l1: Real, l2: Real) -> Point3<Real> {
    let [d1, th2, th3] = q;
    let elbow_x = l1 * th2.cos();
    let elbow_y = l1 * th2.sin();
    Point3::new(
        elbow_x + l2 * (th2 + th3).cos(),
        elbow_y + l2 * (th2 + th3).sin(),
        d1,
    )
}

/// Inverse kinematics for one tool position, elbow-down branch.
pub fn inverse_point(p: &Point3<Real>, l1: Real, l2: Real) -> [Real; 3] {
    let r_sq = p.x * p.x + p.y * p.y;
    let cos_th3 = ((r_sq - l1 * l1 - l2 * l2) / (2.0 * l1 * l2)).clamp(-1.0, 1.0);
    let th3 = (1.0 - cos_th3 * cos_th3).max(0.0).sqrt().atan2(cos_th3);
    let th2_offset = (l2 * th3.sin()).atan2(l1 + l2 * th3.cos());
    let th2 = p.y.atan2(p.x) - th2_offset;
    [p.z, th2, th3]
}

/// Geometric Jacobian at a joint configuration.
pub fn jacobian(q: [Real; 3], l1: Real, l2: Real) -> Matrix3<Real> {
    let [_, th2, th3] = q;
    let (s2, c2) = th2.sin_cos();
    let (s23, c23) = (th2 + th3).sin_cos();
    Matrix3::new(
        0.0, -l1 * s2 - l2 * s23, -l2 * s23, //
        0.0, l1 * c2 + l2 * c23, l2 * c23, //
        1.0, 0.0, 0.0,
    )
}

/// Convert a planned cartesian trajectory (meters) to joint samples.
pub fn inverse_trajectory(traj: &Trajectory, l1: Real, l2: Real) -> Vec<JointSample> {
    traj.samples
        .iter()
        .map(|&CartSample { x, y, z, flag, v }| {
            let [d1, th2, th3] = inverse_point(&Point3::new(x, y, z), l1, l2);
            JointSample {
                d1,
                th2,
                th3,
                flag,
                v,
            }
        })
        .collect()
}
