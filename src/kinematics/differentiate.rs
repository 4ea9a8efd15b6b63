//! Time reconstruction and numeric differentiation of joint trajectories.
//!
//! Time stamps come from arc length over mean sample velocity, floored by
//! the sampling period. Velocities use a forward difference at the first
//! sample, centered differences inside, and a backward difference at the
//! last; accelerations repeat the scheme on the velocities and then get an
//! edge-padded moving-average pass sized to ~5% of the stream.

use super::JointSample;
use crate::config::ArmConfig;
use crate::float_types::{METER, Real};

const EPS_V: Real = 1e-6;

/// Differentiated joint stream: per-sample time, velocity and
/// acceleration columns for `[d1, θ₂, θ₃]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JointDynamics {
    pub t: Vec<Real>,
    pub qdot: Vec<[Real; 3]>,
    pub qddot: Vec<[Real; 3]>,
}

fn finite_differences(q: &[[Real; 3]], t: &[Real]) -> Vec<[Real; 3]> {
    let n = q.len();
    let mut out = vec![[0.0; 3]; n];
    let dt_first = t[1] - t[0];
    let dt_last = t[n - 1] - t[n - 2];
    for j in 0..3 {
        out[0][j] = (q[1][j] - q[0][j]) / dt_first;
        for i in 1..n - 1 {
            out[i][j] = (q[i + 1][j] - q[i - 1][j]) / (t[i + 1] - t[i - 1]);
        }
        out[n - 1][j] = (q[n - 1][j] - q[n - 2][j]) / dt_last;
    }
    out
}

fn clamp_columns(values: &mut [[Real; 3]], limits: &Option<[Real; 3]>) {
    if let Some(limits) = limits {
        for row in values {
            for j in 0..3 {
                row[j] = row[j].clamp(-limits[j], limits[j]);
            }
        }
    }
}

/// Edge-padded moving average, column-wise. `window` must be odd.
fn smooth_moving_mean(values: &[[Real; 3]], window: usize) -> Vec<[Real; 3]> {
    if window < 3 || values.is_empty() {
        return values.to_vec();
    }
    let n = values.len();
    let pad = window / 2;
    let mut out = vec![[0.0; 3]; n];
    for j in 0..3 {
        for i in 0..n {
            let mut sum = 0.0;
            for k in 0..window {
                // Edge padding: indices past the ends repeat the end value.
                let idx = (i + k).saturating_sub(pad).min(n - 1);
                sum += values[idx][j];
            }
            out[i][j] = sum / window as Real;
        }
    }
    out
}

fn zero_round(values: &mut [[Real; 3]], threshold: Real) {
    for row in values {
        for v in row {
            if !v.is_finite() || v.abs() < threshold {
                *v = 0.0;
            }
        }
    }
}

/// Differentiate a joint trajectory.
///
/// `step_mm` is the planner's arc-length step (mm); sample velocities are
/// m/s. Streams shorter than two samples produce zeroed columns.
pub fn differentiate(samples: &[JointSample], step_mm: Real, arm: &ArmConfig) -> JointDynamics {
    let n = samples.len();
    if n < 2 {
        return JointDynamics {
            t: vec![0.0; n],
            qdot: vec![[0.0; 3]; n],
            qddot: vec![[0.0; 3]; n],
        };
    }

    let q: Vec<[Real; 3]> = samples.iter().map(|s| [s.d1, s.th2, s.th3]).collect();
    let v: Vec<Real> = samples.iter().map(|s| s.v).collect();

    let dl = step_mm / METER;
    let dt_min = 1.0 / arm.sample_rate;

    let mut t = vec![0.0; n];
    for i in 1..n {
        let v_mean = (v[i] + v[i - 1]) / 2.0;
        let dt = if v[i] < EPS_V || v_mean < EPS_V {
            dt_min
        } else {
            dl / v_mean
        };
        t[i] = t[i - 1] + dt.max(1e-9);
    }

    let mut qdot = finite_differences(&q, &t);
    let mut qddot = finite_differences(&qdot, &t);

    clamp_columns(&mut qdot, &arm.qdot_max);
    clamp_columns(&mut qddot, &arm.qddot_max);

    // Moving-average window ≈ 5% of the stream, odd, at least 3.
    let window = (((n as Real * 0.05) as usize / 2) * 2 + 1).max(3);
    let mut qddot = smooth_moving_mean(&qddot, window);

    zero_round(&mut qdot, 1e-9);
    zero_round(&mut qddot, 1e-6);

    JointDynamics { t, qdot, qddot }
}
