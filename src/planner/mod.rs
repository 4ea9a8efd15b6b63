//! Trajectory planning: arc-length block interpolation, lift / traverse /
//! plunge transition synthesis, and the trapezoidal velocity profile.
//!
//! Planning happens in millimeters; [`plan`] converts to meters and m/s
//! when it emits. The profile is the classic forward-backward pass: the
//! forward sweep limits each sample to √(v²₋₁ + 2·a·ΔL) with zero pins at
//! every stop condition, the backward sweep applies the same bound in
//! reverse so decelerations respect the acceleration limit too.

use crate::config::PlannerConfig;
use crate::errors::RouteError;
use crate::float_types::{METER, Real};

/// Velocities below this floor are clamped before emit so downstream
/// divisions stay finite.
pub const V_MIN: Real = 1e-6;

// ==========================
// Sample and block types
// ==========================

/// Per-sample machine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    /// Tool engaged at cutting height.
    Cut = 1,
    /// Stationary at home height.
    Rest = 2,
    /// Moving with the tool raised.
    Traverse = 3,
}

impl Flag {
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(Flag::Cut),
            2 => Some(Flag::Rest),
            3 => Some(Flag::Traverse),
            _ => None,
        }
    }
}

/// Pre-interpolation input row in mm. Flag 0 marks annotation rows; a
/// group that is all zeros never reaches the machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawPoint {
    pub x: Real,
    pub y: Real,
    pub z: Real,
    pub flag: i32,
}

impl RawPoint {
    pub const fn new(x: Real, y: Real, z: Real, flag: i32) -> Self {
        Self { x, y, z, flag }
    }
}

/// One interpolated contour: constant flag, constant height.
#[derive(Clone, Debug)]
pub struct Block {
    pub flag: Flag,
    pub points: Vec<[Real; 3]>,
}

/// A planned sample. Millimeters inside the planner, meters once
/// [`plan`] returns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CartSample {
    pub x: Real,
    pub y: Real,
    pub z: Real,
    pub flag: Flag,
    pub v: Real,
}

/// Extent of one block inside [`Trajectory::samples`]. Transition blocks
/// are the synthesized seams (lift / traverse / plunge); content blocks
/// carry a single flag throughout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockSpan {
    pub len: usize,
    pub transition: bool,
}

/// The planned sample stream. Blocks are contiguous runs of `samples`;
/// the NaN separators of the text format exist only on disk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    pub samples: Vec<CartSample>,
    pub spans: Vec<BlockSpan>,
}

impl Trajectory {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate `(samples, is_transition)` per block.
    pub fn blocks(&self) -> impl Iterator<Item = (&[CartSample], bool)> {
        let mut offset = 0usize;
        self.spans.iter().map(move |span| {
            let slice = &self.samples[offset..offset + span.len];
            offset += span.len;
            (slice, span.transition)
        })
    }

    pub fn push_block(&mut self, rows: Vec<CartSample>, transition: bool) {
        if rows.is_empty() {
            return;
        }
        self.spans.push(BlockSpan {
            len: rows.len(),
            transition,
        });
        self.samples.extend(rows);
    }
}

// ==========================
// Block interpolation
// ==========================

/// Piecewise-linear lookup; clamps outside the table like the source data
/// demands (targets are arc lengths within [0, L]).
fn interp(xs: &[Real], ys: &[Real], t: Real) -> Real {
    let last = xs.len() - 1;
    if t <= xs[0] {
        return ys[0];
    }
    if t >= xs[last] {
        return ys[last];
    }
    let (mut lo, mut hi) = (0usize, last);
    while hi - lo > 1 {
        let mid = (hi + lo) / 2;
        if xs[mid] <= t { lo = mid } else { hi = mid }
    }
    let span = xs[hi] - xs[lo];
    let ratio = if span != 0.0 { (t - xs[lo]) / span } else { 0.0 };
    ys[lo] + ratio * (ys[hi] - ys[lo])
}

/// Resample each group at a uniform arc-length step.
///
/// Groups whose flags are all zero are skipped. CUT blocks are forced to
/// `z_cut`; every other block freezes at its first height. The final
/// sample always lands exactly on the contour endpoint.
pub fn interpolate(
    groups: &[Vec<RawPoint>],
    step: Real,
    z_cut: Real,
) -> Result<Vec<Block>, RouteError> {
    if !(step.is_finite() && step > 0.0) {
        return Err(RouteError::ParameterInvalid(format!(
            "interpolation step must be > 0, got {step}"
        )));
    }
    if !z_cut.is_finite() {
        return Err(RouteError::ParameterInvalid(format!(
            "z_cut must be finite, got {z_cut}"
        )));
    }

    let mut blocks = Vec::new();
    for group in groups {
        if group.is_empty() || group.iter().all(|p| p.flag == 0) {
            continue;
        }
        let flag = Flag::from_raw(group[0].flag).unwrap_or(Flag::Traverse);

        let clean: Vec<&RawPoint> = group
            .iter()
            .filter(|p| !p.x.is_nan() && !p.y.is_nan())
            .collect();
        if clean.is_empty() {
            continue;
        }
        // The whole block lives at one height.
        let z0 = if flag == Flag::Cut { z_cut } else { clean[0].z };

        let xs: Vec<Real> = clean.iter().map(|p| p.x).collect();
        let ys: Vec<Real> = clean.iter().map(|p| p.y).collect();
        let mut dist = Vec::with_capacity(xs.len());
        dist.push(0.0);
        for i in 1..xs.len() {
            let seg = ((xs[i] - xs[i - 1]).powi(2) + (ys[i] - ys[i - 1]).powi(2)).sqrt();
            dist.push(dist[i - 1] + seg);
        }
        let total = *dist.last().unwrap();

        let points: Vec<[Real; 3]> = if total < step || xs.len() < 2 {
            xs.iter().zip(&ys).map(|(&x, &y)| [x, y, z0]).collect()
        } else {
            let whole_steps = (total / step).floor() as usize;
            let mut targets: Vec<Real> = (0..=whole_steps).map(|k| k as Real * step).collect();
            if targets.last().copied().unwrap() + 1e-9 < total {
                targets.push(total);
            }
            targets
                .iter()
                .map(|&s| [interp(&dist, &xs, s), interp(&dist, &ys, s), z0])
                .collect()
        };

        blocks.push(Block { flag, points });
    }
    Ok(blocks)
}

// ==========================
// Transition synthesis + velocity profile
// ==========================

/// Vertical move sampled at `step` from `z_from` to `z_to`, excluding the
/// starting sample. Always at least one row, even for a zero travel.
fn axial_move(x: Real, y: Real, z_from: Real, z_to: Real, step: Real, v: Real) -> Vec<CartSample> {
    let n = (((z_to - z_from).abs() / step).ceil() as usize).max(2);
    (1..n)
        .map(|i| CartSample {
            x,
            y,
            z: z_from + (z_to - z_from) * i as Real / (n - 1) as Real,
            flag: Flag::Traverse,
            v,
        })
        .collect()
}

/// Desired per-sample velocity for a content block. CUT blocks travel at
/// traverse speed with the final sample pinned to zero (except the
/// opening block, whose pin comes from its plunge); REST stays at zero.
fn desired_block(block: &Block, v_traverse: Real, opening: bool) -> Vec<CartSample> {
    let n = block.points.len();
    block
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let v = match block.flag {
                Flag::Rest => 0.0,
                Flag::Cut if !opening && i == n - 1 => 0.0,
                _ => v_traverse,
            };
            CartSample {
                x: p[0],
                y: p[1],
                z: p[2],
                flag: block.flag,
                v,
            }
        })
        .collect()
}

fn profile_velocity(traj: &mut Trajectory, a_max: Real, dl: Real) {
    let n = traj.samples.len();
    if n == 0 {
        return;
    }
    let mut prof = vec![0.0; n];

    // Acceleration sweep. Stops: rest on either side, cut entry, or the
    // first traverse sample after a cut.
    for i in 1..n {
        let flag_i = traj.samples[i].flag;
        let flag_prev = traj.samples[i - 1].flag;
        let stop = flag_i == Flag::Rest
            || flag_prev == Flag::Rest
            || (flag_i == Flag::Cut && flag_prev != Flag::Cut)
            || (flag_i == Flag::Traverse && flag_prev == Flag::Cut);
        let (target, prev) = if stop { (0.0, 0.0) } else { (traj.samples[i].v, prof[i - 1]) };
        let reachable = (prev * prev + 2.0 * a_max * dl).max(0.0).sqrt();
        prof[i] = target.min(reachable);
    }

    // Deceleration sweep, mirrored; the stream always ends at rest.
    prof[n - 1] = 0.0;
    for i in (0..n - 1).rev() {
        let flag_i = traj.samples[i].flag;
        let flag_next = traj.samples[i + 1].flag;
        let stop = flag_i == Flag::Rest
            || flag_next == Flag::Rest
            || (flag_i == Flag::Cut && flag_next != Flag::Cut);
        if stop {
            prof[i] = 0.0;
            continue;
        }
        let limit = (prof[i + 1] * prof[i + 1] + 2.0 * a_max * dl).max(0.0).sqrt();
        prof[i] = prof[i].min(limit);
    }

    for (sample, v) in traj.samples.iter_mut().zip(prof) {
        sample.v = v;
    }
}

/// Assemble the full planned stream from interpolated blocks.
///
/// The opening block is emitted as-is followed by a plunge from its tail
/// to cutting height. Every later block gets a seam sample at the
/// previous position, a lift to `z_home` when the tail is off-home, a
/// horizontal traverse, and a plunge whose last sample is the cut-entry
/// pin (flag CUT, v = 0). After the last block the tool lifts home and a
/// terminal REST sample is appended. Positions convert to meters on emit
/// and velocities are floored to [`V_MIN`].
pub fn plan(blocks: &[Block], cfg: &PlannerConfig) -> Trajectory {
    let v_traverse = cfg.v_traverse();
    let step = cfg.step_mm;
    let z_home = cfg.z_home;
    let z_cut = cfg.z_cut;

    let mut traj = Trajectory::default();

    for block in blocks {
        if block.points.is_empty() {
            continue;
        }
        if traj.is_empty() {
            let tail = *block.points.last().unwrap();
            traj.push_block(desired_block(block, v_traverse, true), false);

            let mut plunge = axial_move(tail[0], tail[1], tail[2], z_cut, step, v_traverse);
            if let Some(last) = plunge.last_mut() {
                last.flag = Flag::Cut;
                last.v = 0.0;
            }
            traj.push_block(plunge, true);
        } else {
            let prev = *traj.samples.last().unwrap();
            let entry = block.points[0];
            let mut rows = Vec::new();

            // Seam marker at the previous stream tail.
            rows.push(CartSample {
                x: prev.x,
                y: prev.y,
                z: prev.z,
                flag: Flag::Traverse,
                v: v_traverse,
            });

            if (z_home - prev.z).abs() > 1e-9 {
                rows.extend(axial_move(prev.x, prev.y, prev.z, z_home, step, v_traverse));
            }

            let (dx, dy) = (entry[0] - prev.x, entry[1] - prev.y);
            let dist_xy = (dx * dx + dy * dy).sqrt();
            if dist_xy > 1e-9 {
                let n2 = ((dist_xy / step).ceil() as usize).max(2);
                for i in 1..=n2 {
                    let t = i as Real / n2 as Real;
                    rows.push(CartSample {
                        x: prev.x + t * dx,
                        y: prev.y + t * dy,
                        z: z_home,
                        flag: Flag::Traverse,
                        v: v_traverse,
                    });
                }
            }

            if (z_home - entry[2]).abs() > 1e-6 {
                let mut down = axial_move(entry[0], entry[1], z_home, entry[2], step, v_traverse);
                if let Some(last) = down.last_mut() {
                    last.flag = Flag::Cut;
                    last.v = 0.0;
                }
                rows.extend(down);
            }

            traj.push_block(rows, true);
            traj.push_block(desired_block(block, v_traverse, false), false);
        }
    }

    if let Some(last) = traj.samples.last().copied() {
        if (last.z - z_home).abs() > 1e-9 && last.flag != Flag::Rest {
            let lift = axial_move(last.x, last.y, last.z, z_home, step, v_traverse);
            traj.push_block(lift, true);
        }
        let tail = *traj.samples.last().unwrap();
        if tail.flag != Flag::Rest {
            traj.push_block(
                vec![CartSample {
                    x: tail.x,
                    y: tail.y,
                    z: z_home,
                    flag: Flag::Rest,
                    v: 0.0,
                }],
                false,
            );
        }
    }

    profile_velocity(&mut traj, cfg.accel(), cfg.dl());

    for sample in &mut traj.samples {
        sample.x /= METER;
        sample.y /= METER;
        sample.z /= METER;
        sample.v = if sample.v.is_finite() && sample.v >= V_MIN {
            sample.v
        } else {
            V_MIN
        };
    }
    traj
}
