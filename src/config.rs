//! Pipeline parameters, grouped per stage and validated up front.
//!
//! Everything the stages need travels through these structs; there is no
//! module-level mutable configuration anywhere in the crate.

use crate::errors::RouteError;
use crate::float_types::{METER, MM_PER_MIN_TO_M_PER_S, Real};

/// Knobs for topology reconstruction (§snap/merge/ring stages).
#[derive(Clone, Debug)]
pub struct TopologyConfig {
    /// Endpoint-snap tolerance in mm. Endpoints closer than this end up on
    /// the same cluster centroid.
    pub tol_topo: Real,
    /// Sample count for full circles and splines; arcs use
    /// `max(10, interpolation_points / 2)`.
    pub interpolation_points: usize,
    /// Rings not longer than this (mm) are discarded.
    pub min_ring_len: Real,
    /// Douglas-Peucker tolerance (mm) applied when promoting rings to
    /// polygons. `<= 0` disables simplification.
    pub simplify_tolerance: Real,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            tol_topo: 0.05,
            interpolation_points: 200,
            min_ring_len: 1e-6,
            simplify_tolerance: 0.01,
        }
    }
}

/// Knobs for interpolation, transition synthesis and the velocity profile.
///
/// Linear quantities are millimeters; feed rates mm/min; acceleration
/// mm/s². The planner converts to meters on emit.
#[derive(Clone, Debug)]
pub struct PlannerConfig {
    /// Arc-length resampling step Δs (mm).
    pub step_mm: Real,
    /// Safe-travel height (mm).
    pub z_home: Real,
    /// Cutting height (mm).
    pub z_cut: Real,
    /// Cut feed rate (mm/min).
    pub speed_cut: Real,
    /// Traverse feed rate (mm/min).
    pub speed_traverse: Real,
    /// Cartesian acceleration limit (mm/s²).
    pub accel_max: Real,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            step_mm: 1.0,
            z_home: 10.0,
            z_cut: 0.0,
            speed_cut: 5000.0,
            speed_traverse: 15000.0,
            accel_max: 2000.0,
        }
    }
}

impl PlannerConfig {
    /// Cut feed in m/s.
    pub fn v_cut(&self) -> Real {
        self.speed_cut * MM_PER_MIN_TO_M_PER_S
    }

    /// Traverse feed in m/s.
    pub fn v_traverse(&self) -> Real {
        self.speed_traverse * MM_PER_MIN_TO_M_PER_S
    }

    /// Acceleration limit in m/s².
    pub fn accel(&self) -> Real {
        self.accel_max / METER
    }

    /// Sample spacing in meters.
    pub fn dl(&self) -> Real {
        self.step_mm / METER
    }
}

/// Arm geometry and joint-space limits.
#[derive(Clone, Debug)]
pub struct ArmConfig {
    /// Inner arm length (m).
    pub l1: Real,
    /// Outer arm length (m).
    pub l2: Real,
    /// Minimum sampling rate Fs (Hz) used when the commanded velocity is
    /// too small to derive a time step.
    pub sample_rate: Real,
    /// Optional per-axis joint velocity clamp (d1 m/s, θ rad/s).
    pub qdot_max: Option<[Real; 3]>,
    /// Optional per-axis joint acceleration clamp.
    pub qddot_max: Option<[Real; 3]>,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            l1: 0.5,
            l2: 0.45,
            sample_rate: 200.0,
            qdot_max: None,
            qddot_max: None,
        }
    }
}

/// Everything a single pipeline invocation needs.
#[derive(Clone, Debug, Default)]
pub struct PipelineConfig {
    pub topology: TopologyConfig,
    pub planner: PlannerConfig,
    pub arm: ArmConfig,
    /// Write the topology-only stream in meters (true) or mm (false). The
    /// planner stream is always meters.
    pub export_in_meters: bool,
}

impl PipelineConfig {
    /// Reject bad parameters before any geometry is touched.
    pub fn validate(&self) -> Result<(), RouteError> {
        fn positive(name: &str, v: Real) -> Result<(), RouteError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(RouteError::ParameterInvalid(format!("{name} must be > 0, got {v}")))
            }
        }
        fn finite(name: &str, v: Real) -> Result<(), RouteError> {
            if v.is_finite() {
                Ok(())
            } else {
                Err(RouteError::ParameterInvalid(format!("{name} must be finite, got {v}")))
            }
        }

        positive("tol_topo", self.topology.tol_topo)?;
        if self.topology.interpolation_points < 2 {
            return Err(RouteError::ParameterInvalid(format!(
                "interpolation_points must be >= 2, got {}",
                self.topology.interpolation_points
            )));
        }
        positive("min_ring_len", self.topology.min_ring_len)?;
        finite("simplify_tolerance", self.topology.simplify_tolerance)?;

        positive("step_mm", self.planner.step_mm)?;
        finite("z_home", self.planner.z_home)?;
        finite("z_cut", self.planner.z_cut)?;
        positive("speed_cut", self.planner.speed_cut)?;
        positive("speed_traverse", self.planner.speed_traverse)?;
        positive("accel_max", self.planner.accel_max)?;

        positive("l1", self.arm.l1)?;
        positive("l2", self.arm.l2)?;
        positive("sample_rate", self.arm.sample_rate)?;
        for (name, clamp) in [("qdot_max", &self.arm.qdot_max), ("qddot_max", &self.arm.qddot_max)]
        {
            if let Some(axes) = clamp {
                for v in axes {
                    positive(name, *v)?;
                }
            }
        }
        Ok(())
    }
}
