//! One-shot pipeline entry point: entities in, route + cartesian
//! trajectory + joint stream out.
//!
//! A [`Pipeline`] is a pure function of its configuration and inputs; it
//! keeps no state between invocations, so callers may hold one per task
//! or rebuild it freely.

use crate::cad::{self, CadEntity, Stroke};
use crate::config::{PipelineConfig, TopologyConfig};
use crate::errors::RouteError;
use crate::float_types::Real;
use crate::kinematics::{self, JointDynamics, JointSample};
use crate::planner::{self, RawPoint, Trajectory};
use crate::topology::{self, Route};
use geo::LineString;
use log::debug;

/// Everything one invocation produces.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub route: Route,
    /// Planned cartesian stream, meters and m/s.
    pub trajectory: Trajectory,
    /// The trajectory in joint space.
    pub joints: Vec<JointSample>,
    /// Time stamps and joint derivatives.
    pub dynamics: JointDynamics,
}

#[derive(Clone, Debug)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate and capture the configuration.
    pub fn new(config: PipelineConfig) -> Result<Self, RouteError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Topology only: flatten, classify, reconstruct and sequence.
    pub fn route(&self, entities: &[CadEntity]) -> Result<Route, RouteError> {
        if entities.is_empty() {
            return Err(RouteError::EmptyDrawing);
        }
        let topo = &self.config.topology;

        let strokes = cad::flatten_entities(entities, topo.interpolation_points);
        if strokes.is_empty() {
            return Err(RouteError::EmptyDrawing);
        }
        debug!("flattened {} of {} entities", strokes.len(), entities.len());

        let (cut, nocut) = cad::split_by_class(strokes)?;
        debug!("classified {} cut / {} no-cut strokes", cut.len(), nocut.len());

        let (cut_rings, cut_open) = reconstruct(cut, topo);
        debug!("cut class: {} rings, {} open lines", cut_rings.len(), cut_open.len());
        let cut_groups =
            topology::build_cut_sequence(&cut_rings, &cut_open, topo.simplify_tolerance);

        let (nocut_rings, nocut_open) = reconstruct(nocut, topo);
        let nocut_groups = topology::build_nocut_sequence(&nocut_rings, &nocut_open);

        Ok(Route {
            cut: cut_groups,
            nocut: nocut_groups,
        })
    }

    /// Run the whole pipeline.
    pub fn run(&self, entities: &[CadEntity]) -> Result<PipelineOutput, RouteError> {
        let route = self.route(entities)?;
        let raw = raw_groups(&route);
        let blocks =
            planner::interpolate(&raw, self.config.planner.step_mm, self.config.planner.z_cut)?;
        let trajectory = planner::plan(&blocks, &self.config.planner);
        debug!(
            "planned {} samples in {} blocks",
            trajectory.samples.len(),
            trajectory.spans.len()
        );

        let arm = &self.config.arm;
        let joints = kinematics::inverse_trajectory(&trajectory, arm.l1, arm.l2);
        let dynamics = kinematics::differentiate(&joints, self.config.planner.step_mm, arm);

        Ok(PipelineOutput {
            route,
            trajectory,
            joints,
            dynamics,
        })
    }
}

/// Snap, merge and extract rings for one class of strokes.
fn reconstruct(
    strokes: Vec<Stroke>,
    cfg: &TopologyConfig,
) -> (Vec<LineString<Real>>, Vec<LineString<Real>>) {
    let mut lines: Vec<LineString<Real>> = strokes.into_iter().map(|s| s.line).collect();
    if lines.is_empty() {
        return (Vec::new(), Vec::new());
    }
    topology::snap_endpoints(&mut lines, cfg.tol_topo);
    let merged = topology::merge_chains(lines);
    let extraction = topology::extract_rings_and_open(&merged, cfg.min_ring_len);
    (extraction.rings, extraction.open_lines)
}

/// Raw interpolator input: one group per chain, flag 1 for CUT chains and
/// 0 for NO_CUT, all at height zero.
pub fn raw_groups(route: &Route) -> Vec<Vec<RawPoint>> {
    let mut groups = Vec::new();
    for (class_groups, flag) in [(&route.cut, 1), (&route.nocut, 0)] {
        for group in class_groups {
            for chain in &group.contours {
                groups.push(
                    chain
                        .0
                        .iter()
                        .map(|c| RawPoint::new(c.x, c.y, 0.0, flag))
                        .collect(),
                );
            }
        }
    }
    groups
}
