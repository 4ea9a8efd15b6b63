//! Converts planar CAD line art into an ordered, time-parameterized toolpath
//! for a cylindrical-elbow **SCARA** cutter (one prismatic Z axis, two
//! revolute arms).
//!
//! The pipeline reconstructs topology from fragmented strokes (endpoint
//! snapping, chain merging, ring extraction), builds the interior-before-
//! exterior containment hierarchy, sequences contours to minimize air
//! travel, resamples everything at a fixed arc-length step with lift /
//! traverse / plunge transitions and a trapezoidal velocity profile, and
//! finally converts the cartesian stream to joint space with per-sample
//! velocities and accelerations.
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - [**dxf-io**](https://en.wikipedia.org/wiki/AutoCAD_DXF): `.dxf` import
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64

#![forbid(unsafe_code)]
#![deny(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod cad;
pub mod config;
pub mod errors;
pub mod float_types;
pub mod io;
pub mod kinematics;
pub mod pipeline;
pub mod planner;
pub mod topology;

#[cfg(any(
    all(feature = "f64", feature = "f32"),
    not(any(feature = "f64", feature = "f32"))
))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");
