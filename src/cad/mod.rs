//! CAD primitives, flattening to polyline strokes, and CUT/NO_CUT
//! classification.
//!
//! The decoder collaborator (see [`crate::io::dxf`] for the DXF one)
//! delivers [`CadEntity`] values; everything downstream works on the
//! flattened [`Stroke`]s.

use crate::errors::RouteError;
use crate::float_types::{Real, TAU};
use geo::{Coord, LineString};
use log::warn;
use thiserror::Error;

pub mod spline;

/// Geometry payload of a drawing entity, one variant per supported kind.
#[derive(Clone, Debug)]
pub enum CadPrimitive {
    /// Straight segment between two endpoints.
    Line { start: Coord<Real>, end: Coord<Real> },
    /// Vertex list of any polyline variant, already projected to 2D.
    Polyline { vertices: Vec<Coord<Real>> },
    Circle {
        center: Coord<Real>,
        radius: Real,
    },
    /// Angles in degrees, counterclockwise from +X, as decoders deliver them.
    Arc {
        center: Coord<Real>,
        radius: Real,
        start_angle: Real,
        end_angle: Real,
    },
    /// Fit points are preferred; control points are the fallback.
    Spline {
        fit_points: Vec<Coord<Real>>,
        control_points: Vec<Coord<Real>>,
    },
}

impl CadPrimitive {
    pub const fn kind(&self) -> &'static str {
        match self {
            CadPrimitive::Line { .. } => "LINE",
            CadPrimitive::Polyline { .. } => "POLYLINE",
            CadPrimitive::Circle { .. } => "CIRCLE",
            CadPrimitive::Arc { .. } => "ARC",
            CadPrimitive::Spline { .. } => "SPLINE",
        }
    }
}

/// Entity color after the decoder has resolved "by-layer" indirection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityColor {
    /// AutoCAD color index; 7 when the entity carries none.
    Aci(i16),
    /// 24-bit true color.
    Rgb(u8, u8, u8),
}

/// One drawing entity as handed over by the decoder.
#[derive(Clone, Debug)]
pub struct CadEntity {
    pub primitive: CadPrimitive,
    pub color: EntityColor,
    pub layer: String,
}

/// Whether a stroke removes material or is annotation to keep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CutClass {
    Cut,
    NoCut,
}

/// A flattened entity: a polyline sample plus the metadata classification
/// needs. Holds at least two points with no consecutive duplicates.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub line: LineString<Real>,
    pub color: EntityColor,
    pub layer: String,
}

impl Stroke {
    pub fn class(&self) -> CutClass {
        classify(self.color, &self.layer)
    }
}

/// Why a single entity failed to flatten. These are logged and dropped by
/// [`flatten_entities`]; the pipeline continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlattenError {
    #[error("fewer than 2 distinct points after sampling")]
    Degenerate,
    #[error("spline has neither 2 fit points nor 2 control points")]
    SplineUnderdetermined,
}

fn linspace(a: Real, b: Real, n: usize) -> impl Iterator<Item = Real> {
    let span = b - a;
    let last = (n - 1).max(1) as Real;
    (0..n).map(move |i| a + span * (i as Real) / last)
}

/// Reduce one entity to a polyline sample.
///
/// `resolution` is the interpolation resolution: full circles and splines
/// get `resolution` samples, arcs `max(10, resolution / 2)`.
pub fn flatten(entity: &CadEntity, resolution: usize) -> Result<Stroke, FlattenError> {
    let raw: Vec<Coord<Real>> = match &entity.primitive {
        CadPrimitive::Line { start, end } => vec![*start, *end],
        CadPrimitive::Polyline { vertices } => vertices.clone(),
        CadPrimitive::Circle { center, radius } => linspace(0.0, TAU, resolution)
            .map(|t| Coord {
                x: center.x + radius * t.cos(),
                y: center.y + radius * t.sin(),
            })
            .collect(),
        CadPrimitive::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => {
            let a1 = start_angle.to_radians();
            let mut a2 = end_angle.to_radians();
            if a2 < a1 {
                a2 += TAU;
            }
            linspace(a1, a2, (resolution / 2).max(10))
                .map(|t| Coord {
                    x: center.x + radius * t.cos(),
                    y: center.y + radius * t.sin(),
                })
                .collect()
        },
        CadPrimitive::Spline {
            fit_points,
            control_points,
        } => {
            let through = if fit_points.len() >= 2 {
                fit_points
            } else {
                control_points
            };
            spline::sample_through(through, resolution)
                .ok_or(FlattenError::SplineUnderdetermined)?
        },
    };

    // Collapse consecutive duplicates.
    let mut pts: Vec<Coord<Real>> = Vec::with_capacity(raw.len());
    for p in raw {
        if pts.last() != Some(&p) {
            pts.push(p);
        }
    }
    if pts.len() < 2 {
        return Err(FlattenError::Degenerate);
    }

    Ok(Stroke {
        line: LineString::new(pts),
        color: entity.color,
        layer: entity.layer.clone(),
    })
}

/// Flatten a whole drawing; unparseable entities are logged and dropped.
pub fn flatten_entities(entities: &[CadEntity], resolution: usize) -> Vec<Stroke> {
    let mut strokes = Vec::with_capacity(entities.len());
    for entity in entities {
        match flatten(entity, resolution) {
            Ok(stroke) => strokes.push(stroke),
            Err(err) => warn!("dropping {} entity: {err}", entity.primitive.kind()),
        }
    }
    strokes
}

/// ACI 2, or a true color close to yellow.
fn is_yellow(color: EntityColor) -> bool {
    match color {
        EntityColor::Aci(index) => index == 2,
        EntityColor::Rgb(r, g, b) => r >= 200 && g >= 200 && b <= 120,
    }
}

/// Deterministic CUT/NO_CUT rule: yellow entities and layers whose name
/// contains "NO" (case-insensitive) are annotations.
pub fn classify(color: EntityColor, layer: &str) -> CutClass {
    if is_yellow(color) || layer.to_uppercase().contains("NO") {
        CutClass::NoCut
    } else {
        CutClass::Cut
    }
}

/// Split strokes into (cut, no-cut). An empty cut class is a hard error:
/// there is nothing to machine.
pub fn split_by_class(strokes: Vec<Stroke>) -> Result<(Vec<Stroke>, Vec<Stroke>), RouteError> {
    let mut cut = Vec::new();
    let mut nocut = Vec::new();
    for stroke in strokes {
        match stroke.class() {
            CutClass::Cut => cut.push(stroke),
            CutClass::NoCut => nocut.push(stroke),
        }
    }
    if cut.is_empty() {
        return Err(RouteError::NoCuttable);
    }
    Ok((cut, nocut))
}
