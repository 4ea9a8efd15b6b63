//! Ring → polygon promotion: closure, Douglas-Peucker simplification,
//! self-repair, validity gate.

use crate::float_types::Real;
use geo::orient::Direction;
use geo::{Area, LineString, Orient, Polygon as GeoPolygon, Simplify, Validation};

/// Promote a ring to a simple polygon.
///
/// Simplification runs only for a positive tolerance. Invalid polygons go
/// through one normalisation pass (duplicate and spike removal, closure,
/// reorientation); whatever is still invalid, or has no area, is
/// discarded.
pub fn ring_to_polygon(
    ring: &LineString<Real>,
    simplify_tolerance: Real,
) -> Option<GeoPolygon<Real>> {
    let mut coords = ring.0.clone();
    if coords.len() < 3 {
        return None;
    }
    if coords.first() != coords.last() {
        coords.push(coords[0]);
    }

    let mut poly = GeoPolygon::new(LineString::new(coords), vec![]);
    if simplify_tolerance > 0.0 {
        poly = poly.simplify(&simplify_tolerance);
    }
    if !poly.is_valid() {
        poly = repair(&poly);
    }
    (poly.is_valid() && poly.unsigned_area() > 0.0).then_some(poly)
}

/// Normalise the exterior ring in place of a zero-distance buffer: strip
/// consecutive duplicates and out-and-back spikes, re-close, and orient
/// exteriors counterclockwise.
fn repair(poly: &GeoPolygon<Real>) -> GeoPolygon<Real> {
    let mut pts: Vec<geo::Coord<Real>> = poly.exterior().0.clone();
    // Work on the open ring.
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }

    loop {
        let n = pts.len();
        if n < 3 {
            break;
        }
        let mut changed = false;

        // Consecutive duplicates, cyclically.
        let mut deduped: Vec<geo::Coord<Real>> = Vec::with_capacity(n);
        for p in &pts {
            if deduped.last() != Some(p) {
                deduped.push(*p);
            }
        }
        if deduped.len() > 1 && deduped.first() == deduped.last() {
            deduped.pop();
        }
        if deduped.len() != pts.len() {
            changed = true;
        }
        pts = deduped;

        // A spike is a vertex whose neighbors coincide; drop it with one
        // of the duplicated neighbors.
        let n = pts.len();
        if n >= 3 {
            let mut spike = None;
            for i in 0..n {
                if pts[(i + n - 1) % n] == pts[(i + 1) % n] {
                    spike = Some(i);
                    break;
                }
            }
            if let Some(i) = spike {
                let neighbor = (i + 1) % n;
                let (first, second) = if i < neighbor { (i, neighbor) } else { (neighbor, i) };
                pts.remove(second);
                pts.remove(first);
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    if pts.len() < 3 {
        // Degenerate; hand back an empty polygon that fails the area gate.
        return GeoPolygon::new(LineString::new(Vec::new()), vec![]);
    }
    pts.push(pts[0]);
    GeoPolygon::new(LineString::new(pts), vec![]).orient(Direction::Default)
}
