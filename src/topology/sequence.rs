//! Cut sequencing: turn rings and open lines into an ordered list of
//! contour groups, holes before boundaries, near things before far.

use super::{build_hierarchy, ring_to_polygon};
use crate::float_types::Real;
use geo::{Centroid, EuclideanLength, LineString};

/// One unit of sequencing: either a supergroup's contours (sorted so
/// every hole precedes the boundary that contains it) or a single
/// leftover ring / open line.
#[derive(Clone, Debug)]
pub struct ContourGroup {
    pub contours: Vec<LineString<Real>>,
}

/// The full ordered route. CUT groups are always emitted before NO_CUT
/// groups; the two classes are never interleaved.
#[derive(Clone, Debug, Default)]
pub struct Route {
    pub cut: Vec<ContourGroup>,
    pub nocut: Vec<ContourGroup>,
}

impl Route {
    pub fn is_empty(&self) -> bool {
        self.cut.is_empty() && self.nocut.is_empty()
    }
}

fn length(ls: &LineString<Real>) -> Real {
    ls.euclidean_length()
}

fn sort_by_length(contours: &mut [LineString<Real>]) {
    contours.sort_by(|a, b| {
        length(a)
            .partial_cmp(&length(b))
            .unwrap_or(core::cmp::Ordering::Equal)
    });
}

fn group_rep(group: &ContourGroup) -> (Real, Real) {
    let Some(first) = group.contours.first() else {
        return (0.0, 0.0);
    };
    match first.centroid() {
        Some(c) => (c.x(), c.y()),
        None => first.0.first().map_or((0.0, 0.0), |c| (c.x, c.y)),
    }
}

/// Greedy nearest-representative ordering, starting from the group
/// closest to the origin. Ties keep list order.
fn greedy_order(groups: Vec<ContourGroup>) -> Vec<ContourGroup> {
    if groups.len() < 2 {
        return groups;
    }
    let reps: Vec<(Real, Real)> = groups.iter().map(group_rep).collect();
    let mut slots: Vec<Option<ContourGroup>> = groups.into_iter().map(Some).collect();

    let mut ordered = Vec::with_capacity(slots.len());
    let mut current = (0.0, 0.0);
    for _ in 0..slots.len() {
        let mut best = usize::MAX;
        let mut best_d = Real::INFINITY;
        for (i, slot) in slots.iter().enumerate() {
            if slot.is_none() {
                continue;
            }
            let d = ((reps[i].0 - current.0).powi(2) + (reps[i].1 - current.1).powi(2)).sqrt();
            if d < best_d {
                best_d = d;
                best = i;
            }
        }
        current = reps[best];
        ordered.push(slots[best].take().unwrap());
    }
    ordered
}

/// Sequence the CUT class.
///
/// Rings are promoted to polygons (tracking each polygon's source ring in
/// a parallel index table), grouped by containment, and each supergroup's
/// contours are sorted ascending by length. Rings that produced no
/// polygon and all open lines follow as singleton groups, the latter
/// sorted by length; the final group list is then ordered greedily by
/// nearest representative point.
pub fn build_cut_sequence(
    rings: &[LineString<Real>],
    open_lines: &[LineString<Real>],
    simplify_tolerance: Real,
) -> Vec<ContourGroup> {
    let mut polys = Vec::new();
    let mut source_ring = Vec::new();
    for (ri, ring) in rings.iter().enumerate() {
        if let Some(poly) = ring_to_polygon(ring, simplify_tolerance) {
            polys.push(poly);
            source_ring.push(ri);
        }
    }

    let hierarchy = build_hierarchy(&polys);

    let mut groups: Vec<ContourGroup> = Vec::new();
    for (_, members) in &hierarchy.groups {
        let mut contours: Vec<LineString<Real>> = Vec::new();
        for &m in members {
            contours.push(polys[m].exterior().clone());
            contours.extend(polys[m].interiors().iter().cloned());
        }
        sort_by_length(&mut contours);
        groups.push(ContourGroup { contours });
    }

    // Rings that never became a polygon still get cut, one per group.
    let mut used = vec![false; rings.len()];
    for &ri in &source_ring {
        used[ri] = true;
    }
    for (ri, ring) in rings.iter().enumerate() {
        if !used[ri] {
            groups.push(ContourGroup {
                contours: vec![ring.clone()],
            });
        }
    }

    let mut open_sorted: Vec<LineString<Real>> = open_lines.to_vec();
    sort_by_length(&mut open_sorted);
    groups.extend(open_sorted.into_iter().map(|line| ContourGroup {
        contours: vec![line],
    }));

    greedy_order(groups)
}

/// Sequence the NO_CUT class: every ring as a singleton, open lines by
/// length, same greedy ordering within the class.
pub fn build_nocut_sequence(
    rings: &[LineString<Real>],
    open_lines: &[LineString<Real>],
) -> Vec<ContourGroup> {
    let mut groups: Vec<ContourGroup> = rings
        .iter()
        .map(|r| ContourGroup {
            contours: vec![r.clone()],
        })
        .collect();

    let mut open_sorted: Vec<LineString<Real>> = open_lines.to_vec();
    sort_by_length(&mut open_sorted);
    groups.extend(open_sorted.into_iter().map(|line| ContourGroup {
        contours: vec![line],
    }));

    greedy_order(groups)
}
