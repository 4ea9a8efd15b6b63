//! Containment hierarchy over promoted polygons.
//!
//! For every polygon, the parent is the *smallest-area* polygon strictly
//! containing its representative interior point. The parent relation forms
//! a forest; each root with its transitive descendants is one supergroup,
//! processed together so holes are cut before the boundary that encloses
//! them.

use crate::float_types::Real;
use geo::{Area, BoundingRect, Contains, InteriorPoint, Point, Polygon as GeoPolygon};

/// Parent forest plus the supergroup partition.
#[derive(Clone, Debug, Default)]
pub struct Hierarchy {
    /// `parents[i]` is the parent polygon index, or -1 for roots.
    pub parents: Vec<isize>,
    /// `(root, members)` in first-encounter order; members include the
    /// root itself.
    pub groups: Vec<(usize, Vec<usize>)>,
}

/// Build the containment forest. O(n²) with a bounding-box prefilter,
/// which is plenty for drawing-sized polygon counts.
pub fn build_hierarchy(polys: &[GeoPolygon<Real>]) -> Hierarchy {
    let n = polys.len();
    if n == 0 {
        return Hierarchy::default();
    }

    let areas: Vec<Real> = polys.iter().map(|p| p.unsigned_area()).collect();
    let reps: Vec<Point<Real>> = polys
        .iter()
        .map(|p| {
            p.interior_point()
                .unwrap_or_else(|| Point::from(p.exterior().0[0]))
        })
        .collect();
    let bounds: Vec<_> = polys.iter().map(|p| p.bounding_rect()).collect();

    let mut idx_by_area: Vec<usize> = (0..n).collect();
    idx_by_area.sort_by(|&a, &b| {
        areas[a]
            .partial_cmp(&areas[b])
            .unwrap_or(core::cmp::Ordering::Equal)
    });

    let mut parents = vec![-1isize; n];
    for i in 0..n {
        let rep = reps[i];
        // Only strictly larger polygons whose bbox holds the
        // representative point can contain it.
        let mut candidates: Vec<(Real, usize)> = Vec::new();
        for &j in &idx_by_area {
            if j == i || areas[j] <= areas[i] {
                continue;
            }
            let Some(rect) = bounds[j] else { continue };
            if rep.x() < rect.min().x
                || rep.x() > rect.max().x
                || rep.y() < rect.min().y
                || rep.y() > rect.max().y
            {
                continue;
            }
            if polys[j].contains(&rep) {
                candidates.push((areas[j], j));
            }
        }
        if let Some(&(_, parent)) = candidates.iter().min_by(|a, b| {
            a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal)
        }) {
            parents[i] = parent as isize;
        }
    }

    // Root walk with a hop budget. Correct area ordering makes cycles
    // impossible, but a mutually-containing pair must not hang the walk;
    // the offender has its parent cleared instead.
    let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
    for i in 0..n {
        let mut root = i;
        let mut hops = 0usize;
        while parents[root] != -1 && hops <= n {
            root = parents[root] as usize;
            hops += 1;
        }
        if hops > n {
            root = i;
            parents[i] = -1;
        }
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(i),
            None => groups.push((root, vec![i])),
        }
    }

    Hierarchy { parents, groups }
}
