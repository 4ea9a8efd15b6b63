//! Endpoint snapping: cluster every stroke endpoint by proximity and
//! rewrite each endpoint to its cluster centroid, so topologically
//! adjacent strokes share bit-exact vertices.
//!
//! Density clustering with a minimum population of one degenerates to
//! single linkage at the snap radius, so no general clusterer is needed:
//! a union-find over spatial-hash bins does the same job deterministically.

use crate::float_types::Real;
use geo::LineString;
use hashbrown::HashMap;

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Lower root wins so labels stay stable across runs.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

/// Snap all endpoints of `lines` within `tol` of each other to their
/// common centroid. Interior vertices are untouched.
///
/// Returns one cluster label per endpoint, in `(first, last)` order per
/// line — two endpoints within `tol` are guaranteed to carry the same
/// label and, afterwards, identical coordinates.
pub fn snap_endpoints(lines: &mut [LineString<Real>], tol: Real) -> Vec<usize> {
    let n = lines.len() * 2;
    if n == 0 {
        return Vec::new();
    }

    // Endpoints in (first, last) order, matching the label layout.
    let endpoints: Vec<(Real, Real)> = lines
        .iter()
        .flat_map(|ls| {
            let first = ls.0[0];
            let last = ls.0[ls.0.len() - 1];
            [(first.x, first.y), (last.x, last.y)]
        })
        .collect();

    // Hash each endpoint into a grid of cell size `tol`; candidates for
    // linkage can only live in the 3x3 neighborhood of a point's cell.
    let cell = |v: Real| (v / tol).floor() as i64;
    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, &(x, y)) in endpoints.iter().enumerate() {
        grid.entry((cell(x), cell(y))).or_default().push(i);
    }

    let tol_sq = tol * tol;
    let mut sets = DisjointSet::new(n);
    for (i, &(x, y)) in endpoints.iter().enumerate() {
        let (cx, cy) = (cell(x), cell(y));
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &j in bucket {
                    if j <= i {
                        continue;
                    }
                    let (ox, oy) = endpoints[j];
                    if (x - ox) * (x - ox) + (y - oy) * (y - oy) <= tol_sq {
                        sets.union(i, j);
                    }
                }
            }
        }
    }

    // Centroid per cluster root.
    let mut sums: HashMap<usize, (Real, Real, usize)> = HashMap::new();
    let mut labels = Vec::with_capacity(n);
    for (i, &(x, y)) in endpoints.iter().enumerate() {
        let root = sets.find(i);
        labels.push(root);
        let entry = sums.entry(root).or_insert((0.0, 0.0, 0));
        entry.0 += x;
        entry.1 += y;
        entry.2 += 1;
    }

    for (li, line) in lines.iter_mut().enumerate() {
        let len = line.0.len();
        for (end, slot) in [(0usize, 2 * li), (len - 1, 2 * li + 1)] {
            let (sx, sy, count) = sums[&labels[slot]];
            line.0[end].x = sx / count as Real;
            line.0[end].y = sy / count as Real;
        }
    }
    labels
}
