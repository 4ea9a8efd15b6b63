//! Ring extraction: trace the enclosed faces of the merged chain graph
//! and split everything else into candidate rings and open lines.
//!
//! The face tracer is the crate's stand-in for a planar-arrangement
//! polygonizer. Snapping guarantees chains only touch at shared nodes, so
//! no intersection noding is required: build the segment graph, prune
//! dangles, sort the half-edges around each node by angle, and walk each
//! face by always taking the next edge clockwise from the reversed
//! incoming edge. Bounded faces come out counterclockwise with positive
//! signed area; the unbounded face is the one negative cycle and is
//! dropped.
//!
//! A figure-eight therefore yields its two lobes as separate rings — the
//! tracer has no notion of a combined outer boundary.

use super::node_key;
use crate::float_types::Real;
use geo::{Centroid, EuclideanLength, LineString};
use hashbrown::HashMap;

/// Output of ring extraction.
#[derive(Clone, Debug, Default)]
pub struct RingExtraction {
    /// Closed rings, first point equal to the last.
    pub rings: Vec<LineString<Real>>,
    /// Chains that neither close on themselves nor bound a face.
    pub open_lines: Vec<LineString<Real>>,
}

struct SegmentGraph {
    coords: Vec<geo::Coord<Real>>,
    /// Endpoint vertex ids per undirected edge; edge `e` owns half-edges
    /// `2e` (u→v) and `2e+1` (v→u).
    edges: Vec<(usize, usize)>,
    /// Chain that contributed each edge.
    edge_chain: Vec<usize>,
    alive: Vec<bool>,
}

impl SegmentGraph {
    fn build(chains: &[LineString<Real>]) -> Self {
        let mut index: HashMap<(u64, u64), usize> = HashMap::new();
        let mut coords = Vec::new();
        let mut edges = Vec::new();
        let mut edge_chain = Vec::new();

        for (ci, chain) in chains.iter().enumerate() {
            let mut prev: Option<usize> = None;
            for coord in &chain.0 {
                let vid = *index.entry(node_key(coord)).or_insert_with(|| {
                    coords.push(*coord);
                    coords.len() - 1
                });
                if let Some(p) = prev {
                    if p != vid {
                        edges.push((p, vid));
                        edge_chain.push(ci);
                    }
                }
                prev = Some(vid);
            }
        }

        let alive = vec![true; edges.len()];
        Self {
            coords,
            edges,
            edge_chain,
            alive,
        }
    }

    /// Iteratively strip edges hanging off degree-1 vertices; dangles can
    /// never bound a face.
    fn prune_dangles(&mut self) {
        let n = self.coords.len();
        let mut degree = vec![0usize; n];
        let mut incident: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (e, &(u, v)) in self.edges.iter().enumerate() {
            degree[u] += 1;
            degree[v] += 1;
            incident[u].push(e);
            incident[v].push(e);
        }

        let mut stack: Vec<usize> = (0..n).filter(|&v| degree[v] == 1).collect();
        while let Some(v) = stack.pop() {
            if degree[v] != 1 {
                continue;
            }
            let Some(&e) = incident[v].iter().find(|&&e| self.alive[e]) else {
                continue;
            };
            self.alive[e] = false;
            let (a, b) = self.edges[e];
            degree[a] -= 1;
            degree[b] -= 1;
            let other = if a == v { b } else { a };
            if degree[other] == 1 {
                stack.push(other);
            }
        }
    }

    /// Walk every face. Returns the rings of the bounded (positive-area)
    /// faces and marks which edges those faces used.
    fn trace_faces(&self) -> (Vec<LineString<Real>>, Vec<bool>) {
        // Outgoing half-edges per vertex, sorted counterclockwise.
        let mut out: Vec<Vec<usize>> = vec![Vec::new(); self.coords.len()];
        for (e, &(u, v)) in self.edges.iter().enumerate() {
            if self.alive[e] {
                out[u].push(2 * e);
                out[v].push(2 * e + 1);
            }
        }
        let tail = |h: usize| {
            let (u, v) = self.edges[h / 2];
            if h % 2 == 0 { u } else { v }
        };
        let head = |h: usize| {
            let (u, v) = self.edges[h / 2];
            if h % 2 == 0 { v } else { u }
        };
        for (v, list) in out.iter_mut().enumerate() {
            let origin = self.coords[v];
            list.sort_unstable_by(|&a, &b| {
                let pa = self.coords[head(a)];
                let pb = self.coords[head(b)];
                let aa = (pa.y - origin.y).atan2(pa.x - origin.x);
                let ab = (pb.y - origin.y).atan2(pb.x - origin.x);
                aa.partial_cmp(&ab).unwrap_or(core::cmp::Ordering::Equal)
            });
        }

        // next(u→v) = at v, the outgoing edge one step clockwise from v→u.
        let next_of = |h: usize| -> usize {
            let v = head(h);
            let twin = h ^ 1;
            let list = &out[v];
            let pos = list.iter().position(|&e| e == twin).unwrap();
            list[(pos + list.len() - 1) % list.len()]
        };

        let mut visited = vec![false; 2 * self.edges.len()];
        let mut rings = Vec::new();
        let mut used = vec![false; self.edges.len()];

        for start in 0..2 * self.edges.len() {
            if visited[start] || !self.alive[start / 2] {
                continue;
            }
            let mut cycle = Vec::new();
            let mut h = start;
            loop {
                visited[h] = true;
                cycle.push(h);
                h = next_of(h);
                if h == start {
                    break;
                }
            }

            // Shoelace over the cycle's tail vertices.
            let mut area = 0.0;
            for &h in &cycle {
                let p = self.coords[tail(h)];
                let q = self.coords[head(h)];
                area += p.x * q.y - q.x * p.y;
            }
            if area <= 0.0 {
                continue;
            }

            let mut pts: Vec<geo::Coord<Real>> = Vec::with_capacity(cycle.len() + 1);
            for &h in &cycle {
                pts.push(self.coords[tail(h)]);
                used[h / 2] = true;
            }
            rings.push(LineString::new(rotate_to_min_vertex(pts)));
        }
        (rings, used)
    }
}

/// Rotate an open ring so it starts at its smallest vertex and close it.
/// Keeps traced ring output stable no matter which edge the walk entered
/// the face through.
fn rotate_to_min_vertex(mut pts: Vec<geo::Coord<Real>>) -> Vec<geo::Coord<Real>> {
    let mut min_idx = 0;
    for (i, p) in pts.iter().enumerate() {
        let m = pts[min_idx];
        if (p.x, p.y) < (m.x, m.y) {
            min_idx = i;
        }
    }
    pts.rotate_left(min_idx);
    pts.push(pts[0]);
    pts
}

/// Two rings are duplicates when their lengths and centroids agree to
/// 1e-6.
fn is_duplicate(candidate: &LineString<Real>, accepted: &[LineString<Real>]) -> bool {
    let len = candidate.euclidean_length();
    let Some(centroid) = candidate.centroid() else {
        return false;
    };
    accepted.iter().any(|r| {
        if (r.euclidean_length() - len).abs() >= 1e-6 {
            return false;
        }
        match r.centroid() {
            Some(c) => {
                let (dx, dy) = (c.x() - centroid.x(), c.y() - centroid.y());
                (dx * dx + dy * dy).sqrt() < 1e-6
            },
            None => false,
        }
    })
}

fn is_closed(chain: &LineString<Real>) -> bool {
    let pts = &chain.0;
    if pts.len() < 4 {
        return false;
    }
    let (first, last) = (pts[0], pts[pts.len() - 1]);
    first == last || ((first.x - last.x).abs() <= 1e-8 && (first.y - last.y).abs() <= 1e-8)
}

/// Split merged chains into rings and open lines.
///
/// Faces of the chain graph come first; chains consumed by a face are
/// dropped, the rest are classified by closure. Rings at or below
/// `min_ring_len` are discarded, and duplicate rings (same length and
/// centroid within 1e-6) are kept once.
pub fn extract_rings_and_open(
    chains: &[LineString<Real>],
    min_ring_len: Real,
) -> RingExtraction {
    let mut graph = SegmentGraph::build(chains);
    graph.prune_dangles();
    let (face_rings, used_edges) = graph.trace_faces();

    let mut consumed = vec![false; chains.len()];
    for (e, &u) in used_edges.iter().enumerate() {
        if u {
            consumed[graph.edge_chain[e]] = true;
        }
    }

    let mut extraction = RingExtraction::default();
    for ring in face_rings {
        if ring.euclidean_length() <= min_ring_len {
            continue;
        }
        if !is_duplicate(&ring, &extraction.rings) {
            extraction.rings.push(ring);
        }
    }

    for (ci, chain) in chains.iter().enumerate() {
        if consumed[ci] {
            continue;
        }
        if is_closed(chain) {
            if chain.euclidean_length() > min_ring_len
                && !is_duplicate(chain, &extraction.rings)
            {
                extraction.rings.push(chain.clone());
            }
        } else {
            extraction.open_lines.push(chain.clone());
        }
    }
    extraction
}
