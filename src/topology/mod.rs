//! Topology reconstruction: fragmented strokes in, an ordered cutting
//! route out.
//!
//! The stages run strictly in sequence, each consuming the previous one's
//! output: endpoint snapping ([`snap`]), chain merging ([`merge`]), ring
//! extraction ([`rings`]), polygon promotion ([`polygon`]), containment
//! hierarchy ([`hierarchy`]) and cut sequencing ([`sequence`]).

pub mod hierarchy;
pub mod merge;
pub mod polygon;
pub mod rings;
pub mod sequence;
pub mod snap;

pub use hierarchy::{Hierarchy, build_hierarchy};
pub use merge::merge_chains;
pub use polygon::ring_to_polygon;
pub use rings::{RingExtraction, extract_rings_and_open};
pub use sequence::{ContourGroup, Route, build_cut_sequence, build_nocut_sequence};
pub use snap::snap_endpoints;

use crate::float_types::Real;

/// Exact node identity for snapped coordinates. Two endpoints are the same
/// node iff their bit patterns agree, which snapping guarantees for
/// clustered endpoints.
pub(crate) fn node_key(c: &geo::Coord<Real>) -> (u64, u64) {
    (c.x.to_bits() as u64, c.y.to_bits() as u64)
}
