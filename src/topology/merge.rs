//! Chain merging: concatenate snapped polylines at every node of degree
//! two, leaving nodes of any other degree as chain endpoints.
//!
//! Works on snapped input only — endpoints meeting at a node must already
//! be bit-identical.

use super::node_key;
use crate::float_types::Real;
use geo::LineString;
use hashbrown::HashMap;

type Key = (u64, u64);

fn resolve(redirect: &mut [usize], mut id: usize) -> usize {
    while redirect[id] != id {
        redirect[id] = redirect[redirect[id]];
        id = redirect[id];
    }
    id
}

/// Merge polylines into maximal chains. A chain whose two ends meet alone
/// at a node stays (or becomes) a closed loop; disconnected components
/// come out as separate chains.
pub fn merge_chains(lines: Vec<LineString<Real>>) -> Vec<LineString<Real>> {
    let mut chains: Vec<Option<Vec<geo::Coord<Real>>>> =
        lines.into_iter().map(|ls| Some(ls.0)).collect();

    // Static end incidence: merging consumes exactly the two ends meeting
    // at a degree-2 node, so entries never need to move between nodes.
    let mut incidence: HashMap<Key, Vec<usize>> = HashMap::new();
    for (id, chain) in chains.iter().enumerate() {
        let pts = chain.as_ref().unwrap();
        incidence.entry(node_key(&pts[0])).or_default().push(id);
        incidence
            .entry(node_key(&pts[pts.len() - 1]))
            .or_default()
            .push(id);
    }

    // Deterministic node order regardless of hash state.
    let mut keys: Vec<Key> = incidence.keys().copied().collect();
    keys.sort_unstable();

    let mut redirect: Vec<usize> = (0..chains.len()).collect();
    for key in keys {
        let incident = &incidence[&key];
        if incident.len() != 2 {
            continue;
        }
        let a = resolve(&mut redirect, incident[0]);
        let b = resolve(&mut redirect, incident[1]);
        if a == b {
            // Both ends of the same chain: already a loop at this node.
            continue;
        }

        let mut left = chains[a].take().unwrap();
        let mut right = chains[b].take().unwrap();
        // Orient left to end at the node and right to start at it.
        if node_key(&left[left.len() - 1]) != key {
            left.reverse();
        }
        if node_key(&right[0]) != key {
            right.reverse();
        }
        debug_assert_eq!(node_key(&left[left.len() - 1]), key);
        debug_assert_eq!(node_key(&right[0]), key);

        left.extend(right.drain(1..));
        chains[a] = Some(left);
        redirect[b] = a;
    }

    chains
        .into_iter()
        .flatten()
        .map(LineString::new)
        .collect()
}
