//! Pure graph analysis. No external dependencies.
//!
//! Sorted traversal everywhere for determinism.
//! All density values: int64 fixed-point (real * SCALE).

use std::collections::{BTreeMap, BTreeSet};

use crate::arithmetic::{checked_mul, SCALE};
use crate::domain::SimState;

// ---------------------------------------------------------------------------
// Adjacency
// ---------------------------------------------------------------------------

/// Build sorted undirected adjacency lists from the edge set.
/// Every vertex gets an entry, including isolated ones.
pub fn adjacency(state: &SimState) -> BTreeMap<&str, Vec<&str>> {
    let mut adj: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for vid in &state.vertices {
        adj.insert(vid.as_str(), Vec::new());
    }
    for edge in &state.edges {
        adj.entry(edge.u.as_str()).or_default().push(edge.v.as_str());
        adj.entry(edge.v.as_str()).or_default().push(edge.u.as_str());
    }
    for list in adj.values_mut() {
        list.sort();
    }
    adj
}

/// Count the colors held by the given neighbors. Uncolored neighbors
/// are skipped.
pub fn neighbor_color_counts(
    neighbors: &[&str],
    coloring: &BTreeMap<String, String>,
) -> BTreeMap<String, i64> {
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for nb in neighbors {
        if let Some(color) = coloring.get(*nb) {
            *counts.entry(color.clone()).or_insert(0) += 1;
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Coloring views
// ---------------------------------------------------------------------------

/// Invert a coloring: each key is a color, each value the set of
/// vertices holding it.
pub fn invert_coloring(
    coloring: &BTreeMap<String, String>,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut inverted: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (vertex, color) in coloring {
        inverted
            .entry(color.clone())
            .or_default()
            .insert(vertex.clone());
    }
    inverted
}

/// Number of vertices per color, over colored vertices only.
pub fn color_census(coloring: &BTreeMap<String, String>) -> BTreeMap<String, i64> {
    let mut census: BTreeMap<String, i64> = BTreeMap::new();
    for color in coloring.values() {
        *census.entry(color.clone()).or_insert(0) += 1;
    }
    census
}

// ---------------------------------------------------------------------------
// Isolation
// ---------------------------------------------------------------------------

/// Return vertex IDs with zero incident edges. Sorted.
pub fn find_isolated_vertices(state: &SimState) -> Vec<String> {
    let mut connected: BTreeSet<&str> = BTreeSet::new();
    for edge in &state.edges {
        connected.insert(&edge.u);
        connected.insert(&edge.v);
    }
    state
        .vertices
        .iter()
        .filter(|vid| !connected.contains(vid.as_str()))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Edge agreement (fixed-point int64)
// ---------------------------------------------------------------------------

/// Count edges whose endpoints hold the same color.
/// Edges with an uncolored endpoint never count.
pub fn monochromatic_edge_count(state: &SimState) -> i64 {
    state
        .edges
        .iter()
        .filter(|e| {
            match (state.coloring.get(&e.u), state.coloring.get(&e.v)) {
                (Some(cu), Some(cv)) => cu == cv,
                _ => false,
            }
        })
        .count() as i64
}

/// Edge agreement density = (monochromatic_edges * SCALE) // total_edges.
/// Returns 0 if the graph has no edges.
pub fn edge_agreement_density(state: &SimState) -> i64 {
    let total = state.edges.len() as i64;
    if total == 0 {
        return 0;
    }
    checked_mul(monochromatic_edge_count(state), SCALE) / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Edge;

    fn path_state() -> SimState {
        // a - b - c, with d isolated
        let mut state = SimState::default();
        for vid in ["a", "b", "c", "d"] {
            state.vertices.insert(vid.to_string());
        }
        state.edges.push(Edge::normalized("a", "b"));
        state.edges.push(Edge::normalized("b", "c"));
        state.palette = vec!["green".to_string(), "red".to_string()];
        state.coloring.insert("a".to_string(), "green".to_string());
        state.coloring.insert("b".to_string(), "green".to_string());
        state.coloring.insert("c".to_string(), "red".to_string());
        state.coloring.insert("d".to_string(), "red".to_string());
        state
    }

    #[test]
    fn adjacency_is_sorted_and_total() {
        let state = path_state();
        let adj = adjacency(&state);
        assert_eq!(adj["b"], vec!["a", "c"]);
        assert!(adj["d"].is_empty());
    }

    #[test]
    fn neighbor_counts_skip_uncolored() {
        let mut state = path_state();
        state.coloring.remove("c");
        let adj = adjacency(&state);
        let counts = neighbor_color_counts(&adj["b"], &state.coloring);
        assert_eq!(counts.get("green").copied(), Some(1));
        assert_eq!(counts.get("red"), None);
    }

    #[test]
    fn invert_and_census_agree() {
        let state = path_state();
        let inverted = invert_coloring(&state.coloring);
        let census = color_census(&state.coloring);
        assert_eq!(inverted["green"].len() as i64, census["green"]);
        assert_eq!(inverted["red"].len() as i64, census["red"]);
        assert!(inverted["green"].contains("a"));
    }

    #[test]
    fn isolated_vertices_found() {
        let state = path_state();
        assert_eq!(find_isolated_vertices(&state), vec!["d".to_string()]);
    }

    #[test]
    fn agreement_density_counts_monochromatic_edges() {
        let state = path_state();
        // a-b agrees (green/green), b-c does not
        assert_eq!(monochromatic_edge_count(&state), 1);
        assert_eq!(edge_agreement_density(&state), SCALE / 2);
    }

    #[test]
    fn agreement_density_zero_without_edges() {
        let mut state = path_state();
        state.edges.clear();
        assert_eq!(edge_agreement_density(&state), 0);
    }
}
