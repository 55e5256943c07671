//! Drift detection: determinism verification and state comparison.
//!
//! All numeric values are fixed-point i64 (SCALE = 10_000).
//! No float arithmetic anywhere.

use std::collections::BTreeSet;

use graph_dynamics_engine::domain::SimState;
use graph_dynamics_engine::events::EventEnvelope;
use graph_dynamics_engine::graph::edge_agreement_density;

use crate::replay;

/// Verify determinism by replaying the same events twice and
/// asserting identical hashes. Panics on failure.
pub fn verify_determinism(events: &[EventEnvelope]) {
    let (_, hash1) = replay::rebuild_state(events);
    let (_, hash2) = replay::rebuild_state(events);

    if hash1 != hash2 {
        panic!(
            "DETERMINISM FAILURE: two replays produced different hashes.\n\
             Run 1: {}\n\
             Run 2: {}",
            hash1, hash2
        );
    }
}

/// Structured state comparison. All values are integers.
///
/// Returns a DriftReport with deltas and per-vertex color changes.
pub fn compare_states(state_a: &SimState, state_b: &SimState) -> DriftReport {
    let ids_a: BTreeSet<&str> = state_a.vertices.iter().map(|s| s.as_str()).collect();
    let ids_b: BTreeSet<&str> = state_b.vertices.iter().map(|s| s.as_str()).collect();

    let added: Vec<String> = ids_b.difference(&ids_a).map(|s| s.to_string()).collect();
    let removed: Vec<String> = ids_a.difference(&ids_b).map(|s| s.to_string()).collect();

    // Color changes in vertices present in both states
    let mut recolored = Vec::new();
    for vid in ids_a.intersection(&ids_b) {
        let before = state_a.coloring.get(*vid);
        let after = state_b.coloring.get(*vid);
        if before != after {
            recolored.push(vid.to_string());
        }
    }

    // Agreement density (int64 fixed-point, no float)
    let density_a = edge_agreement_density(state_a);
    let density_b = edge_agreement_density(state_b);

    DriftReport {
        vertex_count_a: state_a.vertices.len() as i64,
        vertex_count_b: state_b.vertices.len() as i64,
        vertex_count_delta: state_b.vertices.len() as i64 - state_a.vertices.len() as i64,
        edge_count_a: state_a.edges.len() as i64,
        edge_count_b: state_b.edges.len() as i64,
        edge_count_delta: state_b.edges.len() as i64 - state_a.edges.len() as i64,
        colored_count_a: state_a.coloring.len() as i64,
        colored_count_b: state_b.coloring.len() as i64,
        agreement_density_a: density_a,
        agreement_density_b: density_b,
        agreement_density_delta: density_b - density_a,
        step_count_a: state_a.step_count,
        step_count_b: state_b.step_count,
        step_count_delta: state_b.step_count - state_a.step_count,
        added_vertices: added,
        removed_vertices: removed,
        recolored_vertices: recolored,
    }
}

/// Structured drift report. All numeric fields are i64.
#[derive(Debug, Clone)]
pub struct DriftReport {
    pub vertex_count_a: i64,
    pub vertex_count_b: i64,
    pub vertex_count_delta: i64,
    pub edge_count_a: i64,
    pub edge_count_b: i64,
    pub edge_count_delta: i64,
    pub colored_count_a: i64,
    pub colored_count_b: i64,
    pub agreement_density_a: i64,
    pub agreement_density_b: i64,
    pub agreement_density_delta: i64,
    pub step_count_a: i64,
    pub step_count_b: i64,
    pub step_count_delta: i64,
    pub added_vertices: Vec<String>,
    pub removed_vertices: Vec<String>,
    pub recolored_vertices: Vec<String>,
}
