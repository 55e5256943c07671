//! Canonical hashing.
//!
//! Deterministic canonical serialization + SHA-256 hashing.
//! Produces byte-identical output across platforms.
//!
//! Rules:
//!   - Vertices sorted (UTF-8 byte order)
//!   - Edges sorted by (u, v)
//!   - Coloring keys sorted
//!   - Palette kept in declaration order (position is meaningful)
//!   - UTF-8 JSON, no whitespace, no float, no platform newline
//!   - event_history is excluded from the hash

use sha2::{Digest, Sha256};
use serde_json::{Map, Value};

use crate::domain::SimState;
use crate::KERNEL_VERSION;

/// Canonical serialization of SimState to UTF-8 JSON bytes.
/// No whitespace. No float. Deterministic field order.
/// Includes kernel_version as the first field for identity binding.
pub fn canonical_serialize(state: &SimState) -> Vec<u8> {
    let obj = build_canonical_value(state);
    serde_json::to_string(&obj)
        .expect("canonical_serialize: JSON serialization failed")
        .into_bytes()
}

/// SHA-256 of canonical serialization. Lowercase hex string.
pub fn canonical_hash(state: &SimState) -> String {
    let bytes = canonical_serialize(state);
    let digest = Sha256::digest(&bytes);
    digest
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
}

/// Build the canonical serde_json::Value in strict field order.
///
/// Uses serde_json::Map, which preserves insertion order.
///
/// Field order: kernel_version, vertices, edges, palette, coloring,
///              thresholds, step_count
fn build_canonical_value(state: &SimState) -> Value {
    // -- vertices (BTreeSet is already sorted) --
    let vertices_list: Vec<Value> = state
        .vertices
        .iter()
        .map(|vid| Value::String(vid.clone()))
        .collect();

    // -- edges (sorted by (u, v)) --
    let mut sorted_edges = state.edges.clone();
    sorted_edges.sort();
    let mut edges_list: Vec<Value> = Vec::new();
    for edge in &sorted_edges {
        let mut edge_map = Map::new();
        edge_map.insert("u".to_string(), Value::String(edge.u.clone()));
        edge_map.insert("v".to_string(), Value::String(edge.v.clone()));
        edges_list.push(Value::Object(edge_map));
    }

    // -- palette (declaration order) --
    let palette_list: Vec<Value> = state
        .palette
        .iter()
        .map(|c| Value::String(c.clone()))
        .collect();

    // -- coloring (BTreeMap is already sorted by vertex) --
    let mut coloring_map = Map::new();
    for (vid, color) in &state.coloring {
        coloring_map.insert(vid.clone(), Value::String(color.clone()));
    }

    // -- thresholds (fixed field order) --
    let mut thresholds_map = Map::new();
    thresholds_map.insert(
        "strong_threshold".to_string(),
        Value::Number(state.thresholds.strong_threshold.into()),
    );
    thresholds_map.insert(
        "weak_threshold".to_string(),
        Value::Number(state.thresholds.weak_threshold.into()),
    );
    thresholds_map.insert(
        "rival_threshold".to_string(),
        Value::Number(state.thresholds.rival_threshold.into()),
    );

    // -- top-level (strict field order) --
    // kernel_version MUST be first. It is part of the kernel identity.
    let mut root = Map::new();
    root.insert(
        "kernel_version".to_string(),
        Value::Number((KERNEL_VERSION as i64).into()),
    );
    root.insert("vertices".to_string(), Value::Array(vertices_list));
    root.insert("edges".to_string(), Value::Array(edges_list));
    root.insert("palette".to_string(), Value::Array(palette_list));
    root.insert("coloring".to_string(), Value::Object(coloring_map));
    root.insert("thresholds".to_string(), Value::Object(thresholds_map));
    root.insert(
        "step_count".to_string(),
        Value::Number(state.step_count.into()),
    );

    Value::Object(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Edge;

    #[test]
    fn hash_ignores_edge_insertion_order() {
        let mut state_a = SimState::default();
        state_a.vertices.insert("a".to_string());
        state_a.vertices.insert("b".to_string());
        state_a.vertices.insert("c".to_string());
        let mut state_b = state_a.clone();

        state_a.edges.push(Edge::normalized("a", "b"));
        state_a.edges.push(Edge::normalized("b", "c"));
        state_b.edges.push(Edge::normalized("b", "c"));
        state_b.edges.push(Edge::normalized("a", "b"));

        assert_eq!(canonical_hash(&state_a), canonical_hash(&state_b));
    }

    #[test]
    fn hash_ignores_event_history() {
        let mut state_a = SimState::default();
        state_a.vertices.insert("a".to_string());
        let mut state_b = state_a.clone();
        state_b
            .event_history
            .push(serde_json::json!({"event_type": "add_vertex"}));

        assert_eq!(canonical_hash(&state_a), canonical_hash(&state_b));
    }

    #[test]
    fn hash_is_sensitive_to_coloring() {
        let mut state_a = SimState::default();
        state_a.vertices.insert("a".to_string());
        state_a.palette = vec!["green".to_string(), "red".to_string()];
        let mut state_b = state_a.clone();

        state_a.coloring.insert("a".to_string(), "green".to_string());
        state_b.coloring.insert("a".to_string(), "red".to_string());

        assert_ne!(canonical_hash(&state_a), canonical_hash(&state_b));
    }

    #[test]
    fn hash_is_sensitive_to_palette_order() {
        // GSL rules read colors by palette position, so order is identity
        let mut state_a = SimState::default();
        state_a.palette = vec!["green".to_string(), "red".to_string()];
        let mut state_b = SimState::default();
        state_b.palette = vec!["red".to_string(), "green".to_string()];

        assert_ne!(canonical_hash(&state_a), canonical_hash(&state_b));
    }
}
