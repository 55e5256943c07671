//! Invariant checks.
//!
//! Hard-fail validation. Every check panics on failure; the `try_`
//! variants return `Err(message)` instead and are used by snapshot
//! restore, which must not abort the process.

use std::collections::BTreeSet;

use crate::arithmetic::{checked_add, SCALE};
use crate::domain::SimState;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run all 8 invariant checks. Panics on the first failure.
pub fn validate_invariants(state: &SimState) {
    if let Err(msg) = try_validate_invariants(state) {
        panic!("Invariant violation: {}", msg);
    }
}

/// Non-panicking variant of `validate_invariants`.
/// Returns `Err(message)` on the first failure, `Ok(())` if all pass.
pub fn try_validate_invariants(state: &SimState) -> Result<(), String> {
    try_check_vertex_id_format(state)?;
    try_check_edge_refs(state)?;
    try_check_edge_canonical(state)?;
    try_check_duplicate_edges(state)?;
    try_check_coloring_refs(state)?;
    try_check_palette_distinct(state)?;
    try_check_palette_membership(state)?;
    try_check_threshold_relations(state)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

/// INV-1: Every vertex ID must be ASCII [a-zA-Z0-9_-] only.
fn try_check_vertex_id_format(state: &SimState) -> Result<(), String> {
    for vid in &state.vertices {
        let bad = vid.is_empty()
            || vid
                .chars()
                .any(|ch| !ch.is_ascii_alphanumeric() && ch != '_' && ch != '-');
        if bad {
            return Err(format!(
                "[INVARIANT:vertex_id_format] Vertex ID {:?} must match [a-zA-Z0-9_-]+",
                vid
            ));
        }
    }
    Ok(())
}

/// INV-2: Every edge must reference existing vertices.
fn try_check_edge_refs(state: &SimState) -> Result<(), String> {
    for edge in &state.edges {
        if !state.vertices.contains(&edge.u) {
            return Err(format!(
                "[INVARIANT:edge_refs] Edge endpoint {:?} does not exist in vertices",
                edge.u
            ));
        }
        if !state.vertices.contains(&edge.v) {
            return Err(format!(
                "[INVARIANT:edge_refs] Edge endpoint {:?} does not exist in vertices",
                edge.v
            ));
        }
    }
    Ok(())
}

/// INV-3: Every edge is stored normalized with u < v.
/// Rules out self-loops and unordered endpoint pairs.
fn try_check_edge_canonical(state: &SimState) -> Result<(), String> {
    for edge in &state.edges {
        if edge.u >= edge.v {
            return Err(format!(
                "[INVARIANT:edge_canonical] Edge {:?} -- {:?} is not stored \
                 with u < v (self-loops are forbidden)",
                edge.u, edge.v
            ));
        }
    }
    Ok(())
}

/// INV-4: No duplicate edges.
fn try_check_duplicate_edges(state: &SimState) -> Result<(), String> {
    let mut seen: BTreeSet<(&str, &str)> = BTreeSet::new();
    for edge in &state.edges {
        if !seen.insert((edge.u.as_str(), edge.v.as_str())) {
            return Err(format!(
                "[INVARIANT:duplicate_edges] Edge {:?} -- {:?} appears more than once",
                edge.u, edge.v
            ));
        }
    }
    Ok(())
}

/// INV-5: Every colored vertex must exist.
fn try_check_coloring_refs(state: &SimState) -> Result<(), String> {
    for vid in state.coloring.keys() {
        if !state.vertices.contains(vid) {
            return Err(format!(
                "[INVARIANT:coloring_refs] Coloring entry for {:?} references \
                 a vertex that does not exist",
                vid
            ));
        }
    }
    Ok(())
}

/// INV-6: Palette entries are non-empty and distinct.
fn try_check_palette_distinct(state: &SimState) -> Result<(), String> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for color in &state.palette {
        if color.is_empty() {
            return Err(
                "[INVARIANT:palette_distinct] Palette contains an empty color".to_string()
            );
        }
        if !seen.insert(color.as_str()) {
            return Err(format!(
                "[INVARIANT:palette_distinct] Palette color {:?} appears more than once",
                color
            ));
        }
    }
    Ok(())
}

/// INV-7: Every assigned color is a palette member.
fn try_check_palette_membership(state: &SimState) -> Result<(), String> {
    for (vid, color) in &state.coloring {
        if !state.palette.contains(color) {
            return Err(format!(
                "[INVARIANT:palette_membership] Vertex {:?} has color {:?} \
                 which is not in the palette",
                vid, color
            ));
        }
    }
    Ok(())
}

/// INV-8: Threshold relations: strong >= 0.5 and weak + rival <= strong.
fn try_check_threshold_relations(state: &SimState) -> Result<(), String> {
    let t = &state.thresholds;
    if t.strong_threshold < SCALE / 2 {
        return Err(format!(
            "[INVARIANT:threshold_relations] strong_threshold={} below minimum {}",
            t.strong_threshold,
            SCALE / 2
        ));
    }
    if checked_add(t.weak_threshold, t.rival_threshold) > t.strong_threshold {
        return Err(format!(
            "[INVARIANT:threshold_relations] weak_threshold={} + rival_threshold={} \
             exceeds strong_threshold={}",
            t.weak_threshold, t.rival_threshold, t.strong_threshold
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Edge;

    fn valid_state() -> SimState {
        let mut state = SimState::default();
        state.vertices.insert("a".to_string());
        state.vertices.insert("b".to_string());
        state.edges.push(Edge::normalized("a", "b"));
        state.palette = vec!["green".to_string(), "red".to_string()];
        state.coloring.insert("a".to_string(), "green".to_string());
        state
    }

    #[test]
    fn valid_state_passes() {
        validate_invariants(&valid_state());
    }

    #[test]
    fn dangling_edge_fails() {
        let mut state = valid_state();
        state.edges.push(Edge {
            u: "b".to_string(),
            v: "zz".to_string(),
        });
        let err = try_validate_invariants(&state).unwrap_err();
        assert!(err.contains("edge_refs"), "got: {}", err);
    }

    #[test]
    fn unnormalized_edge_fails() {
        let mut state = valid_state();
        state.vertices.insert("c".to_string());
        state.edges.push(Edge {
            u: "c".to_string(),
            v: "b".to_string(),
        });
        let err = try_validate_invariants(&state).unwrap_err();
        assert!(err.contains("edge_canonical"), "got: {}", err);
    }

    #[test]
    fn duplicate_edge_fails() {
        let mut state = valid_state();
        state.edges.push(Edge::normalized("a", "b"));
        let err = try_validate_invariants(&state).unwrap_err();
        assert!(err.contains("duplicate_edges"), "got: {}", err);
    }

    #[test]
    fn off_palette_color_fails() {
        let mut state = valid_state();
        state
            .coloring
            .insert("b".to_string(), "magenta".to_string());
        let err = try_validate_invariants(&state).unwrap_err();
        assert!(err.contains("palette_membership"), "got: {}", err);
    }

    #[test]
    fn bad_thresholds_fail() {
        let mut state = valid_state();
        state.thresholds.weak_threshold = 4_000;
        state.thresholds.rival_threshold = 4_000;
        let err = try_validate_invariants(&state).unwrap_err();
        assert!(err.contains("threshold_relations"), "got: {}", err);
    }

    #[test]
    #[should_panic(expected = "Invariant violation")]
    fn validate_panics_on_failure() {
        let mut state = valid_state();
        state.coloring.insert("zz".to_string(), "green".to_string());
        validate_invariants(&state);
    }
}
