//! Color update rules.
//!
//! Every rule is a pure function from the current state to a new
//! coloring. All vertices update synchronously from the previous
//! coloring, and traversal is sorted for determinism. A vertex with no
//! colored neighbors keeps its color under every rule.
//!
//! Rules require a total coloring and panic on uncolored vertices.

use std::collections::BTreeMap;

use crate::arithmetic::{below_fraction, checked_mul, exceeds_fraction, reaches_fraction};
use crate::domain::{RuleThresholds, SimState};
use crate::graph::{adjacency, neighbor_color_counts};

/// Names of the available update rules.
pub const RULES: [&str; 4] = ["majority", "plurality", "gsl3", "gsl2"];

/// A total or partial vertex coloring.
pub type Coloring = BTreeMap<String, String>;

/// Dispatch a rule by name. Panics on unknown names.
pub fn apply_rule(state: &SimState, rule: &str, thresholds: &RuleThresholds) -> Coloring {
    match rule {
        "majority" => majority(state),
        "plurality" => plurality(state),
        "gsl3" => gsl3(state, thresholds),
        "gsl2" => gsl2(state, thresholds),
        other => panic!("Unknown rule {:?}: must be one of {:?}", other, RULES),
    }
}

/// Panic unless every vertex has a color.
pub fn require_total_coloring(state: &SimState) {
    for vid in &state.vertices {
        if !state.coloring.contains_key(vid) {
            panic!(
                "Vertex {:?} has no color: update rules require a total coloring",
                vid
            );
        }
    }
}

fn current_color<'a>(state: &'a SimState, vertex: &str) -> &'a str {
    state
        .coloring
        .get(vertex)
        .map(|c| c.as_str())
        .unwrap_or_else(|| {
            panic!(
                "Vertex {:?} has no color: update rules require a total coloring",
                vertex
            )
        })
}

/// First maximal entry of a count map. BTreeMap iteration order makes
/// ties resolve to the lexicographically least color.
fn max_count_color(counts: &BTreeMap<String, i64>) -> Option<(&str, i64)> {
    let mut best: Option<(&str, i64)> = None;
    for (color, count) in counts {
        match best {
            Some((_, c)) if *count <= c => {}
            _ => best = Some((color.as_str(), *count)),
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Majority / plurality
// ---------------------------------------------------------------------------

/// Majority rule: a vertex takes the color held by a strict majority
/// (> 1/2) of its neighbors. Without a majority color it keeps its own.
pub fn majority(state: &SimState) -> Coloring {
    let adj = adjacency(state);
    let mut new_coloring = Coloring::new();
    for x in &state.vertices {
        let neighbors = adj.get(x.as_str()).map(|v| v.as_slice()).unwrap_or(&[]);
        let counts = neighbor_color_counts(neighbors, &state.coloring);
        let mut next = current_color(state, x).to_string();
        if let Some((max_color, max_count)) = max_count_color(&counts) {
            let num_neighbors: i64 = counts.values().sum();
            // Strict majority, tested exactly: 2 * max > n
            if checked_mul(2, max_count) > num_neighbors {
                next = max_color.to_string();
            }
        }
        new_coloring.insert(x.clone(), next);
    }
    new_coloring
}

/// Plurality rule: a vertex takes the most frequent neighbor color if
/// that frequency exceeds 1. A vertex whose own color ties for the
/// maximum keeps it; otherwise the least maximal color wins.
pub fn plurality(state: &SimState) -> Coloring {
    let adj = adjacency(state);
    let mut new_coloring = Coloring::new();
    for x in &state.vertices {
        let neighbors = adj.get(x.as_str()).map(|v| v.as_slice()).unwrap_or(&[]);
        let counts = neighbor_color_counts(neighbors, &state.coloring);
        let own = current_color(state, x);
        let mut next = own.to_string();
        if let Some((max_color, max_count)) = max_count_color(&counts) {
            if max_count > 1 && counts.get(own).copied().unwrap_or(0) < max_count {
                next = max_color.to_string();
            }
        }
        new_coloring.insert(x.clone(), next);
    }
    new_coloring
}

// ---------------------------------------------------------------------------
// Girard-Seligman-Liu rules
// ---------------------------------------------------------------------------

/// Girard-Seligman-Liu 3-color rule.
///
/// palette[0] = green (for a proposition), palette[1] = red (against),
/// palette[2] = yellow (undecided). Only these three colors count among
/// a vertex's neighbors.
///
/// Strong influence: green (then red) exceeding fraction
/// `strong_threshold` of the counted neighbors flips the vertex.
/// Weak influence: a green vertex with less than `weak_threshold` green
/// neighbors and at least `rival_threshold` red neighbors turns yellow;
/// symmetrically for red. Otherwise the vertex keeps its color.
pub fn gsl3(state: &SimState, t: &RuleThresholds) -> Coloring {
    if state.palette.len() < 3 {
        panic!(
            "gsl3 requires a palette of at least 3 colors, got {}",
            state.palette.len()
        );
    }
    let green = state.palette[0].as_str();
    let red = state.palette[1].as_str();
    let yellow = state.palette[2].as_str();

    let adj = adjacency(state);
    let mut new_coloring = Coloring::new();
    for x in &state.vertices {
        let neighbors = adj.get(x.as_str()).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut green_count: i64 = 0;
        let mut red_count: i64 = 0;
        let mut num_counted: i64 = 0;
        for nb in neighbors {
            let c = current_color(state, nb);
            if c == green {
                green_count += 1;
                num_counted += 1;
            } else if c == red {
                red_count += 1;
                num_counted += 1;
            } else if c == yellow {
                num_counted += 1;
            }
        }

        let own = current_color(state, x);
        let next = if exceeds_fraction(green_count, num_counted, t.strong_threshold) {
            green
        } else if exceeds_fraction(red_count, num_counted, t.strong_threshold) {
            red
        } else if own == green
            && below_fraction(green_count, num_counted, t.weak_threshold)
            && reaches_fraction(red_count, num_counted, t.rival_threshold)
        {
            yellow
        } else if own == red
            && below_fraction(red_count, num_counted, t.weak_threshold)
            && reaches_fraction(green_count, num_counted, t.rival_threshold)
        {
            yellow
        } else {
            own
        };
        new_coloring.insert(x.clone(), next.to_string());
    }
    new_coloring
}

/// Girard-Seligman-Liu 2-color rule.
///
/// palette[0] = green (for a proposition), palette[1] = yellow
/// (undecided). Green exceeding fraction `strong_threshold` of the
/// counted neighbors flips the vertex green; otherwise no change.
pub fn gsl2(state: &SimState, t: &RuleThresholds) -> Coloring {
    if state.palette.len() < 2 {
        panic!(
            "gsl2 requires a palette of at least 2 colors, got {}",
            state.palette.len()
        );
    }
    let green = state.palette[0].as_str();
    let yellow = state.palette[1].as_str();

    let adj = adjacency(state);
    let mut new_coloring = Coloring::new();
    for x in &state.vertices {
        let neighbors = adj.get(x.as_str()).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut green_count: i64 = 0;
        let mut num_counted: i64 = 0;
        for nb in neighbors {
            let c = current_color(state, nb);
            if c == green {
                green_count += 1;
                num_counted += 1;
            } else if c == yellow {
                num_counted += 1;
            }
        }

        let own = current_color(state, x);
        let next = if exceeds_fraction(green_count, num_counted, t.strong_threshold) {
            green
        } else {
            own
        };
        new_coloring.insert(x.clone(), next.to_string());
    }
    new_coloring
}

// ---------------------------------------------------------------------------
// Iteration
// ---------------------------------------------------------------------------

/// Apply `rule` repeatedly, collecting the trajectory `[c0, c1, ...]`.
/// Stops after `max_steps` applications, or earlier as soon as the
/// coloring reaches a fixed point.
pub fn iterate(
    state: &SimState,
    rule: &str,
    thresholds: &RuleThresholds,
    max_steps: i64,
) -> Vec<Coloring> {
    let mut trajectory = vec![state.coloring.clone()];
    let mut scratch = state.clone();
    for _ in 0..max_steps {
        let next = apply_rule(&scratch, rule, thresholds);
        if next == scratch.coloring {
            // Stabilized
            break;
        }
        scratch.coloring = next.clone();
        trajectory.push(next);
    }
    trajectory
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Edge;

    fn state_with(
        vertices: &[&str],
        edges: &[(&str, &str)],
        palette: &[&str],
        coloring: &[(&str, &str)],
    ) -> SimState {
        let mut state = SimState::default();
        for vid in vertices {
            state.vertices.insert(vid.to_string());
        }
        for (a, b) in edges {
            state.edges.push(Edge::normalized(a, b));
        }
        state.palette = palette.iter().map(|c| c.to_string()).collect();
        for (vid, color) in coloring {
            state.coloring.insert(vid.to_string(), color.to_string());
        }
        state
    }

    #[test]
    fn majority_flips_dominated_vertex() {
        // Star: center x with three green leaves
        let state = state_with(
            &["x", "a", "b", "c"],
            &[("x", "a"), ("x", "b"), ("x", "c")],
            &["green", "red"],
            &[("x", "red"), ("a", "green"), ("b", "green"), ("c", "green")],
        );
        let next = majority(&state);
        assert_eq!(next["x"], "green");
        // Leaves see a single red neighbor, which is a majority of 1
        assert_eq!(next["a"], "red");
    }

    #[test]
    fn majority_keeps_color_without_majority() {
        // x has one green and one red neighbor
        let state = state_with(
            &["x", "a", "b"],
            &[("x", "a"), ("x", "b")],
            &["green", "red"],
            &[("x", "red"), ("a", "green"), ("b", "red")],
        );
        let next = majority(&state);
        assert_eq!(next["x"], "red");
    }

    #[test]
    fn majority_isolated_vertex_keeps_color() {
        let state = state_with(&["x"], &[], &["green", "red"], &[("x", "red")]);
        let next = majority(&state);
        assert_eq!(next["x"], "red");
    }

    #[test]
    fn plurality_requires_frequency_above_one() {
        // x sees one neighbor of each color: max frequency is 1, no change
        let state = state_with(
            &["x", "a", "b"],
            &[("x", "a"), ("x", "b")],
            &["green", "red", "blue"],
            &[("x", "blue"), ("a", "green"), ("b", "red")],
        );
        let next = plurality(&state);
        assert_eq!(next["x"], "blue");
    }

    #[test]
    fn plurality_takes_most_frequent_color() {
        let state = state_with(
            &["x", "a", "b", "c"],
            &[("x", "a"), ("x", "b"), ("x", "c")],
            &["green", "red"],
            &[("x", "red"), ("a", "green"), ("b", "green"), ("c", "red")],
        );
        let next = plurality(&state);
        assert_eq!(next["x"], "green");
    }

    #[test]
    fn plurality_own_color_wins_ties() {
        // Two green and two red neighbors: x keeps red
        let state = state_with(
            &["x", "a", "b", "c", "d"],
            &[("x", "a"), ("x", "b"), ("x", "c"), ("x", "d")],
            &["green", "red"],
            &[
                ("x", "red"),
                ("a", "green"),
                ("b", "green"),
                ("c", "red"),
                ("d", "red"),
            ],
        );
        let next = plurality(&state);
        assert_eq!(next["x"], "red");
    }

    #[test]
    fn gsl3_strong_influence_flips() {
        // 3 of 4 counted neighbors green, T = 0.5
        let state = state_with(
            &["x", "a", "b", "c", "d"],
            &[("x", "a"), ("x", "b"), ("x", "c"), ("x", "d")],
            &["green", "red", "yellow"],
            &[
                ("x", "yellow"),
                ("a", "green"),
                ("b", "green"),
                ("c", "green"),
                ("d", "red"),
            ],
        );
        let next = gsl3(&state, &RuleThresholds::default());
        assert_eq!(next["x"], "green");
    }

    #[test]
    fn gsl3_weak_influence_turns_yellow() {
        // Green x with 0 green neighbors and enough red ones:
        // red is not a strong majority (2 of 4), but the weak clause fires.
        let state = state_with(
            &["x", "a", "b", "c", "d"],
            &[("x", "a"), ("x", "b"), ("x", "c"), ("x", "d")],
            &["green", "red", "yellow"],
            &[
                ("x", "green"),
                ("a", "red"),
                ("b", "red"),
                ("c", "yellow"),
                ("d", "yellow"),
            ],
        );
        let next = gsl3(&state, &RuleThresholds::default());
        assert_eq!(next["x"], "yellow");
    }

    #[test]
    fn gsl3_no_influence_keeps_color() {
        // Green x with enough green support: no clause fires
        let state = state_with(
            &["x", "a", "b"],
            &[("x", "a"), ("x", "b")],
            &["green", "red", "yellow"],
            &[("x", "green"), ("a", "green"), ("b", "yellow")],
        );
        let next = gsl3(&state, &RuleThresholds::default());
        assert_eq!(next["x"], "green");
    }

    #[test]
    fn gsl3_ignores_colors_outside_palette_trio() {
        // Neighbors in a fourth color are invisible to the rule
        let state = state_with(
            &["x", "a", "b"],
            &[("x", "a"), ("x", "b")],
            &["green", "red", "yellow", "blue"],
            &[("x", "yellow"), ("a", "green"), ("b", "blue")],
        );
        // Counted neighborhood is just {green}: 1 of 1 exceeds T
        let next = gsl3(&state, &RuleThresholds::default());
        assert_eq!(next["x"], "green");
    }

    #[test]
    fn gsl2_green_spreads() {
        let state = state_with(
            &["x", "a", "b"],
            &[("x", "a"), ("x", "b")],
            &["green", "yellow"],
            &[("x", "yellow"), ("a", "green"), ("b", "green")],
        );
        let next = gsl2(&state, &RuleThresholds::default());
        assert_eq!(next["x"], "green");
        // Green vertices never revert
        assert_eq!(next["a"], "green");
    }

    #[test]
    #[should_panic(expected = "gsl3 requires a palette of at least 3 colors")]
    fn gsl3_rejects_short_palette() {
        let state = state_with(&["x"], &[], &["green", "red"], &[("x", "green")]);
        gsl3(&state, &RuleThresholds::default());
    }

    #[test]
    #[should_panic(expected = "has no color")]
    fn rules_reject_partial_coloring() {
        let state = state_with(
            &["x", "a"],
            &[("x", "a")],
            &["green", "red"],
            &[("x", "green")],
        );
        majority(&state);
    }

    #[test]
    fn iterate_stops_at_fixed_point() {
        // K4 with a single red vertex converges to all-green in one step,
        // then iterate() detects the fixed point and stops.
        let state = state_with(
            &["x", "a", "b", "c"],
            &[
                ("x", "a"),
                ("x", "b"),
                ("x", "c"),
                ("a", "b"),
                ("a", "c"),
                ("b", "c"),
            ],
            &["green", "red"],
            &[("x", "red"), ("a", "green"), ("b", "green"), ("c", "green")],
        );
        let trajectory = iterate(&state, "majority", &RuleThresholds::default(), 10);
        assert_eq!(trajectory.len(), 2);
        let last = trajectory.last().unwrap();
        assert!(last.values().all(|c| c == "green"));
    }

    #[test]
    fn iterate_zero_steps_returns_initial() {
        let state = state_with(&["x"], &[], &["green", "red"], &[("x", "green")]);
        let trajectory = iterate(&state, "majority", &RuleThresholds::default(), 0);
        assert_eq!(trajectory.len(), 1);
        assert_eq!(trajectory[0], state.coloring);
    }

    #[test]
    #[should_panic(expected = "Unknown rule")]
    fn unknown_rule_rejected() {
        let state = state_with(&["x"], &[], &["green", "red"], &[("x", "green")]);
        apply_rule(&state, "antimajority", &RuleThresholds::default());
    }
}
