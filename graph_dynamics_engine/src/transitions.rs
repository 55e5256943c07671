//! Centralized transition logic.
//!
//! ALL state-mutation logic lives here. All math is pure integer.
//! Thresholds read from state.thresholds unless overridden per event.
//! Random color padding uses an RNG seeded from the event payload, so
//! replaying the log reproduces the exact same coloring.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::arithmetic::{checked_add, validate_vertex_id, SCALE};
use crate::domain::{Edge, RuleThresholds, SimState, StepOutcome};
use crate::events::EventEnvelope;
use crate::rules::{self, require_total_coloring, Coloring};

// ---------------------------------------------------------------------------
// Public dispatcher
// ---------------------------------------------------------------------------

/// Apply *event* to *state* and return `(new_state, outcome)`.
/// The original state is never mutated. A deep clone is made first.
pub fn apply_event(state: &SimState, event: &EventEnvelope) -> (SimState, StepOutcome) {
    let mut new_state = state.clone();

    let etype = event.event_type.as_str();

    let outcome = match etype {
        "initialize_palette" => apply_initialize_palette(&mut new_state, event),
        "add_vertex" => apply_add_vertex(&mut new_state, event),
        "remove_vertex" => apply_remove_vertex(&mut new_state, event),
        "add_edge" => apply_add_edge(&mut new_state, event),
        "remove_edge" => apply_remove_edge(&mut new_state, event),
        "assign_colors" => apply_assign_colors(&mut new_state, event),
        "set_vertex_color" => apply_set_vertex_color(&mut new_state, event),
        "step_rule" => apply_step_rule(&mut new_state, event),
        "run_rule" => apply_run_rule(&mut new_state, event),
        _ => panic!("Unknown event type: {}", etype),
    };

    // Record event in history
    new_state.event_history.push(event.to_dict());

    (new_state, outcome)
}

// ---------------------------------------------------------------------------
// Individual transition handlers (private)
// ---------------------------------------------------------------------------

fn apply_initialize_palette(state: &mut SimState, event: &EventEnvelope) -> StepOutcome {
    let p = &event.payload;

    let colors = json_str_array(p, "colors");
    if colors.is_empty() {
        panic!("initialize_palette: 'colors' must be a non-empty array");
    }
    state.palette = colors;

    let old = &state.thresholds;
    state.thresholds = RuleThresholds {
        strong_threshold: p
            .get("strong_threshold")
            .and_then(|v| v.as_i64())
            .unwrap_or(old.strong_threshold),
        weak_threshold: p
            .get("weak_threshold")
            .and_then(|v| v.as_i64())
            .unwrap_or(old.weak_threshold),
        rival_threshold: p
            .get("rival_threshold")
            .and_then(|v| v.as_i64())
            .unwrap_or(old.rival_threshold),
    };
    validate_thresholds(&state.thresholds);

    StepOutcome {
        event_type: "initialize_palette".to_string(),
        success: true,
        ..Default::default()
    }
}

fn apply_add_vertex(state: &mut SimState, event: &EventEnvelope) -> StepOutcome {
    let vertex_id = event.payload["id"]
        .as_str()
        .expect("add_vertex: missing 'id' in payload");
    validate_vertex_id(vertex_id);

    if state.vertices.contains(vertex_id) {
        panic!("Vertex ID collision: {:?} already exists", vertex_id);
    }
    state.vertices.insert(vertex_id.to_string());

    StepOutcome {
        event_type: "add_vertex".to_string(),
        success: true,
        ..Default::default()
    }
}

fn apply_remove_vertex(state: &mut SimState, event: &EventEnvelope) -> StepOutcome {
    let vertex_id = event.payload["id"]
        .as_str()
        .expect("remove_vertex: missing 'id' in payload");

    if !state.vertices.remove(vertex_id) {
        panic!("Vertex {:?} does not exist", vertex_id);
    }
    state.edges.retain(|e| e.u != vertex_id && e.v != vertex_id);
    state.coloring.remove(vertex_id);

    StepOutcome {
        event_type: "remove_vertex".to_string(),
        success: true,
        ..Default::default()
    }
}

fn apply_add_edge(state: &mut SimState, event: &EventEnvelope) -> StepOutcome {
    let p = &event.payload;
    let u = p["u"].as_str().expect("add_edge: missing 'u' in payload");
    let v = p["v"].as_str().expect("add_edge: missing 'v' in payload");

    for endpoint in [u, v] {
        if !state.vertices.contains(endpoint) {
            panic!("add_edge: vertex {:?} does not exist", endpoint);
        }
    }

    let edge = Edge::normalized(u, v);
    if state.edges.contains(&edge) {
        panic!("Duplicate edge: {:?} -- {:?} already exists", edge.u, edge.v);
    }
    state.edges.push(edge);

    StepOutcome {
        event_type: "add_edge".to_string(),
        success: true,
        ..Default::default()
    }
}

fn apply_remove_edge(state: &mut SimState, event: &EventEnvelope) -> StepOutcome {
    let p = &event.payload;
    let u = p["u"].as_str().expect("remove_edge: missing 'u' in payload");
    let v = p["v"].as_str().expect("remove_edge: missing 'v' in payload");

    let edge = Edge::normalized(u, v);
    let pos = state
        .edges
        .iter()
        .position(|e| *e == edge)
        .unwrap_or_else(|| panic!("Edge {:?} -- {:?} does not exist", edge.u, edge.v));
    state.edges.remove(pos);

    StepOutcome {
        event_type: "remove_edge".to_string(),
        success: true,
        ..Default::default()
    }
}

/// Assign colors to vertices in sorted order; pad the remainder with
/// uniform random draws from `pad_randomly` using the payload seed.
fn apply_assign_colors(state: &mut SimState, event: &EventEnvelope) -> StepOutcome {
    let p = &event.payload;
    let color_list = json_str_array(p, "colors");
    let pad_randomly = json_str_array(p, "pad_randomly");
    let seed = p.get("seed").and_then(|v| v.as_u64()).unwrap_or(0);

    for color in color_list.iter().chain(pad_randomly.iter()) {
        if !state.palette.contains(color) {
            panic!("assign_colors: color {:?} is not in the palette", color);
        }
    }

    let vertices: Vec<String> = state.vertices.iter().cloned().collect();
    if color_list.len() > vertices.len() {
        panic!(
            "assign_colors: {} colors given for {} vertices",
            color_list.len(),
            vertices.len()
        );
    }

    for (vid, color) in vertices.iter().zip(color_list.iter()) {
        state.coloring.insert(vid.clone(), color.clone());
    }

    let mut assigned = color_list.len() as i64;
    if color_list.len() < vertices.len() && !pad_randomly.is_empty() {
        let mut rng = StdRng::seed_from_u64(seed);
        for vid in &vertices[color_list.len()..] {
            let pick = rng.gen_range(0..pad_randomly.len());
            state.coloring.insert(vid.clone(), pad_randomly[pick].clone());
            assigned = checked_add(assigned, 1);
        }
    }

    StepOutcome {
        event_type: "assign_colors".to_string(),
        success: true,
        changed_vertices: assigned,
        ..Default::default()
    }
}

fn apply_set_vertex_color(state: &mut SimState, event: &EventEnvelope) -> StepOutcome {
    let p = &event.payload;
    let vertex_id = p["id"]
        .as_str()
        .expect("set_vertex_color: missing 'id' in payload");
    let color = p["color"]
        .as_str()
        .expect("set_vertex_color: missing 'color' in payload");

    if !state.vertices.contains(vertex_id) {
        panic!("Vertex {:?} does not exist", vertex_id);
    }
    if !state.palette.contains(&color.to_string()) {
        panic!("set_vertex_color: color {:?} is not in the palette", color);
    }

    let previous = state
        .coloring
        .insert(vertex_id.to_string(), color.to_string());
    let changed = match previous {
        Some(old) if old == color => 0,
        _ => 1,
    };

    StepOutcome {
        event_type: "set_vertex_color".to_string(),
        success: true,
        changed_vertices: changed,
        ..Default::default()
    }
}

fn apply_step_rule(state: &mut SimState, event: &EventEnvelope) -> StepOutcome {
    let p = &event.payload;
    let rule = p["rule"]
        .as_str()
        .expect("step_rule: missing 'rule' in payload")
        .to_string();
    let thresholds = resolve_thresholds(state, p);

    require_total_coloring(state);
    let next = rules::apply_rule(state, &rule, &thresholds);
    let changed = diff_count(&state.coloring, &next);
    state.coloring = next;
    state.step_count = checked_add(state.step_count, 1);

    StepOutcome {
        event_type: "step_rule".to_string(),
        success: true,
        rule,
        steps_taken: 1,
        changed_vertices: changed,
        stabilized: changed == 0,
        ..Default::default()
    }
}

fn apply_run_rule(state: &mut SimState, event: &EventEnvelope) -> StepOutcome {
    let p = &event.payload;
    let rule = p["rule"]
        .as_str()
        .expect("run_rule: missing 'rule' in payload")
        .to_string();
    let max_steps = p.get("max_steps").and_then(|v| v.as_i64()).unwrap_or(10);
    if max_steps < 0 {
        panic!("run_rule: max_steps must be non-negative, got {}", max_steps);
    }
    let thresholds = resolve_thresholds(state, p);

    require_total_coloring(state);
    let trajectory = rules::iterate(state, &rule, &thresholds, max_steps);
    let steps_taken = (trajectory.len() - 1) as i64;
    let stabilized = steps_taken < max_steps;
    let last = trajectory
        .last()
        .expect("iterate always returns the initial coloring")
        .clone();
    let changed = diff_count(&state.coloring, &last);
    state.coloring = last;
    state.step_count = checked_add(state.step_count, steps_taken);

    StepOutcome {
        event_type: "run_rule".to_string(),
        success: true,
        rule,
        steps_taken,
        changed_vertices: changed,
        stabilized,
        reason: if stabilized {
            format!("fixed point after {} steps", steps_taken)
        } else {
            format!("max_steps={} reached", max_steps)
        },
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Per-event threshold overrides on top of the state defaults.
fn resolve_thresholds(state: &SimState, p: &serde_json::Value) -> RuleThresholds {
    let base = &state.thresholds;
    let resolved = RuleThresholds {
        strong_threshold: p
            .get("strong_threshold")
            .and_then(|v| v.as_i64())
            .unwrap_or(base.strong_threshold),
        weak_threshold: p
            .get("weak_threshold")
            .and_then(|v| v.as_i64())
            .unwrap_or(base.weak_threshold),
        rival_threshold: p
            .get("rival_threshold")
            .and_then(|v| v.as_i64())
            .unwrap_or(base.rival_threshold),
    };
    validate_thresholds(&resolved);
    resolved
}

/// Enforce the GSL parameter relations: T >= 0.5 and s + t <= T.
fn validate_thresholds(t: &RuleThresholds) {
    if t.strong_threshold < SCALE / 2 {
        panic!(
            "strong_threshold={} below minimum {} (0.5 fixed-point)",
            t.strong_threshold,
            SCALE / 2
        );
    }
    if checked_add(t.weak_threshold, t.rival_threshold) > t.strong_threshold {
        panic!(
            "weak_threshold={} + rival_threshold={} exceeds strong_threshold={}",
            t.weak_threshold, t.rival_threshold, t.strong_threshold
        );
    }
}

/// Number of vertices whose color differs between two colorings.
fn diff_count(a: &Coloring, b: &Coloring) -> i64 {
    let mut changed: i64 = 0;
    for (vid, color) in b {
        if a.get(vid) != Some(color) {
            changed += 1;
        }
    }
    for vid in a.keys() {
        if !b.contains_key(vid) {
            changed += 1;
        }
    }
    changed
}

fn json_str_array(v: &serde_json::Value, key: &str) -> Vec<String> {
    v.get(key)
        .and_then(|arr| arr.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|s| s.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}
