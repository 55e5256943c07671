//! Demo harness.
//!
//! Builds a ten-vertex ring, seeds a random coloring, and runs the
//! majority rule to a fixed point (or the step cap), printing the color
//! census and canonical hash along the way.

use serde_json::json;

use graph_dynamics_engine::engine::SimEngine;
use graph_dynamics_engine::events::{EventEnvelope, SCHEMA_VERSION};
use graph_dynamics_engine::graph::{color_census, edge_agreement_density, invert_coloring};
use graph_dynamics_engine::hashing::canonical_hash;

fn make_event(sequence: u64, event_type: &str, payload: serde_json::Value) -> EventEnvelope {
    EventEnvelope {
        event_type: event_type.to_string(),
        sequence,
        timestamp: String::new(),
        logical_time: sequence,
        payload,
        schema_version: SCHEMA_VERSION,
    }
}

fn main() {
    let ring_size = 10;
    let mut events: Vec<EventEnvelope> = Vec::new();
    let mut seq: u64 = 0;
    let mut next_seq = || {
        seq += 1;
        seq
    };

    events.push(make_event(
        next_seq(),
        "initialize_palette",
        json!({ "colors": ["green", "red", "yellow"] }),
    ));
    for i in 0..ring_size {
        events.push(make_event(
            next_seq(),
            "add_vertex",
            json!({ "id": format!("v{:02}", i) }),
        ));
    }
    for i in 0..ring_size {
        events.push(make_event(
            next_seq(),
            "add_edge",
            json!({
                "u": format!("v{:02}", i),
                "v": format!("v{:02}", (i + 1) % ring_size),
            }),
        ));
    }
    events.push(make_event(
        next_seq(),
        "assign_colors",
        json!({
            "colors": ["green", "green", "red"],
            "pad_randomly": ["green", "red", "yellow"],
            "seed": 42,
        }),
    ));

    let mut engine = SimEngine::new();
    engine.initialize_state();
    engine.apply_sequence(&events);

    println!("Initial coloring (ring of {}):", ring_size);
    for (color, group) in invert_coloring(&engine.state().coloring) {
        println!("  {:8} {:?}", color, group);
    }
    println!(
        "  agreement density: {}",
        edge_agreement_density(engine.state())
    );

    let run = make_event(
        next_seq(),
        "run_rule",
        json!({ "rule": "majority", "max_steps": 25 }),
    );
    let (_, outcome) = engine.apply_event(&run);

    println!();
    println!(
        "Ran {} for {} steps (stabilized: {}, changed vertices: {})",
        outcome.rule, outcome.steps_taken, outcome.stabilized, outcome.changed_vertices
    );
    println!("Final census:");
    for (color, count) in color_census(&engine.state().coloring) {
        println!("  {:8} {}", color, count);
    }
    println!(
        "  agreement density: {}",
        edge_agreement_density(engine.state())
    );
    println!();
    println!("Canonical hash: {}", canonical_hash(engine.state()));
}
