//! Replay orchestrator: rebuild state from an event log.
//!
//! Delegates all simulation logic to the frozen kernel v1.
//! No shortcuts, no cached state logic.

use graph_dynamics_engine::domain::SimState;
use graph_dynamics_engine::engine::SimEngine;
use graph_dynamics_engine::events::EventEnvelope;
use graph_dynamics_engine::hashing::canonical_hash;

/// Rebuild the simulation state from a sequence of events.
///
/// 1. Create fresh engine + state
/// 2. Pass each event sequentially to the kernel
/// 3. Return (final_state, canonical_hash)
///
/// This is a pure function on the event stream, deterministic by the
/// kernel's guarantee.
pub fn rebuild_state(events: &[EventEnvelope]) -> (SimState, String) {
    let mut engine = SimEngine::new();
    engine.initialize_state();

    for evt in events {
        engine.apply_event(evt);
    }

    let state = engine.state().clone();
    let hash = canonical_hash(&state);
    (state, hash)
}

/// Rebuild state and return only the canonical hash.
pub fn rebuild_hash(events: &[EventEnvelope]) -> String {
    let (_, hash) = rebuild_state(events);
    hash
}
