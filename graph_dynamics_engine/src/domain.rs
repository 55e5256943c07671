//! Core domain types. Pure data, no transition logic.
//!
//! All threshold values are i64 fixed-point (SCALE = 10_000).

use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};

// ── Core Domain Types ──────────────────────────────────────────────

/// Undirected edge. Always stored normalized with `u < v`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Edge {
    pub u: String,
    pub v: String,
}

impl Edge {
    /// Build a normalized edge from two endpoints. Panics on self-loops.
    pub fn normalized(a: &str, b: &str) -> Self {
        if a == b {
            panic!("Self-loop edge on vertex {:?}", a);
        }
        if a < b {
            Self { u: a.to_string(), v: b.to_string() }
        } else {
            Self { u: b.to_string(), v: a.to_string() }
        }
    }
}

/// Rule thresholds, i64 fixed-point (real * SCALE).
///
/// `strong_threshold` is the GSL strong-influence fraction T,
/// `weak_threshold` the weak-influence fraction t, and `rival_threshold`
/// the opposing-color fraction s. The kernel requires `T >= 0.5` and
/// `s + t <= T`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleThresholds {
    pub strong_threshold: i64, // default 5000 (0.5 * SCALE)
    pub weak_threshold: i64,   // default 2500
    pub rival_threshold: i64,  // default 2500
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            strong_threshold: 5_000,
            weak_threshold: 2_500,
            rival_threshold: 2_500,
        }
    }
}

/// Structured, immutable outcome of a state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepOutcome {
    pub event_type: String,
    pub success: bool,
    pub rule: String,
    pub steps_taken: i64,
    pub changed_vertices: i64,
    pub stabilized: bool,
    pub reason: String,
}

impl Default for StepOutcome {
    fn default() -> Self {
        Self {
            event_type: String::new(),
            success: true,
            rule: String::new(),
            steps_taken: 0,
            changed_vertices: 0,
            stabilized: false,
            reason: String::new(),
        }
    }
}

/// Complete simulation state snapshot.
///
/// The coloring is partial until an assignment event runs; stepping a
/// rule requires it to be total. Palette order is meaningful: the GSL
/// rules read their green/red/yellow colors by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimState {
    pub vertices: BTreeSet<String>,
    pub edges: Vec<Edge>,
    pub palette: Vec<String>,
    pub thresholds: RuleThresholds,
    pub coloring: BTreeMap<String, String>,
    pub step_count: i64,
    pub event_history: Vec<serde_json::Value>,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            vertices: BTreeSet::new(),
            edges: Vec::new(),
            palette: Vec::new(),
            thresholds: RuleThresholds::default(),
            coloring: BTreeMap::new(),
            step_count: 0,
            event_history: Vec::new(),
        }
    }
}
