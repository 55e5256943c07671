//! State construction.

use crate::domain::{RuleThresholds, SimState};

/// Create a fresh, empty SimState.
///
/// The palette stays empty until an initialize_palette event runs;
/// thresholds default to 0.5 / 0.25 / 0.25 in fixed-point.
pub fn create_initial_state(
    palette: Option<Vec<String>>,
    thresholds: Option<RuleThresholds>,
) -> SimState {
    SimState {
        vertices: std::collections::BTreeSet::new(),
        edges: Vec::new(),
        palette: palette.unwrap_or_default(),
        thresholds: thresholds.unwrap_or_default(),
        coloring: std::collections::BTreeMap::new(),
        step_count: 0,
        event_history: Vec::new(),
    }
}
