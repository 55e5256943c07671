//! Proto <-> kernel conversion bridge.
//!
//! Converts between protobuf wire types (proto_types.rs) and the
//! kernel's EventEnvelope (which uses serde_json::Value payloads).
//!
//! The JSON payload structure must exactly match what the kernel's
//! transitions module reads. Threshold overrides are individually
//! optional in both representations: an absent key means "use the
//! state default", and the bridge preserves absence.

use graph_dynamics_engine::events::EventEnvelope;
use serde_json::{json, Map, Value};

use crate::proto_types::*;

/// Convert a protobuf EventEnvelope to the kernel's EventEnvelope.
pub fn proto_to_kernel(proto: &ProtoEventEnvelope) -> EventEnvelope {
    let event = proto
        .event
        .as_ref()
        .expect("ProtoEventEnvelope has no event");
    let kind = event.kind.as_ref().expect("ProtoEvent has no kind");

    let (event_type, payload) = match kind {
        EventKind::InitializePalette(ip) => {
            let mut map = Map::new();
            map.insert(
                "colors".to_string(),
                Value::Array(ip.colors.iter().cloned().map(Value::String).collect()),
            );
            insert_thresholds(&mut map, &ip.thresholds);
            ("initialize_palette", Value::Object(map))
        }
        EventKind::AddVertex(av) => ("add_vertex", json!({ "id": av.id })),
        EventKind::RemoveVertex(rv) => ("remove_vertex", json!({ "id": rv.id })),
        EventKind::AddEdge(ae) => ("add_edge", json!({ "u": ae.u, "v": ae.v })),
        EventKind::RemoveEdge(re) => ("remove_edge", json!({ "u": re.u, "v": re.v })),
        EventKind::AssignColors(ac) => (
            "assign_colors",
            json!({
                "colors": ac.colors,
                "pad_randomly": ac.pad_randomly,
                "seed": ac.seed,
            }),
        ),
        EventKind::SetVertexColor(sv) => (
            "set_vertex_color",
            json!({ "id": sv.id, "color": sv.color }),
        ),
        EventKind::StepRule(sr) => {
            let mut map = Map::new();
            map.insert("rule".to_string(), Value::String(sr.rule.clone()));
            insert_thresholds(&mut map, &sr.thresholds);
            ("step_rule", Value::Object(map))
        }
        EventKind::RunRule(rr) => {
            let mut map = Map::new();
            map.insert("rule".to_string(), Value::String(rr.rule.clone()));
            map.insert("max_steps".to_string(), Value::Number(rr.max_steps.into()));
            insert_thresholds(&mut map, &rr.thresholds);
            ("run_rule", Value::Object(map))
        }
    };

    EventEnvelope {
        event_type: event_type.to_string(),
        sequence: proto.sequence,
        timestamp: String::new(), // proto doesn't carry timestamp
        logical_time: proto.logical_time,
        payload,
        schema_version: 1,
    }
}

/// Convert a kernel EventEnvelope to a protobuf EventEnvelope.
///
/// Used for persisting events to the append-only binary log.
pub fn kernel_to_proto(kernel: &EventEnvelope) -> ProtoEventEnvelope {
    let p = &kernel.payload;
    let kind = match kernel.event_type.as_str() {
        "initialize_palette" => EventKind::InitializePalette(InitializePalette {
            colors: json_str_array(p, "colors"),
            thresholds: extract_thresholds(p),
        }),
        "add_vertex" => EventKind::AddVertex(AddVertex {
            id: json_str(p, "id"),
        }),
        "remove_vertex" => EventKind::RemoveVertex(RemoveVertex {
            id: json_str(p, "id"),
        }),
        "add_edge" => EventKind::AddEdge(AddEdge {
            u: json_str(p, "u"),
            v: json_str(p, "v"),
        }),
        "remove_edge" => EventKind::RemoveEdge(RemoveEdge {
            u: json_str(p, "u"),
            v: json_str(p, "v"),
        }),
        "assign_colors" => EventKind::AssignColors(AssignColors {
            colors: json_str_array(p, "colors"),
            pad_randomly: json_str_array(p, "pad_randomly"),
            seed: p.get("seed").and_then(|v| v.as_u64()).unwrap_or(0),
        }),
        "set_vertex_color" => EventKind::SetVertexColor(SetVertexColor {
            id: json_str(p, "id"),
            color: json_str(p, "color"),
        }),
        "step_rule" => EventKind::StepRule(StepRule {
            rule: json_str(p, "rule"),
            thresholds: extract_thresholds(p),
        }),
        "run_rule" => EventKind::RunRule(RunRule {
            rule: json_str(p, "rule"),
            max_steps: p.get("max_steps").and_then(|v| v.as_u64()).unwrap_or(10),
            thresholds: extract_thresholds(p),
        }),
        other => panic!("Unknown event type for proto conversion: {}", other),
    };

    ProtoEventEnvelope {
        sequence: kernel.sequence,
        logical_time: kernel.logical_time,
        event: Some(ProtoEvent { kind: Some(kind) }),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn insert_thresholds(map: &mut Map<String, Value>, thresholds: &Option<ProtoThresholds>) {
    if let Some(t) = thresholds {
        if let Some(v) = t.strong_threshold {
            map.insert("strong_threshold".to_string(), Value::Number(v.into()));
        }
        if let Some(v) = t.weak_threshold {
            map.insert("weak_threshold".to_string(), Value::Number(v.into()));
        }
        if let Some(v) = t.rival_threshold {
            map.insert("rival_threshold".to_string(), Value::Number(v.into()));
        }
    }
}

fn extract_thresholds(p: &Value) -> Option<ProtoThresholds> {
    let strong = p.get("strong_threshold").and_then(|v| v.as_i64());
    let weak = p.get("weak_threshold").and_then(|v| v.as_i64());
    let rival = p.get("rival_threshold").and_then(|v| v.as_i64());
    if strong.is_none() && weak.is_none() && rival.is_none() {
        return None;
    }
    Some(ProtoThresholds {
        strong_threshold: strong,
        weak_threshold: weak,
        rival_threshold: rival,
    })
}

fn json_str(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(|s| s.as_str())
        .unwrap_or("")
        .to_string()
}

fn json_str_array(v: &Value, key: &str) -> Vec<String> {
    v.get(key)
        .and_then(|a| a.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|s| s.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}
