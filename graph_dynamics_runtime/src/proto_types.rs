//! Hand-written protobuf types for the event log.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//! One message per kernel event type, joined by a oneof.

use prost::Message;

// ── Event Envelope ─────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoEventEnvelope {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(uint64, tag = "2")]
    pub logical_time: u64,
    #[prost(message, optional, tag = "3")]
    pub event: Option<ProtoEvent>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoEvent {
    #[prost(oneof = "EventKind", tags = "1, 2, 3, 4, 5, 6, 7, 8, 9")]
    pub kind: Option<EventKind>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum EventKind {
    #[prost(message, tag = "1")]
    InitializePalette(InitializePalette),
    #[prost(message, tag = "2")]
    AddVertex(AddVertex),
    #[prost(message, tag = "3")]
    RemoveVertex(RemoveVertex),
    #[prost(message, tag = "4")]
    AddEdge(AddEdge),
    #[prost(message, tag = "5")]
    RemoveEdge(RemoveEdge),
    #[prost(message, tag = "6")]
    AssignColors(AssignColors),
    #[prost(message, tag = "7")]
    SetVertexColor(SetVertexColor),
    #[prost(message, tag = "8")]
    StepRule(StepRule),
    #[prost(message, tag = "9")]
    RunRule(RunRule),
}

// ── Thresholds ─────────────────────────────────────────────────

/// Per-event threshold overrides. Absent fields fall back to the
/// state's defaults, so each one is optional on the wire.
#[derive(Clone, PartialEq, Message)]
pub struct ProtoThresholds {
    #[prost(int64, optional, tag = "1")]
    pub strong_threshold: Option<i64>,
    #[prost(int64, optional, tag = "2")]
    pub weak_threshold: Option<i64>,
    #[prost(int64, optional, tag = "3")]
    pub rival_threshold: Option<i64>,
}

// ── Event Types ────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct InitializePalette {
    #[prost(string, repeated, tag = "1")]
    pub colors: Vec<String>,
    #[prost(message, optional, tag = "2")]
    pub thresholds: Option<ProtoThresholds>,
}

#[derive(Clone, PartialEq, Message)]
pub struct AddVertex {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct RemoveVertex {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct AddEdge {
    #[prost(string, tag = "1")]
    pub u: String,
    #[prost(string, tag = "2")]
    pub v: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct RemoveEdge {
    #[prost(string, tag = "1")]
    pub u: String,
    #[prost(string, tag = "2")]
    pub v: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct AssignColors {
    #[prost(string, repeated, tag = "1")]
    pub colors: Vec<String>,
    #[prost(string, repeated, tag = "2")]
    pub pad_randomly: Vec<String>,
    #[prost(uint64, tag = "3")]
    pub seed: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct SetVertexColor {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub color: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct StepRule {
    #[prost(string, tag = "1")]
    pub rule: String,
    #[prost(message, optional, tag = "2")]
    pub thresholds: Option<ProtoThresholds>,
}

#[derive(Clone, PartialEq, Message)]
pub struct RunRule {
    #[prost(string, tag = "1")]
    pub rule: String,
    #[prost(uint64, tag = "2")]
    pub max_steps: u64,
    #[prost(message, optional, tag = "3")]
    pub thresholds: Option<ProtoThresholds>,
}
