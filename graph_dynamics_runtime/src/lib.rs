#![forbid(unsafe_code)]

//! Runtime for the graph dynamics kernel.
//!
//! Wraps the frozen kernel v1 with persistence, replay, snapshots,
//! session management, and drift detection.
//!
//! No simulation logic lives here. All transitions and invariants are
//! delegated to the kernel.

pub mod proto_types;
pub mod proto_bridge;
pub mod event_store;
pub mod replay;
pub mod snapshot;
pub mod snapshot_codec;
pub mod session;
pub mod drift;
