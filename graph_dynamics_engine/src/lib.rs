#![forbid(unsafe_code)]

//! Graph coloring dynamics kernel, v1.
//!
//! A coloring assigns a palette label to each vertex of an undirected
//! graph. Adjacent vertices may share a label; this is not proper graph
//! coloring in the graph-theoretic sense. Update rules recompute the
//! whole coloring synchronously from the previous one; iterating a rule
//! simulates the dynamics.
//!
//! The kernel is event-sourced and fully deterministic: the same event
//! stream always produces the same state and the same canonical hash.

/// Kernel v1. Behavioral changes require kernel v2.
pub const KERNEL_VERSION: u32 = 1;

pub mod arithmetic;
pub mod domain;
pub mod events;
pub mod state;
pub mod graph;
pub mod rules;
pub mod transitions;
pub mod invariants;
pub mod hashing;
pub mod engine;
