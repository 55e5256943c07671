//! Snapshot codec: deterministic SimState encoder/decoder.
//!
//! Pure codec layer. No side-effects, no timestamps, no envelope.
//!
//! - `encode_snapshot`:  SimState -> canonical JSON string
//! - `decode_snapshot`:  JSON string -> SimState (strict, no defaults)
//! - `restore_snapshot`: decode + invariant validation
//! - `export_snapshot_to_file` / `import_snapshot_from_file`: file I/O
//! - `snapshot_hash`:    SHA-256 of the serde JSON (lowercase hex)

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

use graph_dynamics_engine::domain::SimState;
use graph_dynamics_engine::invariants::try_validate_invariants;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// All possible snapshot codec failures.
#[derive(Debug)]
pub enum SnapshotError {
    /// JSON serialization failed.
    SerializationError(String),
    /// JSON deserialization failed (malformed, missing fields, unknown fields).
    DeserializationError(String),
    /// Loaded state violates kernel invariants.
    InvariantViolation(String),
    /// File I/O error.
    IoError(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::SerializationError(msg) => {
                write!(f, "SerializationError: {}", msg)
            }
            SnapshotError::DeserializationError(msg) => {
                write!(f, "DeserializationError: {}", msg)
            }
            SnapshotError::InvariantViolation(msg) => {
                write!(f, "InvariantViolation: {}", msg)
            }
            SnapshotError::IoError(msg) => {
                write!(f, "IoError: {}", msg)
            }
        }
    }
}

impl From<io::Error> for SnapshotError {
    fn from(err: io::Error) -> Self {
        SnapshotError::IoError(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Encoder / decoder
// ---------------------------------------------------------------------------

/// Encode a SimState to a JSON string.
///
/// Uses serde serialization; BTree collections keep keys sorted, so
/// output is deterministic for identical states.
pub fn encode_snapshot(state: &SimState) -> Result<String, SnapshotError> {
    serde_json::to_string(state).map_err(|e| SnapshotError::SerializationError(e.to_string()))
}

/// Decode a JSON string into a SimState.
///
/// Strict deserialization: `deny_unknown_fields` on all types rejects
/// unexpected fields, and missing required fields cause failure. No
/// silent defaults. No invariant validation; use `restore_snapshot`
/// for validated loading.
pub fn decode_snapshot(json: &str) -> Result<SimState, SnapshotError> {
    serde_json::from_str::<SimState>(json)
        .map_err(|e| SnapshotError::DeserializationError(e.to_string()))
}

/// Decode a JSON string and validate invariants immediately.
///
/// This is the safe entry point for loading state from untrusted
/// sources. Returns `Err(InvariantViolation)` if any kernel invariant
/// check fails.
pub fn restore_snapshot(json: &str) -> Result<SimState, SnapshotError> {
    let state = decode_snapshot(json)?;
    try_validate_invariants(&state).map_err(SnapshotError::InvariantViolation)?;
    Ok(state)
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Export a SimState to a file as JSON.
///
/// Creates parent directories if needed. Byte-for-byte identical across
/// identical states. No timestamps in output.
pub fn export_snapshot_to_file(state: &SimState, path: &Path) -> Result<(), SnapshotError> {
    let json = encode_snapshot(state)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, json.as_bytes())?;
    Ok(())
}

/// Import a SimState from a JSON file.
///
/// Reads the file, deserializes, and validates invariants.
/// Fails on malformed JSON, missing fields, or invariant violations.
pub fn import_snapshot_from_file(path: &Path) -> Result<SimState, SnapshotError> {
    let content = fs::read_to_string(path)?;
    restore_snapshot(&content)
}

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// SHA-256 of the serde JSON encoding. Lowercase hex string.
///
/// NOTE: This hashes the *serde-derived* JSON, NOT the canonical hash
/// from the kernel's hashing module (which includes `kernel_version`
/// and hand-crafted field ordering). This hash is for snapshot file
/// integrity only.
pub fn snapshot_hash(state: &SimState) -> Result<String, SnapshotError> {
    let json = encode_snapshot(state)?;
    let digest = Sha256::digest(json.as_bytes());
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use graph_dynamics_engine::domain::Edge;

    /// Build a minimal valid SimState for testing.
    fn make_test_state() -> SimState {
        let mut state = SimState::default();
        for vid in ["left", "right"] {
            state.vertices.insert(vid.to_string());
        }
        state.edges.push(Edge::normalized("left", "right"));
        state.palette = vec!["green".to_string(), "red".to_string()];
        state
            .coloring
            .insert("left".to_string(), "green".to_string());
        state
            .coloring
            .insert("right".to_string(), "red".to_string());
        state.step_count = 3;
        state
    }

    #[test]
    fn roundtrip_produces_identical_json() {
        let state = make_test_state();
        let json1 = encode_snapshot(&state).unwrap();
        let decoded = decode_snapshot(&json1).unwrap();
        let json2 = encode_snapshot(&decoded).unwrap();
        assert_eq!(json1, json2, "Roundtrip must produce identical JSON");
    }

    #[test]
    fn dangling_edge_returns_invariant_violation() {
        let mut state = make_test_state();
        state.edges.push(Edge {
            u: "left".to_string(),
            v: "missing".to_string(),
        });
        let json = encode_snapshot(&state).unwrap();
        let result = restore_snapshot(&json);
        match result.unwrap_err() {
            SnapshotError::InvariantViolation(msg) => {
                assert!(msg.contains("edge_refs"), "got: {}", msg);
            }
            other => panic!("Expected InvariantViolation, got: {:?}", other),
        }
    }

    #[test]
    fn off_palette_color_returns_invariant_violation() {
        let mut state = make_test_state();
        state
            .coloring
            .insert("left".to_string(), "magenta".to_string());
        let json = encode_snapshot(&state).unwrap();
        let result = restore_snapshot(&json);
        match result.unwrap_err() {
            SnapshotError::InvariantViolation(msg) => {
                assert!(msg.contains("palette_membership"), "got: {}", msg);
            }
            other => panic!("Expected InvariantViolation, got: {:?}", other),
        }
    }

    #[test]
    fn file_roundtrip_matches() {
        let state = make_test_state();
        let dir = std::env::temp_dir()
            .join("graph_dynamics_codec_tests")
            .join("file_roundtrip");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("state.json");

        export_snapshot_to_file(&state, &path).unwrap();
        let imported = import_snapshot_from_file(&path).unwrap();
        let json_original = encode_snapshot(&state).unwrap();
        let json_imported = encode_snapshot(&imported).unwrap();
        assert_eq!(json_original, json_imported);
    }

    #[test]
    fn file_content_matches_encoding() {
        let state = make_test_state();
        let json = encode_snapshot(&state).unwrap();
        let dir = std::env::temp_dir()
            .join("graph_dynamics_codec_tests")
            .join("file_content");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("state.json");

        export_snapshot_to_file(&state, &path).unwrap();
        let file_content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(json, file_content);
    }

    #[test]
    fn corrupted_file_returns_deserialization_error() {
        let dir = std::env::temp_dir()
            .join("graph_dynamics_codec_tests")
            .join("corrupted");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.json");
        std::fs::write(&path, b"{ not valid json !!!}").unwrap();

        let result = import_snapshot_from_file(&path);
        match result.unwrap_err() {
            SnapshotError::DeserializationError(_) => {}
            other => panic!("Expected DeserializationError, got: {:?}", other),
        }
    }

    #[test]
    fn missing_field_returns_deserialization_error() {
        // Valid JSON but missing required SimState fields
        let json = r#"{"vertices":[]}"#;
        let result = decode_snapshot(json);
        match result.unwrap_err() {
            SnapshotError::DeserializationError(_) => {}
            other => panic!("Expected DeserializationError, got: {:?}", other),
        }
    }

    #[test]
    fn unknown_field_returns_deserialization_error() {
        let state = make_test_state();
        let mut v: serde_json::Value =
            serde_json::from_str(&encode_snapshot(&state).unwrap()).unwrap();
        v["surprise"] = serde_json::json!(true);
        let result = decode_snapshot(&serde_json::to_string(&v).unwrap());
        match result.unwrap_err() {
            SnapshotError::DeserializationError(_) => {}
            other => panic!("Expected DeserializationError, got: {:?}", other),
        }
    }

    #[test]
    fn hash_is_deterministic() {
        let state = make_test_state();
        let h1 = snapshot_hash(&state).unwrap();
        let h2 = snapshot_hash(&state).unwrap();
        assert_eq!(h1, h2, "Same state must produce same hash");
        assert_eq!(h1.len(), 64, "SHA-256 hex string must be 64 chars");
    }

    #[test]
    fn hash_matches_file_hash() {
        let state = make_test_state();
        let mem_hash = snapshot_hash(&state).unwrap();

        let dir = std::env::temp_dir()
            .join("graph_dynamics_codec_tests")
            .join("hash_parity");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("state.json");
        export_snapshot_to_file(&state, &path).unwrap();

        let file_bytes = std::fs::read(&path).unwrap();
        let file_digest = Sha256::digest(&file_bytes);
        let file_hash: String = file_digest.iter().map(|b| format!("{:02x}", b)).collect();

        assert_eq!(mem_hash, file_hash);
    }
}
