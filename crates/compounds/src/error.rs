//! Error taxonomy for store and fingerprint operations
//!
//! None of these are fatal to a running browser. Connection loss leaves
//! whatever was already materialized in place, and fingerprint problems
//! degrade to an all-zero vector that simply ranks last.

use thiserror::Error;

/// Failures surfaced by the external document store
#[derive(Debug, Error)]
pub enum StoreError {
  /// The store is unreachable; retrying later may succeed
  #[error("store connection lost: {0}")]
  ConnectionLost(String),

  /// The store produced a payload this client could not interpret
  #[error("malformed store payload: {0}")]
  Malformed(String),
}

/// Failures while producing a fingerprint for a record
#[derive(Debug, Error)]
pub enum FingerprintError {
  /// The record carries no structure identifier field
  #[error("record has no `{0}` field")]
  MissingStructure(String),

  /// The structure identifier did not parse
  #[error("structure identifier `{0}` did not parse")]
  MalformedStructure(String),

  /// Persisting a computed fingerprint failed; the in-memory value is
  /// still valid for the current operation
  #[error("fingerprint write-back failed: {0}")]
  WriteBackFailed(#[from] StoreError),
}
