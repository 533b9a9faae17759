//! Runtime settings for the browser core
//!
//! Settings are loaded once and threaded explicitly through constructors;
//! there is no process-wide configuration handle.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fingerprint::FingerprintMethod;

/// Settings shared by the caches and filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
  /// Record field holding the line-notation structure identifier
  #[serde(default = "default_structure_field")]
  pub structure_field: String,
  /// Fingerprint scheme used for similarity ranking and write-back caching
  #[serde(default)]
  pub fingerprint: FingerprintMethod,
  /// Default number of rows pulled per incremental load
  #[serde(default = "default_page_size")]
  pub page_size: usize,
}

fn default_structure_field() -> String {
  "structure".to_string()
}

fn default_page_size() -> usize {
  50
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      structure_field: default_structure_field(),
      fingerprint: FingerprintMethod::default(),
      page_size: default_page_size(),
    }
  }
}

impl Settings {
  pub fn from_json(json: &str) -> Result<Self> {
    serde_json::from_str(json).context("invalid settings document")
  }

  pub fn from_file(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read settings from {}", path.display()))?;
    Self::from_json(&contents)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let settings = Settings::default();

    assert_eq!(settings.structure_field, "structure");
    assert_eq!(settings.fingerprint.bits, 1024);
    assert_eq!(settings.page_size, 50);
  }

  #[test]
  fn test_partial_document_fills_in_defaults() {
    let settings = Settings::from_json(r#"{ "page_size": 25 }"#).unwrap();

    assert_eq!(settings.page_size, 25);
    assert_eq!(settings.structure_field, "structure");
    assert_eq!(settings.fingerprint, FingerprintMethod::default());
  }

  #[test]
  fn test_invalid_document_is_an_error() {
    assert!(Settings::from_json(r#"{ "page_size": "many" }"#).is_err());
  }
}
