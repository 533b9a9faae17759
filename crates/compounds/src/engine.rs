//! Structure engine contract
//!
//! The real chemistry lives in an external engine. This crate only defines
//! the seam: parse a line-notation identifier into an opaque structure,
//! derive a fingerprint from it, and test substructure containment.
//!
//! `LineNotationEngine` is a deterministic stand-in used by tests and local
//! runs. Its fingerprints are n-gram hashes over the identifier text, which
//! preserves the properties the caches rely on (identical input gives
//! identical bits, related strings share bits) without doing any chemistry.

use crate::fingerprint::{Fingerprint, FingerprintMethod};

/// An engine-parsed structure, opaque outside the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
  identifier: String,
}

impl Structure {
  pub fn identifier(&self) -> &str {
    &self.identifier
  }
}

/// Parses structure identifiers and derives fingerprints from them
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
pub trait StructureEngine: Send + Sync {
  /// Parse a line-notation identifier; `None` on malformed input
  fn parse(&self, identifier: &str) -> Option<Structure>;

  /// Compute the fixed-format fingerprint of a parsed structure
  fn fingerprint(&self, structure: &Structure, method: &FingerprintMethod) -> Fingerprint;

  /// Test whether a structure contains the given substructure pattern
  fn matches_substructure(&self, structure: &Structure, pattern: &str) -> bool;
}

/// Hash-based engine over raw line notation
pub struct LineNotationEngine;

impl LineNotationEngine {
  const MIN_GRAM: usize = 1;
  const MAX_GRAM: usize = 3;
}

impl StructureEngine for LineNotationEngine {
  fn parse(&self, identifier: &str) -> Option<Structure> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_graphic()) {
      return None;
    }
    Some(Structure { identifier: trimmed.to_string() })
  }

  fn fingerprint(&self, structure: &Structure, method: &FingerprintMethod) -> Fingerprint {
    let mut fingerprint = Fingerprint::zero(method.bits);
    if method.bits == 0 {
      return fingerprint;
    }

    let bytes = structure.identifier.as_bytes();
    for width in Self::MIN_GRAM..=Self::MAX_GRAM {
      if bytes.len() < width {
        break;
      }
      for gram in bytes.windows(width) {
        fingerprint.set((fnv1a(gram) % method.bits as u64) as usize);
      }
    }
    fingerprint
  }

  fn matches_substructure(&self, structure: &Structure, pattern: &str) -> bool {
    !pattern.is_empty() && structure.identifier.contains(pattern)
  }
}

/// FNV-1a over a byte slice; stable across platforms and runs
fn fnv1a(bytes: &[u8]) -> u64 {
  let mut hash = 0xcbf2_9ce4_8422_2325u64;
  for &byte in bytes {
    hash ^= u64::from(byte);
    hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
  }
  hash
}

#[cfg(test)]
mod tests {
  use super::*;

  fn method() -> FingerprintMethod {
    FingerprintMethod::new("fp.test", 512)
  }

  #[test]
  fn test_parse_rejects_empty_and_whitespace() {
    let engine = LineNotationEngine;

    assert!(engine.parse("").is_none());
    assert!(engine.parse("   ").is_none());
    assert!(engine.parse("C C O").is_none());
  }

  #[test]
  fn test_parse_trims_surrounding_whitespace() {
    let engine = LineNotationEngine;

    let structure = engine.parse("  c1ccccc1\n").unwrap();

    assert_eq!(structure.identifier(), "c1ccccc1");
  }

  #[test]
  fn test_fingerprint_is_deterministic() {
    let engine = LineNotationEngine;
    let structure = engine.parse("CC(=O)OC1=CC=CC=C1C(=O)O").unwrap();

    let first = engine.fingerprint(&structure, &method());
    let second = engine.fingerprint(&structure, &method());

    assert_eq!(first, second);
    assert_eq!(first.len(), 512);
    assert!(!first.is_zero());
  }

  #[test]
  fn test_identical_identifiers_score_one() {
    let engine = LineNotationEngine;
    let a = engine.parse("c1ccccc1").unwrap();
    let b = engine.parse("c1ccccc1").unwrap();

    let fp_a = engine.fingerprint(&a, &method());
    let fp_b = engine.fingerprint(&b, &method());

    assert_eq!(fp_a.tanimoto(&fp_b), 1.0);
  }

  #[test]
  fn test_related_identifiers_score_higher_than_unrelated() {
    let engine = LineNotationEngine;
    let reference = engine.parse("CC(=O)OC1=CC=CC=C1C(=O)O").unwrap();
    let related = engine.parse("CC(=O)OC1=CC=CC=C1").unwrap();
    let unrelated = engine.parse("N").unwrap();

    let ref_fp = engine.fingerprint(&reference, &method());
    let related_score = ref_fp.tanimoto(&engine.fingerprint(&related, &method()));
    let unrelated_score = ref_fp.tanimoto(&engine.fingerprint(&unrelated, &method()));

    assert!(related_score > unrelated_score);
  }

  #[test]
  fn test_substructure_containment() {
    let engine = LineNotationEngine;
    let structure = engine.parse("CC(=O)OC1=CC=CC=C1C(=O)O").unwrap();

    assert!(engine.matches_substructure(&structure, "C(=O)O"));
    assert!(!engine.matches_substructure(&structure, "N"));
    assert!(!engine.matches_substructure(&structure, ""));
  }
}
