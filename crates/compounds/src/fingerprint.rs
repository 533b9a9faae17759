//! Structural fingerprint bit-vectors
//!
//! A fingerprint is a fixed-length bit-vector summarizing a compound's
//! structure. Storage is padded to whole 64-bit blocks; the padding bits are
//! kept zero at all times so popcount-based comparisons never see them.
//! Fingerprints persisted by other clients may carry a different padding
//! width, so deserialization always normalizes to the caller's expected
//! logical length.

use serde::{Deserialize, Serialize};

const BLOCK_BITS: usize = 64;

/// Names a fingerprint scheme and fixes its logical bit length
///
/// The name doubles as the record field under which the serialized
/// fingerprint is cached in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintMethod {
  pub name: String,
  pub bits: usize,
}

impl FingerprintMethod {
  pub fn new(name: impl Into<String>, bits: usize) -> Self {
    Self { name: name.into(), bits }
  }
}

impl Default for FingerprintMethod {
  fn default() -> Self {
    Self { name: "fp.hashed.v1".to_string(), bits: 1024 }
  }
}

/// A fixed-length bit-vector over 64-bit blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
  blocks: Vec<u64>,
  bits: usize,
}

impl Fingerprint {
  /// An all-zero fingerprint of the given logical length
  pub fn zero(bits: usize) -> Self {
    Self { blocks: vec![0; block_count(bits)], bits }
  }

  /// Logical length in bits
  pub fn len(&self) -> usize {
    self.bits
  }

  pub fn is_empty(&self) -> bool {
    self.bits == 0
  }

  pub fn is_zero(&self) -> bool {
    self.blocks.iter().all(|b| *b == 0)
  }

  /// Set bit `i`; out-of-range indices are ignored
  pub fn set(&mut self, i: usize) {
    if i < self.bits {
      self.blocks[i / BLOCK_BITS] |= 1u64 << (i % BLOCK_BITS);
    }
  }

  pub fn test(&self, i: usize) -> bool {
    if i >= self.bits {
      return false;
    }
    self.blocks[i / BLOCK_BITS] >> (i % BLOCK_BITS) & 1 == 1
  }

  pub fn count_ones(&self) -> u32 {
    self.blocks.iter().map(|b| b.count_ones()).sum()
  }

  /// Serialize as little-endian block bytes for storage as a binary field
  pub fn to_bytes(&self) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(self.blocks.len() * 8);
    for block in &self.blocks {
      bytes.extend_from_slice(&block.to_le_bytes());
    }
    bytes
  }

  /// Rebuild from stored bytes, normalized to `expected_bits`
  ///
  /// Blobs written on platforms with a different padding width are truncated
  /// or zero-extended to the expected block count, and any stray padding
  /// bits are cleared before the vector is used in comparisons.
  pub fn from_bytes(bytes: &[u8], expected_bits: usize) -> Self {
    let mut blocks = vec![0u64; block_count(expected_bits)];
    for (i, block) in blocks.iter_mut().enumerate() {
      let mut le = [0u8; 8];
      let start = i * 8;
      if start >= bytes.len() {
        break;
      }
      let end = usize::min(start + 8, bytes.len());
      le[..end - start].copy_from_slice(&bytes[start..end]);
      *block = u64::from_le_bytes(le);
    }

    let mut fingerprint = Self { blocks, bits: expected_bits };
    fingerprint.mask_padding();
    fingerprint
  }

  /// Tanimoto coefficient |A∩B| / |A∪B| against another fingerprint
  ///
  /// Two all-zero vectors score 0.0, not NaN. Vectors of unequal block count
  /// are compared as if the shorter were zero-extended.
  pub fn tanimoto(&self, other: &Fingerprint) -> f64 {
    let longest = usize::max(self.blocks.len(), other.blocks.len());
    let mut intersection = 0u32;
    let mut union = 0u32;

    for i in 0..longest {
      let a = self.blocks.get(i).copied().unwrap_or(0);
      let b = other.blocks.get(i).copied().unwrap_or(0);
      intersection += (a & b).count_ones();
      union += (a | b).count_ones();
    }

    if union == 0 {
      0.0
    } else {
      f64::from(intersection) / f64::from(union)
    }
  }

  /// Clear storage bits beyond the logical length
  fn mask_padding(&mut self) {
    let tail_bits = self.bits % BLOCK_BITS;
    if tail_bits != 0 {
      if let Some(last) = self.blocks.last_mut() {
        *last &= (1u64 << tail_bits) - 1;
      }
    }
  }
}

fn block_count(bits: usize) -> usize {
  (bits + BLOCK_BITS - 1) / BLOCK_BITS
}
