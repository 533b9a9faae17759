//! Pairwise similarity scoring and top-K selection
//!
//! Ranks a working set against a reference compound by Tanimoto similarity
//! of their fingerprints. Candidate sets are the currently materialized
//! page, not the full remote collection, so a linear scan plus one sort is
//! the whole algorithm.
//!
//! Tied scores keep the candidates' original order. An earlier revision
//! keyed the selection on the exact score value, which silently dropped one
//! of two equally scored records; the stable (score, position) sort here is
//! the intended behavior.

use std::cmp::Ordering;

use compounds::{FingerprintMethod, Record};

use crate::fingerprint_cache::FingerprintCache;

/// One ranked candidate: its score, original working-set position, and the
/// record itself
#[derive(Debug, Clone)]
pub struct RankedEntry {
  pub score: f64,
  pub position: usize,
  pub record: Record,
}

/// Top-K candidates, descending by score
#[derive(Debug, Clone, Default)]
pub struct RankedResult {
  entries: Vec<RankedEntry>,
}

impl RankedResult {
  pub fn entries(&self) -> &[RankedEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// The ranked records in score order, ready for `RecordCache::replace_with`
  pub fn into_records(self) -> Vec<Record> {
    self.entries.into_iter().map(|entry| entry.record).collect()
  }
}

pub struct SimilarityRanker {
  fingerprints: FingerprintCache,
}

impl SimilarityRanker {
  pub fn new(fingerprints: FingerprintCache) -> Self {
    Self { fingerprints }
  }

  /// Score every candidate against `reference` and keep the best `k`
  ///
  /// `k` is clamped to the candidate count. Candidates whose fingerprints
  /// degrade to all-zero score 0.0 and sink to the bottom.
  pub async fn rank(
    &self,
    reference: &Record,
    candidates: &[Record],
    k: usize,
    method: &FingerprintMethod,
  ) -> RankedResult {
    let reference_fp = self.fingerprints.get(reference, method).await;

    let mut scored: Vec<(f64, usize)> = Vec::with_capacity(candidates.len());
    for (position, candidate) in candidates.iter().enumerate() {
      let candidate_fp = self.fingerprints.get(candidate, method).await;
      scored.push((reference_fp.tanimoto(&candidate_fp), position));
    }

    scored.sort_by(|a, b| {
      b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal).then_with(|| a.1.cmp(&b.1))
    });
    scored.truncate(k.min(candidates.len()));

    RankedResult {
      entries: scored
        .into_iter()
        .map(|(score, position)| RankedEntry {
          score,
          position,
          record: candidates[position].clone(),
        })
        .collect(),
    }
  }
}
