//! Cache-or-compute fingerprints with store write-back
//!
//! The fast path reads a fingerprint previously serialized onto the record
//! under the method's field name. The slow path computes one through the
//! structure engine and writes it back to the store so later sessions hit
//! the fast path. Write-back is best-effort: a failure is logged and the
//! in-memory fingerprint stays valid for the current operation.
//!
//! Recomputation is idempotent for a given record and method (the structure
//! does not change), so duplicate write-backs overwrite each other safely.

use std::sync::Arc;

use tracing::{debug, warn};

use compounds::{
  Fingerprint, FingerprintError, FingerprintMethod, Record, Settings, Store, StructureEngine,
  Value,
};

/// Outcome counts of a bulk precompute pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterializeSummary {
  /// Fingerprints computed (and written back) this pass
  pub computed: usize,
  /// Fingerprints already present on the records
  pub cached: usize,
}

pub struct FingerprintCache {
  store: Arc<dyn Store>,
  engine: Arc<dyn StructureEngine>,
  structure_field: String,
}

impl FingerprintCache {
  pub fn new(store: Arc<dyn Store>, engine: Arc<dyn StructureEngine>, settings: &Settings) -> Self {
    Self { store, engine, structure_field: settings.structure_field.clone() }
  }

  /// The record's fingerprint for `method`, cached or computed
  ///
  /// Degraded inputs (no structure field, unparseable identifier) yield an
  /// all-zero fingerprint of the method's length, which ranks last instead
  /// of failing the whole operation.
  pub async fn get(&self, record: &Record, method: &FingerprintMethod) -> Fingerprint {
    if let Some(bytes) = record.get_bytes(&method.name) {
      return Fingerprint::from_bytes(bytes, method.bits);
    }
    self.compute_and_cache(record, method).await
  }

  /// Force fingerprint population for every record in a working set
  ///
  /// Operates only on the supplied records, never the full remote
  /// collection.
  pub async fn materialize_all(
    &self,
    records: &[Record],
    method: &FingerprintMethod,
  ) -> MaterializeSummary {
    let mut summary = MaterializeSummary::default();
    for record in records {
      if record.get_bytes(&method.name).is_some() {
        summary.cached += 1;
      } else {
        summary.computed += 1;
      }
      self.get(record, method).await;
    }
    summary
  }

  async fn compute_and_cache(&self, record: &Record, method: &FingerprintMethod) -> Fingerprint {
    let Some(identifier) = record.get_str(&self.structure_field) else {
      warn!("{}", FingerprintError::MissingStructure(self.structure_field.clone()));
      return Fingerprint::zero(method.bits);
    };

    let Some(structure) = self.engine.parse(identifier) else {
      warn!("{}", FingerprintError::MalformedStructure(identifier.to_string()));
      return Fingerprint::zero(method.bits);
    };

    let fingerprint = self.engine.fingerprint(&structure, method);
    self.write_back(record, method, &fingerprint).await;
    fingerprint
  }

  /// Persist a computed fingerprint onto the record, best-effort
  async fn write_back(
    &self,
    record: &Record,
    method: &FingerprintMethod,
    fingerprint: &Fingerprint,
  ) {
    let Some(id) = record.id() else {
      debug!("record has no store identity, skipping fingerprint write-back");
      return;
    };

    let selector = Record::new().with_id(id);
    let patch = Record::new().field(method.name.clone(), Value::bytes(fingerprint.to_bytes()));
    if let Err(e) = self.store.update(&selector, &patch, false).await {
      warn!("{}", FingerprintError::WriteBackFailed(e));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use compounds::engine::MockStructureEngine;
  use compounds::store::MockStore;
  use compounds::{LineNotationEngine, MemoryStore, Query, RecordId};

  fn method() -> FingerprintMethod {
    FingerprintMethod::new("fp.test", 256)
  }

  fn settings() -> Settings {
    Settings { fingerprint: method(), ..Settings::default() }
  }

  fn cache_over(store: Arc<dyn Store>) -> FingerprintCache {
    FingerprintCache::new(store, Arc::new(LineNotationEngine), &settings())
  }

  #[tokio::test]
  async fn test_fast_path_reads_stored_bytes_without_engine_or_store() {
    let mut stored = Fingerprint::zero(256);
    stored.set(7);
    stored.set(200);
    let record = Record::new()
      .with_id(RecordId::new())
      .field("fp.test", Value::bytes(stored.to_bytes()));

    let mut store = MockStore::new();
    store.expect_update().times(0);
    let mut engine = MockStructureEngine::new();
    engine.expect_parse().times(0);
    let cache = FingerprintCache::new(Arc::new(store), Arc::new(engine), &settings());

    let fingerprint = cache.get(&record, &method()).await;

    assert_eq!(fingerprint, stored);
  }

  #[tokio::test]
  async fn test_fast_path_normalizes_foreign_padding() {
    // Another client padded the blob out to 512 bits; we read at 256.
    let mut wide = Fingerprint::zero(512);
    wide.set(3);
    wide.set(400); // beyond our logical length, must be dropped
    let record = Record::new().field("fp.test", Value::bytes(wide.to_bytes()));

    let cache = cache_over(Arc::new(MemoryStore::new()));
    let fingerprint = cache.get(&record, &method()).await;

    assert_eq!(fingerprint.len(), 256);
    assert!(fingerprint.test(3));
    assert_eq!(fingerprint.count_ones(), 1);
  }

  #[tokio::test]
  async fn test_slow_path_computes_and_writes_back() {
    let store = Arc::new(MemoryStore::new());
    let id = store
      .insert(Record::new().field("structure", Value::text("c1ccccc1")))
      .await
      .unwrap();
    let record = store.fetch_by_id(id).await.unwrap().unwrap();

    let cache = cache_over(Arc::clone(&store) as Arc<dyn Store>);
    let fingerprint = cache.get(&record, &method()).await;
    assert!(!fingerprint.is_zero());

    // The store-side record now carries the serialized fingerprint.
    let refreshed = store.fetch_by_id(id).await.unwrap().unwrap();
    let bytes = refreshed.get_bytes("fp.test").unwrap();
    assert_eq!(Fingerprint::from_bytes(bytes, 256), fingerprint);
  }

  #[tokio::test]
  async fn test_slow_path_issues_exactly_one_non_upsert_update() {
    let record = Record::new()
      .with_id(RecordId::new())
      .field("structure", Value::text("CC(=O)OC1=CC=CC=C1C(=O)O"));

    let mut store = MockStore::new();
    store
      .expect_update()
      .withf(|_selector, patch, upsert| patch.get_bytes("fp.test").is_some() && !*upsert)
      .times(1)
      .returning(|_, _, _| Ok(()));
    let cache = FingerprintCache::new(Arc::new(store), Arc::new(LineNotationEngine), &settings());

    cache.get(&record, &method()).await;
  }

  #[tokio::test]
  async fn test_write_back_failure_keeps_in_memory_fingerprint() {
    let store = Arc::new(MemoryStore::new());
    let id = store
      .insert(Record::new().field("structure", Value::text("c1ccccc1")))
      .await
      .unwrap();
    let record = store.fetch_by_id(id).await.unwrap().unwrap();

    let cache = cache_over(Arc::clone(&store) as Arc<dyn Store>);
    store.fail_next(1);
    let fingerprint = cache.get(&record, &method()).await;

    // The computed value is still usable despite the failed persistence.
    assert!(!fingerprint.is_zero());
    let refreshed = store.fetch_by_id(id).await.unwrap().unwrap();
    assert!(refreshed.get_bytes("fp.test").is_none());
  }

  #[tokio::test]
  async fn test_missing_structure_yields_zero_without_write_back() {
    let record = Record::new().with_id(RecordId::new()).field("name", Value::text("mystery"));

    let mut store = MockStore::new();
    store.expect_update().times(0);
    let cache = FingerprintCache::new(Arc::new(store), Arc::new(LineNotationEngine), &settings());

    let fingerprint = cache.get(&record, &method()).await;

    assert!(fingerprint.is_zero());
    assert_eq!(fingerprint.len(), 256);
  }

  #[tokio::test]
  async fn test_malformed_identifier_yields_zero() {
    let record = Record::new().field("structure", Value::text("   "));

    let cache = cache_over(Arc::new(MemoryStore::new()));
    let fingerprint = cache.get(&record, &method()).await;

    assert!(fingerprint.is_zero());
  }

  #[tokio::test]
  async fn test_get_is_idempotent_across_cache_states() {
    let store = Arc::new(MemoryStore::new());
    let id = store
      .insert(Record::new().field("structure", Value::text("CC(C)Cc1ccc(cc1)C(C)C(=O)O")))
      .await
      .unwrap();
    let record = store.fetch_by_id(id).await.unwrap().unwrap();

    let cache = cache_over(Arc::clone(&store) as Arc<dyn Store>);
    let computed = cache.get(&record, &method()).await;

    // Second read from the refreshed record takes the fast path and must be
    // bit-identical after padding normalization.
    let refreshed = store.fetch_by_id(id).await.unwrap().unwrap();
    let cached = cache.get(&refreshed, &method()).await;

    assert_eq!(cached, computed);
  }

  #[tokio::test]
  async fn test_materialize_all_populates_the_working_set_only() {
    let store = Arc::new(MemoryStore::new());
    for identifier in ["c1ccccc1", "CCO", "CC(=O)O"] {
      store
        .insert(Record::new().field("structure", Value::text(identifier)))
        .await
        .unwrap();
    }
    // One record outside the working set.
    let outside = store
      .insert(Record::new().field("structure", Value::text("N#N")))
      .await
      .unwrap();

    let mut cursor = store
      .query(&Query::filtered(Record::new()))
      .await
      .unwrap();
    let mut working_set = Vec::new();
    while let Some(record) = cursor.next().await.unwrap() {
      if record.id() != Some(outside) {
        working_set.push(record);
      }
    }

    let cache = cache_over(Arc::clone(&store) as Arc<dyn Store>);
    let first = cache.materialize_all(&working_set, &method()).await;
    assert_eq!(first, MaterializeSummary { computed: 3, cached: 0 });

    // Refetch: everything in the working set now hits the fast path.
    let mut refreshed = Vec::new();
    for record in &working_set {
      refreshed.push(store.fetch_by_id(record.id().unwrap()).await.unwrap().unwrap());
    }
    let second = cache.materialize_all(&refreshed, &method()).await;
    assert_eq!(second, MaterializeSummary { computed: 0, cached: 3 });

    // The record outside the supplied set was never touched.
    let untouched = store.fetch_by_id(outside).await.unwrap().unwrap();
    assert!(untouched.get_bytes("fp.test").is_none());
  }
}
