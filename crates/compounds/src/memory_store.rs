//! In-memory store implementation
//!
//! Backs the test suites and local demo runs with a real cursor-producing
//! store, so the caches upstream exercise the same code paths they hit
//! against a remote document store. `fail_next` injects connection-level
//! failures to drive the degraded paths.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::query::{Query, SortDirection};
use crate::record::{Record, RecordId, Value};
use crate::store::{CursorStream, Store};

#[derive(Default)]
pub struct MemoryStore {
  records: Mutex<Vec<Record>>,
  pending_failures: Arc<AtomicUsize>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make the next `n` store or cursor calls fail with `ConnectionLost`
  pub fn fail_next(&self, n: usize) {
    self.pending_failures.store(n, AtomicOrdering::SeqCst);
  }

  pub fn record_count(&self) -> usize {
    self.records.lock().unwrap().len()
  }

  fn take_failure(&self) -> bool {
    take_failure(&self.pending_failures)
  }
}

fn take_failure(pending: &AtomicUsize) -> bool {
  if pending.load(AtomicOrdering::SeqCst) > 0 {
    pending.fetch_sub(1, AtomicOrdering::SeqCst);
    return true;
  }
  false
}

fn connection_lost() -> StoreError {
  StoreError::ConnectionLost("memory store: injected failure".to_string())
}

/// Equality match of every selector field, plus identity when present
fn matches(record: &Record, selector: &Record) -> bool {
  if let Some(id) = selector.id() {
    if record.id() != Some(id) {
      return false;
    }
  }
  selector.fields().all(|(name, value)| record.get(name) == Some(value))
}

/// Field-value ordering used for server-side sorts
///
/// Records missing the sort field order first. Mixed-type fields compare
/// equal rather than panicking.
fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
  match (a, b) {
    (None, None) => Ordering::Equal,
    (None, Some(_)) => Ordering::Less,
    (Some(_), None) => Ordering::Greater,
    (Some(x), Some(y)) => compare_values(x, y),
  }
}

fn compare_values(x: &Value, y: &Value) -> Ordering {
  if let (Some(a), Some(b)) = (x.as_f64(), y.as_f64()) {
    return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
  }
  match (x, y) {
    (Value::Text(a), Value::Text(b)) => a.cmp(b),
    (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
    _ => Ordering::Equal,
  }
}

struct MemoryCursor {
  remaining: std::vec::IntoIter<Record>,
  pending_failures: Arc<AtomicUsize>,
}

#[async_trait]
impl CursorStream for MemoryCursor {
  async fn next(&mut self) -> Result<Option<Record>, StoreError> {
    if take_failure(&self.pending_failures) {
      return Err(connection_lost());
    }
    Ok(self.remaining.next())
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn query(&self, query: &Query) -> Result<Box<dyn CursorStream>, StoreError> {
    if self.take_failure() {
      return Err(connection_lost());
    }

    let mut results: Vec<Record> = self
      .records
      .lock()
      .unwrap()
      .iter()
      .filter(|record| matches(record, &query.filter))
      .cloned()
      .collect();

    if let Some(sort) = &query.sort {
      results.sort_by(|a, b| {
        let ordering = compare_field(a.get(&sort.field), b.get(&sort.field));
        match sort.direction {
          SortDirection::Ascending => ordering,
          SortDirection::Descending => ordering.reverse(),
        }
      });
    }

    Ok(Box::new(MemoryCursor {
      remaining: results.into_iter(),
      pending_failures: Arc::clone(&self.pending_failures),
    }))
  }

  async fn fetch_by_id(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
    if self.take_failure() {
      return Err(connection_lost());
    }

    let records = self.records.lock().unwrap();
    Ok(records.iter().find(|r| r.id() == Some(id)).cloned())
  }

  async fn update(
    &self,
    selector: &Record,
    patch: &Record,
    upsert: bool,
  ) -> Result<(), StoreError> {
    if self.take_failure() {
      return Err(connection_lost());
    }

    let mut records = self.records.lock().unwrap();
    let mut matched = false;
    for record in records.iter_mut().filter(|r| matches(r, selector)) {
      matched = true;
      for (name, value) in patch.fields() {
        record.set(name, value.clone());
      }
    }

    if !matched && upsert {
      let mut inserted = patch.clone();
      if inserted.id().is_none() {
        inserted.assign_id(RecordId::new());
      }
      records.push(inserted);
    }

    Ok(())
  }

  async fn insert(&self, record: Record) -> Result<RecordId, StoreError> {
    if self.take_failure() {
      return Err(connection_lost());
    }

    let id = record.id().unwrap_or_else(RecordId::new);
    let mut inserted = record;
    inserted.assign_id(id);
    self.records.lock().unwrap().push(inserted);
    Ok(id)
  }
}
