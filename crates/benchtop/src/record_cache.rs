//! Incremental, cursor-backed result cache
//!
//! Presents an unbounded streaming query result as a stable, randomly
//! indexable sequence. Rows are appended strictly in stream order and a
//! materialized position never changes identity until the whole cache is
//! invalidated by a new query, so positions are safe to hand out as row
//! tokens.
//!
//! All store interaction happens inside the async operations; awaiting them
//! is the explicit blocking point. The `&mut self` receivers make
//! `set_query`, `load_more`, and `replace_with` mutually exclusive per
//! instance.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, warn};

use compounds::{CursorStream, Query, Record, SortDirection, Store};

/// Ordered projection metadata: which record fields are displayed, and how
///
/// Purely presentation-side; changing the projection never touches the
/// materialized records.
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
  columns: Vec<(String, String)>,
}

impl FieldSpec {
  pub fn add(&mut self, name: impl Into<String>, title: impl Into<String>) -> Result<()> {
    let name = name.into();
    if self.columns.iter().any(|(n, _)| *n == name) {
      return Err(anyhow!("field `{name}` is already projected"));
    }
    self.columns.push((name, title.into()));
    Ok(())
  }

  pub fn remove(&mut self, index: usize) -> Option<(String, String)> {
    if index < self.columns.len() {
      Some(self.columns.remove(index))
    } else {
      None
    }
  }

  pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
    self.columns.iter().map(|(n, t)| (n.as_str(), t.as_str()))
  }

  pub fn len(&self) -> usize {
    self.columns.len()
  }

  pub fn is_empty(&self) -> bool {
    self.columns.is_empty()
  }
}

/// Cursor-backed cache of materialized query results
pub struct RecordCache {
  store: Arc<dyn Store>,
  query: Query,
  stream: Option<Box<dyn CursorStream>>,
  records: Vec<Record>,
  fields: FieldSpec,
}

impl RecordCache {
  /// An empty cache; no cursor is open until `set_query`
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self {
      store,
      query: Query::all(),
      stream: None,
      records: Vec::new(),
      fields: FieldSpec::default(),
    }
  }

  /// Discard everything materialized and open a fresh cursor for `query`
  ///
  /// A store connection failure is recoverable: the cache logs it and stays
  /// empty, and the caller may re-issue the query later.
  pub async fn set_query(&mut self, query: Query) {
    self.records.clear();
    self.stream = None;
    self.query = query;

    match self.store.query(&self.query).await {
      Ok(stream) => self.stream = Some(stream),
      Err(e) => warn!("query failed, result cache left empty: {e}"),
    }
  }

  /// Pull up to `n` more records from the open cursor, in stream order
  ///
  /// Returns how many records were appended. A short read marks the stream
  /// exhausted; a cursor error does the same after logging, keeping what was
  /// already materialized. Without an open cursor this is a no-op.
  pub async fn load_more(&mut self, n: usize) -> usize {
    let Some(mut stream) = self.stream.take() else {
      return 0;
    };

    let mut appended = 0;
    let mut exhausted = false;
    while appended < n {
      match stream.next().await {
        Ok(Some(record)) => {
          self.records.push(record);
          appended += 1;
        }
        Ok(None) => {
          debug!("cursor exhausted after {} materialized rows", self.records.len());
          exhausted = true;
          break;
        }
        Err(e) => {
          warn!("cursor failed, keeping {} materialized rows: {e}", self.records.len());
          exhausted = true;
          break;
        }
      }
    }

    if !exhausted {
      self.stream = Some(stream);
    }
    appended
  }

  /// Whether an open cursor may still yield more records
  pub fn has_more(&self) -> bool {
    self.stream.is_some()
  }

  /// The record at position `i`, if materialized; never fetches
  pub fn get(&self, i: usize) -> Option<&Record> {
    self.records.get(i)
  }

  pub fn count(&self) -> usize {
    self.records.len()
  }

  /// The current working set, in materialization order
  pub fn records(&self) -> &[Record] {
    &self.records
  }

  /// Project an additional field; duplicate names are rejected
  pub fn add_field(&mut self, name: impl Into<String>, title: impl Into<String>) -> Result<()> {
    self.fields.add(name, title)
  }

  /// Drop the projected field at `index`
  pub fn remove_field(&mut self, index: usize) -> Option<(String, String)> {
    self.fields.remove(index)
  }

  pub fn fields(&self) -> &FieldSpec {
    &self.fields
  }

  /// Re-issue the current predicate with a new server-side sort key
  ///
  /// Sorting is a server concern, so this invalidates and restarts the
  /// cursor rather than re-ordering materialized rows client-side.
  pub async fn set_sort(&mut self, field: impl Into<String>, direction: SortDirection) {
    let query = self.query.with_sort(field, direction);
    self.set_query(query).await;
  }

  /// Install an externally produced working set, bypassing the cursor
  ///
  /// Used to apply a ranked result. Afterwards `has_more` is false and no
  /// cursor exists until the next `set_query`.
  pub fn replace_with(&mut self, records: Vec<Record>) {
    self.stream = None;
    self.records = records;
  }
}
