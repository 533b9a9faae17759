//! Contracts for the external document store
//!
//! The store is an opaque collaborator reached over a connection that can
//! drop at any point. Every operation is an explicit suspension point for
//! the caller; nothing here retries or spawns work of its own.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::query::Query;
use crate::record::{Record, RecordId};

/// A server-side streaming query result
///
/// Yields one record at a time in server order. The total count is unknown
/// without a separate round trip, so consumers pull until `None`.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait CursorStream: Send {
  /// Pull the next record; `None` means the stream is exhausted
  async fn next(&mut self) -> Result<Option<Record>, StoreError>;
}

/// The external document store
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
  /// Open a streaming cursor over records matching the query
  async fn query(&self, query: &Query) -> Result<Box<dyn CursorStream>, StoreError>;

  /// Fetch a single record by its store identity
  async fn fetch_by_id(&self, id: RecordId) -> Result<Option<Record>, StoreError>;

  /// Merge `patch` fields into every record matching `selector`
  ///
  /// With `upsert`, a selector that matches nothing inserts the patch as a
  /// new record instead.
  async fn update(&self, selector: &Record, patch: &Record, upsert: bool)
    -> Result<(), StoreError>;

  /// Insert a record, returning its store-assigned identity
  async fn insert(&self, record: Record) -> Result<RecordId, StoreError>;
}
