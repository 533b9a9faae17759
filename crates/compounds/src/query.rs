//! Store query descriptions
//!
//! The filter document is opaque to this crate: it is handed verbatim to the
//! store, which owns the predicate semantics. Only the sort key is inspected
//! client-side (to re-issue a query when the sort changes).

use serde::{Deserialize, Serialize};

use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
  Ascending,
  Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
  pub field: String,
  pub direction: SortDirection,
}

/// A predicate document plus an optional server-side sort key
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
  pub filter: Record,
  pub sort: Option<SortKey>,
}

impl Query {
  /// Match every record in the collection
  pub fn all() -> Self {
    Self::default()
  }

  pub fn filtered(filter: Record) -> Self {
    Self { filter, sort: None }
  }

  /// The same predicate with a different sort key
  pub fn with_sort(&self, field: impl Into<String>, direction: SortDirection) -> Self {
    Self {
      filter: self.filter.clone(),
      sort: Some(SortKey { field: field.into(), direction }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::Value;

  #[test]
  fn test_with_sort_preserves_filter() {
    let query = Query::filtered(Record::new().field("family", Value::text("nsaid")));

    let sorted = query.with_sort("mass", SortDirection::Descending);

    assert_eq!(sorted.filter, query.filter);
    assert_eq!(
      sorted.sort,
      Some(SortKey { field: "mass".to_string(), direction: SortDirection::Descending })
    );
  }

  #[test]
  fn test_all_has_empty_filter_and_no_sort() {
    let query = Query::all();

    assert!(query.filter.is_empty());
    assert!(query.sort.is_none());
  }
}
