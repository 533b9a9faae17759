//! Read-only filter predicates over materialized rows
//!
//! Both adapters only ever examine positions the cache has already
//! materialized; a presentation layer that needs more accepted rows must
//! drive `RecordCache::load_more` itself.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use compounds::{Record, Settings, StructureEngine};

/// Accepts records whose structure contains a substructure pattern
///
/// An empty pattern, a missing structure field, or an unparseable
/// identifier all reject.
pub struct SubstructureFilter {
  engine: Arc<dyn StructureEngine>,
  structure_field: String,
  pattern: String,
}

impl SubstructureFilter {
  pub fn new(
    engine: Arc<dyn StructureEngine>,
    settings: &Settings,
    pattern: impl Into<String>,
  ) -> Self {
    Self {
      engine,
      structure_field: settings.structure_field.clone(),
      pattern: pattern.into(),
    }
  }

  pub fn accepts(&self, record: &Record) -> bool {
    if self.pattern.is_empty() {
      return false;
    }
    let Some(identifier) = record.get_str(&self.structure_field) else {
      return false;
    };
    match self.engine.parse(identifier) {
      Some(structure) => self.engine.matches_substructure(&structure, &self.pattern),
      None => false,
    }
  }
}

/// Shared set of accepted row positions, owned by an external collaborator
///
/// The owner (e.g. a plot's selection link) replaces the set's contents
/// between reads; the filter only ever reads it.
pub type SharedSelection = Arc<RwLock<HashSet<usize>>>;

/// Accepts row positions that are members of an external selection
pub struct SelectionFilter {
  selected: SharedSelection,
}

impl SelectionFilter {
  pub fn new(selected: SharedSelection) -> Self {
    Self { selected }
  }

  pub fn accepts(&self, position: usize) -> bool {
    self.selected.read().map(|set| set.contains(&position)).unwrap_or(false)
  }
}
