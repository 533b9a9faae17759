//! Document-style compound records
//!
//! Records are ordered field maps fetched from the external store. Once
//! fetched they are immutable snapshots: edits go through the store and
//! require a re-fetch to observe.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned record identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
  pub fn new() -> Self {
    Self(Uuid::new_v4())
  }
}

impl Default for RecordId {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Display for RecordId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A single field value in a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
  Null,
  Number(f64),
  Integer(i64),
  Text(String),
  Bytes(Vec<u8>),
  Document(Record),
  Array(Vec<Value>),
}

impl Value {
  pub fn text(s: impl Into<String>) -> Self {
    Value::Text(s.into())
  }

  pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
    Value::Bytes(b.into())
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Text(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_bytes(&self) -> Option<&[u8]> {
    match self {
      Value::Bytes(b) => Some(b),
      _ => None,
    }
  }

  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Value::Number(n) => Some(*n),
      Value::Integer(i) => Some(*i as f64),
      _ => None,
    }
  }
}

/// An ordered mapping from field names to values
///
/// Field order is preserved across set/remove so projections stay stable.
/// Reading a missing field yields `None`, never an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
  id: Option<RecordId>,
  fields: Vec<(String, Value)>,
}

impl Record {
  pub fn new() -> Self {
    Self::default()
  }

  /// Attach a store-assigned identity
  pub fn with_id(mut self, id: RecordId) -> Self {
    self.id = Some(id);
    self
  }

  /// Builder-style field append, for assembling records in one expression
  pub fn field(mut self, name: impl Into<String>, value: Value) -> Self {
    self.set(name, value);
    self
  }

  pub fn id(&self) -> Option<RecordId> {
    self.id
  }

  pub fn assign_id(&mut self, id: RecordId) {
    self.id = Some(id);
  }

  pub fn get(&self, name: &str) -> Option<&Value> {
    self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
  }

  pub fn get_str(&self, name: &str) -> Option<&str> {
    self.get(name).and_then(Value::as_str)
  }

  pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
    self.get(name).and_then(Value::as_bytes)
  }

  /// Replace a field's value in place, or append it if not present
  pub fn set(&mut self, name: impl Into<String>, value: Value) {
    let name = name.into();
    if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
      slot.1 = value;
    } else {
      self.fields.push((name, value));
    }
  }

  pub fn remove(&mut self, name: &str) -> Option<Value> {
    let index = self.fields.iter().position(|(n, _)| n == name)?;
    Some(self.fields.remove(index).1)
  }

  pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.fields.iter().map(|(n, v)| (n.as_str(), v))
  }

  pub fn len(&self) -> usize {
    self.fields.len()
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }
}
