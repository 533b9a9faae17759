//! Compounds - Record Model and Store Contracts
//!
//! The shared foundation of the compound browser: the document-style record
//! model, the contracts for the external store and structure engine, the
//! fingerprint bit-vector, and the runtime settings that thread through the
//! higher-level caches.

pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod memory_store;
pub mod query;
pub mod record;
pub mod settings;
pub mod store;

pub use engine::{LineNotationEngine, Structure, StructureEngine};
pub use error::{FingerprintError, StoreError};
pub use fingerprint::{Fingerprint, FingerprintMethod};
pub use memory_store::MemoryStore;
pub use query::{Query, SortDirection, SortKey};
pub use record::{Record, RecordId, Value};
pub use settings::Settings;
pub use store::{CursorStream, Store};
