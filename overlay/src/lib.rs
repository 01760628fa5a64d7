//! Local-edits overlay engine
//!
//! Reconciles remotely fetched (canonical) records with field overrides the
//! user entered locally:
//! - [`EditStore`] persists a sparse override map per record as one JSON blob
//! - [`merge`] derives the display record and per-field provenance
//! - [`EditSession`] drafts edits and commits only the fields that differ from
//!   canonical, pruning overrides the user reverted
//!
//! Storage failures never reach callers; they are logged and absorbed at the
//! store boundary.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod backend;
pub mod fields;
pub mod merge;
pub mod session;
pub mod store;
pub mod view;

pub use backend::{BackendError, FileBackend, MemoryBackend, PersistenceBackend};
pub use fields::{EditableField, OverlayRecord, RecordId};
pub use merge::{DisplayRecord, Provenance, field_is_overridden, merge, provenance};
pub use session::{EditSession, SessionOutcome, SessionState};
pub use store::{EditStore, EditStoreBlob, FieldOverrideMap, OverridePatch};
pub use view::DetailView;
