//! Everything a detail screen needs for one record.

use crate::backend::PersistenceBackend;
use crate::fields::{OverlayRecord, RecordId};
use crate::merge::{DisplayRecord, Provenance, merge, provenance};
use crate::store::EditStore;

/// Display record, per-field provenance and the "has local edits" badge,
/// all derived from a single read of the store.
#[derive(Debug, Clone)]
pub struct DetailView<R: OverlayRecord> {
    pub id: RecordId,
    pub display: DisplayRecord<R>,
    pub provenance: Provenance<R::Field>,
    pub has_local_edits: bool,
}

impl<R: OverlayRecord> DetailView<R> {
    pub fn build<B: PersistenceBackend>(canonical: &R, store: &EditStore<B>) -> Self {
        let id = canonical.record_id();
        let overrides = store.get(&id);
        Self {
            display: merge(canonical, overrides.as_ref()),
            provenance: provenance(overrides.as_ref()),
            has_local_edits: overrides.is_some(),
            id,
        }
    }
}
