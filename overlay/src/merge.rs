//! Merge engine: canonical record + stored overrides → display record.
//!
//! Pure derivation, no side effects. Provenance is decided by key membership
//! in the stored map, never by comparing displayed and canonical values.

use crate::backend::PersistenceBackend;
use crate::fields::{EditableField, OverlayRecord, RecordId};
use crate::store::{EditStore, FieldOverrideMap};
use std::collections::BTreeSet;

/// Canonical record with overrides applied. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRecord<R> {
    record: R,
}

impl<R: OverlayRecord> DisplayRecord<R> {
    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn value(&self, field: R::Field) -> &str {
        self.record.field(field)
    }

    pub fn into_record(self) -> R {
        self.record
    }
}

/// Set of editable fields that currently carry an override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance<F> {
    overridden: BTreeSet<F>,
}

impl<F: EditableField> Provenance<F> {
    pub fn none() -> Self {
        Self {
            overridden: BTreeSet::new(),
        }
    }

    pub fn is_overridden(&self, field: F) -> bool {
        self.overridden.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.overridden.is_empty()
    }

    /// Overridden fields in display order.
    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.overridden.iter().copied()
    }
}

/// Apply `overrides` to `canonical` field by field.
///
/// An override wins only when it is non-empty. Keys that are not editable
/// fields of `R` are ignored.
pub fn merge<R: OverlayRecord>(
    canonical: &R,
    overrides: Option<&FieldOverrideMap>,
) -> DisplayRecord<R> {
    let mut record = canonical.clone();

    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            let Some(field) = R::Field::parse(key) else {
                tracing::trace!(field = %key, "Ignoring override for non-editable field");
                continue;
            };
            if !value.is_empty() {
                record.set_field(field, value.clone());
            }
        }
    }

    DisplayRecord { record }
}

/// Editable fields present as keys in `overrides`.
pub fn provenance<F: EditableField>(overrides: Option<&FieldOverrideMap>) -> Provenance<F> {
    let overridden = overrides
        .into_iter()
        .flat_map(|map| map.keys())
        .filter_map(|key| F::parse(key))
        .collect();
    Provenance { overridden }
}

/// Whether the store currently holds an override for `field` of `id`.
pub fn field_is_overridden<B, F>(store: &EditStore<B>, id: &RecordId, field: F) -> bool
where
    B: PersistenceBackend,
    F: EditableField,
{
    store
        .get(id)
        .is_some_and(|overrides| overrides.contains_key(field.as_str()))
}
