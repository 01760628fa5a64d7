//! Edit store: record id → sparse field overrides, persisted as one blob
//!
//! Layout of the persisted JSON:
//!
//! ```text
//! {
//!   "1": { "name": "Luke Skywalker (Modified)", "height": "180" },
//!   "2": { "mass": "80" }
//! }
//! ```
//!
//! Every write re-reads the blob, applies the change and writes the whole
//! blob back. A record whose overrides are all empty has no entry at all.

use crate::backend::PersistenceBackend;
use crate::fields::RecordId;
use serde_json::Value;
use std::collections::BTreeMap;

/// Overrides for one record, keyed by field name.
pub type FieldOverrideMap = BTreeMap<String, String>;

/// Everything the store persists.
pub type EditStoreBlob = BTreeMap<RecordId, FieldOverrideMap>;

/// Key-wise change applied by [`EditStore::set`].
///
/// `None` removes the key from the stored map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverridePatch {
    entries: BTreeMap<String, Option<String>>,
}

impl OverridePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(field.into(), Some(value.into()));
        self
    }

    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.entries.insert(field.into(), None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl From<FieldOverrideMap> for OverridePatch {
    fn from(map: FieldOverrideMap) -> Self {
        Self {
            entries: map.into_iter().map(|(k, v)| (k, Some(v))).collect(),
        }
    }
}

impl FromIterator<(String, Option<String>)> for OverridePatch {
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A map is worth keeping only if at least one value is non-empty.
fn has_any_value(map: &FieldOverrideMap) -> bool {
    map.values().any(|value| !value.is_empty())
}

/// String-valued overrides of one stored entry. Values of any other JSON
/// type are skipped so the rest of the blob survives.
fn string_overrides(id: &RecordId, entry: Value) -> FieldOverrideMap {
    let Value::Object(fields) = entry else {
        tracing::warn!(record_id = %id, "Stored overrides are not an object, skipping");
        return FieldOverrideMap::new();
    };

    fields
        .into_iter()
        .filter_map(|(field, value)| match value {
            Value::String(value) => Some((field, value)),
            other => {
                tracing::warn!(record_id = %id, field = %field, value = %other, "Skipping non-string override");
                None
            }
        })
        .collect()
}

/// Persistent store of local overrides.
///
/// Never fails towards its callers: an unreadable or corrupt blob reads as
/// empty, and a failed write is dropped after logging.
#[derive(Debug)]
pub struct EditStore<B> {
    backend: B,
}

impl<B: PersistenceBackend> EditStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Overrides stored for `id`, if any.
    pub fn get(&self, id: &RecordId) -> Option<FieldOverrideMap> {
        self.load().remove(id)
    }

    pub fn has(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    /// Snapshot of every stored override.
    pub fn all(&self) -> EditStoreBlob {
        self.load()
    }

    /// Merge `patch` into the overrides of `id` and persist.
    ///
    /// When no non-empty value remains after the merge the entry for `id` is
    /// deleted instead of stored.
    pub fn set(&mut self, id: &RecordId, patch: OverridePatch) {
        let mut blob = self.load();
        let mut merged = blob.remove(id).unwrap_or_default();

        for (field, value) in patch.entries {
            match value {
                Some(value) => {
                    merged.insert(field, value);
                }
                None => {
                    merged.remove(&field);
                }
            }
        }

        if has_any_value(&merged) {
            tracing::debug!(record_id = %id, fields = merged.len(), "Stored overrides");
            blob.insert(id.clone(), merged);
        } else {
            tracing::debug!(record_id = %id, "Overrides empty after merge, dropping entry");
        }

        self.persist(&blob);
    }

    /// Delete every override of `id`.
    pub fn clear(&mut self, id: &RecordId) {
        let mut blob = self.load();
        if blob.remove(id).is_some() {
            tracing::debug!(record_id = %id, "Cleared overrides");
        }
        self.persist(&blob);
    }

    fn load(&self) -> EditStoreBlob {
        let raw = match self.backend.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return EditStoreBlob::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Edit store unreadable, treating as empty");
                return EditStoreBlob::new();
            }
        };

        if raw.trim().is_empty() {
            return EditStoreBlob::new();
        }

        match serde_json::from_str::<BTreeMap<RecordId, Value>>(&raw) {
            Ok(entries) => entries
                .into_iter()
                .filter_map(|(id, entry)| {
                    let overrides = string_overrides(&id, entry);
                    has_any_value(&overrides).then_some((id, overrides))
                })
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Edit store corrupt, treating as empty");
                EditStoreBlob::new()
            }
        }
    }

    fn persist(&self, blob: &EditStoreBlob) {
        let serialized = match serde_json::to_string(blob) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize edit store");
                return;
            }
        };

        if let Err(e) = self.backend.write(&serialized) {
            tracing::warn!(error = %e, "Failed to persist edit store, change dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use pretty_assertions::assert_eq;

    fn store() -> EditStore<MemoryBackend> {
        EditStore::new(MemoryBackend::new())
    }

    fn map(pairs: &[(&str, &str)]) -> FieldOverrideMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn get_returns_none_for_unknown_record() {
        let store = store();
        assert_eq!(store.get(&RecordId::from("999")), None);
        assert!(!store.has(&RecordId::from("999")));
    }

    #[test]
    fn set_persists_blob_layout() {
        let mut store = store();
        store.set(
            &RecordId::from("1"),
            OverridePatch::new()
                .set("name", "Luke Modified")
                .set("height", "180"),
        );

        let raw = store.backend().contents().expect("blob written");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(
            parsed,
            serde_json::json!({ "1": { "name": "Luke Modified", "height": "180" } })
        );
    }

    #[test]
    fn set_merges_incrementally() {
        let mut store = store();
        let id = RecordId::from("1");
        store.set(&id, OverridePatch::new().set("name", "A"));
        store.set(&id, OverridePatch::new().set("height", "180"));

        assert_eq!(store.get(&id), Some(map(&[("name", "A"), ("height", "180")])));
    }

    #[test]
    fn set_with_only_empty_values_deletes_entry() {
        let mut store = store();
        let id = RecordId::from("1");
        store.set(&id, OverridePatch::new().set("name", "Luke Modified"));
        store.set(&id, OverridePatch::new().set("name", "").unset("height"));

        assert!(!store.has(&id));
    }

    #[test]
    fn set_on_fresh_record_with_empty_patch_stores_nothing() {
        let mut store = store();
        let id = RecordId::from("1");
        store.set(&id, OverridePatch::new().set("name", "").unset("height"));

        assert!(!store.has(&id));
        assert_eq!(store.backend().contents().as_deref(), Some("{}"));
    }

    #[test]
    fn empty_value_is_kept_next_to_a_real_one() {
        let mut store = store();
        let id = RecordId::from("1");
        store.set(&id, OverridePatch::new().set("name", "A").set("mass", ""));

        assert_eq!(store.get(&id), Some(map(&[("name", "A"), ("mass", "")])));
    }

    #[test]
    fn unset_removes_single_key() {
        let mut store = store();
        let id = RecordId::from("1");
        store.set(&id, OverridePatch::new().set("name", "A").set("height", "180"));
        store.set(&id, OverridePatch::new().unset("name"));

        assert_eq!(store.get(&id), Some(map(&[("height", "180")])));
    }

    #[test]
    fn clear_is_idempotent_and_leaves_other_records() {
        let mut store = store();
        let luke = RecordId::from("1");
        let threepio = RecordId::from("2");
        store.set(&luke, OverridePatch::new().set("name", "X"));
        store.set(&threepio, OverridePatch::new().set("name", "Y"));

        store.clear(&luke);
        let once = store.all();
        store.clear(&luke);

        assert_eq!(store.all(), once);
        assert!(!store.has(&luke));
        assert_eq!(store.get(&threepio), Some(map(&[("name", "Y")])));
    }

    #[test]
    fn clear_unknown_record_does_not_fail() {
        let mut store = store();
        store.clear(&RecordId::from("404"));
        assert!(store.all().is_empty());
    }

    #[test]
    fn corrupt_blob_reads_as_empty_and_is_replaced_on_write() {
        let mut store = EditStore::new(MemoryBackend::with_contents("not valid json {{{"));
        let id = RecordId::from("1");
        assert!(store.all().is_empty());

        store.set(&id, OverridePatch::new().set("name", "A"));
        assert_eq!(store.get(&id), Some(map(&[("name", "A")])));
    }

    #[test]
    fn legacy_empty_entries_are_hidden() {
        let store = EditStore::new(MemoryBackend::with_contents(
            r#"{"1":{},"2":{"name":""},"3":{"name":"Y"}}"#,
        ));

        let all = store.all();
        assert_eq!(all.keys().map(RecordId::as_str).collect::<Vec<_>>(), vec!["3"]);
        assert!(!store.has(&RecordId::from("1")));
    }

    #[test]
    fn mixed_shape_entries_keep_their_string_values() {
        let mut store = EditStore::new(MemoryBackend::with_contents(
            r#"{"1":{"name":"Luke Mod"},"2":{"height":180},"3":{"mass":null,"name":"R2"},"5":"oops"}"#,
        ));

        assert_eq!(store.get(&RecordId::from("1")), Some(map(&[("name", "Luke Mod")])));
        assert!(!store.has(&RecordId::from("2")));
        assert_eq!(store.get(&RecordId::from("3")), Some(map(&[("name", "R2")])));

        store.set(&RecordId::from("4"), OverridePatch::new().set("name", "X"));

        let raw = store.backend().contents().expect("blob written");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(
            parsed,
            serde_json::json!({
                "1": { "name": "Luke Mod" },
                "3": { "name": "R2" },
                "4": { "name": "X" }
            })
        );
    }

    #[test]
    fn unreadable_backend_reads_as_empty() {
        let backend = MemoryBackend::with_contents(r#"{"1":{"name":"A"}}"#);
        backend.set_unavailable(true);
        let store = EditStore::new(backend);
        assert_eq!(store.get(&RecordId::from("1")), None);
    }

    #[test]
    fn failed_write_is_dropped_silently() {
        let backend = MemoryBackend::new().with_quota(16);
        let mut store = EditStore::new(backend);
        let id = RecordId::from("1");

        store.set(&id, OverridePatch::new().set("name", "a name far too long for the quota"));

        assert!(!store.has(&id));
        assert_eq!(store.backend().contents(), None);
    }
}
