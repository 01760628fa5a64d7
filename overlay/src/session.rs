//! Edit session: draft state for one record and the commit algorithm
//!
//! ```text
//! Idle --start--> Drafting --update_field--> Drafting
//! Drafting --cancel--> Idle            (no store interaction)
//! Drafting --save--> Idle              (three-way commit, notifies)
//! * --reset_all / reset_field--> Idle  (store write, notifies)
//! ```
//!
//! The session is the only writer of the [`EditStore`]; the store is lent to
//! it for each transition that persists.

use crate::backend::PersistenceBackend;
use crate::fields::{EditableField, OverlayRecord, RecordId};
use crate::merge::merge;
use crate::store::{EditStore, OverridePatch};
use std::collections::BTreeMap;
use std::fmt;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState<F> {
    Idle,
    Drafting { draft: BTreeMap<F, String> },
}

/// Result of a persisting transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome<F> {
    /// Draft diffed and written; `reverted` fields lost their override
    Committed { overridden: Vec<F>, reverted: Vec<F> },
    /// Every override of the record was removed
    Cleared,
    /// Nothing to act on (no bound record or no draft)
    Skipped,
}

type SaveListener = Box<dyn FnMut(&RecordId)>;

/// Draft state for the currently bound canonical record.
pub struct EditSession<R: OverlayRecord> {
    canonical: Option<R>,
    state: SessionState<R::Field>,
    on_save_success: Option<SaveListener>,
}

impl<R: OverlayRecord> fmt::Debug for EditSession<R>
where
    R: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("canonical", &self.canonical)
            .field("state", &self.state)
            .field("has_listener", &self.on_save_success.is_some())
            .finish()
    }
}

impl<R: OverlayRecord> Default for EditSession<R> {
    fn default() -> Self {
        Self::unbound()
    }
}

impl<R: OverlayRecord> EditSession<R> {
    /// Session with no record loaded yet.
    pub fn unbound() -> Self {
        Self {
            canonical: None,
            state: SessionState::Idle,
            on_save_success: None,
        }
    }

    pub fn for_record(canonical: R) -> Self {
        Self {
            canonical: Some(canonical),
            ..Self::unbound()
        }
    }

    /// Called with the record id after every successful store write.
    pub fn on_save_success(mut self, listener: impl FnMut(&RecordId) + 'static) -> Self {
        self.on_save_success = Some(Box::new(listener));
        self
    }

    /// Replace the canonical record after a fresh fetch. Any draft is dropped.
    pub fn bind(&mut self, canonical: R) {
        self.canonical = Some(canonical);
        self.state = SessionState::Idle;
    }

    pub fn canonical(&self) -> Option<&R> {
        self.canonical.as_ref()
    }

    pub fn state(&self) -> &SessionState<R::Field> {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, SessionState::Drafting { .. })
    }

    pub fn draft(&self) -> Option<&BTreeMap<R::Field, String>> {
        match &self.state {
            SessionState::Drafting { draft } => Some(draft),
            SessionState::Idle => None,
        }
    }

    /// Begin editing with a snapshot of every editable field as currently
    /// displayed: canonical values with the stored overrides applied.
    ///
    /// Returns `false` when no record is bound.
    pub fn start<B: PersistenceBackend>(&mut self, store: &EditStore<B>) -> bool {
        let Some(canonical) = &self.canonical else {
            return false;
        };
        let overrides = store.get(&canonical.record_id());
        let display = merge(canonical, overrides.as_ref());
        let draft = R::Field::ALL
            .iter()
            .map(|field| (*field, display.value(*field).to_string()))
            .collect();
        self.state = SessionState::Drafting { draft };
        true
    }

    /// Set a draft value. No validation; ignored while idle.
    pub fn update_field(&mut self, field: R::Field, value: impl Into<String>) {
        if let SessionState::Drafting { draft } = &mut self.state {
            draft.insert(field, value.into());
        }
    }

    /// Discard the draft without touching the store.
    pub fn cancel(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Commit the draft against canonical and the store's current overrides.
    ///
    /// Fields that differ from canonical are written; fields equal to
    /// canonical have their override removed. Overrides on fields absent from
    /// the draft are preserved.
    pub fn save<B: PersistenceBackend>(
        &mut self,
        store: &mut EditStore<B>,
    ) -> SessionOutcome<R::Field> {
        let Some((canonical, id)) = self.bound() else {
            return SessionOutcome::Skipped;
        };
        let SessionState::Drafting { draft } = std::mem::replace(&mut self.state, SessionState::Idle)
        else {
            return SessionOutcome::Skipped;
        };

        let mut updated = store.get(&id).unwrap_or_default();
        let mut overridden = Vec::new();
        let mut reverted = Vec::new();

        for (field, value) in draft {
            let key = field.as_str();
            if value != canonical.field(field) {
                updated.insert(key.to_string(), value);
                overridden.push(field);
            } else if updated.remove(key).is_some() {
                reverted.push(field);
            }
        }

        if updated.is_empty() {
            store.clear(&id);
        } else {
            // Reverted keys are passed as removals so the store's merge
            // cannot bring them back from the existing map.
            let patch = updated
                .into_iter()
                .map(|(key, value)| (key, Some(value)))
                .chain(reverted.iter().map(|field| (field.as_str().to_string(), None)))
                .collect::<OverridePatch>();
            store.set(&id, patch);
        }

        tracing::debug!(
            record_id = %id,
            overridden = overridden.len(),
            reverted = reverted.len(),
            "Committed edit session"
        );

        self.notify(&id);
        SessionOutcome::Committed {
            overridden,
            reverted,
        }
    }

    /// Drop every override of the bound record.
    pub fn reset_all<B: PersistenceBackend>(
        &mut self,
        store: &mut EditStore<B>,
    ) -> SessionOutcome<R::Field> {
        let Some((_, id)) = self.bound() else {
            return SessionOutcome::Skipped;
        };

        store.clear(&id);
        self.state = SessionState::Idle;
        tracing::debug!(record_id = %id, "Reset all overrides");

        self.notify(&id);
        SessionOutcome::Cleared
    }

    /// Drop the override of a single field, read-modify-write against the
    /// store's current map.
    pub fn reset_field<B: PersistenceBackend>(
        &mut self,
        store: &mut EditStore<B>,
        field: R::Field,
    ) -> SessionOutcome<R::Field> {
        let Some((_, id)) = self.bound() else {
            return SessionOutcome::Skipped;
        };

        let had_override = store
            .get(&id)
            .is_some_and(|overrides| overrides.contains_key(field.as_str()));
        store.set(&id, OverridePatch::new().unset(field.as_str()));
        self.state = SessionState::Idle;
        tracing::debug!(record_id = %id, field = field.as_str(), had_override, "Reset field override");

        self.notify(&id);
        if store.has(&id) {
            SessionOutcome::Committed {
                overridden: Vec::new(),
                reverted: if had_override { vec![field] } else { Vec::new() },
            }
        } else {
            SessionOutcome::Cleared
        }
    }

    /// Canonical record and its id, when both are usable.
    fn bound(&self) -> Option<(R, RecordId)> {
        let canonical = self.canonical.as_ref()?;
        let id = canonical.record_id();
        if id.is_empty() {
            return None;
        }
        Some((canonical.clone(), id))
    }

    fn notify(&mut self, id: &RecordId) {
        if let Some(listener) = self.on_save_success.as_mut() {
            listener(id);
        }
    }
}
