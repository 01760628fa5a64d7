//! Record identity and the editable-field contract a record type opts into.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Opaque identifier of a canonical record, derived from its resource URL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An id that could not be derived from a resource URL.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Closed set of field names a record type allows to be overridden.
///
/// Stored override maps are keyed by [`EditableField::as_str`]; any stored key
/// that does not [`parse`](EditableField::parse) back into a field is ignored by
/// the merge engine.
pub trait EditableField: Copy + Eq + Ord + Hash + fmt::Debug + 'static {
    /// Every editable field, in display order
    const ALL: &'static [Self];

    /// Key used in the persisted override map
    fn as_str(self) -> &'static str;

    /// Parse a persisted key back into a field
    fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.as_str() == name)
    }
}

/// A canonical record that can carry local overrides.
pub trait OverlayRecord: Clone {
    type Field: EditableField;

    /// Identifier the overrides are stored under
    fn record_id(&self) -> RecordId;

    /// Current value of an editable field
    fn field(&self, field: Self::Field) -> &str;

    /// Replace the value of an editable field
    fn set_field(&mut self, field: Self::Field, value: String);
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Minimal record type shared by the unit tests of this crate.

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum PersonField {
        Name,
        Height,
        Mass,
    }

    impl EditableField for PersonField {
        const ALL: &'static [Self] = &[Self::Name, Self::Height, Self::Mass];

        fn as_str(self) -> &'static str {
            match self {
                Self::Name => "name",
                Self::Height => "height",
                Self::Mass => "mass",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Person {
        pub id: String,
        pub name: String,
        pub height: String,
        pub mass: String,
        pub url: String,
    }

    impl Person {
        pub fn luke() -> Self {
            Self {
                id: "1".to_string(),
                name: "Luke Skywalker".to_string(),
                height: "172".to_string(),
                mass: "77".to_string(),
                url: "https://swapi.py4e.com/api/people/1/".to_string(),
            }
        }
    }

    impl OverlayRecord for Person {
        type Field = PersonField;

        fn record_id(&self) -> RecordId {
            RecordId::new(self.id.clone())
        }

        fn field(&self, field: PersonField) -> &str {
            match field {
                PersonField::Name => &self.name,
                PersonField::Height => &self.height,
                PersonField::Mass => &self.mass,
            }
        }

        fn set_field(&mut self, field: PersonField, value: String) {
            match field {
                PersonField::Name => self.name = value,
                PersonField::Height => self.height = value,
                PersonField::Mass => self.mass = value,
            }
        }
    }
}
