//! SWAPI wire types and the character's editable-field set.

use crate::ids;
use holocron_overlay::{EditableField, OverlayRecord, RecordId};
use serde::{Deserialize, Serialize};

/// A character as returned by `GET /people/<id>/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub hair_color: String,
    pub skin_color: String,
    pub eye_color: String,
    pub birth_year: String,
    pub gender: String,
    #[serde(default)]
    pub homeworld: String,
    #[serde(default)]
    pub films: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub starships: Vec<String>,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub edited: String,
    pub url: String,
}

/// Character fields that accept local overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CharacterField {
    Name,
    Height,
    Mass,
    HairColor,
    SkinColor,
    EyeColor,
    BirthYear,
    Gender,
}

impl CharacterField {
    /// Human label for prompts and tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Height => "Height",
            Self::Mass => "Mass",
            Self::HairColor => "Hair color",
            Self::SkinColor => "Skin color",
            Self::EyeColor => "Eye color",
            Self::BirthYear => "Birth year",
            Self::Gender => "Gender",
        }
    }

    /// Unit appended when displaying the value.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            Self::Height => Some("cm"),
            Self::Mass => Some("kg"),
            _ => None,
        }
    }
}

impl EditableField for CharacterField {
    const ALL: &'static [Self] = &[
        Self::Name,
        Self::Height,
        Self::Mass,
        Self::HairColor,
        Self::SkinColor,
        Self::EyeColor,
        Self::BirthYear,
        Self::Gender,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Height => "height",
            Self::Mass => "mass",
            Self::HairColor => "hair_color",
            Self::SkinColor => "skin_color",
            Self::EyeColor => "eye_color",
            Self::BirthYear => "birth_year",
            Self::Gender => "gender",
        }
    }
}

impl OverlayRecord for Character {
    type Field = CharacterField;

    fn record_id(&self) -> RecordId {
        RecordId::from(ids::character_id(&self.url))
    }

    fn field(&self, field: CharacterField) -> &str {
        match field {
            CharacterField::Name => &self.name,
            CharacterField::Height => &self.height,
            CharacterField::Mass => &self.mass,
            CharacterField::HairColor => &self.hair_color,
            CharacterField::SkinColor => &self.skin_color,
            CharacterField::EyeColor => &self.eye_color,
            CharacterField::BirthYear => &self.birth_year,
            CharacterField::Gender => &self.gender,
        }
    }

    fn set_field(&mut self, field: CharacterField, value: String) {
        let slot = match field {
            CharacterField::Name => &mut self.name,
            CharacterField::Height => &mut self.height,
            CharacterField::Mass => &mut self.mass,
            CharacterField::HairColor => &mut self.hair_color,
            CharacterField::SkinColor => &mut self.skin_color,
            CharacterField::EyeColor => &mut self.eye_color,
            CharacterField::BirthYear => &mut self.birth_year,
            CharacterField::Gender => &mut self.gender,
        };
        *slot = value;
    }
}

/// Paginated list envelope as sent by SWAPI.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPage<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// One page of records, as handed to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> From<ApiPage<T>> for Page<T> {
    fn from(page: ApiPage<T>) -> Self {
        Self {
            items: page.results,
            total_count: page.count,
            has_next: page.next.is_some(),
            has_previous: page.previous.is_some(),
        }
    }
}
