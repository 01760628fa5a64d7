//! SWAPI access for the holocron overlay
//!
//! Fetches canonical character records (by id or by page and search),
//! portraits from the companion image API, and names of related resources.
//! [`Character`] implements [`holocron_overlay::OverlayRecord`] with the
//! closed set of editable fields in [`CharacterField`].

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod catalog;
pub mod client;
pub mod errors;
pub mod ids;
pub mod images;
pub mod resources;
pub mod types;

pub use catalog::Catalog;
pub use client::{DEFAULT_BASE_URL, RecordFetcher, SwapiClient};
pub use errors::{FetchError, Result};
pub use images::{DEFAULT_IMAGE_BASE_URL, ImageLookup};
pub use types::{Character, CharacterField, Page};
