//! Artwork records shared between the gallery API layer and the scene engine.
//!
//! The remote API hands out loosely shaped JSON. Everything in this crate
//! exists to turn that into a fixed, validated shape once, at the boundary,
//! so the rendering core never has to second-guess a field.
#![allow(missing_docs)]

pub mod artwork;
pub mod dataset;
pub mod error;
pub mod ids;

pub use artwork::{ArtworkRef, RawArtwork, RawAuthor, RawId, RawImageField};
pub use dataset::ArtworkSet;
pub use error::{ModelError, Result as ModelResult};
pub use ids::ArtworkId;
