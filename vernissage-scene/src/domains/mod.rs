//! Domain modules of the scene engine
//!
//! Leaves first: `media` resolves artworks to textures, `performance`
//! classifies the frame budget, `scene` owns the planes and their
//! scheduler, and `interaction` turns pointer input into navigation.

pub mod interaction;
pub mod media;
pub mod performance;
pub mod scene;
