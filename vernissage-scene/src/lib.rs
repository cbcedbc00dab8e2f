//! Vernissage scene engine
//!
//! Adaptive 3D gallery scene for the student art showcase. Artworks are laid
//! out as textured planes, animated with a per-entity update scheduler whose
//! budget follows a frame-rate monitor, and resolved to textures through a
//! deduplicating, concurrency-limited image preloader with synthesized
//! fallbacks.
//!
//! Notes
//! - [`gallery::Gallery`] is the entry point for embedders; the domain
//!   modules are public so tests and tooling can drive parts directly.
//! - Rendering goes through [`domains::scene::RenderSurface`]; the crate
//!   ships only a headless surface.

pub mod domains;
pub mod gallery;
pub mod infra;

pub use gallery::{FrameReport, Gallery, RenderEnvironment, SceneServices};
