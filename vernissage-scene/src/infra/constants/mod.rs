//! Constants module for centralized configuration values
//!
//! Every value here is a default for [`crate::infra::config::SceneConfig`];
//! none of them are load-bearing on their own.

pub mod animation;
pub mod layout;
pub mod lod;
pub mod media;
pub mod performance;
