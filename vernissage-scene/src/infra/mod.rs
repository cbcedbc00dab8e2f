//! Infrastructure shared by every scene domain: configuration, device
//! adaptation and the injectable random source.

pub mod config;
pub mod constants;
pub mod device;
pub mod rng;
