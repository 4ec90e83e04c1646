//! Client side of the relay: everything that talks to the inference daemon.
//!
//! - [`client`]: HTTP client bound to the daemon's base URL
//! - [`models`]: model inventory listing
//! - [`types`]: chat and inventory wire types

pub mod client;
pub mod models;
pub mod types;
