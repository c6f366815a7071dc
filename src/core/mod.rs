//! Core library components.
//!
//! Validation, rate limiting, credential storage and the browser handshake
//! live here, independent of the command-line surface.

pub mod api;
pub mod config;
pub mod constants;
pub mod domain;
pub mod handshake;
pub mod paths;
pub mod ratelimit;
pub mod store;
pub mod validation;
