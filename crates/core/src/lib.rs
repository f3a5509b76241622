//! Core business logic for shoutly.

pub mod services;

pub use services::*;
