//! Core business logic for folio.

pub mod services;

pub use services::*;
