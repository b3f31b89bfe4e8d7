//! Core library modules for schoolmiles
//!
//! This module contains the internal implementation details of the
//! schoolmiles library.

pub mod error;
pub mod maps;
pub mod pairs;
pub mod render;
pub mod roster;
pub mod snapshot;
pub mod store;

// Re-export main types for internal use
pub use error::{Error, Result};
pub use store::DistanceStore;
