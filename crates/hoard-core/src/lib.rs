//! # hoard-core
//!
//! Core types, traits, and abstractions for hoard.
//!
//! This crate provides the data structures and trait definitions shared by
//! the storage, inference, and job crates.

pub mod defaults;
pub mod error;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
