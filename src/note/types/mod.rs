//! Foundational data structures, error types, and tag maps.

pub mod error;
pub mod models;
pub mod tags;
