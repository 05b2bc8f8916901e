//! Core domain layer for the Sprout parent portal.
//!
//! This crate holds the advisor chat domain models and state machine,
//! independent of any transport or front end.

pub mod advisor;
pub mod child;
pub mod error;

// Re-export common error type
pub use error::{Result, SproutError};
