//! Application layer for the Sprout parent advisor chat.
//!
//! This crate provides the [`AdvisorChat`] controller, which coordinates the
//! chat state machine from `sprout-core` with an `AdvisorApi` backend: it
//! executes the reducer's effects, maintains the side-list caches, and
//! tracks the guidance-note toast.

mod cache;
mod controller;
mod toast;

pub use cache::ListCache;
pub use controller::AdvisorChat;
pub use toast::{NotesToast, TOAST_DURATION};
