//! HTTP client for the Sprout parent portal backend.
//!
//! Provides [`HttpAdvisorApi`], the production implementation of
//! `sprout_core::advisor::AdvisorApi`, plus the roster fetch standalone
//! front ends need.

mod config;
mod http;

pub use config::ApiConfig;
pub use http::HttpAdvisorApi;
