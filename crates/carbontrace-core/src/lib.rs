//! CarbonTrace Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout CarbonTrace:
//! - The three-state result protocol every remote operation follows
//! - Wire types for the emissions service API
//! - Session store and repository trait seams
//! - Core error types

pub mod error;
pub mod format;
pub mod repository;
pub mod result;
pub mod session_store;
pub mod types;

pub use error::{Error, Result};
