//! CarbonTrace HTTP Access Layer
//!
//! This crate implements the repository seams from `carbontrace-core` over
//! the remote emissions-tracking service:
//! - Auth repository (sign-up, sign-in, sign-out)
//! - User repository (current user)
//! - Activities repository (list, record)
//! - Analytics query layer (concurrent KPI / trend / summary loads)

pub mod activities;
pub mod analytics;
pub mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod user;

pub use error::{ApiError, Result};
