//! File-backed session persistence for CarbonTrace
//!
//! This crate implements the `SessionStore` trait from `carbontrace-core`:
//! one JSON document on disk, replaced atomically on every write, mirrored in
//! an in-process watch cell for snapshot reads and change notification.

pub mod file_store;

pub use file_store::FileSessionStore;
