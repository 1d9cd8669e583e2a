//! Storage helpers for the service layer
//!
//! File-backed snapshots for state small enough to rewrite on every change.

pub mod json_file_store;
