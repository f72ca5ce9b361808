//! Integration test crate for the cue sheet workspace.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the core and timeline crates to verify they work together.

#[cfg(test)]
mod timeline;
