//! Pipeline Test Suite
//!
//! End-to-end export and import through the public API, using the in-memory
//! collaborators.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test pipeline
//!
//! # Run the conflict policy tests only
//! cargo test --test pipeline conflicts::
//!
//! # Run with pipeline logs
//! cargo test --test pipeline -- --nocapture
//! ```

#[path = "../common/mod.rs"]
mod common;

mod conflicts;
mod failures;
mod legacy;
mod roundtrip;
mod user_data;
