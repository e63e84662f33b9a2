//! # Hook-Relay Test Suite
//!
//! Unified test crate for cross-crate scenarios:
//!
//! ```text
//! tests/src/
//! └── integration/      # Full pipeline against real sinks
//!     └── flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p relay-tests
//! ```

pub mod integration;
