//! Cross-crate integration scenarios.

pub mod flows;
