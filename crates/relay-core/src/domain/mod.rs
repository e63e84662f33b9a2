//! # Domain Layer
//!
//! Pure verification logic with no I/O dependencies.
//! This is the inner layer of the hexagonal architecture.

pub mod config;
pub mod entities;
pub mod errors;
pub mod header;
pub mod signature;
