//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that the transport layer calls
//! - **Outbound (Driven)**: Dependencies this pipeline needs

pub mod inbound;
pub mod outbound;
