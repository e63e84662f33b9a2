//! # Adapters
//!
//! In-process implementations of the outbound ports. Deployment-specific
//! adapters (managed secret stores, hosted queues) live outside this crate
//! and only need to satisfy the port traits.

pub mod static_secrets;

pub use static_secrets::StaticSecretStore;
