//! # drngpool-core
//!
//! Instance management for deterministic random bit generators (DRNGs):
//! a pluggable backend contract, seed conditioning, and a per-domain pool
//! of generator instances built once in the background and published
//! atomically.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use drngpool_core::{AlgorithmBackend, DrngConfig, DrngManager, SystemTopology};
//!
//! let config = DrngConfig::new("chacha12");
//! let manager = Arc::new(DrngManager::new(config.clone(), SystemTopology::detect()));
//! manager.register_backend(Arc::new(AlgorithmBackend::from_config(&config))).unwrap();
//! manager.initialize().unwrap();
//!
//! // Replicate per memory domain off the caller's path.
//! manager.schedule_domain_build();
//!
//! manager.reseed(0, b"seed material of any length").unwrap();
//! let bytes = manager.generate(0, 32).unwrap();
//! assert_eq!(bytes.len(), 32);
//! ```
//!
//! ## Architecture
//!
//! Backend → GeneratorInstance (generate lock + seed conditioner) → DomainInstances
//!
//! Until the per-domain array is published, every domain is served by the
//! initial instance. Publication happens once; afterwards the array never
//! changes.

pub mod algorithms;
pub mod backend;
pub mod conditioning;
pub mod config;
pub mod error;
pub mod instance;
pub mod pool;
pub mod topology;

#[cfg(test)]
mod mock;

pub use backend::{AlgorithmBackend, DrngBackend, DrngHandle, RESERVED_DRNG_NAMES, check_drng_name};
pub use conditioning::{SeedConditioner, SeedHash};
pub use config::{DEFAULT_SECURITY_STRENGTH, DrngConfig};
pub use error::{DrngError, ErrorKind, Result};
pub use instance::GeneratorInstance;
pub use pool::{BuildOutcome, DomainInstances, DrngManager, PoolObserver, PoolStatus};
pub use topology::{DomainTopology, StaticTopology, SystemTopology};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
