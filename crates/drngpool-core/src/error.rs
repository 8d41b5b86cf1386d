//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, DrngError>;

/// Broad classification of a [`DrngError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or missing configuration. Never retried automatically.
    Configuration,
    /// A backend, hash or worker could not be allocated.
    Resource,
    /// A seed or generate call failed at runtime.
    Backend,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Resource => write!(f, "resource"),
            Self::Backend => write!(f, "backend"),
        }
    }
}

/// Errors raised by backends, conditioners, instances and the domain pool.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DrngError {
    #[error("DRNG name missing")]
    MissingDrngName,

    #[error("refusing to load the requested random number generator {0}")]
    DeniedDrngName(String),

    #[error("seed size {0} cannot be processed")]
    UnsupportedSeedSize(usize),

    #[error("unknown seed hash {0}")]
    UnknownSeedHash(String),

    #[error("seed hash output size {digest_size} not equal to DRNG seed size {seed_size}")]
    DigestSizeMismatch { digest_size: usize, seed_size: usize },

    #[error("DRNG {0} has no seed size, a seed hash cannot be attached")]
    SeedHashNotApplicable(String),

    #[error("DRNG backend {0} is already registered")]
    AlreadyRegistered(String),

    #[error("DRNG backend {0} is still referenced by live instances")]
    BackendInUse(String),

    #[error("no DRNG backend registered")]
    NoBackend,

    #[error("DRNG {0} cannot be allocated")]
    AllocationFailed(String),

    #[error("failed to spawn the domain build job: {0}")]
    Spawn(String),

    #[error("seeding failed: {0}")]
    Seed(String),

    #[error("generating random bytes failed: {0}")]
    Generate(String),

    #[error("DRNG returned {returned} bytes, {requested} requested")]
    ShortGenerate { requested: usize, returned: usize },

    #[error("seed hash operation failed")]
    Hash,

    #[error("DRNG instance already destroyed")]
    Destroyed,
}

impl DrngError {
    /// Classify this error according to how callers are expected to react.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingDrngName
            | Self::DeniedDrngName(_)
            | Self::UnsupportedSeedSize(_)
            | Self::UnknownSeedHash(_)
            | Self::DigestSizeMismatch { .. }
            | Self::SeedHashNotApplicable(_)
            | Self::AlreadyRegistered(_)
            | Self::BackendInUse(_)
            | Self::NoBackend => ErrorKind::Configuration,
            Self::AllocationFailed(_) | Self::Spawn(_) => ErrorKind::Resource,
            Self::Seed(_)
            | Self::Generate(_)
            | Self::ShortGenerate { .. }
            | Self::Hash
            | Self::Destroyed => ErrorKind::Backend,
        }
    }

    /// Shorthand for `kind() == ErrorKind::Configuration`.
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
