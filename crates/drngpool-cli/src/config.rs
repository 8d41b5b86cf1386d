//! Configuration loading: JSON file first, command-line flags on top.

use std::path::Path;

use drngpool_core::DrngConfig;

use crate::BackendArgs;

/// Read a [`DrngConfig`] from a JSON file. Missing keys take their defaults.
pub fn load_file(path: &Path) -> Result<DrngConfig, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("Invalid configuration {}: {e}", path.display()))
}

/// Resolve the effective configuration for `args`.
pub fn resolve(args: &BackendArgs) -> Result<DrngConfig, String> {
    let mut config = match &args.config {
        Some(path) => load_file(Path::new(path))?,
        None => DrngConfig::default(),
    };
    if let Some(drng) = &args.drng {
        config.drng_name = Some(drng.clone());
    }
    if let Some(hash) = &args.seed_hash {
        config.seed_hash = Some(hash.clone());
    }
    if config.drng_name.is_none() {
        config.drng_name = Some(DEFAULT_DRNG.to_string());
    }
    Ok(config)
}

/// Algorithm used when neither the file nor the flags name one.
pub const DEFAULT_DRNG: &str = "chacha12";
