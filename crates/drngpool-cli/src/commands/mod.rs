pub mod domains;
pub mod generate;
pub mod info;

use std::sync::Arc;

use drngpool_core::{AlgorithmBackend, DrngManager, StaticTopology, SystemTopology};

use crate::BackendArgs;

/// Print `msg` and exit with status 1.
pub fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

/// Build a manager with the configured backend registered and the initial
/// instance allocated.
pub fn make_manager(args: &BackendArgs) -> Arc<DrngManager> {
    let config = crate::config::resolve(args).unwrap_or_else(|e| fail(e));
    let backend = Arc::new(AlgorithmBackend::from_config(&config));
    let manager = match args.domains {
        Some(n) => DrngManager::new(config, StaticTopology::new(n)),
        None => DrngManager::new(config, SystemTopology::detect()),
    };
    if let Err(e) = manager.register_backend(backend) {
        fail(format!("Cannot register DRNG backend: {e}"));
    }
    if let Err(e) = manager.initialize() {
        fail(format!("Cannot allocate the initial DRNG ({} error): {e}", e.kind()));
    }
    Arc::new(manager)
}

/// Fresh seed material from the operating system.
pub fn os_seed(len: usize) -> Vec<u8> {
    let mut seed = vec![0u8; len];
    if let Err(e) = getrandom::fill(&mut seed) {
        fail(format!("OS entropy unavailable: {e}"));
    }
    seed
}

/// Lowercase hex encoding.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
