use std::io::Write;

use crate::BackendArgs;

/// Seed material drawn from the OS per reseed.
const RESEED_BYTES: usize = 64;

pub fn run(args: &BackendArgs, bytes: usize, domain: usize, wait: bool, reseed: bool) {
    let manager = super::make_manager(args);

    if let Some(handle) = manager.schedule_domain_build() {
        if wait && handle.join().is_err() {
            super::fail("Domain build job panicked");
        }
    }

    if reseed {
        let seed = super::os_seed(RESEED_BYTES);
        if let Err(e) = manager.reseed(domain, &seed) {
            super::fail(format!("Reseeding domain {domain} failed: {e}"));
        }
    }

    let output = manager
        .generate(domain, bytes)
        .unwrap_or_else(|e| super::fail(format!("Generating {bytes} bytes failed: {e}")));

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{}", super::hex(&output)) {
        super::fail(format!("Failed to write output: {e}"));
    }
}
