use drngpool_core::algorithms::{BUILTIN_ALGORITHMS, allocate};
use drngpool_core::{DomainTopology, RESERVED_DRNG_NAMES, SeedHash, SystemTopology};

pub fn run() {
    println!("drngpool {}", drngpool_core::VERSION);
    println!("\nBuilt-in DRNG algorithms:");
    println!("  {:<16} {:>9}  {}", "Name", "Seed size", "Seed hash");
    println!("  {}", "-".repeat(40));
    for name in BUILTIN_ALGORITHMS {
        let Some(drng) = allocate(name) else { continue };
        let seed_size = drng.seed_size();
        let hash = if seed_size == 0 {
            "none (any length)".to_string()
        } else {
            SeedHash::for_seed_size(seed_size)
                .map(|h| h.name().to_string())
                .unwrap_or_else(|e| e.to_string())
        };
        println!("  {name:<16} {seed_size:>9}  {hash}");
    }

    println!("\nReserved names (refused as backends): {}", RESERVED_DRNG_NAMES.join(", "));

    let topology = SystemTopology::detect();
    let active = topology.active_domains();
    println!(
        "\nDomains: {} ({} active: {:?})",
        topology.domain_count(),
        active.len(),
        active
    );
}
