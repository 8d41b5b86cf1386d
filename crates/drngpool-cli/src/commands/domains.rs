use std::sync::Arc;

use crate::BackendArgs;

pub fn run(args: &BackendArgs, json: bool) {
    let manager = super::make_manager(args);

    if let Err(e) = manager.build_domain_instances() {
        eprintln!("Per-domain build failed, every domain uses the initial DRNG: {e}");
    }

    if json {
        match serde_json::to_string_pretty(&manager.status()) {
            Ok(s) => println!("{s}"),
            Err(e) => super::fail(format!("Failed to serialize status: {e}")),
        }
        return;
    }

    let status = manager.status();
    println!(
        "Backend: {} | seed hash: {}",
        status.backend.as_deref().unwrap_or("-"),
        status.seed_hash.as_deref().unwrap_or("none")
    );
    println!(
        "Domains: {} | active: {:?} | dedicated instances: {}",
        status.domains, status.active_domains, status.dedicated_instances
    );

    let Some(domains) = manager.domain_instances() else {
        println!("Per-domain instances not published.");
        return;
    };
    let initial = manager.initial_instance();
    println!("\n  {:<8} {:>10} {:<10}", "Domain", "Instance", "Role");
    println!("  {}", "-".repeat(30));
    for (domain, drng) in domains.iter() {
        let role = if initial.is_some_and(|i| Arc::ptr_eq(i, drng)) {
            "initial"
        } else {
            "dedicated"
        };
        println!("  {domain:<8} {:>10} {role:<10}", drng.id());
    }
}
