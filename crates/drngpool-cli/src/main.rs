//! CLI for drngpool: per-domain DRNG instances over pluggable backends.

mod commands;
mod config;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "drngpool")]
#[command(about = "drngpool: per-domain DRNG instances over pluggable backends")]
#[command(version = drngpool_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Backend and topology selection shared by the commands that build a manager.
#[derive(Args, Debug, Clone, Default)]
pub struct BackendArgs {
    /// JSON configuration file (drng_name, seed_hash, security_strength)
    #[arg(long)]
    config: Option<String>,

    /// DRNG algorithm name, overrides the configuration file
    #[arg(long)]
    drng: Option<String>,

    /// Seed conditioning hash (sha256, sha384, sha512), overrides the configuration file
    #[arg(long)]
    seed_hash: Option<String>,

    /// Number of memory domains to simulate instead of detecting NUMA nodes
    #[arg(long)]
    domains: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in DRNG algorithms and the detected domain topology
    Info,

    /// Emit random bytes from the instance serving a domain
    Generate {
        #[command(flatten)]
        backend: BackendArgs,

        /// Number of bytes to emit
        #[arg(long, default_value = "32")]
        bytes: usize,

        /// Domain whose instance serves the request
        #[arg(long, default_value = "0")]
        domain: usize,

        /// Do not wait for the per-domain build; use whatever is published
        #[arg(long)]
        no_wait: bool,

        /// Skip reseeding from OS entropy before generating
        #[arg(long)]
        no_reseed: bool,
    },

    /// Build the per-domain instances and list them
    Domains {
        #[command(flatten)]
        backend: BackendArgs,

        /// Print the pool status as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Info => commands::info::run(),
        Commands::Generate {
            backend,
            bytes,
            domain,
            no_wait,
            no_reseed,
        } => commands::generate::run(&backend, bytes, domain, !no_wait, !no_reseed),
        Commands::Domains { backend, json } => commands::domains::run(&backend, json),
    }
}
