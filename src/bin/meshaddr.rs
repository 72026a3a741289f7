//! meshaddr operator tool
//!
//! Loads configuration, builds an offline subscriber table from the given
//! addresses and prints the abbreviation each one would be sent with.

use clap::Parser;
use meshaddr::services::test_impls::MockServices;
use meshaddr::{Config, DecodeContext, Overlay, Sid, SubscriberId};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// Show the abbreviations a node would use for a set of subscriber ids
#[derive(Parser, Debug)]
#[command(name = "meshaddr", version, about)]
struct Args {
    /// Path to configuration file (overrides default search paths)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Our own subscriber id (hex)
    #[arg(short, long, value_name = "SID")]
    local: Option<Sid>,

    /// Add this many random subscriber ids
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    generate: usize,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    show_config: bool,

    /// Subscriber ids (hex)
    #[arg(value_name = "SID")]
    sids: Vec<Sid>,
}

fn load_config(args: &Args) -> Result<(Config, Vec<PathBuf>), meshaddr::ConfigError> {
    match &args.config {
        // Explicit config file specified - load only that file
        Some(path) => {
            let config = Config::load_file(path)?;
            config.validate()?;
            Ok((config, vec![path.clone()]))
        }
        None => Config::load(),
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let (config, loaded_paths) = match load_config(&args) {
        Ok(result) => result,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if loaded_paths.is_empty() {
        info!("No config files found, using defaults");
    } else {
        for path in &loaded_paths {
            info!(path = %path.display(), "Loaded config file");
        }
    }

    if args.show_config {
        return match config.to_yaml() {
            Ok(yaml) => {
                print!("{}", yaml);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to serialize configuration: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let hosts: Vec<Sid> = config.hosts().iter().filter_map(|h| h.sid().ok()).collect();

    let mut overlay = match Overlay::new(config, MockServices::new()) {
        Ok(overlay) => overlay,
        Err(e) => {
            error!("Failed to create overlay: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(local) = &args.local
        && let Err(e) = overlay.set_local_identity(local)
    {
        error!("Failed to set local identity: {}", e);
        return ExitCode::FAILURE;
    }

    let generated = (0..args.generate).map(|_| Sid::generate());
    let mut ids: Vec<SubscriberId> = Vec::new();
    for sid in hosts.iter().chain(&args.sids).copied().chain(generated) {
        match overlay.find_or_create(&sid) {
            Ok(id) => ids.push(id),
            Err(e) => warn!(sid = %sid, "Skipping subscriber: {}", e),
        }
    }
    ids.extend(overlay.local());
    ids.sort_by_key(|id| overlay.trie().get(*id).map(|s| *s.sid()));
    ids.dedup();

    info!(
        subscribers = overlay.trie().len(),
        nodes = overlay.trie().node_count(),
        "Subscriber table built"
    );

    for id in ids {
        let mut buf = Vec::new();
        if let Err(e) = overlay.append_address(&mut DecodeContext::new(), &mut buf, id) {
            error!(subscriber = %id, "Failed to encode address: {}", e);
            return ExitCode::FAILURE;
        }
        let Ok(sub) = overlay.subscriber(id) else {
            continue;
        };
        println!(
            "{:<66} {:>2}  {}  {}",
            hex::encode(&buf[1..]),
            buf.len() - 1,
            sub.sid(),
            overlay.effective_reachability(id)
        );
    }

    ExitCode::SUCCESS
}
