// src/main.rs

//! appwatch CLI
//!
//! Checks the App Store for new versions of tracked apps and pushes one
//! batched notification per run when something changed.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use appwatch::config::Config;
use appwatch::error::Result;
use appwatch::pipeline;
use appwatch::services::lookup::RegionProber;
use appwatch::services::notify;
use appwatch::storage::VersionCache;

/// appwatch - App Store version update monitor
#[derive(Parser, Debug)]
#[command(name = "appwatch", version, about = "App Store version update monitor")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "appwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every tracked app and push a notification on changes
    Check {
        /// Rewrite cache entries even when versions are unchanged
        #[arg(long)]
        refresh: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Show the cached version baseline
    Status,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("appwatch starting...");

    let mut config = Config::load_or_default(&cli.config);
    config.overlay_env();

    match cli.command {
        Command::Check { refresh } => {
            if refresh {
                config.force_refresh = true;
            }

            let prober = RegionProber::from_config(&config)?;
            let sender = notify::from_config(&config)?;

            let outcome = pipeline::run_check(&config, &prober, sender.as_ref()).await?;

            if let Some(delivered) = outcome.delivered {
                log::info!(
                    "Notification {}",
                    if delivered { "delivered" } else { "failed" }
                );
            }
            log::info!(
                "Cache {}",
                if outcome.cache_written {
                    "written"
                } else {
                    "unchanged"
                }
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            log::info!("✓ {} app id(s) configured", config.app_ids.len());
            log::info!(
                "✓ Probing {} of {} listed region(s)",
                config.lookup.probe_regions().len(),
                config.lookup.regions.len()
            );
            log::info!("✓ Push method: {:?}", config.push.method);
            log::info!("All validations passed!");
        }

        Command::Status => {
            let cache = VersionCache::load(&config.cache_file).await;
            if cache.is_empty() {
                log::info!("No cached versions at {}", cache.path().display());
            } else {
                let mut entries: Vec<_> = cache.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                for (app_id, entry) in entries {
                    log::info!(
                        "{}: {} v{} [{}] checked {}",
                        app_id,
                        entry.display_name,
                        entry.version,
                        entry.region_code,
                        entry.last_checked_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
