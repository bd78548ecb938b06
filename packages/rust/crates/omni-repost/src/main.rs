//! omni-repost binary: VK wall to Telegram channel reposting.

mod cli;
mod nodes;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use omni_repost::{RepostConfig, set_config_home_override};

use crate::cli::{Cli, Command};
use crate::nodes::{run_compose_mode, run_poll_mode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }

    // RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "omni_repost=debug"
        } else {
            "omni_repost=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = RepostConfig::from_env();
    match cli.command {
        Command::Run {
            once,
            interval_secs,
        } => run_poll_mode(config, once, interval_secs).await,
        Command::Compose { post } => run_compose_mode(&config, &post),
    }
}
