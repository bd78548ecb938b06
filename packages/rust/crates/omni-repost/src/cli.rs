use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "omni-repost")]
#[command(about = "Repost new VK community wall posts to a Telegram channel.")]
pub(crate) struct Cli {
    /// Override config directory (holds `omni-repost/settings.yaml`).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    /// Debug logging for omni_repost (ignored when RUST_LOG is set).
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Poll the wall and deliver new posts. Runs until Ctrl+C unless --once.
    Run {
        /// Run a single cycle and exit (same as runtime.single_start).
        #[arg(long)]
        once: bool,

        /// Seconds to sleep between cycles (overrides runtime.interval_secs).
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Print the delivery plan for a post read from a JSON file. Sends nothing.
    Compose {
        /// Path to a JSON-encoded post (`{"id": 1, "text": "...", "photos": [...]}`).
        #[arg(long)]
        post: PathBuf,
    },
}
