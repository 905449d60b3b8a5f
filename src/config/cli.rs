use clap::Parser;
use std::path::PathBuf;

/// my-package: fetch a todo item and summarize it.
#[derive(Debug, Parser)]
#[command(name = "my-package", version, about)]
pub struct CliArgs {
    /// Path to a dotenv file to read settings from (defaults to `.env`).
    #[arg(long = "env-file")]
    pub env_file: Option<PathBuf>,

    /// Print the resolved settings as JSON and exit without fetching.
    #[arg(long = "print-settings")]
    pub print_settings: bool,
}
