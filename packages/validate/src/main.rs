#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Checks the noise map CSV tables and exits non-zero on any error.

use std::path::PathBuf;

use clap::Parser;
use noise_map_records::source::{DEFAULT_DATA_DIR, TableSource};
use noise_map_validate::validate_source;

#[derive(Parser)]
#[command(name = "noise_map_validate", about = "Validate the noise map CSV tables")]
struct Cli {
    /// Directory containing the CSV tables
    #[arg(long, env = "NOISE_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Fetch the tables from this base URL instead of `--data-dir`
    #[arg(long)]
    url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    let source = cli
        .url
        .as_deref()
        .map_or_else(|| TableSource::directory(&cli.data_dir), TableSource::http);

    let report = validate_source(&source).await?;
    report.print();

    if report.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
