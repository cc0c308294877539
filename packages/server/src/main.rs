#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Noise map API server binary.

use std::path::PathBuf;

use clap::Parser;
use noise_map_server::{ServerConfig, run_server};

#[derive(Parser)]
#[command(name = "noise_map_server", about = "Noise map dashboard API server")]
struct Cli {
    /// Address to bind (overrides `BIND_ADDR`)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides `PORT`)
    #[arg(long)]
    port: Option<u16>,

    /// Directory with the CSV tables (overrides `NOISE_DATA_DIR`)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env();
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    run_server(config).await
}
