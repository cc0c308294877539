#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive CLI for the noise map dashboard.
//!
//! Offers the dashboard's views in the terminal (overview metrics, sortable
//! tables, synthetic predictions, AI insights), the table validator, and
//! the API server from one menu. A single [`DashboardState`] lives for the
//! whole session, so prediction controls and sort orders are remembered
//! between actions.
//!
//! Uses `indicatif-log-bridge` (via [`noise_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod insights;
mod overview;
mod predictions;

use dialoguer::Select;
use noise_map_records::source::TableSource;
use noise_map_server::dashboard::{DashboardState, Tab};

/// Top-level actions.
enum Tool {
    Metrics,
    Tables,
    Predictions,
    Insight,
    Validate,
    Server,
    Quit,
}

impl Tool {
    const ALL: &[Self] = &[
        Self::Metrics,
        Self::Tables,
        Self::Predictions,
        Self::Insight,
        Self::Validate,
        Self::Server,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Metrics => "Show overview metrics",
            Self::Tables => "Browse tables",
            Self::Predictions => "Generate predictions",
            Self::Insight => "Generate AI insight",
            Self::Validate => "Validate data",
            Self::Server => "Start server",
            Self::Quit => "Quit",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = noise_map_cli_utils::init_logger();

    println!("Noise Map Toolchain");
    println!();

    let source = TableSource::from_env();
    log::debug!("Reading tables from {}", source.describe());

    let mut state = DashboardState::default();
    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Tool::ALL[idx] {
            Tool::Metrics => {
                state.select_tab(Tab::Overview);
                overview::show_metrics(&source, &multi).await;
            }
            Tool::Tables => {
                state.select_tab(Tab::Overview);
                overview::browse_table(&source, &mut state, &multi).await?;
            }
            Tool::Predictions => predictions::run(&mut state, &multi).await?,
            Tool::Insight => insights::run(&source, &mut state, &multi).await?,
            Tool::Validate => match noise_map_validate::validate_source(&source).await {
                Ok(report) => report.print(),
                Err(e) => log::error!("Validation aborted: {e}"),
            },
            Tool::Server => {
                // The server uses actix-web's runtime, so we need to run it
                // in a blocking task to avoid nesting tokio runtimes.
                tokio::task::spawn_blocking(|| {
                    actix_web::rt::System::new().block_on(noise_map_server::interactive::run())
                })
                .await??;
                break;
            }
            Tool::Quit => break,
        }

        println!();
    }

    Ok(())
}
