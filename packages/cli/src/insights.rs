//! AI insight generation from the terminal.

use dialoguer::Select;
use noise_map_ai::{AiError, InsightKind, InsightRequest, create_provider_from_env, generate_insight};
use noise_map_analytics::{aggregate, location_stats};
use noise_map_cli_utils::{IndicatifProgress, MultiProgress};
use noise_map_noise_models::LOCATIONS;
use noise_map_records::DataFile;
use noise_map_records::source::TableSource;
use noise_map_server::dashboard::{DashboardState, Modal};

const KINDS: [(InsightKind, &str); 3] = [
    (InsightKind::Summary, "Summary of the overview metrics"),
    (InsightKind::Policy, "Policy recommendations"),
    (InsightKind::Location, "Analysis of one location"),
];

/// Prompts for an insight kind and prints the generated text.
///
/// Load and generation failures are logged and the session continues.
///
/// # Errors
///
/// Returns [`AiError::Config`] if no provider is configured, since nothing
/// here can work without one.
pub async fn run(
    source: &TableSource,
    state: &mut DashboardState,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let generator = create_provider_from_env()?;

    let labels: Vec<&str> = KINDS.iter().map(|(_, label)| *label).collect();
    let idx = Select::new()
        .with_prompt("Which insight?")
        .items(&labels)
        .default(0)
        .interact()?;
    let kind = KINDS[idx].0;

    let location = if kind == InsightKind::Location {
        let ids: Vec<&str> = LOCATIONS.iter().map(|l| l.id).collect();
        let pick = Select::new()
            .with_prompt("Location")
            .items(&ids)
            .default(0)
            .interact()?;
        Some(ids[pick].to_string())
    } else {
        None
    };

    state.open_modal(Modal::Insight {
        kind,
        location: location.clone(),
    });

    let spinner = IndicatifProgress::spinner(multi, "Loading tables");
    let (rankings, exceedance, severity) = tokio::join!(
        source.load(DataFile::Rankings),
        source.load(DataFile::Exceedance),
        source.load(DataFile::Severity)
    );
    let tables = rankings.and_then(|r| Ok((r, exceedance?, severity?)));
    let (rankings, exceedance, severity) = match tables {
        Ok(tables) => tables,
        Err(e) => {
            spinner.finish_and_clear();
            log::error!("Failed to load tables: {e}");
            state.close_modal();
            return Ok(());
        }
    };

    let metrics = aggregate(&rankings.records, &exceedance.records);
    let stats = location.as_deref().and_then(|id| {
        location_stats(
            &rankings.records,
            &exceedance.records,
            &severity.records,
            id,
        )
    });

    let request = match (kind, &stats) {
        (InsightKind::Summary, _) => InsightRequest::Summary(&metrics),
        (InsightKind::Policy, _) => InsightRequest::Policy(&metrics),
        (InsightKind::Location, Some(stats)) => InsightRequest::Location(stats),
        (InsightKind::Location, None) => {
            spinner.finish_and_clear();
            log::warn!(
                "No data for location '{}'",
                location.as_deref().unwrap_or_default()
            );
            state.close_modal();
            return Ok(());
        }
    };

    spinner.set_message("Generating text".to_string());
    let result = generate_insight(generator.as_ref(), &request).await;
    spinner.finish_and_clear();

    match result {
        Ok(text) => {
            println!();
            println!("{text}");
        }
        Err(e @ AiError::Config { .. }) => return Err(e.into()),
        Err(e) => log::error!("Text generation failed: {e}"),
    }
    state.close_modal();

    Ok(())
}
