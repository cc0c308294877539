//! Prediction tab: prompts for the controls, runs the staged prediction
//! and prints the batch.

use std::fmt::Write as _;

use dialoguer::{Confirm, Input, Select};
use noise_map_cli_utils::{IndicatifProgress, MultiProgress};
use noise_map_noise_models::{DAY_NAMES, NoisePreset, PredictionOutput};
use noise_map_predict::overlay::to_feature_collection;
use noise_map_predict::progress::{PREDICTION_STAGES, predict_with_progress};
use noise_map_server::dashboard::{DashboardState, Tab};

/// Default file name for the exported overlay.
const DEFAULT_EXPORT_PATH: &str = "predictions.geojson";

fn render_batch(batch: &[PredictionOutput]) -> String {
    let mut out = format!(
        "{:<12} {:<13} {:>9} {:>7}  {:<10} {:>5}",
        "Location", "Zone", "Predicted", "Limit", "Status", "Conf"
    );
    for p in batch {
        let status = if p.is_violation { "VIOLATION" } else { "ok" };
        let _ = write!(
            out,
            "\n{:<12} {:<13} {:>9.2} {:>7.0}  {:<10} {:>4.0}%",
            p.location,
            p.zone_type.to_string(),
            p.predicted_noise,
            p.noise_limit,
            status,
            p.confidence * 100.0
        );
    }
    out
}

/// Runs one prediction round.
///
/// # Errors
///
/// Returns an error if a prompt fails or the overlay cannot be written.
pub async fn run(
    state: &mut DashboardState,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    state.select_tab(Tab::Predictions);

    let hour: u8 = Input::new()
        .with_prompt("Hour of day (0-23)")
        .default(state.controls.hour)
        .validate_with(|h: &u8| if *h <= 23 { Ok(()) } else { Err("hour must be 0-23") })
        .interact_text()?;
    state.set_hour(hour);

    let day = Select::new()
        .with_prompt("Day of week")
        .items(&DAY_NAMES[..])
        .default(usize::from(state.controls.day_of_week))
        .interact()?;
    state.set_day(u8::try_from(day)?);

    let presets = NoisePreset::all();
    let preset_labels: Vec<String> = presets
        .iter()
        .map(|p| format!("{p} ({:.0} dBA)", p.level()))
        .collect();
    let current = presets
        .iter()
        .position(|p| *p == state.controls.preset)
        .unwrap_or(0);
    let preset = Select::new()
        .with_prompt("Previous hour noise")
        .items(&preset_labels)
        .default(current)
        .interact()?;
    state.set_preset(presets[preset]);

    if !state.start_prediction() {
        log::warn!("A prediction is already running");
        return Ok(());
    }

    let progress = IndicatifProgress::stages_bar(
        multi,
        "Starting",
        PREDICTION_STAGES.len() as u64,
    );
    let input = state.controls.input();
    let batch = predict_with_progress(&input, &progress, true, |stage| {
        log::debug!("Finished stage: {}", stage.message);
        state.advance_stage();
    })
    .await;
    state.finish_prediction(batch);

    let Some(batch) = state.predictions() else {
        return Ok(());
    };
    println!();
    println!("{}", render_batch(batch));
    println!();

    if Confirm::new()
        .with_prompt("Save the map overlay as GeoJSON?")
        .default(false)
        .interact()?
    {
        let path: String = Input::new()
            .with_prompt("Output file")
            .default(DEFAULT_EXPORT_PATH.to_string())
            .interact_text()?;
        let collection = to_feature_collection(batch);
        tokio::fs::write(&path, serde_json::to_string_pretty(&collection)?).await?;
        log::info!("Wrote {} features to {path}", collection.features.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use noise_map_noise_models::ZoneType;

    use super::*;

    #[test]
    fn batch_table_marks_violations() {
        let batch = vec![
            PredictionOutput {
                location: "ito".to_string(),
                latitude: 28.63,
                longitude: 77.25,
                predicted_noise: 71.834,
                zone_type: ZoneType::Commercial,
                noise_limit: 65.0,
                is_violation: true,
                confidence: 0.87,
            },
            PredictionOutput {
                location: "nsit".to_string(),
                latitude: 28.61,
                longitude: 77.04,
                predicted_noise: 48.0,
                zone_type: ZoneType::SilenceZone,
                noise_limit: 50.0,
                is_violation: false,
                confidence: 0.8,
            },
        ];
        let text = render_batch(&batch);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("ito"));
        assert!(lines[1].contains("71.83"));
        assert!(lines[1].contains("VIOLATION"));
        assert!(lines[1].ends_with("87%"));
        assert!(lines[2].contains("Silence Zone"));
        assert!(lines[2].contains(" ok "));
    }
}
