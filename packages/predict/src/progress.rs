//! Staged progress reporting for prediction runs.
//!
//! Producing a batch is instant, but the dashboard walks through a fixed
//! sequence of named stages first so the user sees what the prediction is
//! "made of". [`ProgressCallback`] decouples that sequence from how it is
//! rendered (an `indicatif` bar in the CLI, nothing in the server).

use std::sync::Arc;
use std::time::Duration;

use noise_map_noise_models::{PredictionInput, PredictionOutput};

/// Trait for reporting progress from long-running operations.
///
/// Implementations must be `Send + Sync` so they can be shared through an
/// `Arc` across tasks.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected units of work (enables percentage/ETA).
    fn set_total(&self, total: u64);

    /// Set the current position (absolute, not delta).
    fn set_position(&self, pos: u64);

    /// Advance progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);

    /// Mark progress as complete and remove the progress indicator.
    fn finish_and_clear(&self);
}

/// A [`ProgressCallback`] that ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn set_position(&self, _pos: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Returns a shared [`NullProgress`] instance for convenient use.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

/// One step of the staged sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    /// Label shown while the stage runs.
    pub message: &'static str,
    /// How long the stage is shown.
    pub delay: Duration,
}

/// The stages shown before a batch is produced, about 3.5 s in total.
pub const PREDICTION_STAGES: [Stage; 5] = [
    Stage {
        message: "Loading historical noise data",
        delay: Duration::from_millis(800),
    },
    Stage {
        message: "Analyzing time-of-day patterns",
        delay: Duration::from_millis(700),
    },
    Stage {
        message: "Applying location base levels",
        delay: Duration::from_millis(700),
    },
    Stage {
        message: "Computing predictions",
        delay: Duration::from_millis(800),
    },
    Stage {
        message: "Rendering prediction map",
        delay: Duration::from_millis(500),
    },
];

/// Sum of all stage delays.
#[must_use]
pub fn total_stage_delay() -> Duration {
    PREDICTION_STAGES.iter().map(|s| s.delay).sum()
}

/// Walks through [`PREDICTION_STAGES`] and then produces a fresh batch.
///
/// `on_stage_done` runs after each stage, in order, so callers can keep
/// their own view state in step with the progress display. When `animate`
/// is `false` the stage messages are still reported but no time is spent
/// on them.
pub async fn predict_with_progress(
    input: &PredictionInput,
    progress: &Arc<dyn ProgressCallback>,
    animate: bool,
    mut on_stage_done: impl FnMut(&Stage),
) -> Vec<PredictionOutput> {
    progress.set_total(PREDICTION_STAGES.len() as u64);
    progress.set_position(0);

    for stage in &PREDICTION_STAGES {
        progress.set_message(stage.message.to_string());
        if animate {
            tokio::time::sleep(stage.delay).await;
        }
        progress.inc(1);
        on_stage_done(stage);
    }

    let batch = crate::predict(input);
    let violations = batch.iter().filter(|p| p.is_violation).count();
    progress.finish(format!(
        "Predicted {} locations ({violations} over the limit)",
        batch.len()
    ));
    batch
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ProgressCallback for Recorder {
        fn set_total(&self, total: u64) {
            self.events.lock().unwrap().push(format!("total {total}"));
        }
        fn set_position(&self, pos: u64) {
            self.events.lock().unwrap().push(format!("pos {pos}"));
        }
        fn inc(&self, delta: u64) {
            self.events.lock().unwrap().push(format!("inc {delta}"));
        }
        fn set_message(&self, msg: String) {
            self.events.lock().unwrap().push(msg);
        }
        fn finish(&self, msg: String) {
            self.events.lock().unwrap().push(format!("finish {msg}"));
        }
        fn finish_and_clear(&self) {}
    }

    #[test]
    fn stages_sum_to_three_and_a_half_seconds() {
        assert_eq!(total_stage_delay(), Duration::from_millis(3500));
    }

    #[tokio::test]
    async fn reports_every_stage_in_order() {
        let recorder = Arc::new(Recorder::default());
        let progress: Arc<dyn ProgressCallback> = recorder.clone();

        let mut done = Vec::new();
        let batch = predict_with_progress(&PredictionInput::default(), &progress, false, |s| {
            done.push(s.message);
        })
        .await;
        assert_eq!(batch.len(), 9);
        let expected: Vec<&str> = PREDICTION_STAGES.iter().map(|s| s.message).collect();
        assert_eq!(done, expected);

        let events = recorder.events.lock().unwrap();
        assert_eq!(events[0], "total 5");
        let messages: Vec<&String> = events
            .iter()
            .filter(|e| PREDICTION_STAGES.iter().any(|s| s.message == e.as_str()))
            .collect();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0], PREDICTION_STAGES[0].message);
        assert_eq!(messages[4], PREDICTION_STAGES[4].message);
        assert!(events.last().unwrap().starts_with("finish Predicted 9 locations"));
    }

    #[tokio::test(start_paused = true)]
    async fn animated_run_waits_for_every_stage() {
        let start = tokio::time::Instant::now();
        predict_with_progress(&PredictionInput::default(), &null_progress(), true, |_| {}).await;
        assert!(start.elapsed() >= total_stage_delay());
    }
}
