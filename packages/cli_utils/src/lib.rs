#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the noise map tools.
//!
//! Provides `indicatif`-backed progress bars behind the [`ProgressCallback`]
//! trait, plus [`init_logger`] which sets up `indicatif-log-bridge` so that
//! `log::info!` and friends are suspended while progress bars redraw.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use noise_map_predict::progress::ProgressCallback;

pub use indicatif::MultiProgress;

const BAR_CHARS: &str = "=> ";

fn template(template: &str, fallback: fn() -> ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| fallback())
}

/// An `indicatif` [`ProgressBar`] behind the [`ProgressCallback`] trait.
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Applied by `set_total()`, so a spinner can turn into a bar.
    sized_style: ProgressStyle,
}

impl IndicatifProgress {
    fn shared(bar: ProgressBar, sized_style: ProgressStyle) -> Arc<dyn ProgressCallback> {
        Arc::new(Self { bar, sized_style })
    }

    /// Bar for a run of `total` named stages. The stage label is the
    /// message, printed after the bar.
    #[must_use]
    pub fn stages_bar(multi: &MultiProgress, message: &str, total: u64) -> Arc<dyn ProgressCallback> {
        let style = template(
            "{prefix:.bold} [{bar:30.green/dim}] {pos}/{len} {elapsed:>4} {msg}",
            ProgressStyle::default_bar,
        )
        .progress_chars(BAR_CHARS);
        let bar = multi.add(
            ProgressBar::new(total)
                .with_style(style.clone())
                .with_prefix("predict")
                .with_message(message.to_string()),
        );

        Self::shared(bar, style)
    }

    /// Spinner for work of unknown length, such as loading tables or
    /// waiting on the text generator.
    #[must_use]
    pub fn spinner(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(
            ProgressBar::new_spinner()
                .with_style(template("{spinner:.cyan} {msg}", ProgressStyle::default_spinner))
                .with_message(message.to_string()),
        );
        bar.enable_steady_tick(Duration::from_millis(80));

        let sized = template(
            "{spinner:.cyan} {msg} [{bar:30.cyan/dim}] {pos}/{len}",
            ProgressStyle::default_bar,
        )
        .progress_chars(BAR_CHARS);

        Self::shared(bar, sized)
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_style(self.sized_style.clone());
        self.bar.set_length(total);
        self.bar.reset();
    }

    fn set_position(&self, pos: u64) {
        self.bar.set_position(pos);
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }

    fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_timed_builder()
        .parse_env("RUST_LOG")
        .build();
    let max_level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(max_level);
    }

    multi
}

