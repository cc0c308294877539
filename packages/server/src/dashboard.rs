//! Dashboard view state.
//!
//! Everything the user can change on the dashboard lives in one
//! [`DashboardState`] value owned by whoever renders it (the interactive
//! CLI keeps one per session; the HTTP handlers start from
//! [`DashboardState::default`] and apply query parameters on top). All
//! transitions are plain methods without side effects.

use std::collections::BTreeMap;

use noise_map_ai::InsightKind;
use noise_map_noise_models::{NoisePreset, PredictionInput, PredictionOutput};
use noise_map_predict::progress::PREDICTION_STAGES;
use noise_map_records::DataFile;
use noise_map_records::sort::SortOrder;
use noise_map_server_models::{PredictionQueryParams, TableQueryParams};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Top-level dashboard tab.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tab {
    /// Metrics, tables and charts.
    #[default]
    Overview,
    /// Synthetic prediction map.
    Predictions,
}

/// Inputs of the prediction tab.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionControls {
    /// Hour slider, 0-23.
    pub hour: u8,
    /// Day selector, 0 = Monday.
    pub day_of_week: u8,
    /// Previous-hour preset.
    pub preset: NoisePreset,
}

impl Default for PredictionControls {
    fn default() -> Self {
        let input = PredictionInput::default();
        Self {
            hour: input.hour,
            day_of_week: input.day_of_week,
            preset: NoisePreset::default(),
        }
    }
}

impl PredictionControls {
    /// The predictor input these controls describe.
    #[must_use]
    pub const fn input(&self) -> PredictionInput {
        PredictionInput::with_preset(self.hour, self.day_of_week, self.preset)
    }

    /// The predictor input after applying query overrides. An explicit
    /// `prior` wins over both the control preset and the query preset.
    #[must_use]
    pub fn input_for(&self, params: &PredictionQueryParams) -> PredictionInput {
        let mut controls = *self;
        if let Some(hour) = params.hour {
            controls.hour = hour;
        }
        if let Some(day) = params.day {
            controls.day_of_week = day;
        }
        if let Some(preset) = params.preset {
            controls.preset = preset;
        }

        let mut input = controls.input();
        if let Some(prior) = params.prior {
            input.prior_noise = prior;
        }
        input
    }
}

/// Sort state of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSort {
    /// Sorted column; `None` keeps file order.
    pub column: Option<String>,
    /// Direction.
    pub order: SortOrder,
}

impl TableSort {
    /// Applies a header click: the same column flips direction, a new
    /// column starts ascending.
    pub fn toggle(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            self.order = self.order.toggled();
        } else {
            self.column = Some(column.to_string());
            self.order = SortOrder::Asc;
        }
    }

    /// Builds a sort state from query parameters.
    ///
    /// # Errors
    ///
    /// Returns a message if `order` is neither `asc` nor `desc`.
    pub fn from_query(params: &TableQueryParams) -> Result<Self, String> {
        let order = match params.order.as_deref() {
            None => SortOrder::default(),
            Some(raw) => raw
                .parse()
                .map_err(|_| format!("Invalid sort order '{raw}' (expected asc or desc)"))?,
        };
        Ok(Self {
            column: params.sort.clone().filter(|c| !c.is_empty()),
            order,
        })
    }
}

/// The dialog currently shown over the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Modal {
    /// Nothing open.
    #[default]
    Closed,
    /// Generated text; `location` is set for per-station insights.
    Insight {
        /// Kind of insight requested.
        kind: InsightKind,
        /// Station the insight is about.
        location: Option<String>,
    },
}

/// Progress of the staged prediction run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PredictionPhase {
    /// No run yet.
    #[default]
    Idle,
    /// Walking the progress sequence.
    Running {
        /// Number of stages completed so far.
        stage: usize,
    },
    /// The latest batch is available.
    Ready {
        /// One prediction per station.
        batch: Vec<PredictionOutput>,
    },
}

/// Complete UI state of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    /// Active tab.
    pub tab: Tab,
    /// Prediction tab inputs.
    pub controls: PredictionControls,
    /// Sort state per table; tables without an entry keep file order.
    pub sorts: BTreeMap<DataFile, TableSort>,
    /// Open dialog.
    pub modal: Modal,
    /// Prediction run state.
    pub prediction: PredictionPhase,
}

impl DashboardState {
    /// Switches tabs. Any open dialog is closed.
    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.modal = Modal::Closed;
    }

    /// Moves the hour slider, clamped to 0-23.
    pub fn set_hour(&mut self, hour: u8) {
        self.controls.hour = hour.min(23);
    }

    /// Selects a day, clamped to 0-6.
    pub fn set_day(&mut self, day_of_week: u8) {
        self.controls.day_of_week = day_of_week.min(6);
    }

    /// Selects a previous-hour preset.
    pub const fn set_preset(&mut self, preset: NoisePreset) {
        self.controls.preset = preset;
    }

    /// Returns the sort state of `file`.
    #[must_use]
    pub fn sort_for(&self, file: DataFile) -> TableSort {
        self.sorts.get(&file).cloned().unwrap_or_default()
    }

    /// Applies a header click on `column` of `file`.
    pub fn toggle_sort(&mut self, file: DataFile, column: &str) {
        self.sorts.entry(file).or_default().toggle(column);
    }

    /// Opens a dialog, replacing any open one.
    pub fn open_modal(&mut self, modal: Modal) {
        self.modal = modal;
    }

    /// Closes the open dialog.
    pub fn close_modal(&mut self) {
        self.modal = Modal::Closed;
    }

    /// Returns `true` while a prediction run is in progress.
    #[must_use]
    pub const fn is_predicting(&self) -> bool {
        matches!(self.prediction, PredictionPhase::Running { .. })
    }

    /// Starts a prediction run. Returns `false` (and changes nothing) if
    /// one is already running.
    pub fn start_prediction(&mut self) -> bool {
        if self.is_predicting() {
            return false;
        }
        self.prediction = PredictionPhase::Running { stage: 0 };
        true
    }

    /// Records that the current progress stage finished. `stage` counts
    /// completed stages and stops at the number of stages until
    /// [`Self::finish_prediction`] is called.
    pub fn advance_stage(&mut self) {
        if let PredictionPhase::Running { stage } = &mut self.prediction
            && *stage < PREDICTION_STAGES.len()
        {
            *stage += 1;
        }
    }

    /// Stores a finished batch.
    pub fn finish_prediction(&mut self, batch: Vec<PredictionOutput>) {
        self.prediction = PredictionPhase::Ready { batch };
    }

    /// The latest batch, if any.
    #[must_use]
    pub fn predictions(&self) -> Option<&[PredictionOutput]> {
        match &self.prediction {
            PredictionPhase::Ready { batch } => Some(batch),
            _ => None,
        }
    }
}
