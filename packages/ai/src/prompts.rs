//! Fixed prompt templates.
//!
//! Numbers are inserted pre-formatted; missing values read as `N/A` so the
//! model never sees a bare `None`.

use noise_map_analytics_models::{DashboardMetrics, LocationStats};
use noise_map_noise_models::find_location;

use crate::InsightKind;

/// Context for one generation call.
#[derive(Debug, Clone, Copy)]
pub enum InsightRequest<'a> {
    /// Summarize the overview metrics.
    Summary(&'a DashboardMetrics),
    /// Suggest policy measures from the overview metrics.
    Policy(&'a DashboardMetrics),
    /// Analyze one station.
    Location(&'a LocationStats),
}

impl InsightRequest<'_> {
    /// Returns the kind of insight this request produces.
    #[must_use]
    pub const fn kind(&self) -> InsightKind {
        match self {
            Self::Summary(_) => InsightKind::Summary,
            Self::Policy(_) => InsightKind::Policy,
            Self::Location(_) => InsightKind::Location,
        }
    }

    /// Renders the prompt text.
    #[must_use]
    pub fn prompt(&self) -> String {
        match self {
            Self::Summary(metrics) => summary_prompt(metrics),
            Self::Policy(metrics) => policy_prompt(metrics),
            Self::Location(stats) => location_prompt(stats),
        }
    }
}

fn fmt_opt(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.1}{unit}"))
}

fn metrics_block(metrics: &DashboardMetrics) -> String {
    format!(
        "- Monitoring stations: {count}\n\
         - Loudest station: {station}\n\
         - Its average level: {noise:.1} dBA\n\
         - Average share of readings above the legal limit: {rate:.1}%",
        count = metrics.station_count,
        station = metrics.loudest_station,
        noise = metrics.highest_avg_noise,
        rate = metrics.avg_violation_rate,
    )
}

/// Prompt for a plain-language summary of the overview metrics.
#[must_use]
pub fn summary_prompt(metrics: &DashboardMetrics) -> String {
    format!(
        "You are an environmental data analyst. Summarize the following noise \
         pollution measurements from Delhi's monitoring network for a general \
         audience in 3-4 short paragraphs. Explain what the numbers mean for \
         residents' health and daily life, and point out the most concerning \
         finding.\n\n\
         {block}\n\n\
         Keep it factual and do not invent additional figures.",
        block = metrics_block(metrics),
    )
}

/// Prompt for policy recommendations based on the overview metrics.
#[must_use]
pub fn policy_prompt(metrics: &DashboardMetrics) -> String {
    format!(
        "You are an urban policy advisor specializing in noise pollution. Based \
         on the monitoring data below, propose 5 concrete, actionable policy \
         measures for the city administration. For each, give a one-line \
         rationale tied to the data and note whether it is short-term or \
         long-term.\n\n\
         {block}\n\n\
         Zone limits (day/night, dBA): Industrial 75/70, Commercial 65/55, \
         Residential 55/45, Silence Zone 50/40.\n\
         Format the answer as a numbered list.",
        block = metrics_block(metrics),
    )
}

/// Prompt for the analysis of one station.
#[must_use]
pub fn location_prompt(stats: &LocationStats) -> String {
    let zone = stats
        .zone_type
        .or_else(|| find_location(&stats.location).map(|l| l.zone))
        .map_or_else(|| "N/A".to_string(), |z| z.to_string());
    let rank = stats
        .rank
        .map_or_else(
            || "N/A".to_string(),
            |r| format!("{r} of {}", stats.ranked_stations),
        );
    let severity = stats
        .severity_category
        .map_or_else(|| "N/A".to_string(), |s| s.to_string());
    let counts = match (stats.exceedance_count, stats.total_count) {
        (Some(over), Some(total)) => format!("{over:.0} of {total:.0} readings"),
        _ => "N/A".to_string(),
    };

    format!(
        "You are an environmental data analyst. Analyze the noise situation at \
         the monitoring station \"{location}\" in Delhi and suggest 3 targeted \
         mitigation measures suited to its zone.\n\n\
         - Zone: {zone}\n\
         - Rank by average level: {rank}\n\
         - Average level: {avg}\n\
         - Day / night limit: {day} / {night}\n\
         - Readings above limit: {pct} ({counts})\n\
         - Average / maximum excess: {avg_excess} / {max_excess}\n\
         - Severity category: {severity}\n\n\
         Be concise: one short paragraph of analysis, then a bulleted list.",
        location = stats.location,
        avg = fmt_opt(stats.average_laeq_dba, " dBA"),
        day = fmt_opt(stats.day_limit_dba, " dBA"),
        night = fmt_opt(stats.night_limit_dba, " dBA"),
        pct = fmt_opt(stats.exceedance_percentage, "%"),
        avg_excess = fmt_opt(stats.avg_excess_dba, " dBA"),
        max_excess = fmt_opt(stats.max_excess_dba, " dBA"),
    )
}
