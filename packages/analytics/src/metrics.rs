//! Overview metrics and per-station joins.

use noise_map_analytics_models::{DashboardMetrics, LocationStats, PLACEHOLDER_STATION};
use noise_map_records::Record;
use noise_map_records::rows::columns::{AVERAGE_LAEQ_DBA, EXCEEDANCE_PERCENTAGE, LOCATION};
use noise_map_records::rows::{ExceedanceRow, RankingRow, SeverityRow, find_by_location};

/// Computes the overview metrics.
///
/// Returns [`DashboardMetrics::placeholder`] if either table is empty.
/// Otherwise the first ranking row names the loudest station and the
/// violation rate is the plain mean of `Exceedance_Percentage` across every
/// exceedance row. A missing or non-numeric percentage counts as 0 but still
/// contributes to the row count.
#[must_use]
pub fn aggregate(rankings: &[Record], exceedance: &[Record]) -> DashboardMetrics {
    let Some(first) = rankings.first() else {
        return DashboardMetrics::placeholder();
    };
    if exceedance.is_empty() {
        return DashboardMetrics::placeholder();
    }

    let loudest_station = first
        .text(LOCATION)
        .unwrap_or_else(|| PLACEHOLDER_STATION.to_string());
    let highest_avg_noise = first.number(AVERAGE_LAEQ_DBA).unwrap_or(0.0);

    let total: f64 = exceedance
        .iter()
        .map(|r| r.number(EXCEEDANCE_PERCENTAGE).unwrap_or(0.0))
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let avg_violation_rate = total / exceedance.len() as f64;

    log::debug!(
        "Aggregated {} ranking rows and {} exceedance rows: loudest={loudest_station}",
        rankings.len(),
        exceedance.len()
    );

    DashboardMetrics {
        loudest_station,
        highest_avg_noise,
        avg_violation_rate,
        station_count: rankings.len(),
    }
}

/// Violation rate weighted by each station's `Total_Count`.
///
/// Rows lacking either a percentage or a positive total are skipped.
/// Returns `None` when no row carries any weight.
#[must_use]
pub fn weighted_violation_rate(exceedance: &[Record]) -> Option<f64> {
    let (weighted, weight) = exceedance
        .iter()
        .map(ExceedanceRow::from)
        .filter_map(|row| match (row.exceedance_percentage, row.total_count) {
            (Some(pct), Some(total)) if total > 0.0 => Some((pct * total, total)),
            _ => None,
        })
        .fold((0.0, 0.0), |(ws, w), (x, t)| (ws + x, w + t));

    if weight > 0.0 {
        Some(weighted / weight)
    } else {
        None
    }
}

/// Joins the three tables for one station.
///
/// Returns `None` if the station appears in none of them.
#[must_use]
pub fn location_stats(
    rankings: &[Record],
    exceedance: &[Record],
    severity: &[Record],
    location: &str,
) -> Option<LocationStats> {
    let rank_pos = rankings
        .iter()
        .position(|r| r.text(LOCATION).as_deref() == Some(location));
    let ranking = rank_pos.map(|i| RankingRow::from(&rankings[i]));
    let exceed = find_by_location(exceedance, location).map(ExceedanceRow::from);
    let sev = find_by_location(severity, location).map(SeverityRow::from);

    if ranking.is_none() && exceed.is_none() && sev.is_none() {
        return None;
    }

    let zone_type = ranking
        .as_ref()
        .and_then(|r| r.zone_type)
        .or_else(|| exceed.as_ref().and_then(|r| r.zone_type))
        .or_else(|| sev.as_ref().and_then(|r| r.zone_type));

    Some(LocationStats {
        location: location.to_string(),
        rank: rank_pos.map(|i| i + 1),
        ranked_stations: rankings.len(),
        zone_type,
        average_laeq_dba: ranking.as_ref().and_then(|r| r.average_laeq_dba),
        day_limit_dba: ranking
            .as_ref()
            .and_then(|r| r.day_limit_dba)
            .or_else(|| exceed.as_ref().and_then(|r| r.day_limit_dba)),
        night_limit_dba: ranking
            .as_ref()
            .and_then(|r| r.night_limit_dba)
            .or_else(|| exceed.as_ref().and_then(|r| r.night_limit_dba)),
        exceedance_count: exceed.as_ref().and_then(|r| r.exceedance_count),
        total_count: exceed.as_ref().and_then(|r| r.total_count),
        exceedance_percentage: exceed.as_ref().and_then(|r| r.exceedance_percentage),
        avg_excess_dba: sev.as_ref().and_then(|r| r.avg_excess_dba),
        max_excess_dba: sev.as_ref().and_then(|r| r.max_excess_dba),
        severity_category: sev.and_then(|r| r.severity_category),
    })
}

#[cfg(test)]
mod tests {
    use noise_map_noise_models::{SeverityCategory, ZoneType};
    use noise_map_records::parse;

    use super::*;

    const RANKINGS: &str = "Location,Average_LAeq_dBA,Zone_Type,Day_Limit_dBA,Night_Limit_dBA\n\
        ito,76.2,Commercial,65,55\n\
        isbt,75.1,Commercial,65,55\n\
        nsit,64.9,Silence Zone,50,40\n";

    const EXCEEDANCE: &str = "Location,Zone_Type,Day_Limit_dBA,Night_Limit_dBA,Exceedance_Count,Total_Count,Exceedance_Percentage\n\
        ito,Commercial,65,55,80,100,80\n\
        isbt,Commercial,65,55,30,50,60\n\
        nsit,Silence Zone,50,40,100,100,100\n";

    const SEVERITY: &str = "Location,Zone_Type,Avg_Excess_dBA,Max_Excess_dBA,Severity_Category\n\
        ito,Commercial,11.2,24.8,Extreme\n";

    #[test]
    fn empty_rankings_yield_placeholder() {
        let exceedance = parse(EXCEEDANCE).records;
        assert_eq!(aggregate(&[], &exceedance), DashboardMetrics::placeholder());
    }

    #[test]
    fn empty_exceedance_yields_placeholder() {
        let rankings = parse(RANKINGS).records;
        assert_eq!(aggregate(&rankings, &[]), DashboardMetrics::placeholder());
    }

    #[test]
    fn first_ranking_row_is_loudest() {
        let rankings = parse(RANKINGS).records;
        let exceedance = parse(EXCEEDANCE).records;
        let metrics = aggregate(&rankings, &exceedance);
        assert_eq!(metrics.loudest_station, "ito");
        assert!((metrics.highest_avg_noise - 76.2).abs() < 1e-9);
        assert!((metrics.avg_violation_rate - 80.0).abs() < 1e-9);
        assert_eq!(metrics.station_count, 3);
    }

    #[test]
    fn does_not_rerank() {
        let rankings =
            parse("Location,Average_LAeq_dBA\nquiet,50\nloud,90\n").records;
        let exceedance = parse(EXCEEDANCE).records;
        assert_eq!(aggregate(&rankings, &exceedance).loudest_station, "quiet");
    }

    #[test]
    fn non_numeric_percentage_counts_as_zero() {
        let rankings = parse(RANKINGS).records;
        let exceedance = parse("Location,Exceedance_Percentage\na,90\nb,oops\nc\n").records;
        let metrics = aggregate(&rankings, &exceedance);
        assert!((metrics.avg_violation_rate - 30.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_rate_uses_total_count() {
        let exceedance = parse(EXCEEDANCE).records;
        // (80*100 + 60*50 + 100*100) / 250
        let rate = weighted_violation_rate(&exceedance).unwrap();
        assert!((rate - 84.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_rate_without_counts_is_none() {
        let exceedance = parse("Location,Exceedance_Percentage\na,90\n").records;
        assert!(weighted_violation_rate(&exceedance).is_none());
    }

    #[test]
    fn joins_location_across_tables() {
        let rankings = parse(RANKINGS).records;
        let exceedance = parse(EXCEEDANCE).records;
        let severity = parse(SEVERITY).records;

        let stats = location_stats(&rankings, &exceedance, &severity, "ito").unwrap();
        assert_eq!(stats.rank, Some(1));
        assert_eq!(stats.zone_type, Some(ZoneType::Commercial));
        assert_eq!(stats.average_laeq_dba, Some(76.2));
        assert_eq!(stats.exceedance_percentage, Some(80.0));
        assert_eq!(stats.severity_category, Some(SeverityCategory::Extreme));

        let stats = location_stats(&rankings, &exceedance, &severity, "nsit").unwrap();
        assert_eq!(stats.rank, Some(3));
        assert_eq!(stats.ranked_stations, 3);
        assert_eq!(stats.zone_type, Some(ZoneType::SilenceZone));
        assert_eq!(stats.severity_category, None);
    }

    #[test]
    fn unknown_location_is_none() {
        let rankings = parse(RANKINGS).records;
        assert!(location_stats(&rankings, &[], &[], "Dilshad").is_none());
    }
}
