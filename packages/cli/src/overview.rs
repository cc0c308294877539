//! Overview tab: metrics and sortable tables.

use dialoguer::Select;
use noise_map_analytics::{aggregate, weighted_violation_rate};
use noise_map_cli_utils::{IndicatifProgress, MultiProgress};
use noise_map_records::source::TableSource;
use noise_map_records::sort::{SortOrder, sort_records};
use noise_map_records::{DataFile, Table};
use noise_map_server::dashboard::DashboardState;

/// Shown for cells a row does not have.
const MISSING_CELL: &str = "-";

/// Loads the rankings and exceedance tables and prints the overview
/// metrics. Load failures are logged.
pub async fn show_metrics(source: &TableSource, multi: &MultiProgress) {
    let spinner = IndicatifProgress::spinner(multi, "Loading tables");
    let (rankings, exceedance) = tokio::join!(
        source.load(DataFile::Rankings),
        source.load(DataFile::Exceedance)
    );
    spinner.finish_and_clear();

    let (rankings, exceedance) = match (rankings, exceedance) {
        (Ok(rankings), Ok(exceedance)) => (rankings, exceedance),
        (Err(e), _) | (_, Err(e)) => {
            log::error!("Failed to load tables: {e}");
            return;
        }
    };

    let metrics = aggregate(&rankings.records, &exceedance.records);
    println!();
    println!("  Loudest station:        {}", metrics.loudest_station);
    println!("  Highest average level:  {:.1} dBA", metrics.highest_avg_noise);
    println!("  Average violation rate: {:.1}%", metrics.avg_violation_rate);
    if let Some(weighted) = weighted_violation_rate(&exceedance.records) {
        println!("  Weighted by readings:   {weighted:.1}%");
    }
    if metrics.is_placeholder() {
        log::warn!("A source table is empty; showing placeholder values");
    }
}

/// Renders `table` as aligned text columns.
fn render_table(table: &Table) -> String {
    let cells: Vec<Vec<String>> = table
        .records
        .iter()
        .map(|record| {
            table
                .headers
                .iter()
                .map(|h| {
                    record
                        .text(h)
                        .unwrap_or_else(|| MISSING_CELL.to_string())
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(h.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = line(&table.headers);
    out.push('\n');
    out.push_str(&"-".repeat(out.trim_end().len()));
    for row in &cells {
        out.push('\n');
        out.push_str(&line(row));
    }
    out
}

/// Lets the user pick a table, then re-sorts it on each header choice
/// until they go back. Sort choices are kept in `state`.
///
/// # Errors
///
/// Returns an error if a prompt fails.
pub async fn browse_table(
    source: &TableSource,
    state: &mut DashboardState,
    multi: &MultiProgress,
) -> Result<(), dialoguer::Error> {
    let files = DataFile::all();
    let names: Vec<&str> = files.iter().map(|f| f.file_name()).collect();
    let idx = Select::new()
        .with_prompt("Which table?")
        .items(&names)
        .default(0)
        .interact()?;
    let file = files[idx];

    let spinner = IndicatifProgress::spinner(multi, &format!("Loading {}", file.file_name()));
    let loaded = source.load(file).await;
    spinner.finish_and_clear();
    let mut table = match loaded {
        Ok(table) => table,
        Err(e) => {
            log::error!("Failed to load {}: {e}", file.file_name());
            return Ok(());
        }
    };

    let original = table.records.clone();
    loop {
        let sort = state.sort_for(file);
        table.records.clone_from(&original);
        if let Some(column) = &sort.column {
            sort_records(&mut table.records, column, sort.order);
        }

        println!();
        println!("{}", render_table(&table));
        println!();

        let mut choices: Vec<String> = table
            .headers
            .iter()
            .map(|h| {
                let arrow = match (&sort.column, sort.order) {
                    (Some(c), SortOrder::Asc) if c == h => " (asc)",
                    (Some(c), SortOrder::Desc) if c == h => " (desc)",
                    _ => "",
                };
                format!("Sort by {h}{arrow}")
            })
            .collect();
        choices.push("Back".to_string());

        let pick = Select::new()
            .with_prompt("Sort")
            .items(&choices)
            .default(choices.len() - 1)
            .interact()?;
        let Some(column) = table.headers.get(pick) else {
            return Ok(());
        };
        state.toggle_sort(file, column);
    }
}
