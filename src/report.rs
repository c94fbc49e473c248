use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::aggregate::{
    self, CompletionByWind, PlayMixByWind, PointsByCompletion, PointsByTemperature, Tier,
    TierRow,
};
use crate::charts::{self, ChartKind, ChartSpec};
use crate::store::Store;
use crate::venues::VenueTable;

pub const REPORT_FILE: &str = "data.txt";

pub struct ReportSummary {
    pub report_path: PathBuf,
    pub records: usize,
    pub charts: Vec<PathBuf>,
    pub errors: Vec<String>,
}

/// Runs all four aggregations over the store, writes the text report and, per
/// aggregation, a PNG chart and a chart workbook into `output_dir`.
pub fn generate_reports(
    store: &Store,
    venues: &VenueTable,
    output_dir: &Path,
) -> Result<ReportSummary> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir {}", output_dir.display()))?;

    let records = store.load_derived_records(venues)?;
    info!(records = records.len(), "loaded derived records");

    let play_mix = aggregate::play_mix_by_wind(&records);
    let temperature = aggregate::points_by_temperature(&records);
    let completion = aggregate::completion_by_wind(&records);
    let by_completion = aggregate::points_by_completion(&records);

    let report = [
        render_play_mix(&play_mix),
        render_points_by_temperature(&temperature),
        render_completion_by_wind(&completion),
        render_points_by_completion(&by_completion),
    ]
    .concat();
    let report_path = output_dir.join(REPORT_FILE);
    fs::write(&report_path, report)
        .with_context(|| format!("write report {}", report_path.display()))?;

    let specs = [
        play_mix_chart(&play_mix),
        temperature_chart(&temperature),
        completion_chart(&completion),
        completion_points_chart(&by_completion),
    ];
    let mut chart_paths = Vec::new();
    let mut errors = Vec::new();
    for spec in &specs {
        for written in [
            charts::write_chart_image(output_dir, spec),
            charts::write_chart(output_dir, spec),
        ] {
            match written {
                Ok(path) => chart_paths.push(path),
                Err(err) => {
                    warn!(chart = spec.file_stem, error = %err, "chart render failed");
                    errors.push(format!("chart {}: {err:#}", spec.file_stem));
                }
            }
        }
    }

    Ok(ReportSummary {
        report_path,
        records: records.len(),
        charts: chart_paths,
        errors,
    })
}

pub fn render_play_mix(data: &PlayMixByWind) -> String {
    let mut out = String::new();
    out.push_str("-------------Average Rushing and Passing Percentage by Wind Speed-------------\n");
    out.push_str("Category\tGames\tAverage Pass Percentage\tAverage Rush Percentage\n");
    for row in &data.rows {
        out.push_str(&format!(
            "{}\t{}\t{:.2}%\t{:.2}%\n",
            row.tier.label(),
            row.games,
            row.mean(0),
            row.mean(1)
        ));
    }
    out
}

pub fn render_points_by_temperature(data: &PointsByTemperature) -> String {
    let mut out = String::new();
    out.push_str("\n-------------Total Points Based on Temperature-------------\n");
    out.push_str("Category\tGames\tAverage Total Points\n");
    push_mean_rows(&mut out, &data.rows);

    for row in &data.rows {
        out.push_str(&format!("\n--- {} Games ---\n", row.tier.label()));
        out.push_str("Date\tGame ID\tHome/Away\tTotal Points\tTemperature\n");
        for (_, game) in data.games.iter().filter(|(t, _)| *t == row.tier) {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{:.1}°F\n",
                game.date, game.game_id, game.home_away, game.total_points, game.temperature
            ));
        }
    }
    out
}

pub fn render_completion_by_wind(data: &CompletionByWind) -> String {
    let mut out = String::new();
    out.push_str("\n-------------Completion Percentage Based on Wind Speed-------------\n");
    out.push_str("Category\tGames\tAverage Completion Percentage\n");
    for row in &data.rows {
        out.push_str(&format!(
            "{} Wind\t{}\t{:.2}%\n",
            row.tier.label(),
            row.games,
            row.mean(0)
        ));
    }

    for row in &data.rows {
        out.push_str(&format!("\n--- {} Wind ---\n", row.tier.label()));
        out.push_str("Date\tHome/Away\tOpponent\tCompletion Percentage\tMax Wind Speed\n");
        for (_, game) in data.games.iter().filter(|(t, _)| *t == row.tier) {
            out.push_str(&format!(
                "{}\t{}\t{}\t{:.2}%\t{:.1} mph\n",
                game.date, game.home_away, game.opponent, game.completion_pct, game.wind_mph
            ));
        }
    }
    out
}

pub fn render_points_by_completion(data: &PointsByCompletion) -> String {
    let mut out = String::new();
    out.push_str("\n-------------Average Score Per Completion Percentage Range-------------\n");
    out.push_str("Range\tGames\tAverage Total Points\n");
    push_mean_rows(&mut out, &data.rows);
    out
}

fn push_mean_rows<T: Tier>(out: &mut String, rows: &[TierRow<T>]) {
    for row in rows {
        out.push_str(&format!(
            "{}\t{}\t{:.2}\n",
            row.tier.label(),
            row.games,
            row.mean(0)
        ));
    }
}

fn play_mix_chart(data: &PlayMixByWind) -> ChartSpec {
    ChartSpec {
        file_stem: "average_rushing_passing_by_wind",
        title: "Average Rushing and Passing Percentages by Wind Speed",
        x_label: "Wind Speed Category",
        y_label: "Percentage (%)",
        kind: ChartKind::Column,
        categories: labels(&data.rows),
        series: vec![
            ("Average Pass Percentage", column(&data.rows, 0)),
            ("Average Rush Percentage", column(&data.rows, 1)),
        ],
    }
}

fn temperature_chart(data: &PointsByTemperature) -> ChartSpec {
    ChartSpec {
        file_stem: "average_points_by_temperature",
        title: "Average Total Points by Temperature Category",
        x_label: "Temperature Category",
        y_label: "Average Total Points",
        kind: ChartKind::Line,
        categories: labels(&data.rows),
        series: vec![("Average Total Points", column(&data.rows, 0))],
    }
}

fn completion_chart(data: &CompletionByWind) -> ChartSpec {
    ChartSpec {
        file_stem: "average_completion_by_wind",
        title: "Average Completion Percentage by Wind Speed Category",
        x_label: "Wind Speed Category",
        y_label: "Average Completion Percentage (%)",
        kind: ChartKind::Column,
        categories: labels(&data.rows),
        series: vec![("Average Completion Percentage", column(&data.rows, 0))],
    }
}

fn completion_points_chart(data: &PointsByCompletion) -> ChartSpec {
    ChartSpec {
        file_stem: "completion_avg_total_points",
        title: "Average Total Points by Completion Percentage Range",
        x_label: "Completion Percentage Range",
        y_label: "Average Total Points",
        kind: ChartKind::Line,
        categories: labels(&data.rows),
        series: vec![("Avg Total Points", column(&data.rows, 0))],
    }
}

fn labels<T: Tier>(rows: &[TierRow<T>]) -> Vec<&'static str> {
    rows.iter().map(|r| r.tier.label()).collect()
}

fn column<T>(rows: &[TierRow<T>], idx: usize) -> Vec<f64> {
    rows.iter().map(|r| r.mean(idx)).collect()
}
