use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use image::{ImageFormat, Rgb, RgbImage};
use rust_xlsxwriter::{Chart, ChartType, Workbook, Worksheet};

const DATA_SHEET: &str = "Data";

const IMAGE_WIDTH: u32 = 640;
const IMAGE_HEIGHT: u32 = 400;
const IMAGE_MARGIN: u32 = 40;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const PALETTE: [Rgb<u8>; 4] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Column,
    Line,
}

/// A static chart over bucket means: one category per tier, one series per
/// averaged value.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub file_stem: &'static str,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub kind: ChartKind,
    pub categories: Vec<&'static str>,
    pub series: Vec<(&'static str, Vec<f64>)>,
}

/// Writes `<file_stem>.xlsx` holding the bucket table and a native chart of it.
pub fn write_chart(output_dir: &Path, spec: &ChartSpec) -> Result<PathBuf> {
    if spec.categories.is_empty() || spec.series.is_empty() {
        return Err(anyhow!("chart {} has no data", spec.file_stem));
    }
    let last_row = spec.categories.len() as u32;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name(DATA_SHEET)
        .context("name chart data sheet")?;
    write_table(sheet, spec)?;

    let mut chart = Chart::new(match spec.kind {
        ChartKind::Column => ChartType::Column,
        ChartKind::Line => ChartType::Line,
    });
    for (idx, (name, _)) in spec.series.iter().enumerate() {
        let col = (idx + 1) as u16;
        chart
            .add_series()
            .set_name(*name)
            .set_categories((DATA_SHEET, 1, 0, last_row, 0))
            .set_values((DATA_SHEET, 1, col, last_row, col));
    }
    chart.title().set_name(spec.title);
    chart.x_axis().set_name(spec.x_label);
    chart.y_axis().set_name(spec.y_label);

    let chart_col = (spec.series.len() + 2) as u16;
    sheet
        .insert_chart(1, chart_col, &chart)
        .context("insert chart")?;

    let path = output_dir.join(format!("{}.xlsx", spec.file_stem));
    workbook
        .save(&path)
        .with_context(|| format!("save chart {}", path.display()))?;
    Ok(path)
}

/// Writes `<file_stem>.png`: the same bucket means drawn as grouped bars or a
/// line per series. Labels live in the workbook and the text report.
pub fn write_chart_image(output_dir: &Path, spec: &ChartSpec) -> Result<PathBuf> {
    if spec.categories.is_empty() || spec.series.is_empty() {
        return Err(anyhow!("chart {} has no data", spec.file_stem));
    }
    let image = render_image(spec);
    let path = output_dir.join(format!("{}.png", spec.file_stem));
    image
        .save_with_format(&path, ImageFormat::Png)
        .with_context(|| format!("save chart image {}", path.display()))?;
    Ok(path)
}

/// Plot area as `(left, top, right, bottom)` in pixels.
fn plot_area() -> (u32, u32, u32, u32) {
    (
        IMAGE_MARGIN,
        IMAGE_MARGIN,
        IMAGE_WIDTH - IMAGE_MARGIN,
        IMAGE_HEIGHT - IMAGE_MARGIN,
    )
}

fn render_image(spec: &ChartSpec) -> RgbImage {
    let mut img = RgbImage::from_pixel(IMAGE_WIDTH, IMAGE_HEIGHT, BACKGROUND);
    let (left, top, right, bottom) = plot_area();
    let plot_h = (bottom - top) as f64;

    let max = spec
        .series
        .iter()
        .flat_map(|(_, values)| values.iter().copied())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let max = if max > 0.0 { max } else { 1.0 };
    let y_of = |value: f64| -> u32 {
        let v = if value.is_finite() { value.clamp(0.0, max) } else { 0.0 };
        bottom - (v / max * plot_h).round() as u32
    };

    for step in 1..=4 {
        let y = bottom - (plot_h * step as f64 / 4.0).round() as u32;
        fill_rect(&mut img, left, y, right, y, GRID);
    }

    let groups = spec.categories.len() as f64;
    let group_w = (right - left) as f64 / groups;
    match spec.kind {
        ChartKind::Column => {
            let bar_w = group_w * 0.8 / spec.series.len() as f64;
            for (s_idx, (_, values)) in spec.series.iter().enumerate() {
                let color = PALETTE[s_idx % PALETTE.len()];
                for (c_idx, value) in values.iter().take(spec.categories.len()).enumerate() {
                    let x0 = left as f64 + group_w * (c_idx as f64 + 0.1) + bar_w * s_idx as f64;
                    let x1 = (x0 + bar_w).round() as u32 - 1;
                    let y = y_of(*value);
                    if y < bottom {
                        fill_rect(&mut img, x0.round() as u32, y, x1, bottom - 1, color);
                    }
                }
            }
        }
        ChartKind::Line => {
            for (s_idx, (_, values)) in spec.series.iter().enumerate() {
                let color = PALETTE[s_idx % PALETTE.len()];
                let points: Vec<(u32, u32)> = values
                    .iter()
                    .take(spec.categories.len())
                    .enumerate()
                    .map(|(c_idx, value)| {
                        let x = left as f64 + group_w * (c_idx as f64 + 0.5);
                        (x.round() as u32, y_of(*value))
                    })
                    .collect();
                for pair in points.windows(2) {
                    draw_line(&mut img, pair[0], pair[1], color);
                }
                for (x, y) in points {
                    fill_rect(
                        &mut img,
                        x.saturating_sub(3),
                        y.saturating_sub(3),
                        x + 3,
                        y + 3,
                        color,
                    );
                }
            }
        }
    }

    fill_rect(&mut img, left, top, left, bottom, AXIS);
    fill_rect(&mut img, left, bottom, right, bottom, AXIS);
    img
}

/// Inclusive on both corners, clipped to the image.
fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    let x1 = x1.min(img.width() - 1);
    let y1 = y1.min(img.height() - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            img.put_pixel(x, y, color);
        }
    }
}

fn draw_line(img: &mut RgbImage, from: (u32, u32), to: (u32, u32), color: Rgb<u8>) {
    let (dx, dy) = (to.0 as f64 - from.0 as f64, to.1 as f64 - from.1 as f64);
    let steps = dx.abs().max(dy.abs()).max(1.0) as u32;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = (from.0 as f64 + dx * t).round() as u32;
        let y = (from.1 as f64 + dy * t).round() as u32;
        fill_rect(img, x, y, x + 1, y + 1, color);
    }
}

fn write_table(sheet: &mut Worksheet, spec: &ChartSpec) -> Result<()> {
    sheet
        .write_string(0, 0, spec.x_label)
        .context("write chart header")?;
    for (idx, (name, values)) in spec.series.iter().enumerate() {
        let col = (idx + 1) as u16;
        sheet
            .write_string(0, col, *name)
            .context("write chart header")?;
        for (row, value) in values.iter().enumerate() {
            sheet
                .write_number(row as u32 + 1, col, *value)
                .context("write chart value")?;
        }
    }
    for (row, label) in spec.categories.iter().enumerate() {
        sheet
            .write_string(row as u32 + 1, 0, *label)
            .context("write chart category")?;
    }
    Ok(())
}
