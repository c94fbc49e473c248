use anyhow::{Context, Result};

use gridiron_weather::config::{self, PipelineConfig};
use gridiron_weather::logging;
use gridiron_weather::report;
use gridiron_weather::store::Store;

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init_logging();

    let mut config = PipelineConfig::from_env()?;
    if let Some(db) = config::parse_db_path_arg() {
        config.db_path = db;
    }

    let store = Store::open(&config.db_path).context("unable to open football db")?;
    let summary = report::generate_reports(&store, &config.venues, &config.output_dir)?;

    println!("Reports written from {} games", summary.records);
    println!("Report: {}", summary.report_path.display());
    for chart in &summary.charts {
        println!("Chart: {}", chart.display());
    }
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in &summary.errors {
            println!(" - {err}");
        }
    }

    Ok(())
}
