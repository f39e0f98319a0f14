//! Interest Model CLI
//!
//! Loads the model config, the expanded monthly macro grid, and (unless
//! calibration is skipped) the historical observed interest totals, runs
//! calibrate-then-project, writes monthly results and fitted parameters,
//! and prints the FY summary table.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::info;

use interest_model::aggregate::{annual_table, YearKind};
use interest_model::macro_input::{load_macro_csv, load_observed_csv};
use interest_model::{MacroSeries, ModelConfig, ModelRunner, MonthlyResult, RunOutput};

#[derive(Parser)]
#[command(name = "interest-model", about = "Net interest expense forecast model")]
struct Cli {
    /// Model configuration (JSON)
    #[arg(long, default_value = "input/config.json")]
    config: PathBuf,

    /// Expanded monthly macro grid (CSV)
    #[arg(long = "macro", default_value = "input/macro_monthly.csv")]
    macro_csv: PathBuf,

    /// Historical observed monthly interest totals (CSV)
    #[arg(long, default_value = "input/historical_interest.csv")]
    historical: PathBuf,

    /// Output directory
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Skip calibration and use the configured parameters
    #[arg(long)]
    no_calibrate: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let started = Instant::now();

    info!("loading config from {}", cli.config.display());
    let config = ModelConfig::from_json_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    info!("loading macro grid from {}", cli.macro_csv.display());
    let series = load_macro_csv(&cli.macro_csv)
        .with_context(|| format!("loading {}", cli.macro_csv.display()))?;
    series.validate()?;

    let observed = if cli.no_calibrate {
        None
    } else {
        info!("loading historical totals from {}", cli.historical.display());
        Some(
            load_observed_csv(&cli.historical)
                .with_context(|| format!("loading {}", cli.historical.display()))?,
        )
    };

    let runner = ModelRunner::new(config)?;
    let output = runner.run(&series, observed.as_ref())?;

    fs::create_dir_all(&cli.output)?;
    write_monthly_csv(&cli.output.join("monthly.csv"), &output.monthly.months)?;
    if let Some(calibration) = &output.calibration {
        let path = cli.output.join("calibrated_params.json");
        fs::write(&path, serde_json::to_string_pretty(calibration)?)?;
        info!(
            "calibration: loss={:.4e} rel_rmse={:.4} converged={} ({} candidates)",
            calibration.loss, calibration.rel_rmse, calibration.converged, calibration.evaluated
        );
    }

    print_fy_table(&output, &series);

    let summary = output.monthly.summary();
    println!(
        "\n{} months projected, total net interest {:.3e}, final debt {:.3e}",
        summary.total_months, summary.total_net_interest, summary.final_debt
    );
    info!("done in {:.2}s", started.elapsed().as_secs_f64());
    Ok(())
}

fn write_monthly_csv(path: &PathBuf, months: &[MonthlyResult]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in months {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("wrote {} monthly rows to {}", months.len(), path.display());
    Ok(())
}

fn print_fy_table(output: &RunOutput, series: &MacroSeries) {
    let table = annual_table(&output.monthly.months, series, YearKind::Fiscal);

    println!(
        "{:>6} {:>16} {:>16} {:>10} {:>10}",
        "FY", "Interest", "Avg Debt", "EffRate", "Int/GDP"
    );
    println!("{}", "-".repeat(62));
    for (year, row) in &table {
        println!(
            "{:>6} {:>16.3e} {:>16.3e} {:>10.4} {:>10.4}",
            year, row.interest_total, row.debt_avg, row.effective_rate, row.interest_pct_gdp
        );
    }
}
