//! Decline Engine CLI
//!
//! Forecasts a single well from a production CSV and a decline-settings JSON,
//! prints its reserves and rescaled value, and writes the merged series.
//!
//! Usage:
//!   cargo run --bin decline-engine -- --production prod.csv --settings params.json --well 4212345678

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;

use decline_engine::decline::{load_decline_inputs, Phase};
use decline_engine::production::{group_by_well, load_production};
use decline_engine::{EngineConfig, Month, OwnerInterest, ValueBaseline, WellEditor, WellSession};

#[derive(Parser, Debug)]
#[command(name = "decline-engine")]
#[command(about = "Forecast one well and report EUR, net reserves and rescaled value")]
struct Args {
    /// Monthly production CSV
    #[arg(long)]
    production: PathBuf,

    /// JSON object of decline settings keyed by well id
    #[arg(long)]
    settings: PathBuf,

    /// Well identifier (API/UWI)
    #[arg(long)]
    well: String,

    /// Owner net revenue interest fraction; omit when unknown
    #[arg(long)]
    owner_interest: Option<f64>,

    /// Stored present value of the well
    #[arg(long)]
    pv: Option<f64>,

    /// Stored net oil EUR used as the value baseline
    #[arg(long)]
    baseline_net_oil: Option<f64>,

    /// Stored net gas EUR used as the value baseline
    #[arg(long)]
    baseline_net_gas: Option<f64>,

    /// Valuation month (YYYY-MM); defaults to the current month
    #[arg(long)]
    as_of: Option<String>,

    /// Engine configuration JSON overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output CSV for the merged monthly series
    #[arg(long, default_value = "well_forecast.csv")]
    output: PathBuf,
}

fn fmt_volume(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}", v))
}

fn fmt_optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_path(path).with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let as_of = match &args.as_of {
        Some(raw) => Month::parse(raw)?,
        None => Month::current(),
    };

    let mut wells = group_by_well(load_production(&args.production)?);
    let production = wells.remove(&args.well).unwrap_or_default();
    if production.is_empty() {
        info!("well {} has no production rows", args.well);
    }

    let settings = load_decline_inputs(&args.settings)?;
    let record = settings
        .get(&args.well)
        .ok_or_else(|| anyhow!("no decline settings for well {}", args.well))?;
    let inputs = record.to_parameters(&config)?;

    let owner_interest = OwnerInterest::from_raw(args.owner_interest);
    let mut editor = WellEditor::new(config);
    editor.open(WellSession {
        well_id: args.well.clone(),
        production,
        inputs,
        owner_interest,
        baseline: ValueBaseline::from_well_record(args.baseline_net_oil, args.baseline_net_gas, args.pv),
    });
    let view = editor
        .evaluate(as_of)
        .ok_or_else(|| anyhow!("no well open in editor"))?;

    println!("Decline Engine v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");
    println!("Well: {}", args.well);
    println!("  As of: {}", as_of);
    match owner_interest.fraction() {
        Some(f) => println!("  Owner interest: {:.4}%", f * 100.0),
        None => println!("  Owner interest: unknown"),
    }
    println!("  Cumulative oil (bbl): {:.1}", view.series.total_history(Phase::Oil));
    println!("  Cumulative gas (mcf): {:.1}", view.series.total_history(Phase::Gas));
    println!(
        "  Production: {} .. {}",
        view.reserves.first_production_month.map_or("n/a".to_string(), |m| m.to_string()),
        view.reserves.last_production_month.map_or("n/a".to_string(), |m| m.to_string())
    );
    println!("  Gross oil EUR (bbl): {}", fmt_volume(view.reserves.gross_oil_eur));
    println!("  Gross gas EUR (mcf): {}", fmt_volume(view.reserves.gross_gas_eur));
    println!("  Net oil EUR (bbl): {}", fmt_volume(view.reserves.net_oil_eur));
    println!("  Net gas EUR (mcf): {}", fmt_volume(view.reserves.net_gas_eur));
    println!("  Remaining net oil (bbl): {}", fmt_volume(view.reserves.remaining_net_oil));
    println!("  Remaining net gas (mcf): {}", fmt_volume(view.reserves.remaining_net_gas));
    match view.present_value {
        Some(pv) => println!("  Estimated PV: ${:.2}", pv),
        None => println!("  Estimated PV: n/a"),
    }

    let file = File::create(&args.output).with_context(|| format!("creating {}", args.output.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "Month,HistoryOil,HistoryGas,ForecastOil,ForecastGas")?;
    for entry in view.series.iter() {
        writeln!(
            out,
            "{},{},{},{},{}",
            entry.month,
            entry.history_oil,
            entry.history_gas,
            fmt_optional(entry.forecast_oil),
            fmt_optional(entry.forecast_gas)
        )?;
    }
    out.flush()?;

    println!("\nWrote {} months to {}", view.series.len(), args.output.display());
    Ok(())
}
