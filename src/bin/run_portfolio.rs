//! Run forecasts for every well in a production file and aggregate them
//!
//! Outputs monthly portfolio totals inside the reporting window.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use decline_engine::decline::{load_arps_inputs, load_decline_inputs};
use decline_engine::production::{group_by_well, load_production};
use decline_engine::{EngineConfig, Month, OwnerInterest, PortfolioRunner, WellReserves, WellSelection};

#[derive(Parser, Debug)]
#[command(name = "run_portfolio")]
#[command(about = "Forecast all wells and write aggregated monthly totals")]
struct Args {
    /// Monthly production CSV
    #[arg(long)]
    production: PathBuf,

    /// JSON object of decline settings keyed by well id
    #[arg(long, conflicts_with = "arps")]
    settings: Option<PathBuf>,

    /// JSON object of plain Arps inputs (qi, di, b, periods) keyed by well id
    #[arg(long)]
    arps: Option<PathBuf>,

    /// JSON object of owner interest fractions keyed by well id
    #[arg(long)]
    interests: Option<PathBuf>,

    /// Restrict the aggregate to these wells (comma separated)
    #[arg(long, value_delimiter = ',')]
    select: Option<Vec<String>>,

    /// Valuation month (YYYY-MM); defaults to the current month
    #[arg(long)]
    as_of: Option<String>,

    /// Engine configuration JSON overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output CSV for the aggregated series
    #[arg(long, default_value = "portfolio_output.csv")]
    output: PathBuf,
}

fn load_interests(path: &Path) -> Result<BTreeMap<String, OwnerInterest>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let raw: BTreeMap<String, Option<f64>> = serde_json::from_reader(file)?;
    Ok(raw
        .into_iter()
        .map(|(well_id, value)| (well_id, OwnerInterest::from_raw(value)))
        .collect())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_path(path)?,
        None => EngineConfig::default(),
    };
    let as_of = match &args.as_of {
        Some(raw) => Month::parse(raw)?,
        None => Month::current(),
    };

    let start = Instant::now();
    println!("Loading production from {}...", args.production.display());
    let rows = load_production(&args.production)?;
    let row_count = rows.len();
    let wells = group_by_well(rows);
    println!("Loaded {} rows for {} wells in {:?}", row_count, wells.len(), start.elapsed());

    let runner = PortfolioRunner::new(config);
    let interests = match &args.interests {
        Some(path) => load_interests(path)?,
        None => BTreeMap::new(),
    };

    println!("Building forecasts...");
    let build_start = Instant::now();
    let series = match (&args.arps, &args.settings) {
        (Some(path), _) => runner.build_all_arps(&wells, &load_arps_inputs(path)?),
        (None, Some(path)) => runner.build_all(&wells, &runner.resolve_inputs(&load_decline_inputs(path)?)),
        (None, None) => runner.build_all(&wells, &BTreeMap::new()),
    };
    println!("Forecasts complete in {:?}", build_start.elapsed());

    let selection = match args.select {
        Some(ids) => WellSelection::from_flags(ids, true),
        None => WellSelection::All,
    };
    let totals = runner.aggregate(&series, &selection);

    let output_path = &args.output;
    let file = File::create(output_path).with_context(|| format!("creating {}", output_path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "Month,Oil,Gas,OilForecast,GasForecast,Wells")?;
    for i in 0..totals.len() {
        writeln!(
            out,
            "{},{:.2},{:.2},{},{},{}",
            totals.months[i],
            totals.oil[i],
            totals.gas[i],
            totals.oil_forecast[i].map(|v| format!("{:.2}", v)).unwrap_or_default(),
            totals.gas_forecast[i].map(|v| format!("{:.2}", v)).unwrap_or_default(),
            totals.well_count[i]
        )?;
    }
    out.flush()?;
    println!("Wrote {} months to {}", totals.len(), output_path.display());

    // Portfolio reserves summary
    let reserves = runner.reserves_all(&series, &interests, as_of);
    let included: Vec<_> = reserves.iter().filter(|(id, _)| selection.includes(id)).collect();
    let sum = |f: fn(&WellReserves) -> Option<f64>| -> f64 {
        included.iter().filter_map(|(_, r)| f(r)).sum()
    };

    println!("\n=== Portfolio Summary (as of {}) ===", as_of);
    println!("Wells included: {}", included.len());
    println!("Gross oil EUR (bbl): {:.0}", sum(|r| r.gross_oil_eur));
    println!("Gross gas EUR (mcf): {:.0}", sum(|r| r.gross_gas_eur));
    println!("Net oil EUR (bbl): {:.0}", sum(|r| r.net_oil_eur));
    println!("Net gas EUR (mcf): {:.0}", sum(|r| r.net_gas_eur));
    println!("Remaining net oil (bbl): {:.0}", sum(|r| r.remaining_net_oil));
    println!("Remaining net gas (mcf): {:.0}", sum(|r| r.remaining_net_gas));
    println!("Chart bounds: {} .. {}", totals.y_min, totals.y_max);
    println!("Total time: {:?}", start.elapsed());

    Ok(())
}
