//! Load production history from a production database CSV export
//!
//! Upstream exports are inconsistent about column casing and naming. All
//! variants are mapped here, once, so nothing downstream has to guess.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use csv::{Reader, ReaderBuilder, Trim};
use log::{debug, warn};

use super::{Month, ProductionRecord};
use crate::error::{EngineError, Result};

/// Raw CSV row, accepting every known spelling of each column
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "API_UWI", alias = "api_uwi", alias = "Api_Uwi", alias = "well_id", default)]
    well_id: Option<String>,
    #[serde(
        rename = "PRODUCINGMONTH",
        alias = "producingmonth",
        alias = "ProducingMonth",
        alias = "PRODUCTIONMONTH",
        alias = "MONTH",
        alias = "month"
    )]
    month: String,
    #[serde(rename = "LIQUIDSPROD_BBL", alias = "liquidsprod_bbl", alias = "OIL_BBL", alias = "oil_bbl", default)]
    oil: Option<String>,
    #[serde(rename = "GASPROD_MCF", alias = "gasprod_mcf", alias = "GAS_MCF", alias = "gas_mcf", default)]
    gas: Option<String>,
}

impl CsvRow {
    fn into_record(self, row: usize) -> Result<ProductionRecord> {
        let well_id = self
            .well_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(EngineError::MissingWellId { row })?;
        let month = Month::parse(&self.month)?;

        Ok(ProductionRecord::new(
            well_id,
            month,
            parse_volume(self.oil.as_deref(), row),
            parse_volume(self.gas.as_deref(), row),
        ))
    }
}

/// Blank or non-numeric volumes count as zero production
fn parse_volume(raw: Option<&str>, row: usize) -> f64 {
    match raw.map(str::trim) {
        None | Some("") => 0.0,
        Some(text) => match text.replace(',', "").parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                warn!("row {}: volume '{}' is not numeric, treating as 0", row, text);
                0.0
            }
        },
    }
}

fn read_rows<R: Read>(mut reader: Reader<R>) -> Result<Vec<ProductionRecord>> {
    let mut records = Vec::new();

    for (idx, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        // Row numbers are 1-based and skip the header line
        records.push(row.into_record(idx + 2)?);
    }

    debug!("loaded {} production rows", records.len());
    Ok(records)
}

/// Load all production rows from a CSV file
pub fn load_production<P: AsRef<Path>>(path: P) -> Result<Vec<ProductionRecord>> {
    let reader = ReaderBuilder::new().trim(Trim::Headers).from_path(path)?;
    read_rows(reader)
}

/// Load production rows from any reader (e.g., string buffer, network stream)
pub fn load_production_from_reader<R: Read>(reader: R) -> Result<Vec<ProductionRecord>> {
    let reader = ReaderBuilder::new().trim(Trim::Headers).from_reader(reader);
    read_rows(reader)
}

/// Group rows by well, preserving month order within each well
pub fn group_by_well(rows: Vec<ProductionRecord>) -> BTreeMap<String, Vec<ProductionRecord>> {
    let mut by_well: BTreeMap<String, Vec<ProductionRecord>> = BTreeMap::new();
    for row in rows {
        by_well.entry(row.well_id.clone()).or_default().push(row);
    }
    for rows in by_well.values_mut() {
        rows.sort_by_key(|r| r.month);
    }
    by_well
}
