use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Number, Value};
use std::io::{self, Read};

use crate::record::Dataset;

/// Read CSV records from stdin (headers required).
pub fn read_csv_from_stdin() -> Result<Dataset> {
    read_csv(io::stdin())
}

/// Read CSV records from any reader. Cells that parse as finite numbers
/// become JSON numbers, empty cells become null, everything else stays a
/// string; the classifier decides column types afterwards.
pub fn read_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Failed to parse CSV row {}", line + 2))?;
        let mut record = Map::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            record.insert(header.clone(), parse_cell(cell));
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(anyhow!("CSV must contain at least one data row"));
    }

    Ok(Dataset::new(records))
}

// Integers stay integers so period-style cells ("202401") keep their exact
// string form when used as grouping keys.
fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::Number(Number::from(i));
    }
    if let Ok(n) = cell.parse::<f64>() {
        if n.is_finite() {
            if let Some(num) = Number::from_f64(n) {
                return Value::Number(num);
            }
        }
    }
    Value::String(cell.to_string())
}
