use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Write};

use tradegraph::{pipeline, reader, ChartConfig, Dataset};

#[derive(Parser, Debug)]
#[command(name = "tradegraph")]
#[command(about = "Aggregate trade records into chart series from a JSON chart config", long_about = None)]
struct Args {
    /// Chart configuration as a JSON string, or @path to a JSON file
    config: String,

    /// Read records as a JSON array of objects instead of CSV
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config_text = match args.config.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?,
        None => args.config.clone(),
    };
    let config: ChartConfig =
        serde_json::from_str(&config_text).context("Failed to parse chart config JSON")?;

    // Read records from stdin
    let dataset = if args.json {
        let value = serde_json::from_reader(io::stdin()).context("Failed to parse JSON input")?;
        Dataset::from_json(&value).context("Failed to read records from JSON")?
    } else {
        reader::read_csv_from_stdin().context("Failed to read CSV from stdin")?
    };

    let chart = pipeline::run(&dataset.records, &config).context("Failed to run pipeline")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, &chart).context("Failed to write series JSON")?;
    handle.write_all(b"\n")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
