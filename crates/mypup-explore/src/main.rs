//! `mypup-explore` - run MY PUP listing queries against a JSON file.

mod cli;
mod render;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use mypup_query::{QueryEngine, Record};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let profile = args.load_profile()?;
    if args.print_profile {
        print!("{}", profile.to_yaml_string()?);
        return Ok(());
    }

    let text = std::fs::read_to_string(&args.records)
        .with_context(|| format!("failed to read records {}", args.records.display()))?;
    let records = Record::list_from_json(&text)
        .with_context(|| format!("failed to parse records {}", args.records.display()))?;
    tracing::debug!(count = records.len(), path = %args.records.display(), "loaded records");

    let query = args.to_query()?;
    let engine = QueryEngine::new(profile);
    let page = engine.run(&records, &query);

    let out = render::render(&page, engine.profile(), args.format)?;
    std::io::stdout()
        .lock()
        .write_all(out.as_bytes())
        .context("failed to write output")?;
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
