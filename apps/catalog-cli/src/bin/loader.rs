use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use catalog_core::config::{expand_path, Config};
use catalog_core::mapper::DocumentMapper;
use catalog_service::BulkLoader;
use catalog_typesense::TypesenseClient;

/// Create a Typesense collection from a schema file and bulk-import records into it.
#[derive(Parser, Debug)]
#[command(name = "catalog-loader", version)]
struct Args {
    /// JSON collection schema (must have a `name`)
    schema_path: String,
    /// Records file: JSON lines, concatenated JSON values, or one JSON array
    records_path: String,
    /// Drop the collection first if it already exists
    #[arg(long)]
    overwrite: bool,
}

fn run(args: Args) -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let client = TypesenseClient::new(&settings.engine)?;
    let mapper = DocumentMapper::new(settings.mapping_mode);
    let loader = BulkLoader::new(Arc::new(client), mapper);

    let schema_path = expand_path(&args.schema_path);
    let records_path = expand_path(&args.records_path);
    let report = tokio::runtime::Runtime::new()?.block_on(async {
        loader
            .load(&schema_path, &records_path, args.overwrite)
            .await
    })?;

    if report.failed > 0 {
        println!(
            "⚠️  {} of {} documents failed to import (see log)",
            report.failed, report.submitted
        );
    } else {
        println!("✅ Imported {} documents", report.submitted);
    }
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{e}");
            ExitCode::FAILURE
        }
    }
}
