//! Print the OpenAPI document as JSON, to stdout or a file.

use std::path::PathBuf;

use articles_backend::doc::ApiDoc;
use clap::Parser;
use utoipa::OpenApi;

/// Command-line options for `openapi-dump`.
#[derive(Debug, Parser)]
#[command(about = "Emit the articles backend OpenAPI document")]
struct Cli {
    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let json = ApiDoc::openapi().to_pretty_json()?;
    match cli.output {
        Some(path) => std::fs::write(path, json + "\n")?,
        None => println!("{json}"),
    }
    Ok(())
}
