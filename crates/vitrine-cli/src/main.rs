use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vitrine_extract::FieldExtractor;

#[derive(Debug, Parser)]
#[command(name = "vitrine-cli")]
#[command(about = "Extract product fields from storefront HTML")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract a product record from a saved HTML page
    Extract {
        /// HTML file to read, or `-` for stdin
        path: PathBuf,
        /// URL the page was fetched from (defaults to the path)
        #[arg(long)]
        url: Option<String>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
        /// Include recovered issues and detected hydration markers
        #[arg(long)]
        report: bool,
    },
    /// Print the effective extractor configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(vitrine_core::config::log_level()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = vitrine_core::load_extractor_config_from_env()?;

    match cli.command {
        Some(Commands::Extract {
            path,
            url,
            pretty,
            report,
        }) => {
            let body = read_input(&path)?;
            let source_url = url.unwrap_or_else(|| path.display().to_string());
            let extractor = FieldExtractor::new(&config);

            let output = if report {
                let html = std::str::from_utf8(&body)
                    .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
                let extraction = extractor.run(html, &source_url);
                tracing::info!(
                    %source_url,
                    fields = extraction.record.sources.len(),
                    issues = extraction.issues.len(),
                    "extraction complete"
                );
                to_json(&extraction, pretty)?
            } else {
                let record = extractor
                    .extract_bytes(&body, &source_url)
                    .with_context(|| format!("failed to extract {}", path.display()))?;
                tracing::info!(%source_url, fields = record.sources.len(), "extraction complete");
                to_json(&record, pretty)?
            };
            println!("{output}");
        }
        Some(Commands::Config) => println!("{}", to_json(&config, true)?),
        None => println!("vitrine-cli: run `vitrine-cli extract <PATH>` (see --help)"),
    }

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut body = Vec::new();
        std::io::stdin()
            .read_to_end(&mut body)
            .context("failed to read stdin")?;
        return Ok(body);
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("failed to serialize output")
}
