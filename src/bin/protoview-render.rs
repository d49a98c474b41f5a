use anyhow::{Context, Result};
use clap::Parser;
use protoview::*;
use std::path::PathBuf;
use tracing::*;

#[derive(Parser)]
#[command(name = "protoview-render")]
#[command(about = "Render every neutral/protonated pair of a CSV file to SVG", long_about = None)]
struct Cli {
    /// CSV file with Neutral_smiles and Protonated_smiles columns
    csv: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    out: PathBuf,

    /// Depiction width and height in pixels
    #[arg(long, default_value_t = DEFAULT_IMAGE_SIZE)]
    size: u32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let bytes = std::fs::read(&cli.csv)
        .with_context(|| format!("Failed to read {}", cli.csv.display()))?;
    let dataset = Dataset::from_bytes(&bytes)
        .with_context(|| format!("Failed to load {}", cli.csv.display()))?;
    info!(
        "Rendering {} neutral structures from {}",
        dataset.neutral_options().len(),
        cli.csv.display()
    );

    let summary = render_dataset(&dataset, &cli.out, &SmilesParser, &SvgRenderer::new(cli.size))?;
    println!(
        "Rendered {} groups to {}: {} depictions, {} unavailable",
        summary.groups,
        cli.out.display(),
        summary.rendered,
        summary.unavailable
    );
    Ok(())
}
