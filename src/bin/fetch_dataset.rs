use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use retail_staging::config::{KaggleCredentials, DEFAULT_DATASET, DEFAULT_RAW_DIR};
use retail_staging::importers::{list_data_files, KaggleDownloader};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "fetch-dataset")]
#[command(about = "Download and unzip a Kaggle retail dataset into the raw data directory", long_about = None)]
struct Cli {
    /// Kaggle dataset slug (owner/name)
    #[arg(long, default_value = DEFAULT_DATASET)]
    dataset: String,

    /// Directory to download and unzip into
    #[arg(long, default_value = DEFAULT_RAW_DIR)]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.output_dir)?;

    let credentials = KaggleCredentials::resolve()?;
    let downloader = KaggleDownloader::new(credentials);

    info!(
        "Downloading dataset '{}' to {}",
        cli.dataset,
        cli.output_dir.display()
    );
    println!(
        "📥 Downloading dataset '{}' to {} ...",
        cli.dataset,
        cli.output_dir.display()
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!("Downloading '{}'...", cli.dataset));

    let extracted = downloader
        .download_and_unzip(&cli.dataset, &cli.output_dir)
        .await?;

    pb.finish_with_message(format!("✓ Unzipped {} files", extracted.len()));
    println!("✅ Download complete and unzipped.");

    let files = list_data_files(&cli.output_dir)?;
    if files.is_empty() {
        warn!(
            "No .xlsx or .csv files found in {}",
            cli.output_dir.display()
        );
        println!("⚠️ No .xlsx or .csv files found. Check the dataset contents.");
    } else {
        println!("Found data files:");
        for file in &files {
            println!(" - {}", file.display());
        }
    }

    Ok(())
}
