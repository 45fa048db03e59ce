use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use retail_staging::config::DEFAULT_RAW_DIR;
use retail_staging::db::staging_repository::{STAGING_SCHEMA, STAGING_TABLE};
use retail_staging::db::StagingRepository;
use retail_staging::importers::{find_input_file, parse_data_file};
use retail_staging::staging;
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "load-staging")]
#[command(about = "Load the raw retail data file into the Postgres staging table", long_about = None)]
struct Cli {
    /// Database connection string
    #[arg(long, env)]
    database_url: String,

    /// Directory holding the downloaded data files
    #[arg(long, default_value = DEFAULT_RAW_DIR)]
    data_dir: PathBuf,
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
    let start_time = Instant::now();

    let input_file = find_input_file(&cli.data_dir)?;
    info!("Using input file: {}", input_file.display());
    println!("📖 Loading data from {}", input_file.display());

    // Parse the input file (blocking operation)
    let parse_start = Instant::now();
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!("Parsing {}...", input_file.display()));

    let parse_path = input_file.clone();
    let table = tokio::task::spawn_blocking(move || parse_data_file(&parse_path)).await??;

    let rows_parsed = table.rows.len();
    let parse_duration = parse_start.elapsed();
    pb.finish_with_message(format!("✓ Parsed {rows_parsed} rows"));
    println!(
        "Loaded {} rows with columns: {:?}",
        rows_parsed, table.columns
    );

    // Normalize to the staging schema
    let normalize_start = Instant::now();
    let records = staging::normalize(table)?;
    let normalize_duration = normalize_start.elapsed();
    println!("✅ Columns normalized.");

    // Connect to database
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cli.database_url)
        .await?;

    // Replace the staging table contents
    let load_start = Instant::now();
    println!(
        "🚀 Loading {} rows into {}.{} ...",
        records.len(),
        STAGING_SCHEMA,
        STAGING_TABLE
    );
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!(
        "Inserting {} rows into {STAGING_SCHEMA}.{STAGING_TABLE}...",
        records.len()
    ));

    let repo = StagingRepository::new(pool);
    let total_rows = repo.replace_all(&records).await?;
    let load_duration = load_start.elapsed();

    pb.finish_with_message(format!("✓ Loaded {total_rows} rows"));
    println!(
        "✅ Load complete. Total rows now in {STAGING_SCHEMA}.{STAGING_TABLE}: {total_rows}"
    );

    let total_duration = start_time.elapsed();

    // Print performance summary
    println!("\n{}", "=".repeat(60));
    println!("Load Summary");
    println!("{}", "=".repeat(60));
    println!("Input File:         {}", input_file.display());
    println!("Rows Parsed:        {rows_parsed}");
    println!("Rows Loaded:        {total_rows}");
    println!("Destination:        {STAGING_SCHEMA}.{STAGING_TABLE}");
    println!("{}", "-".repeat(60));
    println!("Parse Time:         {:.2}s", parse_duration.as_secs_f64());
    println!(
        "Normalize Time:     {:.2}s",
        normalize_duration.as_secs_f64()
    );
    println!("Load Time:          {:.2}s", load_duration.as_secs_f64());
    println!("{}", "-".repeat(60));
    println!("Total Time:         {:.2}s", total_duration.as_secs_f64());
    println!("{}", "=".repeat(60));

    if total_rows > 0 {
        let rate = total_rows as f64 / load_duration.as_secs_f64();
        println!("Insert Rate:        {rate:.0} rows/sec");
    }

    println!();

    Ok(())
}
