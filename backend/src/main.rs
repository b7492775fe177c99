//! Line Filter CLI - dedupe and reshape text or CSV files
//!
//! # Commands
//!
//! ```bash
//! linefilter serve                          # Start HTTP server (port 8080)
//! linefilter filter notes.txt --trim        # Filter a file locally
//! linefilter filter data.csv -f cfg.json    # Run CSV stages from a features file
//! linefilter example-features               # Show an example features document
//! ```

use clap::{Parser, Subcommand};
use linefilter::{
    filter_file, load_features, logging::init_logging, CsvFeatures, FilterOptions, ServerConfig,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "linefilter")]
#[command(about = "Deduplicate, clean and reshape text and CSV data", long_about = None)]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        #[command(flatten)]
        config: ServerConfig,
    },

    /// Filter a text or CSV file
    Filter {
        /// Input file
        input: PathBuf,

        /// Name used to pick the mode (default: the input's file name)
        #[arg(long)]
        file_name: Option<String>,

        /// Treat lines differing only in case as distinct
        #[arg(long)]
        case_sensitive: bool,

        /// Strip leading and trailing whitespace from each line
        #[arg(long)]
        trim: bool,

        /// Drop empty lines
        #[arg(long)]
        ignore_blanks: bool,

        /// Sort kept lines
        #[arg(long)]
        sort: bool,

        /// CSV features JSON file
        #[arg(short, long)]
        features: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the full response as JSON instead of the filtered text
        #[arg(long)]
        json: bool,
    },

    /// Show an example CSV features document
    ExampleFeatures,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Serve { config } => cmd_serve(config).await,

        Commands::Filter {
            input,
            file_name,
            case_sensitive,
            trim,
            ignore_blanks,
            sort,
            features,
            output,
            json,
        } => {
            let options = FilterOptions {
                case_sensitive,
                trim_whitespace: trim,
                ignore_blanks,
                sort_alphabetically: sort,
            };
            cmd_filter(
                &input,
                file_name.as_deref(),
                options,
                features.as_deref(),
                output.as_deref(),
                json,
            )
        }

        Commands::ExampleFeatures => cmd_example_features(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    linefilter::server::start_server(config).await?;
    Ok(())
}

fn cmd_filter(
    input: &Path,
    file_name: Option<&str>,
    options: FilterOptions,
    features_path: Option<&Path>,
    output: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Filtering: {}", input.display());

    let features = match features_path {
        Some(path) => load_features(path)?,
        None => CsvFeatures::default(),
    };

    let outcome = filter_file(input, file_name, options, features)?;
    let stats = &outcome.response;

    eprintln!("   Mode: {}", outcome.mode.as_str());
    if outcome.pass_through {
        eprintln!("   ⚠️  Input is not valid CSV, returned unchanged");
    }
    eprintln!("   Total lines:        {}", stats.total_lines);
    eprintln!("   Kept:               {}", stats.unique_lines);
    eprintln!("   Duplicates removed: {}", stats.duplicates_removed);
    eprintln!("   Blanks ignored:     {}", stats.blanks_ignored);

    let content = if json {
        serde_json::to_string_pretty(&outcome)?
    } else {
        outcome.response.filtered_text.clone()
    };
    write_output(&content, output)?;

    Ok(())
}

fn cmd_example_features() -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(&CsvFeatures::example())?;
    println!("{}", json);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
