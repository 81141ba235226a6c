//! lessonscope CLI: analyze assessment items with Gemini and export the results.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "lessonscope",
    version,
    about = "Assessment analysis with Google Gemini, exported as CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze assessment data with the configured model
    Analyze {
        /// File with assessment data (reads stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Model to request (e.g. "gemini-1.5-pro")
        #[arg(long)]
        model: Option<String>,

        /// Output directory (default: output_dir from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: csv, json, html, all (comma-separated)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Print the full model output
        #[arg(long)]
        show_raw: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Parse a saved model response without calling the API
    Parse {
        /// File with the model's response text
        #[arg(long)]
        response: PathBuf,

        /// Output directory
        #[arg(long, default_value = ".")]
        output: PathBuf,

        /// Output format: csv, json, html, all (comma-separated)
        #[arg(long, default_value = "csv")]
        format: String,
    },

    /// Test the API connection
    Check {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List available models
    ListModels {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and sample input
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lessonscope=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input,
            model,
            output,
            format,
            show_raw,
            config,
        } => commands::analyze::execute(input, model, output, format, show_raw, config).await,
        Commands::Parse {
            response,
            output,
            format,
        } => commands::parse::execute(response, output, format),
        Commands::Check { config } => commands::check::execute(config).await,
        Commands::ListModels { config } => commands::list_models::execute(config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
