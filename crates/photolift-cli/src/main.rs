use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use photolift_cli::commands::{cmd_analyze, cmd_enhance, cmd_watch};
use photolift_cli::load_enhancer;

#[derive(Parser)]
#[command(name = "photolift")]
#[command(version, about = "Photo diagnostics and adaptive enhancement", long_about = None)]
struct Cli {
    /// JSON configuration file (partial files override defaults)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the diagnostics report for an image
    Analyze {
        /// Input file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Enhance image files or directories
    Enhance {
        /// Input files or directories
        #[arg(value_name = "INPUTS", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Number of parallel threads
        #[arg(short = 'j', long, value_name = "N")]
        threads: Option<usize>,

        /// Write a JSON report of all results
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Watch a directory and enhance new or changed images
    Watch {
        /// Directory to watch
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "enhanced")]
        out: PathBuf,

        /// Polling interval in seconds
        #[arg(long, value_name = "SECS", default_value = "2.0")]
        interval: f64,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    let enhancer = load_enhancer(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze { input, json } => cmd_analyze(&enhancer, &input, json),
        Commands::Enhance {
            inputs,
            out,
            threads,
            report,
        } => cmd_enhance(&enhancer, inputs, out, threads, report),
        Commands::Watch {
            input,
            out,
            interval,
        } => {
            if !(interval.is_finite() && interval > 0.0) {
                return Err(format!("Interval must be positive, got {}", interval));
            }
            cmd_watch(&enhancer, &input, &out, Duration::from_secs_f64(interval))
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
