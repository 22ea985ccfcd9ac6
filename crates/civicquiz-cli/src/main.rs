//! civicquiz CLI — the terminal front end for the quiz engine.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "civicquiz", version, about = "Timed civics quiz with streak scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a quiz in the terminal
    Play {
        /// Question bank TOML file (defaults to the bundled civics bank)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seconds allowed per question
        #[arg(long)]
        time_limit: Option<u32>,

        /// How long the correct answer stays on screen, in milliseconds
        #[arg(long)]
        reveal_delay_ms: Option<u64>,

        /// Directory to save a JSON report into
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate question bank TOML files
    Validate {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Review a saved quiz report
    Review {
        /// Report JSON written by `play --output`
        #[arg(long)]
        report: PathBuf,
    },

    /// Create starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("civicquiz=warn,civicquiz_core=warn,civicquiz_gamification=warn")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            bank,
            config,
            time_limit,
            reveal_delay_ms,
            output,
        } => {
            commands::play::execute(bank, config, time_limit, reveal_delay_ms, output).await
        }
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Review { report } => commands::review::execute(report),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
