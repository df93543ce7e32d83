//! itmaths CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod answers;
mod commands;

#[derive(Parser)]
#[command(name = "itmaths", version, about = "Timed exam practice at the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a timed exam attempt
    Take {
        /// Exam id on the remote platform
        #[arg(long)]
        exam: Option<u64>,

        /// Run against a local exam TOML file instead of the platform
        #[arg(long)]
        offline: Option<PathBuf>,

        /// Answer the paper from a TOML answers file instead of stdin
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Save the attempt report as JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score an answers file against a local exam file (no timer, no network)
    Score {
        /// Local exam TOML file
        #[arg(long)]
        exam: PathBuf,

        /// TOML answers file
        #[arg(long)]
        answers: PathBuf,

        /// Save the score breakdown as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List available exams
    Exams {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show or clear prior attempts
    History {
        /// Delete all history instead of showing it
        #[arg(long)]
        clear: bool,

        /// Override the configured user name
        #[arg(long)]
        user: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate local exam TOML files
    Validate {
        /// Path to an exam file or directory
        #[arg(long)]
        exam: PathBuf,
    },

    /// Create a starter config and example exam file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("itmaths=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            exam,
            offline,
            answers,
            output,
            config,
        } => commands::take::execute(exam, offline, answers, output, config).await,
        Commands::Score {
            exam,
            answers,
            output,
        } => commands::score::execute(exam, answers, output),
        Commands::Exams { config } => commands::exams::execute(config).await,
        Commands::History {
            clear,
            user,
            config,
        } => commands::history::execute(clear, user, config).await,
        Commands::Validate { exam } => commands::validate::execute(exam),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
