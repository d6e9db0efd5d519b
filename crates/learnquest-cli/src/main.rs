//! learnquest CLI: adaptive quizzes and achievement badges from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "learnquest", version, about = "Adaptive quizzes and achievement badges")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend the next quiz from the latest performance snapshot
    Recommend {
        /// Snapshot JSON file (one snapshot or an array)
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Learner id
        #[arg(long, default_value = commands::DEFAULT_USER)]
        user: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Take a quiz; answers are read from stdin, one per line
    Quiz {
        /// Test type (math, reading, writing, internal1, internal2, assignment)
        #[arg(long)]
        test_type: Option<String>,

        /// Difficulty (easy, medium, hard, very_hard)
        #[arg(long)]
        difficulty: Option<String>,

        /// Snapshot JSON file used to recommend a quiz when no test type is given
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// History JSON file the result is appended to
        #[arg(long)]
        history: Option<PathBuf>,

        /// Learner id
        #[arg(long, default_value = commands::DEFAULT_USER)]
        user: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show badge progress
    Badges {
        /// History JSON file to compute statistics from
        #[arg(long)]
        history: Option<PathBuf>,

        /// Total tests taken (overrides --history)
        #[arg(long)]
        total_tests: Option<u32>,

        /// Best score (overrides --history)
        #[arg(long)]
        best_score: Option<f64>,

        /// Favorite subject from the learner profile
        #[arg(long)]
        favorite_subject: Option<String>,

        /// Dream job from the learner profile
        #[arg(long)]
        dream_job: Option<String>,

        /// Learner id
        #[arg(long, default_value = commands::DEFAULT_USER)]
        user: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a learnquest config file
    Validate {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and sample snapshot
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("learnquest=info".parse().unwrap())
                .add_directive("learnquest_core=info".parse().unwrap())
                .add_directive("learnquest_providers=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Recommend {
            snapshot,
            user,
            json,
            config,
        } => commands::recommend::execute(snapshot, user, json, config).await,
        Commands::Quiz {
            test_type,
            difficulty,
            snapshot,
            history,
            user,
            json,
            config,
        } => {
            commands::quiz::execute(
                test_type, difficulty, snapshot, history, user, json, config,
            )
            .await
        }
        Commands::Badges {
            history,
            total_tests,
            best_score,
            favorite_subject,
            dream_job,
            user,
            json,
            config,
        } => {
            commands::badges::execute(
                history,
                total_tests,
                best_score,
                favorite_subject,
                dream_job,
                user,
                json,
                config,
            )
            .await
        }
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
