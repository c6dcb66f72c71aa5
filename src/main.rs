use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueHint};
use tracing_subscriber::EnvFilter;

use studyaid::commands::generate::{self, GenerateOptions};
use studyaid::commands::llm::{self, LlmOptions};
use studyaid::synthesizer::DEFAULT_MAX_ITEMS;

const LOG_ENV: &str = "STUDYAID_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "studyaid",
    version,
    about = "Summaries, quizzes and fill-in-the-blank drills from any text.",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a summary, multiple choice questions and fill-in-the-blanks
    Generate {
        /// Plain text file to study. Reads stdin when omitted or `-`
        #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
        path: Option<PathBuf>,
        /// Maximum number of multiple choice questions
        #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_MAX_ITEMS)]
        max_questions: usize,
        /// Maximum number of fill-in-the-blank sentences
        #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_MAX_ITEMS)]
        max_blanks: usize,
        /// Seed for reproducible questions and distractors
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
        /// Skip the OpenAI models even when an API key is configured
        #[arg(long, default_value_t = false)]
        offline: bool,
        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Save the result as .md, .html, .docx, .pdf or .json
        #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
        export: Option<PathBuf>,
    },
    /// Manage the OpenAI API key and models
    Llm {
        /// Store an API key in the local settings file. Prompts when no key is given
        #[arg(long, value_name = "KEY", num_args = 0..=1, conflicts_with = "clear")]
        set: Option<Option<String>>,
        /// Remove the stored API key from the local settings file
        #[arg(long, conflicts_with = "test")]
        clear: bool,
        /// Load every configured model with the current API key
        #[arg(long, conflicts_with = "clear")]
        test: bool,
        /// Show where the API key comes from and which models are used
        #[arg(long)]
        status: bool,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            path,
            max_questions,
            max_blanks,
            seed,
            offline,
            json,
            export,
        } => {
            generate::run(GenerateOptions {
                path,
                max_questions,
                max_blanks,
                seed,
                offline,
                json,
                export,
            })
            .await?
        }
        Command::Llm {
            set,
            clear,
            test,
            status,
        } => {
            llm::run(LlmOptions {
                set,
                clear,
                test,
                status,
            })
            .await?
        }
    }

    Ok(())
}
