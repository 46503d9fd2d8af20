use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand, command};
use tabula_core::config::SystemConfig;
use tabula_core::pipeline::Pipeline;
use tabula_core::provider::{CompletionProvider, OpenAiChatProvider};
use tabula_core::scoring::{DatasetBreakdown, ScoredRow};
use tabula_core::table::registry::TableRegistry;
use tabula_core::Variant;
use tabula_cli::questions::{load_lines, load_questions, load_semantics};
use tabula_cli::strategy;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Directory holding one sub-directory per dataset
    #[arg(long, short = 'd', env = "TABULA_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Completion model identifier
    #[arg(long, short = 'm', global = true)]
    model: Option<String>,

    /// Prompting strategy (code, zero-shot, few-shot, chain-of-thought, engineered)
    #[arg(long, short = 's', default_value = "code", global = true)]
    strategy: String,

    /// Dataset variant to question (sample or full)
    #[arg(long, default_value = "sample", global = true)]
    variant: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question about a dataset
    Ask {
        /// Dataset key (directory name)
        dataset: String,
        /// The natural-language question
        question: String,
    },

    /// Run a batch of questions and score the responses
    Eval {
        /// CSV file with `question,dataset` columns
        questions: PathBuf,

        /// Gold answers, one per line, aligned with the question file
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Semantic types, one per line, aligned with the answers
        #[arg(long)]
        semantics: Option<PathBuf>,

        /// Where to write responses, one per line
        #[arg(long, short = 'o', default_value = "responses.txt")]
        output: PathBuf,
    },

    /// List loaded datasets
    Datasets,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(cli: &Cli) -> Result<SystemConfig, Box<dyn std::error::Error>> {
    let mut config = if cli.config.exists() {
        SystemConfig::from_file(&cli.config)?
    } else {
        SystemConfig::default()
    };
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }
    Ok(config)
}

fn build_pipeline(
    cli: &Cli,
    config: &SystemConfig,
    registry: Arc<TableRegistry>,
) -> Result<Pipeline, Box<dyn std::error::Error>> {
    let strategy = strategy::by_name(&cli.strategy).ok_or_else(|| {
        format!(
            "Unknown strategy `{}`; expected one of: {}",
            cli.strategy,
            strategy::STRATEGY_NAMES.join(", ")
        )
    })?;
    let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAiChatProvider::from_env("openai")?);
    Ok(Pipeline::new(registry, provider, strategy, config))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let variant = Variant::from_str(&cli.variant)
        .map_err(|_| format!("Unknown variant `{}`; expected sample or full", cli.variant))?;

    let registry = Arc::new(TableRegistry::load_dir(&config.data_dir)?);
    info!(datasets = registry.len(), data_dir = %config.data_dir.display(), "registry loaded");

    match &cli.command {
        Commands::Datasets => {
            for name in registry.dataset_names() {
                println!("{}", name);
            }
        }

        Commands::Ask { dataset, question } => {
            let pipeline = build_pipeline(&cli, &config, registry)?;
            let answer = pipeline.run(dataset, variant, question).await?;
            println!("{}", answer.to_json_string());
        }

        Commands::Eval {
            questions,
            answers,
            semantics,
            output,
        } => {
            let pipeline = build_pipeline(&cli, &config, registry)?;
            let rows = load_questions(questions)?;
            info!(count = rows.len(), "running evaluation");

            let mut responses = Vec::with_capacity(rows.len());
            for (i, row) in rows.iter().enumerate() {
                let response = match pipeline.run(&row.dataset, variant, &row.question).await {
                    Ok(answer) => answer.answer_text(),
                    Err(err) => {
                        warn!(dataset = %row.dataset, error = %err, "question failed");
                        format!("ERROR: {}", err)
                    }
                };
                info!(
                    progress = %format!("{}/{}", i + 1, rows.len()),
                    dataset = %row.dataset,
                    "answered"
                );
                responses.push(response);
            }

            let mut file = fs::File::create(output)?;
            for response in &responses {
                // Responses are one per line; flatten any stray newlines.
                writeln!(file, "{}", response.replace('\n', " "))?;
            }
            println!("Wrote {} responses to {}", responses.len(), output.display());

            if let (Some(answers), Some(semantics)) = (answers, semantics) {
                let truths = load_lines(answers)?;
                let semantics = load_semantics(semantics)?;
                let scored: Vec<ScoredRow> = rows
                    .iter()
                    .zip(&responses)
                    .zip(truths.iter().zip(&semantics))
                    .map(|((row, response), (truth, semantic))| ScoredRow {
                        dataset: row.dataset.clone(),
                        response: response.clone(),
                        truth: truth.clone(),
                        semantic: *semantic,
                    })
                    .collect();
                let breakdown = DatasetBreakdown::from_rows(&scored)?;
                println!("Breakdown for strategy: {}", cli.strategy);
                println!("{}", breakdown);
            }
        }
    }

    Ok(())
}
