//! promptsweep CLI - Grid-search sampling parameters against a chat completions API.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use promptsweep::{
    Config, ExperimentConfig, ExperimentRunner, LLMClient, Model, export_results,
    generate_reflection, load_results, write_reflection,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "promptsweep")]
#[command(version)]
#[command(about = "Grid-search sampling parameters against a chat completions API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every parameter combination and save results + reflection
    Run {
        /// Model to query (gpt-3.5-turbo or gpt-4)
        #[arg(short, long)]
        model: Model,

        /// System prompt
        #[arg(short, long)]
        system_prompt: String,

        /// User prompt (e.g. "Describe a Tesla")
        #[arg(short, long)]
        user_prompt: String,

        /// Stop sequence (omitted from requests when not given)
        #[arg(long)]
        stop: Option<String>,

        /// Results CSV path (overrides config)
        #[arg(long)]
        results: Option<PathBuf>,

        /// Reflection text path (overrides config)
        #[arg(long)]
        reflection: Option<PathBuf>,
    },

    /// Regenerate the reflection from an existing results file
    Reflect {
        /// Path to results CSV
        #[arg(short, long)]
        results: PathBuf,

        /// Reflection text path (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration file and API key
    Validate,

    /// Show example configuration
    Example,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to set tracing subscriber");
    }
}

fn print_example_config() {
    let example = r#"# promptsweep configuration file

[api]
# API key (can also use OPENAI_API_KEY env var, or "${MY_VAR}" expansion)
# api_key = "sk-..."
api_key_env = "OPENAI_API_KEY"
base_url = "https://api.openai.com/v1"
timeout_secs = 180

[grid]
temperatures = [0.0, 0.7, 1.2]
max_tokens = [50, 150, 300]
presence_penalties = [0.0, 1.5]
frequency_penalties = [0.0, 1.5]

[output]
results_path = "results.csv"
reflection_path = "reflection.txt"
"#;
    println!("{example}");
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {path:?}"))?,
        None => Config::default(),
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Example => {
            print_example_config();
        }

        Commands::Validate => {
            let config = load_config(cli.config.as_ref())?;
            config
                .resolve_api_key()
                .context("Failed to resolve API key")?;

            info!("Configuration is valid");
            info!("  Endpoint: {}", config.api.base_url);
            info!("  Combinations: {}", config.grid.len());
        }

        Commands::Reflect { results, output } => {
            let config = load_config(cli.config.as_ref())?;
            let output = output.unwrap_or(config.output.reflection_path);

            let records = load_results(&results)
                .with_context(|| format!("Failed to read results from {results:?}"))?;
            write_reflection(&generate_reflection(&records), &output)
                .context("Failed to save reflection")?;

            println!("Reflection saved to {}", output.display());
        }

        Commands::Run {
            model,
            system_prompt,
            user_prompt,
            stop,
            results,
            reflection,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let api_key = config
                .resolve_api_key()
                .context("Failed to resolve API key")?;
            let experiment = ExperimentConfig::new(model, system_prompt, user_prompt, stop)
                .context("Invalid experiment inputs")?;

            let results_path = results.unwrap_or_else(|| config.output.results_path.clone());
            let reflection_path =
                reflection.unwrap_or_else(|| config.output.reflection_path.clone());

            let client = Arc::new(LLMClient::from_config(&config.api, api_key)?);
            let runner = ExperimentRunner::new(client).with_progress_bar();
            let grid = config.grid.enumerate();

            let (records, stats) = runner.run_with_stats(&experiment, &grid).await;

            export_results(&records, &results_path).context("Failed to save results")?;
            write_reflection(&generate_reflection(&records), &reflection_path)
                .context("Failed to save reflection")?;

            println!("\n=== Parameter Sweep Complete ===");
            println!("Model:        {}", experiment.model);
            println!("Combinations: {}", stats.total);
            println!("Succeeded:    {}", stats.succeeded);
            println!("Failed:       {}", stats.failed);
            println!("Success:      {:.1}%", stats.success_rate * 100.0);
            println!("Runtime:      {:.1}s", stats.runtime_secs);
            println!("Results:      {}", results_path.display());
            println!("Reflection:   {}", reflection_path.display());
        }
    }

    Ok(())
}
