mod config;
mod generate_cmd;
mod tui;

#[cfg(test)]
mod test_util;

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use ludica_core::prompt::lesson_response_schema;
use ludica_core::{AgeGroup, LessonGenerator};

use config::CliOverrides;

#[derive(Parser)]
#[command(name = "ludica", about = "Playful lesson ideas for early-childhood teachers")]
struct Cli {
    /// Model name (overrides LUDICA_MODEL and the config file)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Base URL of the generative model API (overrides LUDICA_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds (overrides LUDICA_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one lesson idea and print it
    Generate {
        /// Lesson theme, e.g. "Primavera"
        #[arg(long, short)]
        theme: String,
        /// Age group: nursery, toddler or preschool (or the Portuguese label)
        #[arg(long, short, default_value = "toddler")]
        age: AgeGroup,
        /// Print the lesson as JSON
        #[arg(long)]
        json: bool,
    },
    /// Launch the interactive terminal demo
    Demo,
    /// List the supported age groups
    Ages,
    /// Print the structured-output schema sent to the model
    Schema,
    /// Write a ludica config file with the default settings
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout,
        }
    }
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

/// Log to stderr, as every command except the demo does.
fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Log to `<config dir>/ludica.log`; the demo owns the terminal.
fn init_file_logging() -> anyhow::Result<()> {
    let dir = config::config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let path = dir.join("ludica.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Execute `ludica init`: write the default config file.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::default_config_file();
    config::save_config_to(&path, &cfg)?;

    println!("Config written to {}", path.display());
    println!("  model.name = {}", cfg.model.name.as_deref().unwrap_or_default());
    println!(
        "  model.credential_env = {}",
        cfg.model.credential_env.join(", ")
    );
    println!();
    println!("Next: export your Gemini API key in one of those variables.");

    Ok(())
}

fn cmd_ages() {
    for age in AgeGroup::ALL {
        println!("{:<10} {}", age.key(), age.label());
    }
}

fn cmd_schema() -> anyhow::Result<()> {
    let schema = serde_json::to_string_pretty(&lesson_response_schema())
        .context("failed to serialize schema")?;
    println!("{schema}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Demo) {
        init_file_logging()?;
    } else {
        init_stderr_logging();
    }

    match &cli.command {
        Commands::Generate { theme, age, json } => {
            let resolved = config::resolve(&cli.overrides())?;
            let code = generate_cmd::run_generate(&resolved, theme, *age, *json).await?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::Demo => {
            let resolved = config::resolve(&cli.overrides())?;
            tracing::info!(model = %resolved.model, endpoint = %resolved.endpoint, "starting demo");
            let generator = LessonGenerator::from_config(&resolved)
                .context("failed to build model client")?;
            tui::run_demo(generator).await?;
        }
        Commands::Ages => cmd_ages(),
        Commands::Schema => cmd_schema()?,
        Commands::Init { force } => cmd_init(*force)?,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "ludica", &mut std::io::stdout());
        }
    }

    Ok(())
}
