//! PromptLib - template prompt generator
//!
//! CLI entry point for inspecting the canonical dataset and generating prompts.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use promptlib::cli::{Cli, Command};
use promptlib::config::Config;
use promptlib::{CanonicalError, CanonicalResolver, Category, ResolvedConfig, generate_many};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptlib")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(log_dir.join("promptlib.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let dataset = cli.dataset.clone().unwrap_or_else(|| config.dataset.clone());
    let plugins = cli.plugins.clone().unwrap_or_else(|| config.plugins.clone());
    info!(dataset = %dataset.display(), plugins = %plugins.display(), "promptlib starting");

    let resolver = CanonicalResolver::default();
    let resolved = resolver
        .resolve(Some(&dataset), Some(&plugins))
        .context("Failed to resolve canonical dataset")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Categories => {
            for category in resolved.categories() {
                println!("{}", category);
            }
        }
        Command::Slots { category } => cmd_slots(&resolved, &category)?,
        Command::Options { category } => cmd_options(&resolved, category),
        Command::Validate { category, option } => {
            if resolved.validate(category.as_str(), &option) {
                println!("{} '{}' is a valid {} option", "✓".green(), option, category.as_str().cyan());
            } else {
                println!("{} '{}' is not a valid {} option", "✗".red(), option, category.as_str().cyan());
                std::process::exit(1);
            }
        }
        Command::Generate {
            category,
            count,
            seed,
            output,
            dry_run,
            structured,
        } => {
            let count = count.unwrap_or(config.default_count);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            let prompts = match generate_many(&resolved, category.as_deref(), count, &mut rng) {
                Ok(prompts) => prompts,
                Err(CanonicalError::UnknownCategory { category }) => unknown_category(&category),
                Err(e) => return Err(e.into()),
            };
            if prompts.is_empty() {
                println!("No prompts found for the given options.");
                return Ok(());
            }

            let text = if structured {
                serde_yaml::to_string(&prompts).context("Failed to serialize prompts")?
            } else {
                format!("{}\n", prompts.iter().map(|p| p.prompt.as_str()).collect::<Vec<_>>().join("\n"))
            };
            if let Some(path) = output.filter(|_| !dry_run) {
                fs::write(&path, &text)
                    .context(format!("Failed to write prompts to {}", path.display()))?;
                info!(path = %path.display(), count = prompts.len(), "Wrote prompts");
            }
            print!("{}", text);
        }
    }

    Ok(())
}

fn cmd_slots(resolved: &ResolvedConfig, category: &str) -> Result<()> {
    match resolved.slots_for(category) {
        Ok(slots) => {
            for (slot, values) in slots {
                println!("{}: {}", slot.yellow(), values.join(", "));
            }
            Ok(())
        }
        Err(CanonicalError::UnknownCategory { category }) => unknown_category(&category),
        Err(e) => Err(e.into()),
    }
}

fn cmd_options(resolved: &ResolvedConfig, category: Option<Category>) {
    match category {
        Some(category) => {
            for value in resolved.plugin_options_for(category.as_str()) {
                println!("{}", value);
            }
        }
        None => {
            if resolved.plugin_options.is_empty() {
                println!("No plugin options found");
            }
            for (category, values) in &resolved.plugin_options {
                println!("{}: {}", category.cyan(), values.join(", "));
            }
        }
    }
}

fn unknown_category(category: &str) -> ! {
    eprintln!("Unknown category: {}", category);
    std::process::exit(1);
}
