//! CLI argument parsing for promptlib

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::category::Category;

#[derive(Parser, Debug)]
#[command(name = "pl")]
#[command(author, version, about = "Template prompt generator with hot-reloading plugin packs", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Base dataset file (overrides config)
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    /// Plugin pack directory (overrides config)
    #[arg(long, global = true)]
    pub plugins: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List template categories
    Categories,

    /// Show the slots and candidate values of a category
    Slots {
        /// Template category
        #[arg(required = true)]
        category: String,
    },

    /// List plugin option values
    Options {
        /// Plugin category (all categories when omitted)
        category: Option<Category>,
    },

    /// Check whether a value is a known plugin option for a category
    Validate {
        /// Plugin category
        #[arg(required = true)]
        category: Category,

        /// Value to check
        #[arg(required = true)]
        option: String,
    },

    /// Generate prompts
    Generate {
        /// Template category (random per prompt when omitted)
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Number of prompts
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Write prompts to this file as well as stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not write the output file
        #[arg(long)]
        dry_run: bool,

        /// Emit YAML records with the category and chosen slot values
        #[arg(long)]
        structured: bool,
    },
}
