//! PromptLib - template prompt generator over a canonical dataset
//!
//! Prompts are built by filling `[SLOT]` markers in per-category templates.
//! Templates and slot values come from a base JSON dataset; plugin packs
//! dropped into a directory contribute extra option values per category.
//!
//! # Layout
//!
//! ```text
//! dataset/
//! └── templates.json     # {"templates": {...}, "slots": {...}}
//! plugins/
//! ├── poses.yaml         # {category: [values]}
//! ├── lighting.json
//! └── extras.md          # fenced ```json / ```yaml blocks
//! ```
//!
//! # Example
//!
//! ```ignore
//! use promptlib::CanonicalResolver;
//!
//! let resolver = CanonicalResolver::new(".");
//! let config = resolver.resolve(None, None)?;
//! for category in config.categories() {
//!     println!("{}", category);
//! }
//! ```
//!
//! The resolver caches its result and reloads when the dataset file or any
//! plugin file changes, so long-running callers can resolve on every request.

pub mod canonical;
pub mod category;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod generate;
pub mod plugins;
mod query;

pub use canonical::{
    CanonicalCache, CanonicalResolver, DEFAULT_DATASET_PATH, DEFAULT_PLUGIN_DIR, Freshness, ResolvedConfig,
    is_valid_option,
};
pub use category::{Category, normalize_category};
pub use dataset::{Dataset, SlotSet, Slots, Templates, load_dataset};
pub use error::CanonicalError;
pub use generate::{GeneratedPrompt, MAX_EXPANSION_PASSES, expand_template, generate, generate_many};
pub use plugins::{PluginFormat, PluginOptions, load_plugin_dir, parse_plugin_file};

/// Default number of prompts produced by `pl generate`
pub const DEFAULT_PROMPT_COUNT: usize = 5;
