//! Plugin packs
//!
//! Drop-in files that contribute extra option values per category on top of
//! the base dataset. See [`parser`] for the accepted formats and [`loader`]
//! for how a directory of packs is merged.

mod loader;
pub mod parser;

pub use loader::load_plugin_dir;
pub use parser::{PluginFormat, PluginOptions, parse_plugin_file};
