//! Read-only queries over a resolved configuration
//!
//! These back the CLI subcommands; everything goes through
//! [`CanonicalResolver`](crate::canonical::CanonicalResolver) first.

use tracing::debug;

use crate::canonical::{ResolvedConfig, is_valid_option};
use crate::dataset::SlotSet;
use crate::error::{CanonicalError, Result};

impl ResolvedConfig {
    /// Template categories, sorted
    pub fn categories(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// Slot definitions for a template category
    pub fn slots_for(&self, category: &str) -> Result<&SlotSet> {
        debug!(%category, "ResolvedConfig::slots_for: called");
        self.slots.get(category).ok_or_else(|| CanonicalError::UnknownCategory {
            category: category.to_string(),
        })
    }

    /// Template string for a template category
    pub fn template_for(&self, category: &str) -> Result<&str> {
        self.templates
            .get(category)
            .map(String::as_str)
            .ok_or_else(|| CanonicalError::UnknownCategory {
                category: category.to_string(),
            })
    }

    /// Plugin values for a plugin category; empty when nothing contributed to it
    pub fn plugin_options_for(&self, category: &str) -> &[String] {
        self.plugin_options.get(category).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether `option` is a plugin value of `category`
    pub fn validate(&self, category: &str, option: &str) -> bool {
        is_valid_option(category, option, &self.plugin_options)
    }
}
