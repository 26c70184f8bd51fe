//! Canonical configuration resolution
//!
//! Combines the base dataset with the merged plugin packs into one
//! [`ResolvedConfig`] and caches it per (dataset path, plugin directory) pair.
//!
//! ## Hot-Reload
//!
//! Every call to [`CanonicalResolver::resolve`] takes a [`Freshness`]
//! signature: the dataset file's mtime and the newest mtime among the plugin
//! directory's direct children. A cached entry is reused only while its
//! signature matches exactly; otherwise everything is reloaded and the entry
//! replaced wholesale. A failed reload leaves the previous entry untouched and
//! is retried on the next call.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use crate::dataset::{Dataset, Slots, Templates, load_dataset};
use crate::error::{CanonicalError, Result};
use crate::plugins::{PluginOptions, load_plugin_dir};

/// Default dataset location, relative to the resolver root
pub const DEFAULT_DATASET_PATH: &str = "dataset/templates.json";

/// Default plugin directory, relative to the resolver root
pub const DEFAULT_PLUGIN_DIR: &str = "plugins";

/// Templates, slots and plugin options resolved from one dataset/plugin pair
///
/// Shared through the cache behind an [`Arc`]; a reload produces a new value
/// rather than mutating this one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub templates: Templates,
    pub slots: Slots,
    pub plugin_options: PluginOptions,
}

/// Modification times that decide whether a cached resolution is still valid
///
/// Missing inputs are recorded as [`UNIX_EPOCH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    pub dataset_mtime: SystemTime,
    pub plugins_mtime: SystemTime,
}

impl Freshness {
    /// Stat the dataset file and every direct child of the plugin directory
    pub fn observe(dataset: &Path, plugin_dir: &Path) -> Self {
        let dataset_mtime = fs::metadata(dataset)
            .and_then(|m| m.modified())
            .unwrap_or(UNIX_EPOCH);

        let mut plugins_mtime = UNIX_EPOCH;
        if let Ok(entries) = fs::read_dir(plugin_dir) {
            for entry in entries.filter_map(|e| e.ok()) {
                // Entries can vanish between listing and stat
                if let Ok(modified) = fs::metadata(entry.path()).and_then(|m| m.modified()) {
                    plugins_mtime = plugins_mtime.max(modified);
                }
            }
        }

        Self {
            dataset_mtime,
            plugins_mtime,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    dataset: PathBuf,
    plugin_dir: PathBuf,
}

#[derive(Debug)]
struct CacheEntry {
    freshness: Freshness,
    config: Arc<ResolvedConfig>,
}

/// Resolved configurations keyed by absolute (dataset, plugin dir) paths
///
/// Can be shared between resolvers; the lock is held for the whole
/// check-reload-store sequence.
#[derive(Debug, Default)]
pub struct CanonicalCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl CanonicalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached path pairs
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        debug!("CanonicalCache::clear: called");
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        // Entries are only ever replaced whole, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resolves and caches canonical configurations
#[derive(Debug, Clone)]
pub struct CanonicalResolver {
    /// Base for relative and default paths
    root: PathBuf,
    cache: Arc<CanonicalCache>,
}

impl CanonicalResolver {
    /// Create a resolver with its own cache, resolving relative paths against `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_cache(root, Arc::new(CanonicalCache::new()))
    }

    /// Create a resolver backed by an existing cache
    pub fn with_cache(root: impl Into<PathBuf>, cache: Arc<CanonicalCache>) -> Self {
        let root = root.into();
        debug!(?root, "CanonicalResolver::with_cache: called");
        Self { root, cache }
    }

    pub fn cache(&self) -> &Arc<CanonicalCache> {
        &self.cache
    }

    /// Return templates, slots and plugin options for the given sources
    ///
    /// `None` selects [`DEFAULT_DATASET_PATH`] / [`DEFAULT_PLUGIN_DIR`]. A missing
    /// dataset file or plugin directory resolves to empty maps. Parse and I/O
    /// errors from files that do exist are returned as-is and nothing is cached.
    pub fn resolve(&self, dataset: Option<&Path>, plugin_dir: Option<&Path>) -> Result<Arc<ResolvedConfig>> {
        let key = self.key(dataset, plugin_dir)?;
        debug!(dataset = ?key.dataset, plugin_dir = ?key.plugin_dir, "resolve: called");

        let mut entries = self.cache.lock();
        let freshness = Freshness::observe(&key.dataset, &key.plugin_dir);

        if let Some(entry) = entries.get(&key)
            && entry.freshness == freshness
        {
            debug!("resolve: cache hit");
            return Ok(Arc::clone(&entry.config));
        }

        debug!(?freshness, "resolve: cache miss, reloading");
        let config = Arc::new(load(&key)?);
        info!(
            dataset = %key.dataset.display(),
            plugin_dir = %key.plugin_dir.display(),
            templates = config.templates.len(),
            plugin_categories = config.plugin_options.len(),
            "Resolved canonical configuration"
        );
        entries.insert(
            key,
            CacheEntry {
                freshness,
                config: Arc::clone(&config),
            },
        );
        Ok(config)
    }

    /// Forget the cached entry for a path pair; returns whether one existed
    pub fn invalidate(&self, dataset: Option<&Path>, plugin_dir: Option<&Path>) -> Result<bool> {
        let key = self.key(dataset, plugin_dir)?;
        debug!(dataset = ?key.dataset, plugin_dir = ?key.plugin_dir, "invalidate: called");
        Ok(self.cache.lock().remove(&key).is_some())
    }

    fn key(&self, dataset: Option<&Path>, plugin_dir: Option<&Path>) -> Result<CacheKey> {
        let dataset = dataset.unwrap_or(Path::new(DEFAULT_DATASET_PATH));
        let plugin_dir = plugin_dir.unwrap_or(Path::new(DEFAULT_PLUGIN_DIR));
        Ok(CacheKey {
            dataset: self.absolute(dataset)?,
            plugin_dir: self.absolute(plugin_dir)?,
        })
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf> {
        let joined = self.root.join(path);
        std::path::absolute(&joined).map_err(|e| CanonicalError::io(joined, e))
    }
}

impl Default for CanonicalResolver {
    /// Resolver rooted at the current working directory
    fn default() -> Self {
        Self::new(".")
    }
}

fn load(key: &CacheKey) -> Result<ResolvedConfig> {
    let Dataset { templates, slots } = if key.dataset.exists() {
        load_dataset(&key.dataset)?
    } else {
        debug!(dataset = ?key.dataset, "load: dataset missing, using empty dataset");
        Dataset::default()
    };

    let plugin_options = if key.plugin_dir.is_dir() {
        load_plugin_dir(&key.plugin_dir)?
    } else {
        debug!(plugin_dir = ?key.plugin_dir, "load: plugin directory missing, no plugin options");
        PluginOptions::new()
    };

    Ok(ResolvedConfig {
        templates,
        slots,
        plugin_options,
    })
}

/// Whether `option` is one of the plugin values for `category`
pub fn is_valid_option(category: &str, option: &str, plugin_options: &PluginOptions) -> bool {
    plugin_options
        .get(category)
        .is_some_and(|values| values.iter().any(|v| v == option))
}
