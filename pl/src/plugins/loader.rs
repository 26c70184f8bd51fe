//! Plugin directory loader
//!
//! Reads every recognized pack directly inside a directory and merges them
//! into one deduplicated, sorted option map.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::parser::{PluginFormat, PluginOptions, parse_plugin_file};
use crate::error::{CanonicalError, Result};

/// Load and merge all plugin packs in `dir`
///
/// Only immediate files are read. Files with an unrecognized extension are
/// skipped so a directory may carry READMEs or other unrelated files, but a
/// recognized file that fails to parse aborts the whole load.
///
/// Each category's values are deduplicated and sorted, so the result does
/// not depend on directory enumeration order.
pub fn load_plugin_dir(dir: &Path) -> Result<PluginOptions> {
    debug!(?dir, "load_plugin_dir: called");
    if !dir.is_dir() {
        return Err(CanonicalError::DirectoryNotFound { path: dir.to_path_buf() });
    }

    let entries = fs::read_dir(dir).map_err(|e| CanonicalError::io(dir, e))?;
    let mut merged = PluginOptions::new();
    let mut pack_count = 0usize;

    for entry in entries {
        let path = entry.map_err(|e| CanonicalError::io(dir, e))?.path();
        if !path.is_file() {
            debug!(?path, "load_plugin_dir: skipping non-file entry");
            continue;
        }
        if PluginFormat::from_path(&path).is_none() {
            debug!(?path, "load_plugin_dir: skipping unrecognized extension");
            continue;
        }

        let pack = parse_plugin_file(&path)?;
        pack_count += 1;
        for (category, values) in pack {
            merged.entry(category).or_default().extend(values);
        }
    }

    let merged: PluginOptions = merged
        .into_iter()
        .map(|(category, values)| {
            let unique: BTreeSet<String> = values.into_iter().filter(|v| !v.is_empty()).collect();
            (category, unique.into_iter().collect())
        })
        .collect();

    info!(?dir, packs = pack_count, categories = merged.len(), "Loaded plugin packs");
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dedup_and_sort_across_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("p1.yaml"), "pose:\n  - stand\n  - sit\n  - stand\n").unwrap();
        fs::write(temp.path().join("p2.json"), r#"{"pose": ["jump"], "unknown": ["x"]}"#).unwrap();

        let result = load_plugin_dir(temp.path()).unwrap();
        assert_eq!(result["pose"], vec!["jump", "sit", "stand"]);
        assert_eq!(result["uncategorized"], vec!["x"]);
    }

    #[test]
    fn test_markdown_and_normalization() {
        let temp = TempDir::new().unwrap();
        let md = "```yaml\nCamera Move:\n  - zoom\n```\n```json\n{\"lighting\": [\"soft\"], \"camera-move\": [\"pan\"]}\n```";
        fs::write(temp.path().join("p.md"), md).unwrap();

        let result = load_plugin_dir(temp.path()).unwrap();
        assert_eq!(result["camera_move"], vec!["pan", "zoom"]);
        assert_eq!(result["lighting"], vec!["soft"]);
    }

    #[test]
    fn test_unrecognized_files_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("notes.txt"), "not a plugin").unwrap();
        fs::write(temp.path().join("LICENSE"), "MIT").unwrap();
        fs::write(temp.path().join("lens.yml"), "lens: [wide]\n").unwrap();

        let result = load_plugin_dir(temp.path()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result["lens"], vec!["wide"]);
    }

    #[test]
    fn test_subdirectories_not_recursed() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("nested.json");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("deep.json"), r#"{"pose": ["hidden"]}"#).unwrap();

        let result = load_plugin_dir(temp.path()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_values_dropped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("p.json"), r#"{"detail": ["", "  ", "grain"]}"#).unwrap();

        let result = load_plugin_dir(temp.path()).unwrap();
        assert_eq!(result["detail"], vec!["grain"]);
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("plugins");

        match load_plugin_dir(&missing) {
            Err(CanonicalError::DirectoryNotFound { path }) => assert_eq!(path, missing),
            other => panic!("expected DirectoryNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("p.json");
        fs::write(&file, "{}").unwrap();

        assert!(matches!(
            load_plugin_dir(&file),
            Err(CanonicalError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn test_malformed_pack_aborts_load() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("good.yaml"), "pose: [stand]\n").unwrap();
        fs::write(temp.path().join("bad.json"), "{\"pose\": [").unwrap();

        let err = load_plugin_dir(temp.path()).unwrap_err();
        match err {
            CanonicalError::MalformedSource { path, .. } => assert!(path.ends_with("bad.json")),
            other => panic!("expected MalformedSource, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_key_does_not_abort_load() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("twice.yaml"), "pose: [stand]\npose: [sit]\n").unwrap();
        fs::write(temp.path().join("twice.json"), r#"{"lens": ["tele"], "lens": ["wide"]}"#).unwrap();

        let result = load_plugin_dir(temp.path()).unwrap();
        assert_eq!(result["pose"], vec!["sit"]);
        assert_eq!(result["lens"], vec!["wide"]);
    }
}
