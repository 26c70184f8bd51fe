//! Base dataset loading
//!
//! The base dataset is a JSON document of the form:
//!
//! ```json
//! {
//!   "templates": { "portrait": "A [SUBJECT] under [LIGHT]" },
//!   "slots": { "portrait": { "SUBJECT": ["dancer"], "LIGHT": ["neon"] } }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{CanonicalError, Result};

/// Template string per template category
pub type Templates = BTreeMap<String, String>;

/// Slot name to candidate values
pub type SlotSet = BTreeMap<String, Vec<String>>;

/// Slot sets per template category
pub type Slots = BTreeMap<String, SlotSet>;

/// Templates and slots read from the base dataset file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Dataset {
    pub templates: Templates,
    pub slots: Slots,
}

/// Read the dataset at `path`
///
/// Both `templates` and `slots` must be present; a missing member or invalid
/// JSON is reported as [`CanonicalError::MalformedSource`].
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    debug!(?path, "load_dataset: called");
    let content = fs::read_to_string(path).map_err(|e| CanonicalError::io(path, e))?;
    let dataset: Dataset = serde_json::from_str(&content).map_err(|e| CanonicalError::malformed(path, e))?;
    debug!(
        ?path,
        templates = dataset.templates.len(),
        slots = dataset.slots.len(),
        "load_dataset: complete"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_dataset() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("templates.json");
        fs::write(
            &path,
            r#"{"templates": {"pose": "A [WHO] [DOING]"}, "slots": {"pose": {"WHO": ["dancer", "runner"], "DOING": ["leaps"]}}}"#,
        )
        .unwrap();

        let dataset = load_dataset(&path).unwrap();
        assert_eq!(dataset.templates["pose"], "A [WHO] [DOING]");
        assert_eq!(dataset.slots["pose"]["WHO"], vec!["dancer", "runner"]);
    }

    #[test]
    fn test_missing_member_is_malformed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("templates.json");
        fs::write(&path, r#"{"templates": {}}"#).unwrap();

        let err = load_dataset(&path).unwrap_err();
        assert!(matches!(err, CanonicalError::MalformedSource { .. }));
        assert!(err.to_string().contains("slots"));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("templates.json");
        fs::write(&path, "{").unwrap();

        assert!(matches!(load_dataset(&path), Err(CanonicalError::MalformedSource { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.json");

        assert!(matches!(load_dataset(&path), Err(CanonicalError::Io { .. })));
    }
}
