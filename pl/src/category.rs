//! Plugin category vocabulary
//!
//! Plugin packs may label their option lists however they like; every label is
//! folded into one of a fixed set of categories before merging. Labels outside
//! the vocabulary land in [`Category::Uncategorized`].

use std::str::FromStr;

use tracing::debug;

/// Canonical plugin category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Pose,
    Lighting,
    Lens,
    CameraMove,
    Environment,
    Shadow,
    Detail,
    Uncategorized,
}

impl Category {
    /// Every category in the vocabulary
    pub const ALL: [Category; 8] = [
        Self::Pose,
        Self::Lighting,
        Self::Lens,
        Self::CameraMove,
        Self::Environment,
        Self::Shadow,
        Self::Detail,
        Self::Uncategorized,
    ];

    /// Canonical key used in plugin option maps
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pose => "pose",
            Self::Lighting => "lighting",
            Self::Lens => "lens",
            Self::CameraMove => "camera_move",
            Self::Environment => "environment",
            Self::Shadow => "shadow",
            Self::Detail => "detail",
            Self::Uncategorized => "uncategorized",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Strict parse of a canonical key; use [`normalize_category`] for raw labels
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown plugin category '{}'", s))
    }
}

/// Map an arbitrary label onto the category vocabulary
///
/// Lower-cases the label and turns spaces and hyphens into underscores, so
/// `"Camera Move"` and `"camera-move"` both become [`Category::CameraMove`].
pub fn normalize_category(raw: &str) -> Category {
    let key = raw.to_lowercase().replace([' ', '-'], "_");
    match key.parse() {
        Ok(category) => category,
        Err(_) => {
            debug!(%raw, "normalize_category: folding into uncategorized");
            Category::Uncategorized
        }
    }
}
