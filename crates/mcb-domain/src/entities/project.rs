//! Project entity (§3): the user-visible container owning Sources.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::ProjectId;

/// Free-form project configuration, including the lineage-exclusion
/// glob list consumed by the Parse Stage (§4.2).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Ordered glob patterns; a file path matching any of these skips
    /// column-level lineage emission.
    #[serde(default)]
    pub lineage_exclude_paths: Vec<String>,
    /// Escape hatch for settings not yet promoted to a typed field.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A user-visible container owning a set of Sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    /// Unique, lowercase, hyphenated identifier used in URLs and CLI args.
    pub slug: String,
    pub display_name: String,
    pub description: Option<String>,
    pub settings: ProjectSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Construct a new project, deriving its id deterministically from
    /// `slug` so re-creating a project with the same slug is idempotent.
    #[must_use]
    pub fn new(slug: impl Into<String>, display_name: impl Into<String>) -> Self {
        let slug = slug.into();
        let now = Utc::now();
        Self {
            id: ProjectId::from_name(&slug),
            slug,
            display_name: display_name.into(),
            description: None,
            settings: ProjectSettings::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `slug` is a valid project slug: lowercase ASCII
    /// alphanumerics and hyphens, non-empty, no leading/trailing hyphen.
    #[must_use]
    pub fn is_valid_slug(slug: &str) -> bool {
        !slug.is_empty()
            && !slug.starts_with('-')
            && !slug.ends_with('-')
            && slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}
