//! Source entity (§3): one external origin within a Project.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ProjectId, SourceId};

/// Origin kind for a Source, determining which [`crate::ports::Connector`]
/// fetches it (§7 "Input").
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Git,
    S3,
    Upload,
    Filesystem,
}

/// One external origin a Project's Files are drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,
    pub project_id: ProjectId,
    pub source_type: SourceType,
    /// Connection URI: git remote URL, `s3://bucket/prefix`, or a local
    /// filesystem path.
    pub connection_uri: String,
    #[serde(default)]
    pub config: BTreeMap<String, serde_json::Value>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub last_commit_sha: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Source {
    #[must_use]
    pub fn new(project_id: ProjectId, source_type: SourceType, connection_uri: impl Into<String>) -> Self {
        let connection_uri = connection_uri.into();
        Self {
            id: SourceId::from_name(&format!("{project_id}:{connection_uri}")),
            project_id,
            source_type,
            connection_uri,
            config: BTreeMap::new(),
            last_synced_at: None,
            last_commit_sha: None,
            created_at: Utc::now(),
        }
    }

    /// Record a successful sync at commit `sha`.
    pub fn mark_synced(&mut self, sha: impl Into<String>) {
        self.last_synced_at = Some(Utc::now());
        self.last_commit_sha = Some(sha.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_source_has_no_sync_state() {
        let project_id = ProjectId::from_name("acme-widgets");
        let source = Source::new(project_id, SourceType::Git, "git@github.com:acme/widgets.git");
        assert!(source.last_synced_at.is_none());
        assert!(source.last_commit_sha.is_none());
    }

    #[test]
    fn mark_synced_records_sha() {
        let project_id = ProjectId::from_name("acme-widgets");
        let mut source = Source::new(project_id, SourceType::Git, "git@github.com:acme/widgets.git");
        source.mark_synced("deadbeef");
        assert_eq!(source.last_commit_sha.as_deref(), Some("deadbeef"));
        assert!(source.last_synced_at.is_some());
    }

    #[test]
    fn source_type_strum_round_trips() {
        use std::str::FromStr;
        assert_eq!(SourceType::from_str("git").unwrap(), SourceType::Git);
        assert_eq!(SourceType::Upload.to_string(), "upload");
    }
}
