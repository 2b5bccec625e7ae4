//! File entity (§3): one unit of parsable input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{FileId, Language, ProjectId, SourceId};

/// One parsable unit of input, uniquely keyed by `(project, source, path)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub id: FileId,
    pub project_id: ProjectId,
    pub source_id: SourceId,
    /// Path relative to the source root.
    pub path: String,
    pub language: Option<Language>,
    pub size_bytes: u64,
    pub content_hash: String,
    pub last_indexed_at: Option<DateTime<Utc>>,
    /// Set by the Parse Stage (§4.2) for files under a migration path or
    /// matching a project-configured exclusion glob.
    pub skip_column_lineage: bool,
}

impl File {
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        source_id: SourceId,
        path: impl Into<String>,
        content: &[u8],
    ) -> Self {
        let path = path.into();
        Self {
            id: FileId::from_name(&format!("{project_id}:{source_id}:{path}")),
            project_id,
            source_id,
            language: Language::from_extension(&path),
            size_bytes: content.len() as u64,
            content_hash: mcb_utils::content_hash(content),
            last_indexed_at: None,
            skip_column_lineage: false,
            path,
        }
    }

    /// Whether `content` differs from the last indexed content, i.e.
    /// re-parsing is necessary.
    #[must_use]
    pub fn has_changed(&self, content: &[u8]) -> bool {
        mcb_utils::content_hash(content) != self.content_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_language_from_extension() {
        let project_id = ProjectId::new();
        let source_id = SourceId::new();
        let file = File::new(project_id, source_id, "src/Widget.cs", b"class Widget {}");
        assert_eq!(file.language, Some(Language::CSharp));
    }

    #[test]
    fn unchanged_content_is_not_a_change() {
        let file = File::new(ProjectId::new(), SourceId::new(), "a.sql", b"SELECT 1");
        assert!(!file.has_changed(b"SELECT 1"));
        assert!(file.has_changed(b"SELECT 2"));
    }
}
