//! ParseErrorRecord entity (§3.1): per-file parser failures, written by
//! the Parse Worker but never fatal to the stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{FileId, ParseErrorRecordId, ProjectId};

/// A single parser failure recorded against a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseErrorRecord {
    pub id: ParseErrorRecordId,
    pub project_id: ProjectId,
    pub file_id: FileId,
    pub line: u32,
    pub column: Option<u32>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl ParseErrorRecord {
    #[must_use]
    pub fn new(project_id: ProjectId, file_id: FileId, line: u32, message: impl Into<String>) -> Self {
        Self {
            id: ParseErrorRecordId::new(),
            project_id,
            file_id,
            line,
            column: None,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}
