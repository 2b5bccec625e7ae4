//! ProjectAnalytics entity (§3.1): persisted output of the Analytics
//! stage (§4.8).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ProjectAnalyticsId, ProjectId};

/// What a [`ProjectAnalytics`] row's `scope_id` refers to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsScope {
    Project,
    Symbol,
    Bridge,
}

/// A computed analytics snapshot, keyed by `(project_id, scope, scope_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAnalytics {
    pub id: ProjectAnalyticsId,
    pub project_id: ProjectId,
    pub scope: AnalyticsScope,
    /// Identity of the scoped entity: the project id restated for
    /// `scope = project`, a `SymbolId` string for `scope = symbol`, or a
    /// `"<srclang>→<tgtlang>:<edge_type>"` key for `scope = bridge`.
    pub scope_id: String,
    pub computed_at: DateTime<Utc>,
    pub data: serde_json::Value,
}

impl ProjectAnalytics {
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        scope: AnalyticsScope,
        scope_id: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        let scope_id = scope_id.into();
        Self {
            id: ProjectAnalyticsId::from_name(&format!("{project_id}:{scope}:{scope_id}")),
            project_id,
            scope,
            scope_id,
            computed_at: Utc::now(),
            data,
        }
    }
}
