//! Symbol entity (§3): a named entity extracted from a file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::{FileId, Language, ProjectId, SymbolId};

/// The kind of a Symbol, grouped by domain (§3).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    // data
    Table,
    View,
    Column,
    Procedure,
    Function,
    Trigger,
    Index,
    Constraint,
    // code
    Class,
    Interface,
    Struct,
    Method,
    Field,
    Property,
    Constructor,
    Module,
    Namespace,
    // web
    Endpoint,
    Route,
    Controller,
    AspPage,
    AspInclude,
    // config
    OrmMapping,
    ConnectionString,
    ConfigEntry,
}

impl SymbolKind {
    /// Whether this kind belongs to the `data` group (§3).
    #[must_use]
    pub fn is_data(self) -> bool {
        matches!(
            self,
            Self::Table
                | Self::View
                | Self::Column
                | Self::Procedure
                | Self::Function
                | Self::Trigger
                | Self::Index
                | Self::Constraint
        )
    }

    /// Whether this kind belongs to the `web` group (§3).
    #[must_use]
    pub fn is_web(self) -> bool {
        matches!(
            self,
            Self::Endpoint | Self::Route | Self::Controller | Self::AspPage | Self::AspInclude
        )
    }
}

/// A named entity extracted from a [`crate::entities::File`].
///
/// Uniqueness invariant (§3): `(project, qualified_name, kind)`. On
/// re-index the row is refreshed in place — never inserted twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub project_id: ProjectId,
    pub file_id: FileId,
    pub name: String,
    pub qualified_name: String,
    pub kind: SymbolKind,
    pub language: Language,
    pub start_line: u32,
    pub end_line: u32,
    pub start_col: u32,
    pub end_col: u32,
    pub signature: Option<String>,
    pub doc_comment: Option<String>,
    /// Populated by the Analytics stage: `in_degree`, `out_degree`,
    /// `pagerank`, `layer`, `cluster_id` (§4.8).
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Symbol {
    /// Deterministic identity key honoring the `(project, qualified_name,
    /// kind)` uniqueness invariant.
    #[must_use]
    pub fn identity_id(project_id: ProjectId, qualified_name: &str, kind: SymbolKind) -> SymbolId {
        SymbolId::from_name(&format!("{project_id}:{kind}:{qualified_name}"))
    }

    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        project_id: ProjectId,
        file_id: FileId,
        name: impl Into<String>,
        qualified_name: impl Into<String>,
        kind: SymbolKind,
        language: Language,
        start_line: u32,
        end_line: u32,
    ) -> Self {
        let qualified_name = qualified_name.into();
        Self {
            id: Self::identity_id(project_id, &qualified_name, kind),
            project_id,
            file_id,
            name: name.into(),
            qualified_name,
            kind,
            language,
            start_line,
            end_line,
            start_col: 0,
            end_col: 0,
            signature: None,
            doc_comment: None,
            metadata: BTreeMap::new(),
        }
    }
}
