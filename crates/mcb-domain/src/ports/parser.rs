//! Parser contract (§4.4): the Parser Registry's unit of plugin
//! behavior. One implementation per language family.

use serde::{Deserialize, Serialize};

use crate::entities::{DerivationType, EdgeType};
use crate::value_objects::{Confidence, FileId, Language, ProjectId, RawReferenceId, SymbolId};

/// Input handed to a [`Parser`] for a single file.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub path: String,
    pub content_bytes: Vec<u8>,
    pub language: Language,
    /// Set by the Parse Stage (§4.2); suppresses column-level reference
    /// emission for schema-migration scripts.
    pub skip_column_lineage: bool,
}

/// A symbol discovered by a parser, keyed by a parser-local string id
/// rather than a [`crate::value_objects::SymbolId`] — the Parse Worker
/// assigns real identity on upsert (§4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSymbol {
    /// Parser-local id, referenced by [`RawReference::from_symbol`]
    /// within the same [`ParseResult`].
    pub local_id: String,
    pub name: String,
    pub qualified_name: String,
    pub kind: crate::entities::SymbolKind,
    pub start_line: u32,
    pub end_line: u32,
    pub start_col: u32,
    pub end_col: u32,
    pub signature: Option<String>,
    pub doc_comment: Option<String>,
}

/// An unresolved or locally-resolved reference emitted by a parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReference {
    /// Parser-local id of the source symbol, or empty when the
    /// reference has no clear local origin (§4.4, §4.5).
    #[serde(default)]
    pub from_symbol: String,
    pub to_name: String,
    pub to_qualified: Option<String>,
    pub reference_type: EdgeType,
    #[serde(default = "Confidence::default")]
    pub confidence: Confidence,
    /// Parser-specific context, e.g. `{"dynamic_sql": true}`.
    #[serde(default)]
    pub context: serde_json::Value,
}

/// A [`RawReference`] staged to the Relational Store at parse time
/// (§4.3 step 5), resolved into a concrete [`crate::entities::SymbolEdge`]
/// by the Cross-Language Resolver (§4.5) and deleted once consumed.
///
/// Not part of the abridged schema table list in §6, which enumerates
/// only the terminal tables; this is the resolver's working queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReferenceRecord {
    pub id: RawReferenceId,
    pub project_id: ProjectId,
    pub file_id: FileId,
    pub language: Language,
    /// `Some` when the Parse Worker already resolved the source symbol
    /// within the file's local scope (§4.3 step 5).
    pub from_symbol: Option<SymbolId>,
    pub to_name: String,
    pub to_qualified: Option<String>,
    pub reference_type: EdgeType,
    pub confidence: Confidence,
    pub context: serde_json::Value,
}

/// A raw column-to-column lineage fact, pre-resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawColumnReference {
    pub source_column_fqn: String,
    pub target_column_fqn: String,
    pub derivation_type: DerivationType,
    pub expression: Option<String>,
    pub line: u32,
}

/// A non-fatal parse failure: line/column plus a human message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseErrorEntry {
    pub line: u32,
    pub column: Option<u32>,
    pub message: String,
}

/// The output of one [`Parser::parse`] call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseResult {
    pub symbols: Vec<RawSymbol>,
    pub references: Vec<RawReference>,
    pub column_references: Vec<RawColumnReference>,
    pub errors: Vec<ParseErrorEntry>,
}

/// One parser implementation, registered per [`Language`] via the
/// `linkme` distributed slice (§4.4, §5).
///
/// Parsers are stateless across calls: any caches must live internal to
/// one `parse` invocation. A parser MUST NOT fail the whole pipeline on
/// malformed input — malformed constructs become [`ParseErrorEntry`]
/// rows with the parse continuing on a best-effort basis.
pub trait Parser: Send + Sync {
    /// Languages this parser handles, in no particular order.
    fn languages(&self) -> &'static [Language];

    /// Parse one file's content into symbols, references, and column
    /// references.
    fn parse(&self, input: &FileInput) -> ParseResult;
}

/// Registration entry collected into the `linkme::distributed_slice`
/// (§4.4): `{ extensions, factory }`.
pub struct ParserRegistration {
    pub extensions: &'static [&'static str],
    pub factory: fn() -> Box<dyn Parser>,
}
