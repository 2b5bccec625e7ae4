//! Language tags for files, symbols, and cross-language bridge rules
//! (§4.4, §4.5).

use std::fmt;

/// A source-language family recognized by the Parser Registry.
///
/// Distinct from a file extension: `.sql` routes to either
/// [`Language::TSql`] or [`Language::PlPgSql`] via the dialect router
/// (§4.4), never to a `Language` of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::EnumIter, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// Microsoft T-SQL (SQL Server dialect).
    TSql,
    /// PostgreSQL's procedural SQL dialect.
    PlPgSql,
    CSharp,
    Java,
    JavaScript,
    TypeScript,
    /// Classic ASP with embedded VBScript.
    AspVbScript,
    /// Delphi / Object Pascal.
    DelphiPascal,
}

impl Language {
    /// Short tag used in log fields, bridge-rule keys, and the
    /// `bridge: "<srclang>→<tgtlang>"` edge metadata string (§4.5).
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::TSql => "tsql",
            Self::PlPgSql => "plpgsql",
            Self::CSharp => "csharp",
            Self::Java => "java",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::AspVbScript => "asp_vbscript",
            Self::DelphiPascal => "delphi_pascal",
        }
    }

    /// Parse a language tag as produced by [`Language::tag`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "tsql" => Self::TSql,
            "plpgsql" => Self::PlPgSql,
            "csharp" => Self::CSharp,
            "java" => Self::Java,
            "javascript" => Self::JavaScript,
            "typescript" => Self::TypeScript,
            "asp_vbscript" => Self::AspVbScript,
            "delphi_pascal" => Self::DelphiPascal,
            _ => return None,
        })
    }

    /// Whether this language belongs to the SQL family, which uses
    /// case-insensitive identifier matching (bridge rule 4, §4.5).
    #[must_use]
    pub fn is_sql_dialect(self) -> bool {
        matches!(self, Self::TSql | Self::PlPgSql)
    }

    /// Best-effort language guess from a file path's extension.
    ///
    /// `.sql` defaults to [`Language::TSql`]; the dialect router (§4.4)
    /// refines this to [`Language::PlPgSql`] from file-header heuristics
    /// once the file is actually read and parsed.
    #[must_use]
    pub fn from_extension(path: &str) -> Option<Self> {
        let ext = path.rsplit('.').next()?.to_lowercase();
        Some(match ext.as_str() {
            "sql" => Self::TSql,
            "cs" => Self::CSharp,
            "java" => Self::Java,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" => Self::TypeScript,
            "asp" | "vbs" => Self::AspVbScript,
            "pas" | "pp" | "dpr" => Self::DelphiPascal,
            _ => return None,
        })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_round_trips() {
        for lang in [
            Language::TSql,
            Language::PlPgSql,
            Language::CSharp,
            Language::Java,
            Language::JavaScript,
            Language::TypeScript,
            Language::AspVbScript,
            Language::DelphiPascal,
        ] {
            assert_eq!(Language::from_tag(lang.tag()), Some(lang));
        }
    }

    #[test]
    fn unknown_tag_is_none() {
        assert_eq!(Language::from_tag("cobol"), None);
    }

    #[test]
    fn extension_sniffing_covers_known_families() {
        assert_eq!(Language::from_extension("Widget.cs"), Some(Language::CSharp));
        assert_eq!(Language::from_extension("proc.sql"), Some(Language::TSql));
        assert_eq!(Language::from_extension("app.tsx"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("README.md"), None);
    }

    #[test]
    fn only_sql_dialects_are_case_insensitive() {
        assert!(Language::TSql.is_sql_dialect());
        assert!(Language::PlPgSql.is_sql_dialect());
        assert!(!Language::CSharp.is_sql_dialect());
    }
}
