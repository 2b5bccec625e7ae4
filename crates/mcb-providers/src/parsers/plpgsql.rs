//! PL/pgSQL parser (§4.4): shares the regex-driven extraction with
//! T-SQL — the dialects differ mainly in quoting and schema
//! conventions, neither of which the shared scan depends on.

use mcb_domain::ports::{FileInput, ParseResult, Parser};
use mcb_domain::value_objects::Language;

use super::sql_common;

#[derive(Default)]
pub struct PlPgSqlParser;

impl Parser for PlPgSqlParser {
    fn languages(&self) -> &'static [Language] {
        &[Language::PlPgSql]
    }

    fn parse(&self, input: &FileInput) -> ParseResult {
        let content = String::from_utf8_lossy(&input.content_bytes);
        sql_common::extract(&content, input.skip_column_lineage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_function_definition() {
        let sql = "CREATE OR REPLACE FUNCTION public.total_widgets() RETURNS INT AS $$\n\
                    BEGIN\n  RETURN (SELECT COUNT(*) FROM public.widgets);\nEND;\n$$ LANGUAGE plpgsql;";
        let result = PlPgSqlParser.parse(&FileInput {
            path: "public/total_widgets.sql".to_owned(),
            content_bytes: sql.as_bytes().to_vec(),
            language: Language::PlPgSql,
            skip_column_lineage: false,
        });
        assert!(result.symbols.iter().any(|s| s.qualified_name == "public.total_widgets()"
            || s.name.starts_with("total_widgets")));
        assert!(result.references.iter().any(|r| r.to_name == "widgets"));
    }
}
