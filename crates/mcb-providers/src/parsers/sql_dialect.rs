//! SQL dialect router (§4.4): `.sql` files route through this parser
//! rather than directly to [`super::tsql::TSqlParser`] or
//! [`super::plpgsql::PlPgSqlParser`], picking the dialect from header
//! heuristics since the extension alone can't tell T-SQL from
//! PL/pgSQL.

use mcb_domain::ports::{FileInput, ParseResult, Parser};
use mcb_domain::value_objects::Language;
use regex::Regex;

use super::plpgsql::PlPgSqlParser;
use super::tsql::TSqlParser;

/// Syntax markers strongly associated with PL/pgSQL over T-SQL.
fn looks_like_plpgsql(content: &str) -> bool {
    let re = Regex::new(r"(?im)(\$\$|LANGUAGE\s+plpgsql|SERIAL\b|RETURNS\s+TRIGGER)").expect("static pattern");
    re.is_match(content)
}

/// Syntax markers strongly associated with T-SQL over PL/pgSQL.
fn looks_like_tsql(content: &str) -> bool {
    let re = Regex::new(r"(?im)(^\s*GO\s*$|IDENTITY\s*\(|NVARCHAR\b|\[dbo\]\.)").expect("static pattern");
    re.is_match(content)
}

#[derive(Default)]
pub struct SqlDialectRouter;

impl Parser for SqlDialectRouter {
    fn languages(&self) -> &'static [Language] {
        &[Language::TSql, Language::PlPgSql]
    }

    fn parse(&self, input: &FileInput) -> ParseResult {
        let content = String::from_utf8_lossy(&input.content_bytes);
        if looks_like_plpgsql(&content) && !looks_like_tsql(&content) {
            PlPgSqlParser.parse(input)
        } else {
            TSqlParser.parse(input)
        }
    }
}
