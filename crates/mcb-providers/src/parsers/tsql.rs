//! T-SQL parser (§4.4, §9 "hand-written recursive-descent" variant):
//! regex-driven extraction of `CREATE` definitions and table
//! references, sufficient for the symbol/reference contract without a
//! full grammar.

use mcb_domain::ports::{FileInput, ParseResult, Parser};
use mcb_domain::value_objects::Language;

use super::sql_common;

#[derive(Default)]
pub struct TSqlParser;

impl Parser for TSqlParser {
    fn languages(&self) -> &'static [Language] {
        &[Language::TSql]
    }

    fn parse(&self, input: &FileInput) -> ParseResult {
        let content = String::from_utf8_lossy(&input.content_bytes);
        sql_common::extract(&content, input.skip_column_lineage)
    }
}
