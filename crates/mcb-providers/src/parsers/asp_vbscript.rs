//! Classic ASP / VBScript parser (§4.4, §9 "regex/state-machine"
//! variant): there's no `tree-sitter` grammar for VBScript, so symbols
//! come from matching `Sub`/`Function` declarations and `<!-- #include
//! -->` directives line by line.

use mcb_domain::entities::{EdgeType, SymbolKind};
use mcb_domain::ports::{FileInput, ParseResult, Parser as ParserPort, RawReference, RawSymbol};
use mcb_domain::value_objects::{Confidence, Language};
use regex::Regex;

use super::counters::LocalIdCounter;

#[derive(Default)]
pub struct AspVbScriptParser;

impl ParserPort for AspVbScriptParser {
    fn languages(&self) -> &'static [Language] {
        &[Language::AspVbScript]
    }

    fn parse(&self, input: &FileInput) -> ParseResult {
        let source = String::from_utf8_lossy(&input.content_bytes);
        let mut result = ParseResult::default();
        let mut ids = LocalIdCounter::default();

        let page_name = input.path.rsplit('/').next().unwrap_or(&input.path).to_owned();
        result.symbols.push(RawSymbol {
            local_id: ids.next(),
            name: page_name.clone(),
            qualified_name: page_name,
            kind: SymbolKind::AspPage,
            start_line: 1,
            end_line: source.lines().count() as u32,
            start_col: 0,
            end_col: 0,
            signature: None,
            doc_comment: None,
        });

        let proc_re = Regex::new(r"(?im)^\s*(Public\s+|Private\s+)?(Sub|Function)\s+(\w+)").expect("static pattern");
        for (idx, line) in source.lines().enumerate() {
            if let Some(caps) = proc_re.captures(line) {
                let kind = if caps[2].eq_ignore_ascii_case("function") {
                    SymbolKind::Function
                } else {
                    SymbolKind::Procedure
                };
                result.symbols.push(RawSymbol {
                    local_id: ids.next(),
                    name: caps[3].to_owned(),
                    qualified_name: caps[3].to_owned(),
                    kind,
                    start_line: idx as u32 + 1,
                    end_line: idx as u32 + 1,
                    start_col: 0,
                    end_col: 0,
                    signature: None,
                    doc_comment: None,
                });
            }
        }

        let include_re = Regex::new(r#"(?im)<!--\s*#include\s+(?:file|virtual)\s*=\s*"([^"]+)"\s*-->"#)
            .expect("static pattern");
        for caps in include_re.captures_iter(&source) {
            result.references.push(RawReference {
                from_symbol: String::new(),
                to_name: caps[1].rsplit('/').next().unwrap_or(&caps[1]).to_owned(),
                to_qualified: Some(caps[1].to_owned()),
                reference_type: EdgeType::Imports,
                confidence: Confidence::EXACT,
                context: serde_json::json!({}),
            });
        }

        let sql_re = Regex::new(r#"(?im)"\s*SELECT\s+.*\s+FROM\s+(\w+)"#).expect("static pattern");
        for caps in sql_re.captures_iter(&source) {
            result.references.push(RawReference {
                from_symbol: String::new(),
                to_name: caps[1].clone(),
                to_qualified: None,
                reference_type: EdgeType::UsesTable,
                confidence: Confidence::new(0.8).expect("in range"),
                context: serde_json::json!({"dynamic_sql": true}),
            });
        }

        result
    }
}
