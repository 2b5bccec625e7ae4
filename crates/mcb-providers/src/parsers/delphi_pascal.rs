//! Delphi / Object Pascal parser (§4.4, §9 "regex/state-machine"
//! variant): matches `type TFoo = class(...)`, `procedure`/`function`
//! declarations, and `uses` clauses line by line.

use mcb_domain::entities::{EdgeType, SymbolKind};
use mcb_domain::ports::{FileInput, ParseResult, Parser as ParserPort, RawReference, RawSymbol};
use mcb_domain::value_objects::{Confidence, Language};
use regex::Regex;

use super::counters::LocalIdCounter;

#[derive(Default)]
pub struct DelphiPascalParser;

impl ParserPort for DelphiPascalParser {
    fn languages(&self) -> &'static [Language] {
        &[Language::DelphiPascal]
    }

    fn parse(&self, input: &FileInput) -> ParseResult {
        let source = String::from_utf8_lossy(&input.content_bytes);
        let mut result = ParseResult::default();
        let mut ids = LocalIdCounter::default();
        let mut current_class: Option<String> = None;

        let class_re = Regex::new(r"(?im)^\s*(\w+)\s*=\s*class(?:\s*\(([\w,\s]*)\))?").expect("static pattern");
        let proc_re = Regex::new(r"(?im)^\s*(procedure|function)\s+(\w+)(?:\.(\w+))?").expect("static pattern");
        let uses_re = Regex::new(r"(?im)^\s*uses\s+([\w\s,]+);").expect("static pattern");

        for (idx, line) in source.lines().enumerate() {
            let line_no = idx as u32 + 1;

            if let Some(caps) = class_re.captures(line) {
                let name = caps[1].to_owned();
                current_class = Some(name.clone());
                result.symbols.push(RawSymbol {
                    local_id: ids.next(),
                    name: name.clone(),
                    qualified_name: name,
                    kind: SymbolKind::Class,
                    start_line: line_no,
                    end_line: line_no,
                    start_col: 0,
                    end_col: 0,
                    signature: None,
                    doc_comment: None,
                });

                if let Some(ancestor) = caps.get(2).map(|m| m.as_str().trim()) {
                    if !ancestor.is_empty() && !ancestor.eq_ignore_ascii_case("TObject") {
                        result.references.push(RawReference {
                            from_symbol: String::new(),
                            to_name: ancestor.to_owned(),
                            to_qualified: None,
                            reference_type: EdgeType::Inherits,
                            confidence: Confidence::EXACT,
                            context: serde_json::json!({}),
                        });
                    }
                }
                continue;
            }

            if let Some(caps) = proc_re.captures(line) {
                let kind = if caps[1].eq_ignore_ascii_case("function") {
                    SymbolKind::Function
                } else {
                    SymbolKind::Procedure
                };
                let owner = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                let method_name = caps.get(3).map(|m| m.as_str());
                let (name, qualified) = match method_name {
                    Some(method) => (method.to_owned(), format!("{owner}.{method}")),
                    None => (owner.to_owned(), owner_qualified(owner, &current_class)),
                };
                result.symbols.push(RawSymbol {
                    local_id: ids.next(),
                    name,
                    qualified_name: qualified,
                    kind,
                    start_line: line_no,
                    end_line: line_no,
                    start_col: 0,
                    end_col: 0,
                    signature: None,
                    doc_comment: None,
                });
            }

            if let Some(caps) = uses_re.captures(line) {
                for unit in caps[1].split(',') {
                    let unit = unit.trim();
                    if unit.is_empty() {
                        continue;
                    }
                    result.references.push(RawReference {
                        from_symbol: String::new(),
                        to_name: unit.to_owned(),
                        to_qualified: None,
                        reference_type: EdgeType::Imports,
                        confidence: Confidence::EXACT,
                        context: serde_json::json!({}),
                    });
                }
            }

            // `TWidget` used bare (Hungarian-notation bridge, §4.5
            // `strip_prefix`) as a query-component class name implies a
            // `Widget` table dependency.
            if let Some(caps) = Regex::new(r"\bT([A-Z]\w+)Query\b").expect("static pattern").captures(line) {
                result.references.push(RawReference {
                    from_symbol: String::new(),
                    to_name: caps[1].to_owned(),
                    to_qualified: None,
                    reference_type: EdgeType::UsesTable,
                    confidence: Confidence::new(0.75).expect("in range"),
                    context: serde_json::json!({}),
                });
            }
        }

        result
    }
}

fn owner_qualified(owner: &str, current_class: &Option<String>) -> String {
    match current_class {
        Some(class) => format!("{class}.{owner}"),
        None => owner.to_owned(),
    }
}
