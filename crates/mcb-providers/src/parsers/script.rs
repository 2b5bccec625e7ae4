//! JavaScript/TypeScript parser (§4.4, §9 "grammar-binding" variant):
//! one implementation handling both languages, since
//! `tree-sitter-javascript`/`tree-sitter-typescript` share the same
//! node-kind vocabulary for the structural symbols this contract cares
//! about.

use mcb_domain::entities::{EdgeType, SymbolKind};
use mcb_domain::ports::{FileInput, ParseResult, Parser as ParserPort, RawReference};
use mcb_domain::value_objects::{Confidence, Language};
use regex::Regex;

use super::treesitter_common::{self, NodeKindMap};

const NODE_KINDS: NodeKindMap = NodeKindMap {
    containers: &[("class_declaration", SymbolKind::Class)],
    leaves: &[
        ("function_declaration", SymbolKind::Function),
        ("method_definition", SymbolKind::Method),
    ],
    name_field: "name",
};

/// Express/Fastify-style `router.get("/path", ...)` route declarations,
/// surfaced as `calls_api`-eligible endpoint symbols rather than
/// ordinary functions, since there's no declaration keyword to anchor
/// a tree-sitter node kind on.
fn route_references(content: &str) -> Vec<RawReference> {
    let re = Regex::new(r#"(?i)\.(get|post|put|patch|delete)\(\s*["']([^"']+)["']"#).expect("static pattern");
    re.captures_iter(content)
        .map(|caps| RawReference {
            from_symbol: String::new(),
            to_name: format!("{} {}", caps[1].to_ascii_uppercase(), &caps[2]),
            to_qualified: None,
            reference_type: EdgeType::CallsApi,
            confidence: Confidence::new(0.8).expect("in range"),
            context: serde_json::json!({}),
        })
        .collect()
}

#[derive(Default)]
pub struct ScriptParser;

impl ParserPort for ScriptParser {
    fn languages(&self) -> &'static [Language] {
        &[Language::JavaScript, Language::TypeScript]
    }

    fn parse(&self, input: &FileInput) -> ParseResult {
        let source = String::from_utf8_lossy(&input.content_bytes).into_owned();
        let mut result = ParseResult::default();

        let ts_language = match input.language {
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            _ => tree_sitter_javascript::LANGUAGE.into(),
        };
        if let Some(tree) = treesitter_common::parse_tree(ts_language, &source) {
            let walked = treesitter_common::walk(&tree, &source, &NODE_KINDS);
            result.symbols = walked.symbols;
            result.errors = walked.errors;
        }
        result.references = route_references(&source);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_function_and_route() {
        let source = r#"
function getInvoice(id) { return db.invoices.find(id); }

router.get("/invoices/:id", (req, res) => {
  res.json(getInvoice(req.params.id));
});
"#;
        let result = ScriptParser.parse(&FileInput {
            path: "invoices.js".to_owned(),
            content_bytes: source.as_bytes().to_vec(),
            language: Language::JavaScript,
            skip_column_lineage: false,
        });
        assert!(result.symbols.iter().any(|s| s.qualified_name == "getInvoice"));
        assert!(result.references.iter().any(|r| r.to_name == "GET /invoices/:id"));
    }
}
