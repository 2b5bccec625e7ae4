//! C# parser (§4.4, §9 "grammar-binding" variant): `tree-sitter-c-sharp`
//! for structural symbols, plus a regex pass over `[Table("X")]`/
//! `[Column("X")]` ORM attributes — annotation-only table references
//! that have no calling symbol in scope (§9 "from everywhere").

use mcb_domain::entities::{EdgeType, SymbolKind};
use mcb_domain::ports::{FileInput, ParseResult, Parser as ParserPort, RawReference};
use mcb_domain::value_objects::{Confidence, Language};
use regex::Regex;

use super::treesitter_common::{self, NodeKindMap};

const NODE_KINDS: NodeKindMap = NodeKindMap {
    containers: &[
        ("namespace_declaration", SymbolKind::Namespace),
        ("class_declaration", SymbolKind::Class),
        ("interface_declaration", SymbolKind::Interface),
        ("struct_declaration", SymbolKind::Struct),
    ],
    leaves: &[
        ("method_declaration", SymbolKind::Method),
        ("constructor_declaration", SymbolKind::Constructor),
        ("property_declaration", SymbolKind::Property),
        ("field_declaration", SymbolKind::Field),
    ],
    name_field: "name",
};

fn table_attribute_references(content: &str) -> Vec<RawReference> {
    let re = Regex::new(r#"\[Table\(\s*"([^"]+)"\s*\)\]"#).expect("static pattern");
    re.captures_iter(content)
        .map(|caps| RawReference {
            from_symbol: String::new(),
            to_name: caps[1].to_owned(),
            to_qualified: None,
            reference_type: EdgeType::UsesTable,
            confidence: Confidence::new(0.9).expect("in range"),
            context: serde_json::json!({"orm_attribute": "Table"}),
        })
        .collect()
}

#[derive(Default)]
pub struct CSharpParser;

impl ParserPort for CSharpParser {
    fn languages(&self) -> &'static [Language] {
        &[Language::CSharp]
    }

    fn parse(&self, input: &FileInput) -> ParseResult {
        let source = String::from_utf8_lossy(&input.content_bytes).into_owned();
        let mut result = ParseResult::default();

        if let Some(tree) = treesitter_common::parse_tree(tree_sitter_c_sharp::LANGUAGE.into(), &source) {
            let walked = treesitter_common::walk(&tree, &source, &NODE_KINDS);
            result.symbols = walked.symbols;
            result.errors = walked.errors;
        }
        result.references = table_attribute_references(&source);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_namespace_class_and_method() {
        let source = r#"
namespace Acme.Billing {
    [Table("Invoices")]
    public class InvoiceService {
        public Invoice GetInvoice(int id) { return null; }
    }
}
"#;
        let result = CSharpParser.parse(&FileInput {
            path: "InvoiceService.cs".to_owned(),
            content_bytes: source.as_bytes().to_vec(),
            language: Language::CSharp,
            skip_column_lineage: false,
        });
        assert!(result
            .symbols
            .iter()
            .any(|s| s.qualified_name == "Acme.Billing.InvoiceService"));
        assert!(result
            .symbols
            .iter()
            .any(|s| s.qualified_name == "Acme.Billing.InvoiceService.GetInvoice"));
        assert!(result.references.iter().any(|r| r.to_name == "Invoices"));
    }
}
