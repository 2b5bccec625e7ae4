//! Java parser (§4.4, §9 "grammar-binding" variant): `tree-sitter-java`
//! for structural symbols, plus a regex pass over `@Table("x")`/
//! `@Entity` JPA annotations for annotation-only table references.

use mcb_domain::entities::{EdgeType, SymbolKind};
use mcb_domain::ports::{FileInput, ParseResult, Parser as ParserPort, RawReference};
use mcb_domain::value_objects::{Confidence, Language};
use regex::Regex;

use super::treesitter_common::{self, NodeKindMap};

const NODE_KINDS: NodeKindMap = NodeKindMap {
    containers: &[
        ("class_declaration", SymbolKind::Class),
        ("interface_declaration", SymbolKind::Interface),
    ],
    leaves: &[
        ("method_declaration", SymbolKind::Method),
        ("constructor_declaration", SymbolKind::Constructor),
        ("field_declaration", SymbolKind::Field),
    ],
    name_field: "name",
};

fn package_prefix(source: &str) -> Option<String> {
    let re = Regex::new(r"(?m)^\s*package\s+([\w.]+)\s*;").expect("static pattern");
    re.captures(source).map(|c| c[1].to_owned())
}

fn table_annotation_references(content: &str) -> Vec<RawReference> {
    let re = Regex::new(r#"@Table\(\s*name\s*=\s*"([^"]+)"\s*\)"#).expect("static pattern");
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
pub struct JavaParser;

impl ParserPort for JavaParser {
    fn languages(&self) -> &'static [Language] {
        &[Language::Java]
    }

    fn parse(&self, input: &FileInput) -> ParseResult {
        let source = String::from_utf8_lossy(&input.content_bytes).into_owned();
        let mut result = ParseResult::default();

        if let Some(tree) = treesitter_common::parse_tree(tree_sitter_java::LANGUAGE.into(), &source) {
            let walked = treesitter_common::walk(&tree, &source, &NODE_KINDS);
            result.symbols = walked.symbols;
            result.errors = walked.errors;
            if let Some(package) = package_prefix(&source) {
                for symbol in &mut result.symbols {
                    symbol.qualified_name = format!("{package}.{}", symbol.qualified_name);
                }
            }
        }
        result.references = table_annotation_references(&source);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_package_qualified_class() {
        let source = r#"
package com.acme.billing;

@Table(name = "invoices")
public class InvoiceService {
    public Invoice getInvoice(int id) { return null; }
}
"#;
        let result = JavaParser.parse(&FileInput {
            path: "InvoiceService.java".to_owned(),
            content_bytes: source.as_bytes().to_vec(),
            language: Language::Java,
            skip_column_lineage: false,
        });
        assert!(result
            .symbols
            .iter()
            .any(|s| s.qualified_name == "com.acme.billing.InvoiceService"));
        assert!(result.references.iter().any(|r| r.to_name == "invoices"));
    }
}
