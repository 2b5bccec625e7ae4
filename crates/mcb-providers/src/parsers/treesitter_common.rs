//! Shared tree-sitter walking for the grammar-binding parsers (§4.4,
//! §9): a generic scope-tracking visitor parameterized by each
//! language's node-kind vocabulary, grounded on the same
//! `Parser::new().set_language(...).parse(...)` shape used elsewhere
//! for AST access.

use mcb_domain::entities::SymbolKind;
use mcb_domain::ports::{ParseErrorEntry, RawSymbol};
use tree_sitter::{Language as TsLanguage, Node, Parser, Tree};

use super::counters::LocalIdCounter;

/// Node kinds this language treats as scope containers (namespace,
/// class, module) versus leaf symbols (method, field). Containers
/// contribute a qualified-name segment and recurse into children;
/// leaves are recorded and not descended into for symbol purposes.
pub struct NodeKindMap {
    pub containers: &'static [(&'static str, SymbolKind)],
    pub leaves: &'static [(&'static str, SymbolKind)],
    pub name_field: &'static str,
}

pub struct WalkResult {
    pub symbols: Vec<RawSymbol>,
    pub errors: Vec<ParseErrorEntry>,
}

pub fn parse_tree(language: TsLanguage, source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&language).ok()?;
    parser.parse(source, None)
}

pub fn walk(tree: &Tree, source: &str, map: &NodeKindMap) -> WalkResult {
    let mut symbols = Vec::new();
    let mut errors = Vec::new();
    let mut ids = LocalIdCounter::default();
    visit(tree.root_node(), source, map, &[], &mut symbols, &mut errors, &mut ids);
    WalkResult { symbols, errors }
}

fn node_name<'a>(node: Node, source: &'a str, name_field: &str) -> Option<&'a str> {
    let name_node = node.child_by_field_name(name_field)?;
    source.get(name_node.start_byte()..name_node.end_byte())
}

#[allow(clippy::too_many_arguments)]
fn visit(
    node: Node,
    source: &str,
    map: &NodeKindMap,
    scope: &[String],
    symbols: &mut Vec<RawSymbol>,
    errors: &mut Vec<ParseErrorEntry>,
    ids: &mut LocalIdCounter,
) {
    if node.is_error() {
        let pos = node.start_position();
        errors.push(ParseErrorEntry {
            line: pos.row as u32 + 1,
            column: Some(pos.column as u32),
            message: "syntax error".to_owned(),
        });
    }

    let kind = node.kind();

    if let Some((_, symbol_kind)) = map.containers.iter().find(|(k, _)| *k == kind) {
        if let Some(name) = node_name(node, source, map.name_field) {
            let mut next_scope = scope.to_vec();
            next_scope.push(name.to_owned());
            let qualified_name = next_scope.join(".");
            let start = node.start_position();
            let end = node.end_position();
            symbols.push(RawSymbol {
                local_id: ids.next(),
                name: name.to_owned(),
                qualified_name,
                kind: *symbol_kind,
                start_line: start.row as u32 + 1,
                end_line: end.row as u32 + 1,
                start_col: start.column as u32,
                end_col: end.column as u32,
                signature: None,
                doc_comment: None,
            });
            for i in 0..node.child_count() {
                if let Some(child) = node.child(i) {
                    visit(child, source, map, &next_scope, symbols, errors, ids);
                }
            }
            return;
        }
    }

    if let Some((_, symbol_kind)) = map.leaves.iter().find(|(k, _)| *k == kind) {
        if let Some(name) = node_name(node, source, map.name_field) {
            let mut qualified = scope.to_vec();
            qualified.push(name.to_owned());
            let start = node.start_position();
            let end = node.end_position();
            symbols.push(RawSymbol {
                local_id: ids.next(),
                name: name.to_owned(),
                qualified_name: qualified.join("."),
                kind: *symbol_kind,
                start_line: start.row as u32 + 1,
                end_line: end.row as u32 + 1,
                start_col: start.column as u32,
                end_col: end.column as u32,
                signature: signature_of(node, source),
                doc_comment: None,
            });
        }
    }

    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            visit(child, source, map, scope, symbols, errors, ids);
        }
    }
}

fn signature_of<'a>(node: Node, source: &'a str) -> Option<String> {
    let params = node.child_by_field_name("parameters")?;
    source.get(params.start_byte()..params.end_byte()).map(str::to_owned)
}
