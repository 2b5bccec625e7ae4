//! Shared regex-driven extraction used by both SQL dialects (§4.4): a
//! hand-written, best-effort scan rather than a full grammar — this is
//! the "hand-written recursive-descent" variant the registry contract
//! calls out, kept intentionally shallow since the parse contract only
//! requires symbols, references, and column references, not a full AST.

use mcb_domain::entities::{DerivationType, EdgeType, SymbolKind};
use mcb_domain::ports::{ParseResult, RawColumnReference, RawReference, RawSymbol};
use mcb_domain::value_objects::Confidence;
use regex::Regex;

use super::counters::LocalIdCounter;

/// One `CREATE <kind> <name> ...` definition found in the file.
struct Definition {
    kind: SymbolKind,
    name: String,
    line: u32,
}

fn definitions(content: &str) -> Vec<Definition> {
    let re = Regex::new(
        r#"(?im)^\s*CREATE\s+(?:OR\s+REPLACE\s+)?(TABLE|VIEW|PROCEDURE|FUNCTION|TRIGGER|INDEX)\s+(?:IF\s+NOT\s+EXISTS\s+)?([\w\.\[\]\"]+)"#,
    )
    .expect("static pattern");

    content
        .lines()
        .enumerate()
        .flat_map(|(idx, line)| {
            re.captures(line).map(|caps| Definition {
                kind: match caps[1].to_ascii_uppercase().as_str() {
                    "TABLE" => SymbolKind::Table,
                    "VIEW" => SymbolKind::View,
                    "PROCEDURE" => SymbolKind::Procedure,
                    "FUNCTION" => SymbolKind::Function,
                    "TRIGGER" => SymbolKind::Trigger,
                    "INDEX" => SymbolKind::Index,
                    _ => SymbolKind::Table,
                },
                name: clean_identifier(&caps[2]),
                line: idx as u32 + 1,
            })
        })
        .collect()
}

fn clean_identifier(raw: &str) -> String {
    raw.trim_matches(|c: char| c == '[' || c == ']' || c == '"').to_string()
}

fn table_references(content: &str) -> Vec<(String, u32)> {
    let re = Regex::new(r#"(?im)\b(?:FROM|JOIN)\s+([\w\.\[\]\"]+)"#).expect("static pattern");
    content
        .lines()
        .enumerate()
        .flat_map(|(idx, line)| {
            re.captures_iter(line)
                .map(move |caps| (clean_identifier(&caps[1]), idx as u32 + 1))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// `INSERT INTO target (cols) SELECT cols FROM ...` column mapping,
/// matched only when both sides list the same column count — anything
/// more complex is left unresolved rather than guessed.
fn column_copies(content: &str) -> Vec<RawColumnReference> {
    let re = Regex::new(
        r#"(?ims)INSERT\s+INTO\s+([\w\.\[\]""]+)\s*\(([^)]+)\)\s*SELECT\s+([^;]+?)\s+FROM\s+([\w\.\[\]""]+)"#,
    )
    .expect("static pattern");

    let mut out = Vec::new();
    for caps in re.captures_iter(content) {
        let target_table = clean_identifier(&caps[1]);
        let target_cols: Vec<&str> = caps[2].split(',').map(str::trim).collect();
        let select_list = &caps[3];
        let source_table = clean_identifier(&caps[4]);

        let source_cols: Vec<&str> = select_list
            .split(',')
            .map(|c| c.trim().rsplit('.').next().unwrap_or(c.trim()).trim())
            .collect();

        if target_cols.len() != source_cols.len() {
            continue;
        }

        let line = content[..caps.get(0).unwrap().start()].lines().count() as u32 + 1;
        for (target_col, source_col) in target_cols.iter().zip(source_cols.iter()) {
            out.push(RawColumnReference {
                source_column_fqn: format!("{source_table}.{source_col}"),
                target_column_fqn: format!("{target_table}.{}", clean_identifier(target_col)),
                derivation_type: if source_col == target_col {
                    DerivationType::DirectCopy
                } else {
                    DerivationType::Expression
                },
                expression: None,
                line,
            });
        }
    }
    out
}

fn dynamic_sql_detected(content: &str) -> bool {
    let re = Regex::new(r"(?im)\b(EXEC(UTE)?\s*\(|sp_executesql|EXECUTE\s+FORMAT)").expect("static pattern");
    re.is_match(content)
}

/// Scan `content` for `CREATE` definitions and table references,
/// producing symbols with parse-local ids and unresolved references
/// the worker's local scope map (or the resolver) will tie together.
pub fn extract(content: &str, skip_column_lineage: bool) -> ParseResult {
    let mut result = ParseResult::default();
    let mut ids = LocalIdCounter::default();
    let dynamic = dynamic_sql_detected(content);

    let defs = definitions(content);
    let mut local_id_of: std::collections::HashMap<String, String> = std::collections::HashMap::new();
    for def in &defs {
        let local_id = ids.next();
        local_id_of.insert(def.name.to_ascii_lowercase(), local_id.clone());
        result.symbols.push(RawSymbol {
            local_id,
            name: short_name(&def.name),
            qualified_name: def.name.clone(),
            kind: def.kind,
            start_line: def.line,
            end_line: def.line,
            start_col: 0,
            end_col: 0,
            signature: None,
            doc_comment: None,
        });
    }

    for (table, line) in table_references(content) {
        let mut context = serde_json::json!({});
        if dynamic {
            context = serde_json::json!({ "dynamic_sql": true });
        }
        result.references.push(RawReference {
            from_symbol: enclosing_definition(&defs, line)
                .and_then(|name| local_id_of.get(&name.to_ascii_lowercase()).cloned())
                .unwrap_or_default(),
            to_name: short_name(&table),
            to_qualified: Some(table),
            reference_type: EdgeType::UsesTable,
            confidence: Confidence::EXACT,
            context,
        });
    }

    if !skip_column_lineage {
        result.column_references = column_copies(content);
    }

    result
}

fn enclosing_definition(defs: &[Definition], line: u32) -> Option<String> {
    defs.iter().filter(|d| d.line <= line).max_by_key(|d| d.line).map(|d| d.name.clone())
}

fn short_name(qualified: &str) -> String {
    qualified.rsplit('.').next().unwrap_or(qualified).to_string()
}
