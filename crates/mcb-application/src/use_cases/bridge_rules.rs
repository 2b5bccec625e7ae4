//! Cross-language bridge rules (§4.5): the ordered strategies the
//! resolver falls back to once exact/local/short-name matching fails.

use mcb_domain::{Confidence, EdgeType, Language, Symbol};

/// One cross-language match attempt's outcome.
#[derive(Debug, Clone)]
pub struct BridgeMatch {
    pub confidence: Confidence,
    pub match_strategy: &'static str,
}

/// `T` (Hungarian-notation) prefix Delphi classes use for SQL-table
/// bridges (§4.5 `strip_prefix`).
const DELPHI_TABLE_CLASS_PREFIX: char = 'T';

/// Try each bridge rule in registration order; first match wins (§4.5).
#[must_use]
pub fn resolve_bridge(
    source_lang: Language,
    candidate_name: &str,
    reference_short_name: &str,
) -> Option<BridgeMatch> {
    if candidate_name == reference_short_name {
        return Some(BridgeMatch {
            confidence: Confidence::EXACT,
            match_strategy: "exact",
        });
    }
    if schema_qualified_match(source_lang, candidate_name, reference_short_name) {
        return Some(BridgeMatch {
            confidence: Confidence::new(0.95).expect("in range"),
            match_strategy: "schema_qualified",
        });
    }
    if candidate_name.eq_ignore_ascii_case(reference_short_name) {
        return Some(BridgeMatch {
            confidence: Confidence::new(0.85).expect("in range"),
            match_strategy: "case_insensitive",
        });
    }
    if strip_prefix_match(candidate_name, reference_short_name) {
        return Some(BridgeMatch {
            confidence: Confidence::new(0.75).expect("in range"),
            match_strategy: "strip_prefix",
        });
    }
    if orm_convention_match(candidate_name, reference_short_name) {
        return Some(BridgeMatch {
            confidence: Confidence::new(0.70).expect("in range"),
            match_strategy: "orm_convention",
        });
    }
    None
}

fn schema_qualified_match(source_lang: Language, candidate_name: &str, reference: &str) -> bool {
    if reference.contains('.') {
        return false;
    }
    let schema = match source_lang {
        Language::TSql => "dbo",
        Language::PlPgSql => "public",
        _ => return false,
    };
    candidate_name.eq_ignore_ascii_case(&format!("{schema}.{reference}"))
}

fn strip_prefix_match(candidate_name: &str, reference: &str) -> bool {
    reference
        .strip_prefix(DELPHI_TABLE_CLASS_PREFIX)
        .is_some_and(|stripped| stripped.eq_ignore_ascii_case(candidate_name))
}

fn orm_convention_match(candidate_name: &str, reference: &str) -> bool {
    mcb_utils::naming_variants(reference)
        .iter()
        .any(|variant| variant.eq_ignore_ascii_case(candidate_name))
}

/// Normalize a route for [`api_route_match`]: trim trailing slash,
/// collapse any parameter token (`{name}`, `{name:constraint}`, `{*}`,
/// `:name`) to the uniform token `{p}` (§4.5). The HTTP verb is
/// lowercased separately in [`split_verb_and_path`]; the path itself
/// compares case-sensitively, so it is left untouched here.
#[must_use]
pub fn normalize_route(route: &str) -> String {
    let trimmed = route.trim_end_matches('/');
    trimmed
        .split('/')
        .map(|segment| {
            if (segment.starts_with('{') && segment.ends_with('}')) || segment.starts_with(':') {
                "{p}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Split `"GET /api/users/{id}"` into `(Some("get"), "/api/users/{id}")`,
/// or `(None, route)` when no verb prefix is present.
#[must_use]
pub fn split_verb_and_path(route: &str) -> (Option<String>, &str) {
    match route.split_once(' ') {
        Some((verb, path)) if verb.chars().all(|c| c.is_ascii_alphabetic()) => {
            (Some(verb.to_lowercase()), path)
        }
        _ => (None, route),
    }
}

/// `api_route_match` bridge rule (§4.5): only applies to
/// `reference_type = calls_api`.
#[must_use]
pub fn api_route_match(reference_route: &str, candidate_signature: &str) -> Option<BridgeMatch> {
    let (ref_verb, ref_path) = split_verb_and_path(reference_route);
    let (cand_verb, cand_path) = split_verb_and_path(candidate_signature);
    if let Some(ref_verb) = &ref_verb {
        if cand_verb.as_deref() != Some(ref_verb.as_str()) {
            return None;
        }
    }
    if normalize_route(ref_path) == normalize_route(cand_path) {
        Some(BridgeMatch {
            confidence: Confidence::new(0.90).expect("in range"),
            match_strategy: "api_route_match",
        })
    } else {
        None
    }
}

/// Whether `symbol`'s language matches the bridge rule's expected
/// target language, per the "verify target language" clause repeated
/// across §4.5's rule table.
#[must_use]
pub fn matches_edge_type_language(symbol: &Symbol, edge_type: EdgeType, expected: Language) -> bool {
    matches!(edge_type, EdgeType::CallsApi) || symbol.language == expected
}
