//! English pluralization/singularization naming variants for the
//! `orm_convention` cross-language bridge rule (§4.5).
//!
//! Deliberately narrow: just enough of the common ORM conventions
//! (Entity Framework, Hibernate, JPA) to generate the table-name variant
//! an ORM class typically maps to, not a general-purpose inflector.

/// Generate the pluralized form of an English short name.
///
/// Rules, in order: `y` preceded by a consonant becomes `ies`; endings in
/// `x`, `s`, `ch`, `sh` get `es`; everything else gets a plain `s`.
#[must_use]
pub fn pluralize(name: &str) -> String {
    if name.is_empty() {
        return name.to_owned();
    }
    let lower = name.to_lowercase();
    if lower.ends_with('y') && !ends_with_vowel_before_y(&lower) {
        format!("{}ies", &name[..name.len() - 1])
    } else if ["x", "s", "ch", "sh"].iter().any(|suf| lower.ends_with(suf)) {
        format!("{name}es")
    } else {
        format!("{name}s")
    }
}

/// Generate the singular form of an English short name — the inverse of
/// [`pluralize`], used to try both directions when matching an ORM
/// class name against a candidate table name.
#[must_use]
pub fn singularize(name: &str) -> String {
    let lower = name.to_lowercase();
    if lower.ends_with("ies") && name.len() > 3 {
        format!("{}y", &name[..name.len() - 3])
    } else if lower.ends_with("ches") || lower.ends_with("shes") || lower.ends_with("xes") {
        name[..name.len() - 2].to_owned()
    } else if lower.ends_with('s') && !lower.ends_with("ss") {
        name[..name.len() - 1].to_owned()
    } else {
        name.to_owned()
    }
}

fn ends_with_vowel_before_y(lower: &str) -> bool {
    let bytes = lower.as_bytes();
    if bytes.len() < 2 {
        return false;
    }
    matches!(bytes[bytes.len() - 2], b'a' | b'e' | b'i' | b'o' | b'u')
}

/// All naming variants (pluralized and singularized) worth trying when
/// matching a class short name against table names, deduplicated and
/// always including the original name.
#[must_use]
pub fn naming_variants(name: &str) -> Vec<String> {
    let mut variants = vec![name.to_owned(), pluralize(name), singularize(name)];
    variants.dedup();
    variants
}
