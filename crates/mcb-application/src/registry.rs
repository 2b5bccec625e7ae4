//! Parser Registry (PR, §4.4): the `linkme` distributed slice that
//! every language-family parser in `mcb-providers` registers into at
//! link time, and the frozen, read-only view built from it at worker
//! startup (§5).

use std::collections::HashMap;

use mcb_domain::ports::{Parser, ParserRegistration};

/// Distributed slice collecting every parser's extension mapping.
/// `mcb-providers` implementations push an entry in here via
/// `#[linkme::distributed_slice(PARSER_REGISTRATIONS)]`.
#[linkme::distributed_slice]
pub static PARSER_REGISTRATIONS: [ParserRegistration] = [..];

/// Extension → parser mapping built once from [`PARSER_REGISTRATIONS`]
/// and treated as frozen thereafter (§5 "Shared resources").
pub struct ParserRegistry {
    by_extension: HashMap<&'static str, fn() -> Box<dyn Parser>>,
}

impl ParserRegistry {
    /// Build the registry by iterating the distributed slice.
    ///
    /// Later registrations win on an extension collision — callers
    /// should ensure each extension is registered by exactly one
    /// provider crate.
    #[must_use]
    pub fn from_registrations() -> Self {
        let mut by_extension = HashMap::new();
        for registration in PARSER_REGISTRATIONS {
            for ext in registration.extensions {
                by_extension.insert(*ext, registration.factory);
            }
        }
        Self { by_extension }
    }

    /// Build a registry directly from an extension map, bypassing the
    /// `linkme` slice. Used by tests and by any bootstrap path that
    /// wants a fixed parser set without linking `mcb-providers`.
    #[must_use]
    pub fn from_map(by_extension: HashMap<&'static str, fn() -> Box<dyn Parser>>) -> Self {
        Self { by_extension }
    }

    /// Select a parser instance for a lowercased, dot-prefixed file
    /// extension, e.g. `".cs"`.
    #[must_use]
    pub fn parser_for_extension(&self, extension: &str) -> Option<Box<dyn Parser>> {
        self.by_extension.get(extension).map(|factory| factory())
    }

    /// Number of distinct registered extensions, for diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::from_registrations()
    }
}
