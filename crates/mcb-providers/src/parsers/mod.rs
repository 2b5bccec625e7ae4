//! Parser implementations (§4.4) and their [`ParserRegistration`]
//! entries into [`mcb_application::registry::PARSER_REGISTRATIONS`].
//!
//! Every submodule here contributes one [`Parser`] and, below, one
//! `#[linkme::distributed_slice]` entry binding it to the file
//! extensions it claims. `.sql` is the one extension that does not map
//! directly to a dialect parser: it maps to [`sql_dialect::SqlDialectRouter`],
//! which picks between [`tsql::TSqlParser`] and [`plpgsql::PlPgSqlParser`]
//! from file content, since extension-sniffing alone defaults every
//! `.sql` file to T-SQL (see `mcb_domain::value_objects::Language::from_extension`).

mod asp_vbscript;
mod counters;
mod csharp;
mod delphi_pascal;
mod java;
mod plpgsql;
mod script;
mod sql_common;
mod sql_dialect;
mod treesitter_common;
mod tsql;

pub use asp_vbscript::AspVbScriptParser;
pub use csharp::CSharpParser;
pub use delphi_pascal::DelphiPascalParser;
pub use java::JavaParser;
pub use plpgsql::PlPgSqlParser;
pub use script::ScriptParser;
pub use sql_dialect::SqlDialectRouter;
pub use tsql::TSqlParser;

use mcb_application::registry::PARSER_REGISTRATIONS;
use mcb_domain::ports::{Parser, ParserRegistration};

#[linkme::distributed_slice(PARSER_REGISTRATIONS)]
static SQL: ParserRegistration = ParserRegistration {
    extensions: &[".sql"],
    factory: || Box::new(SqlDialectRouter) as Box<dyn Parser>,
};

#[linkme::distributed_slice(PARSER_REGISTRATIONS)]
static CSHARP: ParserRegistration = ParserRegistration {
    extensions: &[".cs"],
    factory: || Box::new(CSharpParser) as Box<dyn Parser>,
};

#[linkme::distributed_slice(PARSER_REGISTRATIONS)]
static JAVA: ParserRegistration = ParserRegistration {
    extensions: &[".java"],
    factory: || Box::new(JavaParser) as Box<dyn Parser>,
};

#[linkme::distributed_slice(PARSER_REGISTRATIONS)]
static SCRIPT: ParserRegistration = ParserRegistration {
    extensions: &[".js", ".jsx", ".mjs", ".cjs", ".ts", ".tsx"],
    factory: || Box::new(ScriptParser) as Box<dyn Parser>,
};

#[linkme::distributed_slice(PARSER_REGISTRATIONS)]
static ASP_VBSCRIPT: ParserRegistration = ParserRegistration {
    extensions: &[".asp", ".vbs"],
    factory: || Box::new(AspVbScriptParser) as Box<dyn Parser>,
};

#[linkme::distributed_slice(PARSER_REGISTRATIONS)]
static DELPHI_PASCAL: ParserRegistration = ParserRegistration {
    extensions: &[".pas", ".pp", ".dpr"],
    factory: || Box::new(DelphiPascalParser) as Box<dyn Parser>,
};

#[cfg(test)]
mod tests {
    use super::*;
    use mcb_application::registry::ParserRegistry;

    #[test]
    fn registry_resolves_every_registered_extension() {
        let registry = ParserRegistry::from_registrations();
        for ext in [".sql", ".cs", ".java", ".js", ".ts", ".asp", ".vbs", ".pas"] {
            assert!(registry.parser_for_extension(ext).is_some(), "missing parser for {ext}");
        }
    }
}
