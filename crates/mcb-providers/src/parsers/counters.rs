//! Parser-local id generation (§4.4): symbols returned from one
//! `Parser::parse` call are keyed by a plain string, not a
//! [`mcb_domain::value_objects::SymbolId`] — the Parse Worker assigns
//! real identity on upsert.

#[derive(Default)]
pub struct LocalIdCounter(usize);

impl LocalIdCounter {
    pub fn next(&mut self) -> String {
        let id = format!("s{}", self.0);
        self.0 += 1;
        id
    }
}
