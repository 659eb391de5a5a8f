//! Storage layer: persist a [`Table`](crate::data::model::Table) into SQLite
//! and read back what landed.

pub mod verify;
pub mod writer;

/// Double-quote an SQL identifier, doubling any embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
