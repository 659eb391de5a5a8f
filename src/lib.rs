//! Import a CSV file into a single SQLite table.
//!
//! [`data`] loads the file and infers column types, [`store`] writes the
//! table and reads back its schema and row count.

pub mod data;
pub mod error;
pub mod report;
pub mod store;
