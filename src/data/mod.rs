//! Data layer: core types, loading, and type coercion.
//!
//! Architecture:
//! ```text
//!    plays.csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Table of text / null cells
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  coerce   │  all-or-nothing numeric adoption, then refinement
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Table    │  Vec<Column>, each typed, uniform row count
//!   └──────────┘
//! ```

pub mod coerce;
pub mod loader;
pub mod model;
