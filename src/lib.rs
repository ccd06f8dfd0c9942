//! actiondef: compiler for action and marker definition documents.
//!
//! Documents declare node-graph actions (typed ports, display metadata) and
//! scene markers. The compiler turns each document into generated Rust:
//! type-id constants, typed port keys, provider tables, marker components
//! and a registration manifest.

pub mod config;
pub mod dsl;
pub mod emit;
pub mod host;
pub mod registry;
