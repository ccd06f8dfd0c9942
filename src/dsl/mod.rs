//! Definition compiler: document text → tokens → AST → generated Rust.

pub mod ast;
pub mod compile;
pub mod error;
pub mod lexer;
pub mod names;
pub mod parser;
pub mod resolve;
pub mod token;

pub use ast::*;
pub use compile::{CompileOptions, CompileResult, Document};
pub use error::{Diagnostic, DiagnosticKind, Severity};

use compile::{compile_document, resolve_document};
use resolve::Resolved;

/// The definition compiler.
///
/// Holds only immutable options, so one instance can serve any number of
/// documents, from any thread. Compiling the same text twice yields the
/// same result byte for byte.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a document into artifacts and diagnostics.
    pub fn compile(&self, name: &str, text: &str) -> CompileResult {
        self.compile_document(&Document::new(name, text))
    }

    pub fn compile_document(&self, doc: &Document) -> CompileResult {
        compile_document(doc, &self.options)
    }

    /// Run the front end only: lex, parse and resolve.
    pub fn resolve(&self, name: &str, text: &str) -> (Vec<Resolved>, Vec<Diagnostic>) {
        resolve_document(&Document::new(name, text), &self.options)
    }
}
