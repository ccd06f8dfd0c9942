//! Compile pipeline: document text → artifacts + diagnostics.
//!
//! Runs lexer, parser, resolver and every emitter in sequence. Each stage
//! reports into the shared diagnostics list and passes on whatever is still
//! valid, so a compile always returns a result.

use serde::{Deserialize, Serialize};

use super::error::{Diagnostic, Diagnostics};
use super::lexer::Lexer;
use super::names::module_name;
use super::parser::Parser;
use super::resolve::{resolve, Resolved};
use crate::emit::manifest::{self, ManifestEntry};
use crate::emit::{emit_all, Artifact, ArtifactKind, EmitContext};

/// One source text unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub text: String,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Knobs that shape generated code. All paths are Rust module paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Module providing `TypedKey`, `PortName`, `ActionProvider` and friends.
    pub runtime_path: String,
    /// Module providing `MarkerProvider`.
    pub editor_path: String,
    /// Mount point of generated runtime modules.
    pub generated_path: String,
    /// Mount point of generated editor modules.
    pub editor_generated_path: String,
    /// Module exporting user-supplied port types.
    pub types_path: String,
    pub marker_spacing: f64,
    pub warn_on_repeated_meta: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            runtime_path: "crate::graph".to_string(),
            editor_path: "crate::editor".to_string(),
            generated_path: "crate::generated".to_string(),
            editor_generated_path: "crate::editor::generated".to_string(),
            types_path: "crate::types".to_string(),
            marker_spacing: 1.0,
            warn_on_repeated_meta: false,
        }
    }
}

/// Everything produced from one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileResult {
    pub document: String,
    /// Module name the document's artifacts are filed under.
    pub module: String,
    pub artifacts: Vec<Artifact>,
    pub diagnostics: Vec<Diagnostic>,
    pub manifest: Vec<ManifestEntry>,
}

impl CompileResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }
}

/// Lex, parse and resolve, stopping before emission.
pub fn resolve_document(
    doc: &Document,
    options: &CompileOptions,
) -> (Vec<Resolved>, Vec<Diagnostic>) {
    let mut diags = Diagnostics::new(doc.name.as_str());

    let (tokens, lex_diags) = Lexer::new(&doc.name, &doc.text).tokenize();
    tracing::debug!(document = %doc.name, tokens = tokens.len(), "lexed");
    diags.extend(lex_diags);

    let (statements, parse_diags) = Parser::new(&doc.name, tokens)
        .warn_on_repeated_meta(options.warn_on_repeated_meta)
        .parse();
    tracing::debug!(document = %doc.name, statements = statements.len(), "parsed");
    diags.extend(parse_diags);

    let resolved = resolve(&statements, &mut diags);
    (resolved, diags.into_vec())
}

/// Compile one document into its artifact set.
pub fn compile_document(doc: &Document, options: &CompileOptions) -> CompileResult {
    let module = module_name(&doc.name);
    if module.is_empty() {
        let mut diags = Diagnostics::new(doc.name.as_str());
        diags.semantic(
            format!("document name '{}' does not yield a module name", doc.name),
            1,
            1,
        );
        return CompileResult {
            document: doc.name.clone(),
            module,
            artifacts: Vec::new(),
            diagnostics: diags.into_vec(),
            manifest: Vec::new(),
        };
    }

    let (resolved, diagnostics) = resolve_document(doc, options);
    let ctx = EmitContext {
        document: &doc.name,
        module: &module,
        options,
    };
    let artifacts = emit_all(&resolved, &ctx);
    let manifest = manifest::entries(&resolved, &ctx);
    tracing::debug!(
        document = %doc.name,
        artifacts = artifacts.len(),
        diagnostics = diagnostics.len(),
        "emitted"
    );

    CompileResult {
        document: doc.name.clone(),
        module,
        artifacts,
        diagnostics,
        manifest,
    }
}
