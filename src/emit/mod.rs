//! Code emitters: resolved statements → generated Rust source.
//!
//! Each emitter renders one artifact family for one document. A document's
//! contribution is always its own module file, so documents sharing a
//! generated group sit side by side instead of overwriting each other.

pub mod manifest;
pub mod markers;
pub mod port_keys;
pub mod providers;
pub mod type_ids;

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::dsl::ast::{Literal, Number};
use crate::dsl::compile::CompileOptions;
use crate::dsl::names::MappedType;
use crate::dsl::resolve::Resolved;

/// Families of generated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ArtifactKind {
    ActionTypeIds,
    PortKeys,
    ActionProviders,
    MarkerTypeIds,
    MarkerComponents,
    MarkerProviders,
    Manifest,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 7] = [
        ArtifactKind::ActionTypeIds,
        ArtifactKind::PortKeys,
        ArtifactKind::ActionProviders,
        ArtifactKind::MarkerTypeIds,
        ArtifactKind::MarkerComponents,
        ArtifactKind::MarkerProviders,
        ArtifactKind::Manifest,
    ];

    /// Parent module every document's file of this kind is mounted under.
    pub fn module(self) -> &'static str {
        match self {
            ArtifactKind::ActionTypeIds => "action_type_ids",
            ArtifactKind::PortKeys => "port_keys",
            ArtifactKind::ActionProviders => "action_providers",
            ArtifactKind::MarkerTypeIds => "marker_type_ids",
            ArtifactKind::MarkerComponents => "markers",
            ArtifactKind::MarkerProviders => "marker_providers",
            ArtifactKind::Manifest => "manifest",
        }
    }

    pub fn group(self) -> DestinationGroup {
        match self {
            ArtifactKind::MarkerProviders => DestinationGroup::Editor,
            _ => DestinationGroup::Runtime,
        }
    }
}

/// Build target an artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationGroup {
    Runtime,
    /// Needs editor-only capabilities; kept out of runtime builds.
    Editor,
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub group: DestinationGroup,
    /// Module name of the source document.
    pub module: String,
    pub content: String,
}

impl Artifact {
    fn new(kind: ArtifactKind, module: &str, content: String) -> Self {
        Self {
            kind,
            group: kind.group(),
            module: module.to_string(),
            content,
        }
    }

    /// Path relative to the group's output directory.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.kind.module()).join(format!("{}.rs", self.module))
    }
}

/// Everything an emitter needs besides the statements themselves.
pub struct EmitContext<'a> {
    pub document: &'a str,
    pub module: &'a str,
    pub options: &'a CompileOptions,
}

/// Run every emitter in a fixed order.
pub fn emit_all(resolved: &[Resolved], ctx: &EmitContext<'_>) -> Vec<Artifact> {
    [
        type_ids::emit_action_ids(resolved, ctx),
        port_keys::emit(resolved, ctx),
        providers::emit(resolved, ctx),
        type_ids::emit_marker_ids(resolved, ctx),
        markers::emit_components(resolved, ctx),
        markers::emit_providers(resolved, ctx),
        manifest::emit(resolved, ctx),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Indentation-aware string builder for generated source.
pub(crate) struct CodeWriter {
    buf: String,
    indent: usize,
}

impl CodeWriter {
    /// Start a file with the generated-code header.
    pub fn new(document: &str, summary: &str) -> Self {
        let mut w = Self {
            buf: String::new(),
            indent: 0,
        };
        w.line(&format!(
            "// @generated by actiondef from `{document}`. Do not edit by hand."
        ));
        w.line(&format!("//! {summary}"));
        w.blank();
        w
    }

    pub fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.buf.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.buf.push_str("    ");
        }
        let _ = writeln!(self.buf, "{text}");
    }

    pub fn blank(&mut self) {
        if !self.buf.ends_with("\n\n") && !self.buf.ends_with("{\n") {
            self.buf.push('\n');
        }
    }

    /// Write `header {` and indent.
    pub fn open(&mut self, header: &str) {
        self.line(&format!("{header} {{"));
        self.indent += 1;
    }

    /// Dedent and write `}` followed by `suffix`.
    pub fn close(&mut self, suffix: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(&format!("}}{suffix}"));
    }

    /// Indent a bracketed list whose opening line was already written.
    pub fn open_list(&mut self) {
        self.indent += 1;
    }

    /// Dedent, then write `closing` unless it is empty.
    pub fn close_list(&mut self, closing: &str) {
        self.indent = self.indent.saturating_sub(1);
        if !closing.is_empty() {
            self.line(closing);
        }
    }

    pub fn finish(mut self) -> String {
        while self.buf.ends_with("\n\n") {
            self.buf.pop();
        }
        self.buf
    }
}

/// Rust string literal.
pub(crate) fn str_lit(s: &str) -> String {
    format!("{s:?}")
}

/// Rust float literal, preserving the source digits.
pub(crate) fn float_lit(n: &Number) -> String {
    if n.is_integral() {
        format!("{}.0", n.raw)
    } else {
        n.raw.clone()
    }
}

/// Rust float literal for a configured value.
pub(crate) fn f64_lit(v: f64) -> String {
    let s = v.to_string();
    if s.contains('.') {
        s
    } else {
        s + ".0"
    }
}

/// Bare literal suitable for a `TypedKey::with_default` argument.
pub(crate) fn key_default(ty: &MappedType, lit: &Literal) -> String {
    match (ty, lit) {
        (MappedType::Float, Literal::Number(n)) => float_lit(n),
        (_, Literal::Number(n)) => n.raw.clone(),
        (_, Literal::Str(s)) => str_lit(s),
        (_, Literal::Bool(b)) => b.to_string(),
    }
}

/// `Value` expression for provider metadata.
pub(crate) fn value_expr(ty: &MappedType, lit: &Literal) -> String {
    match (ty, lit) {
        (MappedType::Int, Literal::Number(n)) => format!("Value::Int({})", n.raw),
        (_, Literal::Number(n)) => format!("Value::Float({})", float_lit(n)),
        (_, Literal::Str(s)) => format!("Value::Str({})", str_lit(s)),
        (_, Literal::Bool(b)) => format!("Value::Bool({b})"),
    }
}
