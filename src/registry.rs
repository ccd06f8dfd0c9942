//! Provider registry: type id → manifest entry across all documents.
//!
//! Built once from a batch of compile results and never mutated afterwards.
//! Type ids share one namespace for actions and markers, so a collision
//! between two documents is reported the same way as one inside a document.
//! Generated module names are claimed the same way: two documents whose
//! names fold to one module would write the same files, so only the first
//! keeps it.

use std::collections::BTreeMap;

use crate::dsl::compile::CompileResult;
use crate::dsl::error::{Diagnostic, DiagnosticKind, Severity};
use crate::emit::manifest::{EntryKind, ManifestEntry};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    entries: BTreeMap<String, ManifestEntry>,
    /// Generated module → index of the result that owns it.
    modules: BTreeMap<String, usize>,
}

fn semantic_error(document: &str, line: usize, message: String) -> Diagnostic {
    Diagnostic {
        document: document.to_string(),
        line,
        col: 1,
        severity: Severity::Error,
        kind: DiagnosticKind::Semantic,
        message,
    }
}

impl Registry {
    /// Collect every manifest entry. The first registration of a type id
    /// or generated module wins; later ones are reported and skipped. A
    /// document that loses its module contributes no entries.
    pub fn build(results: &[CompileResult]) -> (Self, Vec<Diagnostic>) {
        let mut entries: BTreeMap<String, ManifestEntry> = BTreeMap::new();
        let mut modules: BTreeMap<String, usize> = BTreeMap::new();
        let mut diagnostics = Vec::new();

        for (index, result) in results.iter().enumerate() {
            if result.module.is_empty() {
                continue;
            }
            if let Some(&owner) = modules.get(&result.module) {
                diagnostics.push(semantic_error(
                    &result.document,
                    1,
                    format!(
                        "document '{}' maps to module '{}' already used by document '{}'",
                        result.document, result.module, results[owner].document
                    ),
                ));
                continue;
            }
            modules.insert(result.module.clone(), index);

            for entry in &result.manifest {
                if let Some(first) = entries.get(&entry.type_id) {
                    diagnostics.push(semantic_error(
                        &entry.document,
                        entry.line,
                        format!(
                            "duplicate type id '{}' (first declared in '{}' on line {})",
                            entry.type_id, first.document, first.line
                        ),
                    ));
                    continue;
                }
                entries.insert(entry.type_id.clone(), entry.clone());
            }
        }

        tracing::debug!(
            entries = entries.len(),
            modules = modules.len(),
            rejected = diagnostics.len(),
            "registry built"
        );
        (Self { entries, modules }, diagnostics)
    }

    /// The results whose artifacts may be written: those that own their
    /// module. `results` must be the slice the registry was built from.
    pub fn writable<'r>(&self, results: &'r [CompileResult]) -> Vec<&'r CompileResult> {
        results
            .iter()
            .enumerate()
            .filter(|(index, result)| self.modules.get(&result.module) == Some(index))
            .map(|(_, result)| result)
            .collect()
    }

    pub fn get(&self, type_id: &str) -> Option<&ManifestEntry> {
        self.entries.get(type_id)
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.entries.contains_key(type_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, ordered by type id.
    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.values()
    }

    pub fn actions(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.iter().filter(|e| e.kind == EntryKind::Action)
    }

    pub fn markers(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.iter().filter(|e| e.kind == EntryKind::Marker)
    }
}
