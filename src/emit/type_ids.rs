//! Type-id constants for actions and markers.

use super::{str_lit, Artifact, ArtifactKind, CodeWriter, EmitContext};
use crate::dsl::resolve::Resolved;

/// Nested `pub mod` blocks, kept in first-use order.
#[derive(Default)]
struct ModuleTree {
    entries: Vec<Entry>,
}

enum Entry {
    Const { name: String, value: String },
    Module { name: String, tree: ModuleTree },
}

impl ModuleTree {
    fn insert(&mut self, path: &[String], name: String, value: String) {
        let Some((head, rest)) = path.split_first() else {
            self.entries.push(Entry::Const { name, value });
            return;
        };
        let existing = self.entries.iter_mut().find_map(|e| match e {
            Entry::Module { name: m, tree } if m == head => Some(tree),
            _ => None,
        });
        match existing {
            Some(tree) => tree.insert(rest, name, value),
            None => {
                let mut tree = ModuleTree::default();
                tree.insert(rest, name, value);
                self.entries.push(Entry::Module {
                    name: head.clone(),
                    tree,
                });
            }
        }
    }

    fn has_modules(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e, Entry::Module { .. }))
    }

    fn write(&self, w: &mut CodeWriter) {
        for entry in &self.entries {
            match entry {
                Entry::Const { name, value } => {
                    w.line(&format!("pub const {name}: &str = {};", str_lit(value)));
                }
                Entry::Module { name, tree } => {
                    w.open(&format!("pub mod {name}"));
                    tree.write(w);
                    w.close("");
                }
            }
        }
    }
}

/// One constant per action type id, grouped by namespace path.
pub fn emit_action_ids(resolved: &[Resolved], ctx: &EmitContext<'_>) -> Option<Artifact> {
    let mut tree = ModuleTree::default();
    for item in resolved {
        if let Resolved::Action(a) = item {
            tree.insert(&a.namespace, a.id_const.clone(), a.type_id.clone());
        }
    }
    if tree.entries.is_empty() {
        return None;
    }

    let mut w = CodeWriter::new(
        ctx.document,
        &format!("Action type ids declared in `{}`.", ctx.document),
    );
    if tree.has_modules() {
        w.line("#![allow(non_snake_case)]");
        w.blank();
    }
    tree.write(&mut w);
    Some(Artifact::new(ArtifactKind::ActionTypeIds, ctx.module, w.finish()))
}

/// One constant per marker name.
pub fn emit_marker_ids(resolved: &[Resolved], ctx: &EmitContext<'_>) -> Option<Artifact> {
    let markers: Vec<_> = resolved
        .iter()
        .filter_map(|item| match item {
            Resolved::Marker(m) => Some(m),
            _ => None,
        })
        .collect();
    if markers.is_empty() {
        return None;
    }

    let mut w = CodeWriter::new(
        ctx.document,
        &format!("Marker type ids declared in `{}`.", ctx.document),
    );
    for m in markers {
        w.line(&format!("pub const {}: &str = {};", m.id_const, str_lit(&m.name)));
    }
    Some(Artifact::new(ArtifactKind::MarkerTypeIds, ctx.module, w.finish()))
}
