//! Registration manifest.
//!
//! Lists every provider a document produced, both as generated source (for
//! a build-time registration step) and as typed [`ManifestEntry`] values
//! the host can feed into a [`crate::registry::Registry`].

use serde::Serialize;

use super::markers::component_path;
use super::{Artifact, ArtifactKind, CodeWriter, DestinationGroup, EmitContext};
use crate::dsl::resolve::Resolved;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Action,
    Marker,
}

/// One registrable provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub type_id: String,
    pub kind: EntryKind,
    pub document: String,
    pub line: usize,
    /// Full path of the generated provider constant.
    pub provider: String,
    /// Full path of the generated component type, for markers.
    pub component: Option<String>,
    pub group: DestinationGroup,
}

pub fn entries(resolved: &[Resolved], ctx: &EmitContext<'_>) -> Vec<ManifestEntry> {
    resolved
        .iter()
        .map(|item| match item {
            Resolved::Action(a) => ManifestEntry {
                type_id: a.type_id.clone(),
                kind: EntryKind::Action,
                document: ctx.document.to_string(),
                line: a.line,
                provider: format!(
                    "{}::{}::{}::{}",
                    ctx.options.generated_path,
                    ArtifactKind::ActionProviders.module(),
                    ctx.module,
                    a.provider_const
                ),
                component: None,
                group: ArtifactKind::ActionProviders.group(),
            },
            Resolved::Marker(m) => ManifestEntry {
                type_id: m.name.clone(),
                kind: EntryKind::Marker,
                document: ctx.document.to_string(),
                line: m.line,
                provider: format!(
                    "{}::{}::{}::{}",
                    ctx.options.editor_generated_path,
                    ArtifactKind::MarkerProviders.module(),
                    ctx.module,
                    m.id_const
                ),
                component: Some(component_path(ctx, m)),
                group: ArtifactKind::MarkerProviders.group(),
            },
        })
        .collect()
}

/// Runtime manifest: every action provider plus every marker type id.
pub fn emit(resolved: &[Resolved], ctx: &EmitContext<'_>) -> Option<Artifact> {
    if resolved.is_empty() {
        return None;
    }

    let mut providers = Vec::new();
    let mut marker_ids = Vec::new();
    for item in resolved {
        match item {
            Resolved::Action(a) => providers.push(a.provider_const.as_str()),
            Resolved::Marker(m) => marker_ids.push(m.id_const.as_str()),
        }
    }

    let generated = &ctx.options.generated_path;
    let mut w = CodeWriter::new(
        ctx.document,
        &format!("Registration manifest for `{}`.", ctx.document),
    );
    w.line(&format!("use {}::ActionProvider;", ctx.options.runtime_path));
    w.blank();
    // Only import modules this document actually generated.
    if !providers.is_empty() {
        w.line(&format!(
            "use {generated}::{}::{} as providers;",
            ArtifactKind::ActionProviders.module(),
            ctx.module
        ));
    }
    if !marker_ids.is_empty() {
        w.line(&format!(
            "use {generated}::{}::{} as marker_ids;",
            ArtifactKind::MarkerTypeIds.module(),
            ctx.module
        ));
    }
    w.blank();

    write_slice(
        &mut w,
        "pub const ACTION_PROVIDERS: &[ActionProvider] = &[",
        "providers",
        &providers,
    );
    w.blank();
    write_slice(
        &mut w,
        "pub const MARKER_TYPE_IDS: &[&str] = &[",
        "marker_ids",
        &marker_ids,
    );

    Some(Artifact::new(ArtifactKind::Manifest, ctx.module, w.finish()))
}

fn write_slice(w: &mut CodeWriter, head: &str, module: &str, items: &[&str]) {
    if items.is_empty() {
        w.line(&format!("{head}];"));
        return;
    }
    w.line(head);
    w.open_list();
    for item in items {
        w.line(&format!("{module}::{item},"));
    }
    w.close_list("];");
}
