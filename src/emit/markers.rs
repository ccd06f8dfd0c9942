//! Marker component skeletons and their editor-side providers.
//!
//! Gizmo shapes are only recorded as comments. Drawing them is up to the
//! editor that consumes the provider.

use super::{f64_lit, str_lit, Artifact, ArtifactKind, CodeWriter, EmitContext};
use crate::dsl::resolve::{Resolved, ResolvedMarker};

fn markers(resolved: &[Resolved]) -> Vec<&ResolvedMarker> {
    resolved
        .iter()
        .filter_map(|item| match item {
            Resolved::Marker(m) => Some(m),
            _ => None,
        })
        .collect()
}

/// Path of a marker's generated type-id constant.
pub fn marker_id_path(ctx: &EmitContext<'_>, marker: &ResolvedMarker) -> String {
    format!(
        "{}::{}::{}::{}",
        ctx.options.generated_path,
        ArtifactKind::MarkerTypeIds.module(),
        ctx.module,
        marker.id_const
    )
}

/// Path of a marker's generated component type.
pub fn component_path(ctx: &EmitContext<'_>, marker: &ResolvedMarker) -> String {
    format!(
        "{}::{}::{}::{}",
        ctx.options.generated_path,
        ArtifactKind::MarkerComponents.module(),
        ctx.module,
        marker.ident
    )
}

pub fn emit_components(resolved: &[Resolved], ctx: &EmitContext<'_>) -> Option<Artifact> {
    let markers = markers(resolved);
    if markers.is_empty() {
        return None;
    }

    let mut w = CodeWriter::new(
        ctx.document,
        &format!("Marker components declared in `{}`.", ctx.document),
    );
    let runtime = &ctx.options.runtime_path;

    for m in markers {
        w.blank();
        for line in m.display_name().lines() {
            w.line(&format!("/// {line}").trim_end());
        }
        if let Some(gizmo) = &m.gizmo {
            let shape = match &gizmo.param {
                Some(p) => format!("{}({})", gizmo.shape.as_str(), p.raw),
                None => gizmo.shape.as_str().to_string(),
            };
            w.line(&format!("// gizmo: {shape}"));
        }
        w.line("#[derive(Debug, Clone, Default)]");
        w.line(&format!("pub struct {};", m.ident));
        w.blank();
        w.open(&format!("impl {runtime}::MarkerComponent for {}", m.ident));
        w.line(&format!(
            "const TYPE_ID: &'static str = {};",
            marker_id_path(ctx, m)
        ));
        w.close("");
    }

    Some(Artifact::new(
        ArtifactKind::MarkerComponents,
        ctx.module,
        w.finish(),
    ))
}

pub fn emit_providers(resolved: &[Resolved], ctx: &EmitContext<'_>) -> Option<Artifact> {
    let markers = markers(resolved);
    if markers.is_empty() {
        return None;
    }

    let mut w = CodeWriter::new(
        ctx.document,
        &format!("Editor marker providers for `{}`.", ctx.document),
    );
    w.line(&format!("use {}::MarkerProvider;", ctx.options.editor_path));

    let spacing = f64_lit(ctx.options.marker_spacing);
    for m in markers {
        w.blank();
        w.open(&format!("pub const {}: MarkerProvider = MarkerProvider", m.id_const));
        w.line(&format!("type_id: {},", str_lit(&m.name)));
        w.line(&format!("display_name: {},", str_lit(m.display_name())));
        w.line(&format!(
            "component_type: {},",
            str_lit(&component_path(ctx, m))
        ));
        w.line(&format!("default_spacing: {spacing},"));
        w.close(";");
    }

    Some(Artifact::new(
        ArtifactKind::MarkerProviders,
        ctx.module,
        w.finish(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::compile::CompileOptions;
    use crate::dsl::Compiler;
    use crate::emit::DestinationGroup;

    fn with_ctx<T>(src: &str, f: impl FnOnce(&[Resolved], &EmitContext<'_>) -> T) -> T {
        let options = CompileOptions::default();
        let (items, diags) = Compiler::default().resolve("level", src);
        assert!(diags.is_empty(), "{diags:?}");
        let ctx = EmitContext {
            document: "level",
            module: "level",
            options: &options,
        };
        f(&items, &ctx)
    }

    #[test]
    fn component_skeleton() {
        let artifact = with_ctx(
            r#"marker SpawnPoint { label "出生点" gizmo wire_sphere(0.5) }"#,
            |items, ctx| emit_components(items, ctx).unwrap(),
        );
        let expected = "\
// @generated by actiondef from `level`. Do not edit by hand.
//! Marker components declared in `level`.

/// 出生点
// gizmo: wire_sphere(0.5)
#[derive(Debug, Clone, Default)]
pub struct SpawnPoint;

impl crate::graph::MarkerComponent for SpawnPoint {
    const TYPE_ID: &'static str = crate::generated::marker_type_ids::level::SPAWN_POINT;
}
";
        assert_eq!(artifact.content, expected);
        assert_eq!(artifact.group, DestinationGroup::Runtime);
    }

    #[test]
    fn marker_named_like_the_trait() {
        let out = with_ctx("marker MarkerComponent { }\nmarker loop { }", |items, ctx| {
            emit_components(items, ctx).unwrap().content
        });
        assert!(!out.contains("use "));
        assert!(out.contains(
            "pub struct MarkerComponent;\n\nimpl crate::graph::MarkerComponent for MarkerComponent {"
        ));
        assert!(out.contains("impl crate::graph::MarkerComponent for r#loop {"));
        assert!(out.contains("crate::generated::marker_type_ids::level::LOOP;"));
    }

    #[test]
    fn multi_line_label_stays_in_doc_comment() {
        let out = with_ctx("marker Gate { label \"North\n\nGate\" }", |items, ctx| {
            emit_components(items, ctx).unwrap().content
        });
        assert!(out.contains("/// North\n///\n/// Gate\n#[derive"));
    }

    #[test]
    fn gizmo_never_becomes_code() {
        let out = with_ctx("marker Zone { gizmo box }", |items, ctx| {
            emit_components(items, ctx).unwrap().content
        });
        assert!(out.contains("// gizmo: box\n"));
        assert_eq!(out.matches("box").count(), 1);
    }

    #[test]
    fn provider_goes_to_editor_group() {
        let artifact = with_ctx("marker Exit { }", |items, ctx| {
            emit_providers(items, ctx).unwrap()
        });
        assert_eq!(artifact.group, DestinationGroup::Editor);
        assert!(artifact.content.contains("use crate::editor::MarkerProvider;"));
        assert!(artifact.content.contains(
            "pub const EXIT: MarkerProvider = MarkerProvider {\n    type_id: \"Exit\",\n    display_name: \"Exit\",\n    component_type: \"crate::generated::markers::level::Exit\",\n    default_spacing: 1.0,\n};\n"
        ));
    }

    #[test]
    fn actions_produce_no_marker_artifacts() {
        let (a, b) = with_ctx("action A { }", |items, ctx| {
            (emit_components(items, ctx), emit_providers(items, ctx))
        });
        assert!(a.is_none());
        assert!(b.is_none());
    }
}
