//! Action provider structures: the registration metadata for each action.

use super::{float_lit, str_lit, value_expr, Artifact, ArtifactKind, CodeWriter, EmitContext};
use crate::dsl::ast::{DurationKind, Number};
use crate::dsl::resolve::{
    Resolved, ResolvedAction, ResolvedPort, IMPLICIT_FLOW_IN, IMPLICIT_FLOW_OUT,
};

const DEFAULT_THEME_COLOR: &str = "[1.0, 1.0, 1.0]";

pub fn emit(resolved: &[Resolved], ctx: &EmitContext<'_>) -> Option<Artifact> {
    let actions: Vec<_> = resolved
        .iter()
        .filter_map(|item| match item {
            Resolved::Action(a) => Some(a),
            _ => None,
        })
        .collect();
    if actions.is_empty() {
        return None;
    }

    let mut w = CodeWriter::new(
        ctx.document,
        &format!("Action providers for actions declared in `{}`.", ctx.document),
    );
    w.line(&format!(
        "use {}::{{ActionProvider, DurationKind, PortDef, PropertyDef, Value, ValueType}};",
        ctx.options.runtime_path
    ));

    for a in actions {
        w.blank();
        write_provider(&mut w, a);
    }

    Some(Artifact::new(
        ArtifactKind::ActionProviders,
        ctx.module,
        w.finish(),
    ))
}

fn write_provider(w: &mut CodeWriter, a: &ResolvedAction) {
    let meta = &a.meta;
    w.line(&format!("/// `{}`", a.type_id));
    w.open(&format!("pub const {}: ActionProvider = ActionProvider", a.provider_const));
    w.line(&format!("type_id: {},", str_lit(&a.type_id)));
    w.line(&format!("display_name: {},", str_lit(a.display_name())));
    w.line(&format!(
        "category: {},",
        str_lit(meta.category.as_deref().unwrap_or_default())
    ));
    w.line(&format!(
        "description: {},",
        str_lit(meta.description.as_deref().unwrap_or_default())
    ));
    let color = meta.theme_color.as_ref().map_or_else(
        || DEFAULT_THEME_COLOR.to_string(),
        |[r, g, b]| format!("[{}, {}, {}]", float_lit(r), float_lit(g), float_lit(b)),
    );
    w.line(&format!("theme_color: {color},"));
    w.line(&format!(
        "duration: DurationKind::{},",
        duration_variant(meta.duration.unwrap_or(DurationKind::Instant))
    ));

    w.line("ports: &[");
    w.open_list();
    w.line(&format!(
        "PortDef::flow_in({0}, {0}),",
        str_lit(IMPLICIT_FLOW_IN)
    ));
    w.line(&format!(
        "PortDef::flow_out({0}, {0}),",
        str_lit(IMPLICIT_FLOW_OUT)
    ));
    for port in &a.ports {
        match port {
            ResolvedPort::Flow { name, .. } => w.line(&format!(
                "PortDef::flow_out({}, {}),",
                str_lit(name),
                str_lit(port.label())
            )),
            ResolvedPort::Data { name, ty, .. } => w.line(&format!(
                "PortDef::data_in({}, {}, {}),",
                str_lit(name),
                str_lit(port.label()),
                ty.value_type_expr()
            )),
        }
    }
    w.close_list("],");

    let properties: Vec<_> = a
        .ports
        .iter()
        .filter(|p| matches!(p, ResolvedPort::Data { .. }))
        .collect();
    if properties.is_empty() {
        w.line("properties: &[],");
    } else {
        w.line("properties: &[");
        w.open_list();
        for port in properties {
            write_property(w, port);
        }
        w.close_list("],");
    }

    w.line("scene_requirements: &[],");
    w.close(";");
}

/// A property only lists the builder calls for fields that are present, so
/// an unconstrained property has no `min`/`max` at all.
fn write_property(w: &mut CodeWriter, port: &ResolvedPort) {
    let ResolvedPort::Data {
        name,
        ty,
        default,
        min,
        max,
        ..
    } = port
    else {
        return;
    };

    let mut calls = Vec::new();
    if let Some(lit) = default {
        calls.push(format!(".with_default({})", value_expr(ty, lit)));
    }
    if let Some(n) = min {
        calls.push(format!(".with_min({})", bound(n)));
    }
    if let Some(n) = max {
        calls.push(format!(".with_max({})", bound(n)));
    }

    let head = format!(
        "PropertyDef::new({}, {}, {})",
        str_lit(name),
        str_lit(port.label()),
        ty.value_type_expr()
    );
    if calls.is_empty() {
        w.line(&format!("{head},"));
        return;
    }
    w.line(&head);
    w.open_list();
    let last = calls.len() - 1;
    for (i, call) in calls.iter().enumerate() {
        if i == last {
            w.line(&format!("{call},"));
        } else {
            w.line(call);
        }
    }
    w.close_list("");
}

fn bound(n: &Number) -> String {
    float_lit(n)
}

fn duration_variant(kind: DurationKind) -> &'static str {
    match kind {
        DurationKind::Instant => "Instant",
        DurationKind::Duration => "Duration",
        DurationKind::Passive => "Passive",
    }
}
