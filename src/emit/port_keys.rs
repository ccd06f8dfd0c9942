//! Typed port keys, one module per action.
//!
//! Data ports become `TypedKey<T>` constants. Flow ports, including the
//! implicit `in` and `out`, are plain `PortName`s and never carry a type.
//! Runtime imports live inside each action module and user types are
//! written with their full path, so no action or type name can shadow them.

use super::{key_default, str_lit, Artifact, ArtifactKind, CodeWriter, EmitContext};
use crate::dsl::names::const_name;
use crate::dsl::resolve::{Resolved, ResolvedPort, IMPLICIT_FLOW_IN, IMPLICIT_FLOW_OUT};

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
        &format!("Port keys for actions declared in `{}`.", ctx.document),
    );
    w.line("#![allow(non_snake_case)]");
    let runtime = &ctx.options.runtime_path;

    for a in actions {
        w.blank();
        w.line(&format!("/// Ports of `{}`.", a.type_id));
        w.open(&format!("pub mod {}", a.class_name));
        let typed = a
            .ports
            .iter()
            .any(|p| matches!(p, ResolvedPort::Data { .. }));
        if typed {
            w.line(&format!("use {runtime}::{{PortName, TypedKey}};"));
        } else {
            w.line(&format!("use {runtime}::PortName;"));
        }
        w.blank();
        for implicit in [IMPLICIT_FLOW_IN, IMPLICIT_FLOW_OUT] {
            w.line(&port_name_const(&const_name(implicit), implicit));
        }
        for port in &a.ports {
            match port {
                ResolvedPort::Flow {
                    name, const_name, ..
                } => w.line(&port_name_const(const_name, name)),
                ResolvedPort::Data {
                    name,
                    const_name,
                    ty,
                    default,
                    ..
                } => {
                    let mut init = format!("TypedKey::new({})", str_lit(name));
                    if let Some(lit) = default {
                        init.push_str(&format!(".with_default({})", key_default(ty, lit)));
                    }
                    w.line(&format!(
                        "pub const {const_name}: TypedKey<{}> = {init};",
                        ty.rust_type(&ctx.options.types_path)
                    ));
                }
            }
        }
        w.close("");
    }

    Some(Artifact::new(ArtifactKind::PortKeys, ctx.module, w.finish()))
}

fn port_name_const(const_name: &str, name: &str) -> String {
    format!(
        "pub const {const_name}: PortName = PortName::new({});",
        str_lit(name)
    )
}
