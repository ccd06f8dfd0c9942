//! Annotates parsed statements with generated names and mapped types.
//!
//! This is also where problems that only show up in generated code are
//! caught: defaults that do not fit the port type, names that fold to the
//! same constant, and identifiers Rust cannot spell even in raw form.
//! Other keywords are kept and written as raw identifiers (`r#type`).

use std::collections::HashMap;

use super::ast::*;
use super::error::Diagnostics;
use super::names::{
    concat_name, const_name, is_unusable_ident, namespace_path, rust_ident, MappedType,
};

/// Implicit flow ports present on every action.
pub const IMPLICIT_FLOW_IN: &str = "in";
pub const IMPLICIT_FLOW_OUT: &str = "out";

#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Action(ResolvedAction),
    Marker(ResolvedMarker),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAction {
    /// Type id exactly as written.
    pub type_id: String,
    /// PascalSegment-folded grouping modules, as Rust identifiers.
    pub namespace: Vec<String>,
    /// Type-id constant inside `namespace`.
    pub id_const: String,
    /// Flat concatenated name, used for the port-key module. Keywords are
    /// already raw identifiers.
    pub class_name: String,
    /// Provider constant.
    pub provider_const: String,
    pub meta: ActionMeta,
    pub ports: Vec<ResolvedPort>,
    pub line: usize,
}

impl ResolvedAction {
    pub fn display_name(&self) -> &str {
        match &self.meta.display_name {
            Some(name) => name.as_str(),
            None => self.type_id.rsplit('.').next().unwrap_or(&self.type_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedPort {
    Flow {
        name: String,
        label: Option<String>,
        const_name: String,
    },
    Data {
        name: String,
        label: Option<String>,
        const_name: String,
        ty: MappedType,
        default: Option<Literal>,
        min: Option<Number>,
        max: Option<Number>,
    },
}

impl ResolvedPort {
    pub fn name(&self) -> &str {
        match self {
            ResolvedPort::Flow { name, .. } | ResolvedPort::Data { name, .. } => name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ResolvedPort::Flow { name, label, .. } | ResolvedPort::Data { name, label, .. } => {
                label.as_deref().unwrap_or(name)
            }
        }
    }

    pub fn const_name(&self) -> &str {
        match self {
            ResolvedPort::Flow { const_name, .. } | ResolvedPort::Data { const_name, .. } => {
                const_name
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMarker {
    /// Type id exactly as written.
    pub name: String,
    /// Component type name in generated code.
    pub ident: String,
    pub id_const: String,
    pub label: Option<String>,
    pub gizmo: Option<Gizmo>,
    pub line: usize,
}

impl ResolvedMarker {
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Resolve every statement, dropping whatever cannot be emitted.
pub fn resolve(statements: &[Statement], diags: &mut Diagnostics) -> Vec<Resolved> {
    let mut claimed: HashMap<String, String> = HashMap::new();
    let mut resolved = Vec::with_capacity(statements.len());

    for statement in statements {
        let item = match statement {
            Statement::Action(action) => resolve_action(action, diags).map(Resolved::Action),
            Statement::Marker(marker) => resolve_marker(marker, diags).map(Resolved::Marker),
        };
        let Some(item) = item else { continue };

        let keys = generated_keys(&item);
        if let Some((key, owner)) = keys
            .iter()
            .find_map(|k| claimed.get(k).map(|owner| (k, owner)))
        {
            diags.semantic(
                format!(
                    "type id '{}' collides with '{owner}' in generated name '{}'",
                    statement.type_id(),
                    key.split_once(':').map_or(key.as_str(), |(_, name)| name)
                ),
                statement.line(),
                1,
            );
            continue;
        }
        for key in keys {
            claimed.insert(key, statement.type_id());
        }
        resolved.push(item);
    }

    resolved
}

/// Names a statement occupies in generated code, prefixed by the artifact
/// they live in.
fn generated_keys(item: &Resolved) -> Vec<String> {
    match item {
        Resolved::Action(a) => {
            let mut path = a.namespace.join("::");
            if !path.is_empty() {
                path.push_str("::");
            }
            vec![
                format!("action_id:{path}{}", a.id_const),
                format!("port_keys:{}", a.class_name),
                format!("provider:{}", a.provider_const),
            ]
        }
        Resolved::Marker(m) => vec![
            format!("marker_id:{}", m.id_const),
            format!("marker:{}", m.ident),
        ],
    }
}

fn resolve_action(action: &ActionDecl, diags: &mut Diagnostics) -> Option<ResolvedAction> {
    let type_id = action.type_id.to_string();
    let namespace = namespace_path(&action.type_id);
    let class_name = concat_name(&action.type_id);
    let id_const = const_name(action.type_id.last());

    if let Some(reserved) = namespace
        .iter()
        .chain([&class_name, &id_const])
        .find(|s| is_unusable_ident(s))
    {
        diags.semantic(
            format!("type id '{type_id}' produces reserved identifier '{reserved}'"),
            action.line,
            1,
        );
        return None;
    }

    let mut ports = Vec::with_capacity(action.ports.len());
    let mut taken: HashMap<String, String> = [IMPLICIT_FLOW_IN, IMPLICIT_FLOW_OUT]
        .iter()
        .map(|name| (const_name(name), name.to_string()))
        .collect();

    for port in &action.ports {
        let Some(resolved) = resolve_port(port, &type_id, diags) else {
            continue;
        };
        if let Some(owner) = taken.get(resolved.const_name()) {
            diags.semantic(
                format!(
                    "port '{}' in action '{type_id}' collides with port '{owner}' as {}",
                    resolved.name(),
                    resolved.const_name()
                ),
                port.line(),
                1,
            );
            continue;
        }
        taken.insert(resolved.const_name().to_string(), resolved.name().to_string());
        ports.push(resolved);
    }

    Some(ResolvedAction {
        id_const,
        provider_const: const_name(&class_name),
        type_id,
        namespace: namespace.iter().map(|s| rust_ident(s)).collect(),
        class_name: rust_ident(&class_name),
        meta: action.meta.clone(),
        ports,
        line: action.line,
    })
}

fn resolve_port(port: &PortDecl, type_id: &str, diags: &mut Diagnostics) -> Option<ResolvedPort> {
    let p = match port {
        PortDecl::Flow(flow) => {
            if is_unusable_ident(&const_name(&flow.name)) {
                diags.semantic(
                    format!(
                        "flow port '{}' in action '{type_id}' has no usable constant name; port dropped",
                        flow.name
                    ),
                    flow.line,
                    1,
                );
                return None;
            }
            return Some(ResolvedPort::Flow {
                name: flow.name.clone(),
                label: flow.label.clone(),
                const_name: const_name(&flow.name),
            })
        }
        PortDecl::Data(p) => p,
    };

    let ty = MappedType::from_type_name(&p.ty);
    if let MappedType::Opaque(name) = &ty {
        if is_unusable_ident(name) {
            diags.semantic(
                format!(
                    "port '{}' in action '{type_id}' has unknown type '{name}'; port dropped",
                    p.name
                ),
                p.line,
                1,
            );
            return None;
        }
    }
    if is_unusable_ident(&const_name(&p.name)) {
        diags.semantic(
            format!(
                "port '{}' in action '{type_id}' has no usable constant name; port dropped",
                p.name
            ),
            p.line,
            1,
        );
        return None;
    }

    let mut default = p.default.clone();
    if let Some(lit) = &default {
        if !literal_fits(&ty, lit) {
            diags.semantic(
                format!(
                    "default of port '{}' does not fit type '{}'; default dropped",
                    p.name,
                    ty.dsl_name()
                ),
                p.line,
                1,
            );
            default = None;
        }
    }

    let (mut min, mut max) = (p.min.clone(), p.max.clone());
    if (min.is_some() || max.is_some()) && !ty.is_numeric() {
        diags.semantic(
            format!(
                "min/max on non-numeric port '{}' of type '{}'; constraint dropped",
                p.name,
                ty.dsl_name()
            ),
            p.line,
            1,
        );
        min = None;
        max = None;
    }
    for (which, bound) in [("min", &mut min), ("max", &mut max)] {
        if let Some(n) = bound {
            if !number_fits(&ty, n) {
                diags.semantic(
                    format!(
                        "{which} {} of port '{}' is out of range for type '{}'; constraint dropped",
                        n.raw,
                        p.name,
                        ty.dsl_name()
                    ),
                    p.line,
                    1,
                );
                *bound = None;
            }
        }
    }
    if let (Some(lo), Some(hi)) = (&min, &max) {
        if lo.value > hi.value {
            diags.warning(
                format!("port '{}' has min {} greater than max {}", p.name, lo.raw, hi.raw),
                p.line,
                1,
            );
        }
    }

    Some(ResolvedPort::Data {
        name: p.name.clone(),
        label: p.label.clone(),
        const_name: const_name(&p.name),
        ty,
        default,
        min,
        max,
    })
}

fn literal_fits(ty: &MappedType, lit: &Literal) -> bool {
    match (ty, lit) {
        (MappedType::Bool, Literal::Bool(_)) => true,
        (MappedType::Str, Literal::Str(_)) => true,
        (_, Literal::Number(n)) => number_fits(ty, n),
        _ => false,
    }
}

/// Whether `n` is representable in the port's generated numeric type.
fn number_fits(ty: &MappedType, n: &Number) -> bool {
    match ty {
        MappedType::Float => n.value.is_finite() && n.value.abs() <= f64::from(f32::MAX),
        MappedType::Int => n.is_integral() && n.raw.parse::<i32>().is_ok(),
        _ => false,
    }
}

fn resolve_marker(marker: &MarkerDecl, diags: &mut Diagnostics) -> Option<ResolvedMarker> {
    if is_unusable_ident(&marker.name) || is_unusable_ident(&const_name(&marker.name)) {
        diags.semantic(
            format!("marker name '{}' is a reserved identifier", marker.name),
            marker.line,
            1,
        );
        return None;
    }
    Some(ResolvedMarker {
        name: marker.name.clone(),
        ident: rust_ident(&marker.name),
        id_const: const_name(&marker.name),
        label: marker.label.clone(),
        gizmo: marker.gizmo.clone(),
        line: marker.line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::error::{DiagnosticKind, Severity};
    use crate::dsl::lexer::Lexer;
    use crate::dsl::parser::Parser;

    fn resolve_src(src: &str) -> (Vec<Resolved>, Diagnostics) {
        let (tokens, _) = Lexer::new("test", src).tokenize();
        let (statements, parse_diags) = Parser::new("test", tokens).parse();
        assert!(parse_diags.is_empty(), "{parse_diags:?}");
        let mut diags = Diagnostics::new("test");
        let resolved = resolve(&statements, &mut diags);
        (resolved, diags)
    }

    fn only_action(resolved: &[Resolved]) -> &ResolvedAction {
        match &resolved[0] {
            Resolved::Action(a) => a,
            other => panic!("expected action, got {other:?}"),
        }
    }

    #[test]
    fn resolves_camera_shake() {
        let (resolved, diags) = resolve_src(
            "action VFX.CameraShake { port float Duration = 0.5 flow OnWaveStart }",
        );
        assert!(diags.is_empty());
        let a = only_action(&resolved);
        assert_eq!(a.type_id, "VFX.CameraShake");
        assert_eq!(a.namespace, vec!["Vfx"]);
        assert_eq!(a.id_const, "CAMERA_SHAKE");
        assert_eq!(a.class_name, "VFXCameraShake");
        assert_eq!(a.provider_const, "VFX_CAMERA_SHAKE");
        assert_eq!(a.display_name(), "CameraShake");
        assert_eq!(a.ports[0].const_name(), "DURATION");
        assert!(matches!(a.ports[1], ResolvedPort::Flow { .. }));
    }

    #[test]
    fn default_type_mismatch_drops_default() {
        let (resolved, diags) = resolve_src(
            "action A { port int Count = 1.5 port bool On = 1 port Prefab P = \"x\" }",
        );
        assert_eq!(diags.len(), 3);
        let a = only_action(&resolved);
        assert_eq!(a.ports.len(), 3);
        for port in &a.ports {
            match port {
                ResolvedPort::Data { default, .. } => assert!(default.is_none()),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn reserved_opaque_type_drops_port() {
        let (resolved, diags) = resolve_src("action A { port self Callback port float X }");
        assert_eq!(diags.len(), 1);
        assert!(diags.into_vec()[0].message.contains("unknown type 'self'"));
        assert_eq!(only_action(&resolved).ports.len(), 1);
    }

    #[test]
    fn keyword_opaque_type_is_kept() {
        let (resolved, diags) = resolve_src("action A { port fn Callback }");
        assert!(diags.is_empty());
        match &only_action(&resolved).ports[0] {
            ResolvedPort::Data { ty, .. } => assert_eq!(ty, &MappedType::Opaque("fn".into())),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn keyword_segments_become_raw_identifiers() {
        let (resolved, diags) = resolve_src("action type.Foo { port float X }\naction Ok { }");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(resolved.len(), 2);
        let a = only_action(&resolved);
        assert_eq!(a.type_id, "type.Foo");
        assert_eq!(a.namespace, vec!["r#type"]);
        assert_eq!(a.class_name, "typeFoo");
        assert_eq!(a.provider_const, "TYPE_FOO");
        assert_eq!(a.ports.len(), 1);

        let (resolved, _) = resolve_src("action match { }");
        assert_eq!(only_action(&resolved).class_name, "r#match");
        assert_eq!(only_action(&resolved).id_const, "MATCH");
    }

    #[test]
    fn unspellable_type_id_drops_statement() {
        let (resolved, diags) = resolve_src("action crate.Foo { }\naction SELF.Bar { }\naction A._ { }");
        let all = diags.into_vec();
        assert_eq!(all.len(), 3);
        assert!(all[1].message.contains("reserved identifier 'Self'"));
        assert!(resolved.is_empty());
    }

    #[test]
    fn int_out_of_range_drops_default_and_bounds() {
        let (resolved, diags) =
            resolve_src("action A { port int N = 99999999999 min -2147483649 max 2147483647 }");
        let all = diags.into_vec();
        assert_eq!(all.len(), 2);
        assert!(all[0].message.contains("default of port 'N'"));
        assert!(all[1].message.contains("min -2147483649 of port 'N' is out of range"));
        match &only_action(&resolved).ports[0] {
            ResolvedPort::Data { default, min, max, .. } => {
                assert!(default.is_none());
                assert!(min.is_none());
                assert_eq!(max.as_ref().map(|n| n.raw.as_str()), Some("2147483647"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn float_beyond_f32_is_rejected() {
        let src = format!(
            "action A {{ port float F = 1{} port float G = 34{} }}",
            "0".repeat(40),
            "0".repeat(37)
        );
        let (resolved, diags) = resolve_src(&src);
        assert_eq!(diags.len(), 1);
        let ports = &only_action(&resolved).ports;
        assert!(matches!(&ports[0], ResolvedPort::Data { default: None, .. }));
        assert!(matches!(&ports[1], ResolvedPort::Data { default: Some(_), .. }));
    }

    #[test]
    fn min_max_on_string_dropped() {
        let (resolved, diags) = resolve_src("action A { port string Name min 1 }");
        assert_eq!(diags.len(), 1);
        match &only_action(&resolved).ports[0] {
            ResolvedPort::Data { min, max, .. } => {
                assert!(min.is_none());
                assert!(max.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn min_above_max_is_a_warning() {
        let (resolved, diags) = resolve_src("action A { port float X min 5 max 1 }");
        let all = diags.into_vec();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].severity, Severity::Warning);
        assert_eq!(only_action(&resolved).ports.len(), 1);
    }

    #[test]
    fn port_colliding_with_implicit_flow() {
        let (resolved, diags) = resolve_src("action A { flow In flow Done }");
        assert_eq!(diags.len(), 1);
        let a = only_action(&resolved);
        assert_eq!(a.ports.len(), 1);
        assert_eq!(a.ports[0].name(), "Done");
    }

    #[test]
    fn folded_port_names_collide() {
        let (resolved, diags) = resolve_src("action A { port float MaxHp port float max_hp }");
        assert_eq!(diags.len(), 1);
        assert_eq!(only_action(&resolved).ports.len(), 1);
    }

    #[test]
    fn folded_type_ids_collide() {
        let (resolved, diags) = resolve_src("action VFX.Shake { }\naction Vfx.Shake { }");
        let all = diags.into_vec();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, DiagnosticKind::Semantic);
        assert_eq!(all[0].line, 2);
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn reserved_marker_name_dropped() {
        let (resolved, diags) = resolve_src("marker Self { }\nmarker _ { }\nmarker Spawn { }");
        assert_eq!(diags.len(), 2);
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn keyword_marker_gets_raw_ident() {
        let (resolved, diags) = resolve_src("marker loop { }");
        assert!(diags.is_empty());
        match &resolved[0] {
            Resolved::Marker(m) => {
                assert_eq!(m.name, "loop");
                assert_eq!(m.ident, "r#loop");
                assert_eq!(m.id_const, "LOOP");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
