//! Identifier derivation and type mapping for generated code.

use super::ast::{TypeId, TypeName};

/// Acronym-aware case folding for a single type-id segment.
///
/// A fully upper-case segment keeps its first character and lower-cases the
/// rest (`VFX` → `Vfx`). Anything else passes through unchanged.
pub fn pascal_segment(segment: &str) -> String {
    let has_upper = segment.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = segment.chars().any(|c| c.is_ascii_lowercase());
    if !has_upper || has_lower {
        return segment.to_string();
    }
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_string() + &chars.as_str().to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Flat identifier for a dotted type id: segments joined in original case.
pub fn concat_name(type_id: &TypeId) -> String {
    type_id.segments.concat()
}

/// Module path that groups a type id's constant: every segment but the last.
pub fn namespace_path(type_id: &TypeId) -> Vec<String> {
    let n = type_id.segments.len().saturating_sub(1);
    type_id.segments[..n]
        .iter()
        .map(|s| pascal_segment(s))
        .collect()
}

/// SCREAMING_SNAKE_CASE for generated constants.
///
/// Word breaks go before an upper-case letter that follows a lower-case
/// letter or digit, and before the last capital of an acronym run
/// (`HTTPServer` → `HTTP_SERVER`).
pub fn const_name(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

/// Module name for a document: lower-case ASCII with `_` separators.
pub fn module_name(document: &str) -> String {
    let mut out = String::new();
    let mut prev = None;
    for c in document.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev.is_some_and(|p: char| p.is_ascii_lowercase()) {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
        prev = Some(c);
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if is_rust_keyword(&out) {
        out.push('_');
    }
    out
}

/// Rust keywords that cannot name a type or module in generated code.
pub fn is_rust_keyword(ident: &str) -> bool {
    matches!(
        ident,
        "as" | "async"
            | "await"
            | "break"
            | "const"
            | "continue"
            | "crate"
            | "dyn"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "self"
            | "Self"
            | "static"
            | "struct"
            | "super"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "abstract"
            | "become"
            | "box"
            | "do"
            | "final"
            | "macro"
            | "override"
            | "priv"
            | "typeof"
            | "unsized"
            | "virtual"
            | "yield"
            | "try"
            | "gen"
    )
}

/// Identifiers that cannot appear in generated code even as raw identifiers.
pub fn is_unusable_ident(ident: &str) -> bool {
    matches!(ident, "self" | "Self" | "super" | "crate" | "_")
}

/// Identifier as written in generated code: keywords become raw identifiers.
pub fn rust_ident(ident: &str) -> String {
    if is_rust_keyword(ident) {
        format!("r#{ident}")
    } else {
        ident.to_string()
    }
}

/// A port type as it appears in generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappedType {
    Float,
    Int,
    Bool,
    Str,
    /// User-supplied type name, passed through untouched.
    Opaque(String),
}

impl MappedType {
    pub fn from_type_name(ty: &TypeName) -> Self {
        match ty {
            TypeName::Float => MappedType::Float,
            TypeName::Int => MappedType::Int,
            TypeName::Bool => MappedType::Bool,
            TypeName::String => MappedType::Str,
            TypeName::Custom(name) => MappedType::Opaque(name.clone()),
        }
    }

    /// The Rust type parameter of the port's `TypedKey`. User types are
    /// spelled out under `types_path`.
    pub fn rust_type(&self, types_path: &str) -> String {
        match self {
            MappedType::Float => "f32".to_string(),
            MappedType::Int => "i32".to_string(),
            MappedType::Bool => "bool".to_string(),
            MappedType::Str => "&'static str".to_string(),
            MappedType::Opaque(name) => format!("{types_path}::{}", rust_ident(name)),
        }
    }

    /// The `ValueType` expression recorded in provider metadata.
    pub fn value_type_expr(&self) -> String {
        match self {
            MappedType::Float => "ValueType::Float".to_string(),
            MappedType::Int => "ValueType::Int".to_string(),
            MappedType::Bool => "ValueType::Bool".to_string(),
            MappedType::Str => "ValueType::Str".to_string(),
            MappedType::Opaque(name) => format!("ValueType::Opaque({name:?})"),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, MappedType::Float | MappedType::Int)
    }

    pub fn dsl_name(&self) -> &str {
        match self {
            MappedType::Float => "float",
            MappedType::Int => "int",
            MappedType::Bool => "bool",
            MappedType::Str => "string",
            MappedType::Opaque(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_id(s: &str) -> TypeId {
        TypeId {
            segments: s.split('.').map(str::to_string).collect(),
        }
    }

    #[test]
    fn pascal_segment_folds_acronyms() {
        assert_eq!(pascal_segment("VFX"), "Vfx");
        assert_eq!(pascal_segment("AI"), "Ai");
        assert_eq!(pascal_segment("CameraShake"), "CameraShake");
        assert_eq!(pascal_segment("camera"), "camera");
        assert_eq!(pascal_segment("UI2"), "Ui2");
        assert_eq!(pascal_segment("_"), "_");
    }

    #[test]
    fn camera_shake_names() {
        let id = type_id("VFX.CameraShake");
        assert_eq!(namespace_path(&id), vec!["Vfx"]);
        assert_eq!(concat_name(&id), "VFXCameraShake");
        assert_eq!(const_name(id.last()), "CAMERA_SHAKE");
    }

    #[test]
    fn single_segment_has_empty_namespace() {
        let id = type_id("Wait");
        assert!(namespace_path(&id).is_empty());
        assert_eq!(concat_name(&id), "Wait");
    }

    #[test]
    fn const_name_word_breaks() {
        assert_eq!(const_name("OnWaveStart"), "ON_WAVE_START");
        assert_eq!(const_name("HTTPServer"), "HTTP_SERVER");
        assert_eq!(const_name("VFXCameraShake"), "VFX_CAMERA_SHAKE");
        assert_eq!(const_name("player2Score"), "PLAYER2_SCORE");
        assert_eq!(const_name("in"), "IN");
        assert_eq!(const_name("max_hp"), "MAX_HP");
        assert_eq!(const_name("Max_Hp"), "MAX_HP");
    }

    #[test]
    fn module_name_from_document() {
        assert_eq!(module_name("combat"), "combat");
        assert_eq!(module_name("VFX Actions"), "vfx_actions");
        assert_eq!(module_name("waveSpawner"), "wave_spawner");
        assert_eq!(module_name("01-intro"), "_01_intro");
        assert_eq!(module_name("mod"), "mod_");
    }

    #[test]
    fn type_mapping_table() {
        let rust = |ty: TypeName| MappedType::from_type_name(&ty).rust_type("crate::types");
        assert_eq!(rust(TypeName::Float), "f32");
        assert_eq!(rust(TypeName::Int), "i32");
        assert_eq!(rust(TypeName::Bool), "bool");
        assert_eq!(rust(TypeName::String), "&'static str");
        assert_eq!(rust(TypeName::Custom("match".into())), "crate::types::r#match");
        let opaque = MappedType::from_type_name(&TypeName::Custom("Prefab".into()));
        assert_eq!(opaque.rust_type("game::types"), "game::types::Prefab");
        assert_eq!(opaque.value_type_expr(), "ValueType::Opaque(\"Prefab\")");
        assert!(!opaque.is_numeric());
    }

    #[test]
    fn keywords_become_raw_identifiers() {
        assert_eq!(rust_ident("type"), "r#type");
        assert_eq!(rust_ident("match"), "r#match");
        assert_eq!(rust_ident("Spawn"), "Spawn");
        assert!(is_unusable_ident("_"));
        assert!(is_unusable_ident("Self"));
        assert!(is_unusable_ident("crate"));
        assert!(!is_unusable_ident("type"));
    }
}
