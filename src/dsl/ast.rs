//! Abstract syntax tree for definition documents.

/// A top-level statement, kept in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Action(ActionDecl),
    Marker(MarkerDecl),
}

impl Statement {
    /// The identifier this statement registers under.
    pub fn type_id(&self) -> String {
        match self {
            Statement::Action(action) => action.type_id.to_string(),
            Statement::Marker(marker) => marker.name.clone(),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Statement::Action(action) => action.line,
            Statement::Marker(marker) => marker.line,
        }
    }
}

/// A dotted type identifier such as `VFX.CameraShake`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeId {
    pub segments: Vec<String>,
}

impl TypeId {
    pub fn last(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionDecl {
    pub type_id: TypeId,
    pub meta: ActionMeta,
    pub ports: Vec<PortDecl>,
    pub line: usize,
}

/// Optional metadata fields. Absent fields fall back to emitter defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionMeta {
    pub display_name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub theme_color: Option<[Number; 3]>,
    pub duration: Option<DurationKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationKind {
    Instant,
    Duration,
    Passive,
}

/// A numeric literal: value plus the exact source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub value: f64,
    pub raw: String,
}

impl Number {
    pub fn is_integral(&self) -> bool {
        !self.raw.contains('.')
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PortDecl {
    Data(DataPort),
    Flow(FlowPort),
}

impl PortDecl {
    pub fn name(&self) -> &str {
        match self {
            PortDecl::Data(port) => &port.name,
            PortDecl::Flow(port) => &port.name,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            PortDecl::Data(port) => port.line,
            PortDecl::Flow(port) => port.line,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPort {
    pub ty: TypeName,
    pub name: String,
    pub default: Option<Literal>,
    pub label: Option<String>,
    pub min: Option<Number>,
    pub max: Option<Number>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowPort {
    pub name: String,
    pub label: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    Float,
    Int,
    Bool,
    String,
    Custom(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(Number),
    Str(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDecl {
    pub name: String,
    pub label: Option<String>,
    pub gizmo: Option<Gizmo>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gizmo {
    pub shape: GizmoShape,
    pub param: Option<Number>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoShape {
    Sphere,
    WireSphere,
    Box,
    WireBox,
}

impl GizmoShape {
    pub fn as_str(self) -> &'static str {
        match self {
            GizmoShape::Sphere => "sphere",
            GizmoShape::WireSphere => "wire_sphere",
            GizmoShape::Box => "box",
            GizmoShape::WireBox => "wire_box",
        }
    }
}
