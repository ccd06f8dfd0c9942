//! Token types for the definition-document lexer.

use std::fmt;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),

    // Literals
    Ident(String),
    Str(String),
    /// Parsed value plus the text exactly as written.
    Number(f64, String),

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    Dot,
    Eq,

    Eof,
}

/// Reserved words of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Action,
    Marker,
    DisplayName,
    Category,
    Description,
    ThemeColor,
    Duration,
    Instant,
    Passive,
    Port,
    Flow,
    Label,
    Min,
    Max,
    Gizmo,
    Float,
    Int,
    Bool,
    String,
    True,
    False,
    Sphere,
    WireSphere,
    Box,
    WireBox,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        let kw = match word {
            "action" => Keyword::Action,
            "marker" => Keyword::Marker,
            "displayName" => Keyword::DisplayName,
            "category" => Keyword::Category,
            "description" => Keyword::Description,
            "themeColor" => Keyword::ThemeColor,
            "duration" => Keyword::Duration,
            "instant" => Keyword::Instant,
            "passive" => Keyword::Passive,
            "port" => Keyword::Port,
            "flow" => Keyword::Flow,
            "label" => Keyword::Label,
            "min" => Keyword::Min,
            "max" => Keyword::Max,
            "gizmo" => Keyword::Gizmo,
            "float" => Keyword::Float,
            "int" => Keyword::Int,
            "bool" => Keyword::Bool,
            "string" => Keyword::String,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "sphere" => Keyword::Sphere,
            "wire_sphere" => Keyword::WireSphere,
            "box" => Keyword::Box,
            "wire_box" => Keyword::WireBox,
            _ => return None,
        };
        Some(kw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Action => "action",
            Keyword::Marker => "marker",
            Keyword::DisplayName => "displayName",
            Keyword::Category => "category",
            Keyword::Description => "description",
            Keyword::ThemeColor => "themeColor",
            Keyword::Duration => "duration",
            Keyword::Instant => "instant",
            Keyword::Passive => "passive",
            Keyword::Port => "port",
            Keyword::Flow => "flow",
            Keyword::Label => "label",
            Keyword::Min => "min",
            Keyword::Max => "max",
            Keyword::Gizmo => "gizmo",
            Keyword::Float => "float",
            Keyword::Int => "int",
            Keyword::Bool => "bool",
            Keyword::String => "string",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Sphere => "sphere",
            Keyword::WireSphere => "wire_sphere",
            Keyword::Box => "box",
            Keyword::WireBox => "wire_box",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(kw) => write!(f, "'{}'", kw.as_str()),
            TokenKind::Ident(name) => write!(f, "identifier '{name}'"),
            TokenKind::Str(s) => write!(f, "string \"{s}\""),
            TokenKind::Number(_, raw) => write!(f, "number {raw}"),
            TokenKind::LBrace => f.write_str("'{'"),
            TokenKind::RBrace => f.write_str("'}'"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::Dot => f.write_str("'.'"),
            TokenKind::Eq => f.write_str("'='"),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}
