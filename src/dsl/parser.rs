//! Recursive-descent parser for definition documents.
//!
//! A syntax error abandons only the top-level statement it occurs in; the
//! parser then resynchronizes at the next `action` or `marker` keyword.
//! Duplicate ports and duplicate type ids are reported as semantic errors
//! and the later declaration is dropped.

use std::collections::HashMap;

use super::ast::*;
use super::error::{Diagnostic, Diagnostics};
use super::token::{Keyword, Token, TokenKind};

/// A structural violation that abandons the current statement.
#[derive(Debug)]
struct SyntaxError {
    message: String,
    line: usize,
    col: usize,
}

type PResult<T> = Result<T, SyntaxError>;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Diagnostics,
    warn_on_repeated_meta: bool,
}

impl Parser {
    pub fn new(document: &str, tokens: Vec<Token>) -> Self {
        let mut tokens = tokens;
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token {
                kind: TokenKind::Eof,
                line,
                col: 1,
            });
        }
        Self {
            tokens,
            pos: 0,
            diagnostics: Diagnostics::new(document),
            warn_on_repeated_meta: false,
        }
    }

    /// Report a warning when a metadata field or marker property is set twice.
    pub fn warn_on_repeated_meta(mut self, enabled: bool) -> Self {
        self.warn_on_repeated_meta = enabled;
        self
    }

    pub fn parse(mut self) -> (Vec<Statement>, Vec<Diagnostic>) {
        let mut statements = Vec::new();
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        while !self.is_at_end() {
            let result = match &self.peek().kind {
                TokenKind::Keyword(Keyword::Action) => self.parse_action().map(Statement::Action),
                TokenKind::Keyword(Keyword::Marker) => self.parse_marker().map(Statement::Marker),
                other => {
                    let t = self.peek();
                    let err = SyntaxError {
                        message: format!("expected 'action' or 'marker', found {other}"),
                        line: t.line,
                        col: t.col,
                    };
                    self.advance();
                    Err(err)
                }
            };

            match result {
                Ok(statement) => {
                    let id = statement.type_id();
                    if let Some(first_line) = first_seen.get(&id) {
                        self.diagnostics.semantic(
                            format!("duplicate type id '{id}' (first declared on line {first_line})"),
                            statement.line(),
                            1,
                        );
                    } else {
                        first_seen.insert(id, statement.line());
                        statements.push(statement);
                    }
                }
                Err(err) => {
                    self.diagnostics.syntax(err.message, err.line, err.col);
                    self.synchronize();
                }
            }
        }

        (statements, self.diagnostics.into_vec())
    }

    // --- Actions ---

    fn parse_action(&mut self) -> PResult<ActionDecl> {
        let line = self.expect_keyword(Keyword::Action)?.line;
        let type_id = self.parse_type_id()?;
        self.expect_open_brace("action", &type_id.to_string())?;

        let mut meta = ActionMeta::default();
        let mut ports: Vec<PortDecl> = Vec::new();
        let mut port_lines: HashMap<String, usize> = HashMap::new();

        loop {
            let t = self.peek().clone();
            match t.kind {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Keyword(Keyword::Port) | TokenKind::Keyword(Keyword::Flow) => {
                    let port = self.parse_port()?;
                    if let Some(first_line) = port_lines.get(port.name()) {
                        self.diagnostics.semantic(
                            format!(
                                "duplicate port name '{}' in action '{type_id}' (first declared on line {first_line})",
                                port.name()
                            ),
                            port.line(),
                            t.col,
                        );
                    } else {
                        port_lines.insert(port.name().to_string(), port.line());
                        ports.push(port);
                    }
                }
                TokenKind::Keyword(kw) if is_meta_keyword(kw) => {
                    self.parse_meta_field(&mut meta)?;
                }
                _ => return Err(self.unclosed_or_unexpected("action", &type_id.to_string())),
            }
        }

        Ok(ActionDecl {
            type_id,
            meta,
            ports,
            line,
        })
    }

    fn parse_type_id(&mut self) -> PResult<TypeId> {
        let mut segments = vec![self.expect_ident("type id")?];
        while self.check(&TokenKind::Dot) {
            self.advance();
            segments.push(self.expect_ident("type id segment")?);
        }
        Ok(TypeId { segments })
    }

    fn parse_meta_field(&mut self, meta: &mut ActionMeta) -> PResult<()> {
        let t = self.advance().clone();
        let TokenKind::Keyword(kw) = t.kind else {
            unreachable!("caller checked for a metadata keyword")
        };

        let repeated = match kw {
            Keyword::DisplayName => meta
                .display_name
                .replace(self.expect_string(kw.as_str())?)
                .is_some(),
            Keyword::Category => meta
                .category
                .replace(self.expect_string(kw.as_str())?)
                .is_some(),
            Keyword::Description => meta
                .description
                .replace(self.expect_string(kw.as_str())?)
                .is_some(),
            Keyword::ThemeColor => {
                let r = self.expect_number("themeColor")?;
                let g = self.expect_number("themeColor")?;
                let b = self.expect_number("themeColor")?;
                meta.theme_color.replace([r, g, b]).is_some()
            }
            Keyword::Duration => {
                let next = self.peek().clone();
                let kind = match next.kind {
                    TokenKind::Keyword(Keyword::Instant) => DurationKind::Instant,
                    TokenKind::Keyword(Keyword::Duration) => DurationKind::Duration,
                    TokenKind::Keyword(Keyword::Passive) => DurationKind::Passive,
                    other => {
                        return Err(SyntaxError {
                            message: format!(
                                "expected 'instant', 'duration' or 'passive', found {other}"
                            ),
                            line: next.line,
                            col: next.col,
                        })
                    }
                };
                self.advance();
                meta.duration.replace(kind).is_some()
            }
            _ => unreachable!("caller checked for a metadata keyword"),
        };

        if repeated && self.warn_on_repeated_meta {
            self.diagnostics.warning(
                format!("repeated '{}' overrides the earlier value", kw.as_str()),
                t.line,
                t.col,
            );
        }
        Ok(())
    }

    // --- Ports ---

    fn parse_port(&mut self) -> PResult<PortDecl> {
        let t = self.advance().clone();
        if t.kind == TokenKind::Keyword(Keyword::Flow) {
            let name = self.expect_ident("flow port name")?;
            let opts = self.parse_port_opts()?;
            if opts.min.is_some() || opts.max.is_some() {
                self.diagnostics.semantic(
                    format!("flow port '{name}' cannot carry min/max; constraint dropped"),
                    t.line,
                    t.col,
                );
            }
            return Ok(PortDecl::Flow(FlowPort {
                name,
                label: opts.label,
                line: t.line,
            }));
        }

        let ty = self.parse_type_name()?;
        let name = self.expect_ident("port name")?;
        let default = if self.check(&TokenKind::Eq) {
            self.advance();
            Some(self.parse_literal()?)
        } else {
            None
        };
        let opts = self.parse_port_opts()?;

        Ok(PortDecl::Data(DataPort {
            ty,
            name,
            default,
            label: opts.label,
            min: opts.min,
            max: opts.max,
            line: t.line,
        }))
    }

    fn parse_port_opts(&mut self) -> PResult<PortOpts> {
        let mut opts = PortOpts::default();
        if self.check_keyword(Keyword::Label) {
            self.advance();
            opts.label = Some(self.expect_string("label")?);
        }
        if self.check_keyword(Keyword::Min) {
            self.advance();
            opts.min = Some(self.expect_number("min")?);
        }
        if self.check_keyword(Keyword::Max) {
            self.advance();
            opts.max = Some(self.expect_number("max")?);
        }
        Ok(opts)
    }

    fn parse_type_name(&mut self) -> PResult<TypeName> {
        let t = self.peek().clone();
        let ty = match t.kind {
            TokenKind::Keyword(Keyword::Float) => TypeName::Float,
            TokenKind::Keyword(Keyword::Int) => TypeName::Int,
            TokenKind::Keyword(Keyword::Bool) => TypeName::Bool,
            TokenKind::Keyword(Keyword::String) => TypeName::String,
            TokenKind::Ident(name) => TypeName::Custom(name),
            other => {
                return Err(SyntaxError {
                    message: format!("expected port type, found {other}"),
                    line: t.line,
                    col: t.col,
                })
            }
        };
        self.advance();
        Ok(ty)
    }

    fn parse_literal(&mut self) -> PResult<Literal> {
        let t = self.peek().clone();
        let lit = match t.kind {
            TokenKind::Number(value, raw) => Literal::Number(Number { value, raw }),
            TokenKind::Str(s) => Literal::Str(s),
            TokenKind::Keyword(Keyword::True) => Literal::Bool(true),
            TokenKind::Keyword(Keyword::False) => Literal::Bool(false),
            other => {
                return Err(SyntaxError {
                    message: format!("expected default value, found {other}"),
                    line: t.line,
                    col: t.col,
                })
            }
        };
        self.advance();
        Ok(lit)
    }

    // --- Markers ---

    fn parse_marker(&mut self) -> PResult<MarkerDecl> {
        let line = self.expect_keyword(Keyword::Marker)?.line;
        let name = self.expect_ident("marker name")?;
        self.expect_open_brace("marker", &name)?;

        let mut label = None;
        let mut gizmo = None;

        loop {
            let t = self.peek().clone();
            let repeated = match t.kind {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Keyword(Keyword::Label) => {
                    self.advance();
                    label.replace(self.expect_string("label")?).is_some()
                }
                TokenKind::Keyword(Keyword::Gizmo) => {
                    self.advance();
                    gizmo.replace(self.parse_gizmo()?).is_some()
                }
                _ => return Err(self.unclosed_or_unexpected("marker", &name)),
            };
            if repeated && self.warn_on_repeated_meta {
                self.diagnostics.warning(
                    format!("repeated {} overrides the earlier value", t.kind),
                    t.line,
                    t.col,
                );
            }
        }

        Ok(MarkerDecl {
            name,
            label,
            gizmo,
            line,
        })
    }

    fn parse_gizmo(&mut self) -> PResult<Gizmo> {
        let t = self.peek().clone();
        let shape = match t.kind {
            TokenKind::Keyword(Keyword::Sphere) => GizmoShape::Sphere,
            TokenKind::Keyword(Keyword::WireSphere) => GizmoShape::WireSphere,
            TokenKind::Keyword(Keyword::Box) => GizmoShape::Box,
            TokenKind::Keyword(Keyword::WireBox) => GizmoShape::WireBox,
            other => {
                return Err(SyntaxError {
                    message: format!("expected gizmo shape, found {other}"),
                    line: t.line,
                    col: t.col,
                })
            }
        };
        self.advance();

        let param = if self.check(&TokenKind::LParen) {
            self.advance();
            let n = self.expect_number("gizmo parameter")?;
            self.expect(&TokenKind::RParen)?;
            Some(n)
        } else {
            None
        };

        Ok(Gizmo { shape, param })
    }

    // --- Utility methods ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        &self.tokens[idx]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn check_keyword(&self, kw: Keyword) -> bool {
        self.peek().kind == TokenKind::Keyword(kw)
    }

    /// Skip to the next token that can start a statement.
    fn synchronize(&mut self) {
        while !self.is_at_end()
            && !self.check_keyword(Keyword::Action)
            && !self.check_keyword(Keyword::Marker)
        {
            self.advance();
        }
    }

    fn error_here(&self, expected: &str) -> SyntaxError {
        let t = self.peek();
        SyntaxError {
            message: format!("expected {expected}, found {}", t.kind),
            line: t.line,
            col: t.col,
        }
    }

    fn unclosed_or_unexpected(&self, what: &str, name: &str) -> SyntaxError {
        let t = self.peek();
        let message = if t.kind == TokenKind::Eof {
            format!("missing '}}' to close {what} '{name}' before end of file")
        } else {
            format!("unexpected {} in {what} '{name}'", t.kind)
        };
        SyntaxError {
            message,
            line: t.line,
            col: t.col,
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<&Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(&kind.to_string()))
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> PResult<&Token> {
        self.expect(&TokenKind::Keyword(kw))
    }

    fn expect_open_brace(&mut self, what: &str, name: &str) -> PResult<()> {
        if self.check(&TokenKind::LBrace) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(&format!("'{{' after {what} '{name}'")))
        }
    }

    fn expect_ident(&mut self, what: &str) -> PResult<String> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error_here(what))
        }
    }

    fn expect_string(&mut self, what: &str) -> PResult<String> {
        if let TokenKind::Str(s) = &self.peek().kind {
            let s = s.clone();
            self.advance();
            Ok(s)
        } else {
            Err(self.error_here(&format!("string after '{what}'")))
        }
    }

    fn expect_number(&mut self, what: &str) -> PResult<Number> {
        if let TokenKind::Number(value, raw) = &self.peek().kind {
            let n = Number {
                value: *value,
                raw: raw.clone(),
            };
            self.advance();
            Ok(n)
        } else {
            Err(self.error_here(&format!("number after '{what}'")))
        }
    }
}

#[derive(Default)]
struct PortOpts {
    label: Option<String>,
    min: Option<Number>,
    max: Option<Number>,
}

fn is_meta_keyword(kw: Keyword) -> bool {
    matches!(
        kw,
        Keyword::DisplayName
            | Keyword::Category
            | Keyword::Description
            | Keyword::ThemeColor
            | Keyword::Duration
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::error::DiagnosticKind;
    use crate::dsl::lexer::Lexer;

    fn parse(src: &str) -> (Vec<Statement>, Vec<Diagnostic>) {
        let (tokens, mut diags) = Lexer::new("test", src).tokenize();
        let (statements, parse_diags) = Parser::new("test", tokens).parse();
        diags.extend(parse_diags);
        (statements, diags)
    }

    fn action(statement: &Statement) -> &ActionDecl {
        match statement {
            Statement::Action(a) => a,
            other => panic!("expected action, got {other:?}"),
        }
    }

    #[test]
    fn parse_empty_document() {
        let (statements, diags) = parse("");
        assert!(statements.is_empty());
        assert!(diags.is_empty());
    }

    #[test]
    fn parse_full_action() {
        let src = r#"
action VFX.CameraShake {
    displayName "镜头震动"
    category "VFX"
    description "Shakes the active camera"
    themeColor 0.8 0.3 0.2
    duration duration
    port float Duration = 0.5 label "时长" min 0 max 10
    port float Frequency = 20.0 label "频率"
    flow OnComplete label "完成"
}
"#;
        let (statements, diags) = parse(src);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(statements.len(), 1);

        let a = action(&statements[0]);
        assert_eq!(a.type_id.segments, vec!["VFX", "CameraShake"]);
        assert_eq!(a.line, 2);
        assert_eq!(a.meta.display_name.as_deref(), Some("镜头震动"));
        assert_eq!(a.meta.category.as_deref(), Some("VFX"));
        assert_eq!(a.meta.duration, Some(DurationKind::Duration));
        let color = a.meta.theme_color.as_ref().unwrap();
        assert_eq!(color[1].raw, "0.3");

        assert_eq!(a.ports.len(), 3);
        match &a.ports[0] {
            PortDecl::Data(p) => {
                assert_eq!(p.ty, TypeName::Float);
                assert_eq!(p.name, "Duration");
                assert_eq!(p.label.as_deref(), Some("时长"));
                assert_eq!(p.min.as_ref().map(|n| n.raw.as_str()), Some("0"));
                assert_eq!(p.max.as_ref().map(|n| n.raw.as_str()), Some("10"));
            }
            other => panic!("expected data port, got {other:?}"),
        }
        match &a.ports[1] {
            PortDecl::Data(p) => {
                assert!(p.min.is_none());
                assert!(p.max.is_none());
            }
            other => panic!("expected data port, got {other:?}"),
        }
        match &a.ports[2] {
            PortDecl::Flow(p) => {
                assert_eq!(p.name, "OnComplete");
                assert_eq!(p.label.as_deref(), Some("完成"));
            }
            other => panic!("expected flow port, got {other:?}"),
        }
    }

    #[test]
    fn parse_custom_type_and_literals() {
        let src = r#"action Spawn {
            port Prefab Target
            port bool Loop = true
            port string Tag = "enemy"
            port int Count = -3
        }"#;
        let (statements, diags) = parse(src);
        assert!(diags.is_empty(), "{diags:?}");
        let a = action(&statements[0]);
        match &a.ports[0] {
            PortDecl::Data(p) => assert_eq!(p.ty, TypeName::Custom("Prefab".into())),
            other => panic!("unexpected {other:?}"),
        }
        match &a.ports[1] {
            PortDecl::Data(p) => assert_eq!(p.default, Some(Literal::Bool(true))),
            other => panic!("unexpected {other:?}"),
        }
        match &a.ports[3] {
            PortDecl::Data(p) => match &p.default {
                Some(Literal::Number(n)) => assert_eq!(n.raw, "-3"),
                other => panic!("unexpected default {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parse_marker_with_gizmo() {
        let src = r#"marker SpawnPoint { label "出生点" gizmo wire_sphere(0.5) }
marker Waypoint { gizmo box }"#;
        let (statements, diags) = parse(src);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(statements.len(), 2);
        match &statements[0] {
            Statement::Marker(m) => {
                assert_eq!(m.name, "SpawnPoint");
                assert_eq!(m.label.as_deref(), Some("出生点"));
                let gizmo = m.gizmo.as_ref().unwrap();
                assert_eq!(gizmo.shape, GizmoShape::WireSphere);
                assert_eq!(gizmo.param.as_ref().unwrap().raw, "0.5");
            }
            other => panic!("unexpected {other:?}"),
        }
        match &statements[1] {
            Statement::Marker(m) => {
                assert_eq!(m.line, 2);
                assert!(m.gizmo.as_ref().unwrap().param.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn repeated_meta_last_write_wins() {
        let src = r#"action A { displayName "one" displayName "two" }"#;
        let (statements, diags) = parse(src);
        assert!(diags.is_empty());
        assert_eq!(
            action(&statements[0]).meta.display_name.as_deref(),
            Some("two")
        );
    }

    #[test]
    fn repeated_meta_warning_when_enabled() {
        let src = "action A {\n displayName \"one\"\n displayName \"two\"\n}";
        let (tokens, _) = Lexer::new("test", src).tokenize();
        let (statements, diags) = Parser::new("test", tokens)
            .warn_on_repeated_meta(true)
            .parse();
        assert_eq!(statements.len(), 1);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Lint);
        assert_eq!(diags[0].line, 3);
    }

    #[test]
    fn duplicate_port_keeps_first() {
        let src = "action A {\n port float Speed = 1\n flow Speed\n}";
        let (statements, diags) = parse(src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Semantic);
        assert_eq!(diags[0].line, 3);
        assert!(diags[0].message.contains("duplicate port name"));

        let a = action(&statements[0]);
        assert_eq!(a.ports.len(), 1);
        assert!(matches!(a.ports[0], PortDecl::Data(_)));
    }

    #[test]
    fn duplicate_type_id_keeps_first() {
        let src = "action A.B { }\n\naction A.B { flow X }\nmarker A.B";
        let (statements, diags) = parse(src);
        // Third statement is a syntax error (dotted marker name).
        let semantic: Vec<_> = diags
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Semantic)
            .collect();
        assert_eq!(semantic.len(), 1);
        assert_eq!(semantic[0].line, 3);
        assert_eq!(statements.len(), 1);
        assert!(action(&statements[0]).ports.is_empty());
    }

    #[test]
    fn action_and_marker_share_id_space() {
        let (statements, diags) = parse("action Spawn { }\nmarker Spawn { }");
        assert_eq!(statements.len(), 1);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 2);
    }

    #[test]
    fn missing_brace_at_eof() {
        let src = "action A { flow Done }\naction B {\n port float X = 1\n";
        let (statements, diags) = parse(src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Syntax);
        assert_eq!(diags[0].line, 4);
        assert!(diags[0].message.contains("end of file"));
        assert_eq!(statements.len(), 1);
        assert_eq!(action(&statements[0]).type_id.to_string(), "A");
    }

    #[test]
    fn missing_brace_before_next_statement() {
        let src = "action A {\n flow Done\naction B { }\nmarker M { }";
        let (statements, diags) = parse(src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 3);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].type_id(), "B");
        assert_eq!(statements[1].type_id(), "M");
    }

    #[test]
    fn syntax_error_abandons_only_current_statement() {
        let src = "action A { port float = 1 }\naction B { flow Go }";
        let (statements, diags) = parse(src);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("port name"));
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].type_id(), "B");
    }

    #[test]
    fn unknown_top_level_token() {
        let (statements, diags) = parse("widget Foo { }\nmarker M { }");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("expected 'action' or 'marker'"));
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn port_opts_must_follow_grammar_order() {
        let (statements, diags) = parse("action A { port float X max 1 min 0 }");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'min'"));
        assert!(statements.is_empty());
    }

    #[test]
    fn flow_port_min_max_dropped() {
        let (statements, diags) = parse("action A { flow Go label \"go\" min 1 }");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Semantic);
        assert_eq!(action(&statements[0]).ports.len(), 1);
    }

    #[test]
    fn bad_duration_kind() {
        let (statements, diags) = parse("action A { duration forever }");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'instant'"));
        assert!(statements.is_empty());
    }

    #[test]
    fn keywords_are_not_names() {
        let (statements, diags) = parse("action A { port float label }");
        assert_eq!(diags.len(), 1);
        assert!(statements.is_empty());
    }
}
