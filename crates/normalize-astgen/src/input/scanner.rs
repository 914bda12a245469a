//! Recursive-descent scanner producing [`FragmentRecord`]s.
//!
//! ```text
//! unit      := decl*
//! decl      := ["export"] ["declare"] (interface | enum) | ";"
//! interface := "interface" Ident [("extends" | "<:") Ident ("," Ident)*] "{" member* "}"
//! member    := Ident ["?"] ":" type-tokens [";" | ","]
//! enum      := "enum" Ident "{" literal (("|" | ",") literal)* [","] "}"
//!            | "enum" Ident "{" (Ident "=" literal [","])* "}"
//! ```

use super::lexer::{Lexer, Token, TokenKind};
use crate::error::SchemaError;
use crate::ir::{FieldMap, FragmentRecord};

/// Scanner configuration.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Field whose single string-literal type marks a concrete variant.
    pub discriminant_key: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            discriminant_key: "type".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{origin}:{line}:{column}: {message}")]
pub struct ScanError {
    pub origin: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl From<ScanError> for SchemaError {
    fn from(err: ScanError) -> Self {
        SchemaError::MalformedFragment {
            origin: format!("{}:{}:{}", err.origin, err.line, err.column),
            reason: err.message,
        }
    }
}

/// Scan every declaration in `source`, in source order.
pub fn scan(
    origin: &str,
    source: &str,
    opts: &ScanOptions,
) -> Result<Vec<FragmentRecord>, ScanError> {
    let mut scanner = Scanner {
        origin,
        source,
        tokens: Lexer::tokenize(source),
        pos: 0,
        opts,
    };
    scanner.unit()
}

struct Scanner<'a> {
    origin: &'a str,
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    opts: &'a ScanOptions,
}

impl<'a> Scanner<'a> {
    fn unit(&mut self) -> Result<Vec<FragmentRecord>, ScanError> {
        let mut records = Vec::new();
        loop {
            match &self.peek().kind {
                TokenKind::Eof => return Ok(records),
                TokenKind::Semi => {
                    self.bump();
                }
                _ => records.push(self.declaration()?),
            }
        }
    }

    fn declaration(&mut self) -> Result<FragmentRecord, ScanError> {
        self.eat_keyword("export");
        self.eat_keyword("declare");
        if self.eat_keyword("interface") {
            self.interface()
        } else if self.eat_keyword("enum") {
            self.enumeration()
        } else {
            Err(self.unexpected("`interface` or `enum`"))
        }
    }

    fn interface(&mut self) -> Result<FragmentRecord, ScanError> {
        let name = self.ident("interface name")?;
        let mut record = FragmentRecord::interface(name);

        if self.eat_keyword("extends") || self.eat(&TokenKind::SubtypeOf) {
            record.extends.push(self.ident("ancestor name")?);
            while self.eat(&TokenKind::Comma) {
                record.extends.push(self.ident("ancestor name")?);
            }
        }

        self.expect(&TokenKind::LBrace, "`{`")?;
        let mut fields = FieldMap::new();
        while !self.eat(&TokenKind::RBrace) {
            let key = self.ident("field name")?;
            self.eat(&TokenKind::Question);
            self.expect(&TokenKind::Colon, "`:` after field name")?;
            let (ty, single) = self.type_expr()?;
            if ty.is_empty() {
                return Err(self.unexpected("a field type"));
            }
            if key == self.opts.discriminant_key {
                record.discriminant = single.and_then(|tok| match tok {
                    TokenKind::Str(raw) => Some(unquote(&raw)).filter(|tag| !tag.is_empty()),
                    _ => None,
                });
            }
            fields.insert(key, ty);
            if !self.eat(&TokenKind::Semi) {
                self.eat(&TokenKind::Comma);
            }
        }
        record.fields = fields;
        Ok(record)
    }

    /// Collect type tokens up to a depth-0 `;`, `,` or the closing `}`.
    /// Also returns the token itself when the type is a single token.
    fn type_expr(&mut self) -> Result<(String, Option<TokenKind>), ScanError> {
        let mut text = String::new();
        let mut count = 0usize;
        let mut first: Option<TokenKind> = None;
        let mut depth = 0usize;
        loop {
            let token = self.peek();
            match &token.kind {
                TokenKind::Eof => {
                    return Err(self.error_at(token, "unterminated interface body"));
                }
                TokenKind::Error(message) => return Err(self.error_at(token, message)),
                TokenKind::Semi | TokenKind::Comma | TokenKind::RBrace if depth == 0 => break,
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket | TokenKind::LAngle => {
                    depth += 1;
                }
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket | TokenKind::RAngle => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            if count > 0 && token.spaced {
                text.push(' ');
            }
            text.push_str(token.span.text(self.source));
            if count == 0 {
                first = Some(token.kind.clone());
            }
            count += 1;
            self.bump();
        }
        let single = if count == 1 { first } else { None };
        Ok((text, single))
    }

    fn enumeration(&mut self) -> Result<FragmentRecord, ScanError> {
        let name = self.ident("enum name")?;
        self.expect(&TokenKind::LBrace, "`{`")?;
        let mut values = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            let named = matches!(&self.peek().kind, TokenKind::Ident(id) if !is_literal_keyword(id));
            if named {
                self.bump();
                self.expect(&TokenKind::Eq, "`=` after enum member name")?;
            }
            values.push(self.literal()?);
            if !self.eat(&TokenKind::Pipe) {
                self.eat(&TokenKind::Comma);
            }
        }
        Ok(FragmentRecord::enumeration(name, values))
    }

    fn literal(&mut self) -> Result<String, ScanError> {
        let token = self.peek();
        let value = match &token.kind {
            TokenKind::Str(raw) | TokenKind::Number(raw) => raw.clone(),
            TokenKind::Ident(id) if is_literal_keyword(id) => id.clone(),
            _ => return Err(self.unexpected("a literal value")),
        };
        self.bump();
        Ok(value)
    }

    fn peek(&self) -> &Token {
        // The token stream always ends in Eof or Error, which are never bumped past.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(&self.peek().kind, TokenKind::Ident(id) if id == keyword) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<(), ScanError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn ident(&mut self, what: &str) -> Result<String, ScanError> {
        match &self.peek().kind {
            TokenKind::Ident(id) => {
                let id = id.clone();
                self.bump();
                Ok(id)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn unexpected(&self, expected: &str) -> ScanError {
        let token = self.peek();
        let found = match &token.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Error(message) => return self.error_at(token, message),
            _ => format!("`{}`", token.span.text(self.source)),
        };
        self.error_at(token, &format!("expected {expected}, found {found}"))
    }

    fn error_at(&self, token: &Token, message: &str) -> ScanError {
        ScanError {
            origin: self.origin.to_string(),
            line: token.span.line,
            column: token.span.column,
            message: message.to_string(),
        }
    }
}

fn is_literal_keyword(id: &str) -> bool {
    matches!(id, "true" | "false" | "null")
}

fn unquote(raw: &str) -> String {
    raw.get(1..raw.len().saturating_sub(1))
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::DeclKind;

    fn scan_ok(source: &str) -> Vec<FragmentRecord> {
        scan("test.ts", source, &ScanOptions::default()).unwrap()
    }

    #[test]
    fn test_interface_with_extends_and_discriminant() {
        let records = scan_ok(
            r#"
            export interface CallExpression extends Expression, HasLocation {
                type: "CallExpression";
                callee: Expression;
                arguments: Array<Expression | SpreadElement>;
                optional?: boolean
            }
            "#,
        );
        assert_eq!(records.len(), 1);
        let call = &records[0];
        assert_eq!(call.kind, DeclKind::Interface);
        assert_eq!(call.extends, vec!["Expression", "HasLocation"]);
        assert_eq!(call.discriminant.as_deref(), Some("CallExpression"));
        assert_eq!(call.fields["type"], "\"CallExpression\"");
        assert_eq!(
            call.fields["arguments"],
            "Array<Expression | SpreadElement>"
        );
        assert_eq!(call.fields["optional"], "boolean");
    }

    #[test]
    fn test_subtype_arrow_and_whitespace_collapse() {
        let records = scan_ok(
            "interface Literal <: Expression { type: \"Literal\"; value: string |\n      boolean   | null; }",
        );
        assert_eq!(records[0].extends, vec!["Expression"]);
        assert_eq!(records[0].fields["value"], "string | boolean | null");
    }

    #[test]
    fn test_union_discriminant_is_not_a_tag() {
        let records = scan_ok(r#"interface Property { type: "Property" | "Init"; }"#);
        assert_eq!(records[0].discriminant, None);
        assert_eq!(records[0].fields["type"], "\"Property\" | \"Init\"");
    }

    #[test]
    fn test_empty_string_discriminant_is_not_a_tag() {
        let records = scan_ok(r#"interface Odd { type: ""; }"#);
        assert_eq!(records[0].discriminant, None);
        assert!(records[0].validate().is_ok());
    }

    #[test]
    fn test_inline_object_field_type() {
        let records = scan_ok(
            "interface TemplateElement { value: { cooked: string; raw: string }; tail: boolean }",
        );
        let fields: Vec<_> = records[0].fields.iter().collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(records[0].fields["value"], "{ cooked: string; raw: string }");
    }

    #[test]
    fn test_enum_forms() {
        let records = scan_ok(
            r#"
            enum UnaryOperator { "-" | "+" | "!" }
            enum LogicalOperator { "||", "&&", }
            declare enum Flags { A = 1, B = 2 }
            "#,
        );
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].kind, DeclKind::Enum);
        assert_eq!(records[0].values, vec!["\"-\"", "\"+\"", "\"!\""]);
        assert_eq!(records[1].values, vec!["\"||\"", "\"&&\""]);
        assert_eq!(records[2].values, vec!["1", "2"]);
    }

    #[test]
    fn test_multiple_declarations_and_comments() {
        let records = scan_ok(
            r#"
            // Nodes
            interface Node { loc: SourceLocation | null; };
            /* Programs */
            interface Program <: Node { type: "Program"; body: [ Statement ]; }
            "#,
        );
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Node", "Program"]);
        assert_eq!(records[1].fields["body"], "[ Statement ]");
    }

    #[test]
    fn test_missing_colon_reports_position() {
        let err = scan("a.ts", "interface A {\n  name string; }", &ScanOptions::default())
            .unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 8);
        assert!(err.message.contains("`:`"), "{}", err.message);
        assert_eq!(err.to_string(), format!("a.ts:2:8: {}", err.message));
    }

    #[test]
    fn test_unterminated_body() {
        let err = scan("a.ts", "interface A { name: string", &ScanOptions::default())
            .unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_scan_error_into_schema_error() {
        let err = scan("a.ts", "type A = string;", &ScanOptions::default()).unwrap_err();
        let schema: SchemaError = err.into();
        assert!(matches!(schema, SchemaError::MalformedFragment { ref origin, .. } if origin == "a.ts:1:1"));
    }

    #[test]
    fn test_custom_discriminant_key() {
        let opts = ScanOptions {
            discriminant_key: "kind".into(),
        };
        let records = scan("a.ts", "interface Id { kind: 'Id'; type: \"x\" }", &opts).unwrap();
        assert_eq!(records[0].discriminant.as_deref(), Some("Id"));
    }
}
