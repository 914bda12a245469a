//! Tokenizer for declaration fragments.
//!
//! Comments are dropped. Each token remembers whether whitespace (or a
//! comment) preceded it so raw type text can be re-assembled with single
//! spaces.

/// Byte range plus the 1-based position of its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    /// String literal, quotes included.
    Str(String),
    Number(String),
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LAngle,
    RAngle,
    Colon,
    Semi,
    Comma,
    Pipe,
    Question,
    Eq,
    /// `<:`, the subtype arrow used as an alternative to `extends`.
    SubtypeOf,
    /// `=>`
    Arrow,
    /// Any other punctuation; only meaningful inside type expressions.
    Punct(char),
    Eof,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Whitespace or a comment separates this token from the previous one.
    pub spaced: bool,
}

pub struct Lexer<'src> {
    source: &'src str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the whole source. The last token is always `Eof`, unless an
    /// `Error` token stops the scan first.
    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let stop = matches!(token.kind, TokenKind::Eof | TokenKind::Error(_));
            tokens.push(token);
            if stop {
                return tokens;
            }
        }
    }

    pub fn next_token(&mut self) -> Token {
        let spaced = match self.skip_trivia() {
            Ok(spaced) => spaced,
            Err((message, start, line, column)) => {
                return Token {
                    kind: TokenKind::Error(message),
                    span: Span {
                        start,
                        end: self.position,
                        line,
                        column,
                    },
                    spaced: true,
                };
            }
        };

        let start = self.position;
        let line = self.line;
        let column = self.column;

        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some(c) => match c {
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '[' => self.single(TokenKind::LBracket),
                ']' => self.single(TokenKind::RBracket),
                '>' => self.single(TokenKind::RAngle),
                ':' => self.single(TokenKind::Colon),
                ';' => self.single(TokenKind::Semi),
                ',' => self.single(TokenKind::Comma),
                '|' => self.single(TokenKind::Pipe),
                '?' => self.single(TokenKind::Question),
                '<' => {
                    self.advance();
                    if self.peek() == Some(':') {
                        self.advance();
                        TokenKind::SubtypeOf
                    } else {
                        TokenKind::LAngle
                    }
                }
                '=' => {
                    self.advance();
                    if self.peek() == Some('>') {
                        self.advance();
                        TokenKind::Arrow
                    } else {
                        TokenKind::Eq
                    }
                }
                '"' | '\'' | '`' => self.scan_string(c),
                c if c.is_ascii_digit() => self.scan_number(),
                '-' if self.peek_second().is_some_and(|n| n.is_ascii_digit()) => {
                    self.scan_number()
                }
                c if is_ident_start(c) => self.scan_ident(),
                c if c.is_ascii_punctuation() => self.single(TokenKind::Punct(c)),
                c => {
                    self.advance();
                    TokenKind::Error(format!("unexpected character `{c}`"))
                }
            },
        };

        Token {
            kind,
            span: Span {
                start,
                end: self.position,
                line,
                column,
            },
            spaced,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.source[self.position..].chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Skip whitespace and comments; report whether anything was skipped.
    fn skip_trivia(&mut self) -> Result<bool, (String, usize, u32, u32)> {
        let before = self.position;
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.advance();
                }
                (Some('/'), Some('/')) => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    let (start, line, column) = (self.position, self.line, self.column);
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err((
                                    "unterminated block comment".to_string(),
                                    start,
                                    line,
                                    column,
                                ));
                            }
                        }
                    }
                }
                _ => return Ok(self.position > before),
            }
        }
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        let start = self.position;
        self.advance();
        loop {
            match self.advance() {
                Some('\\') => {
                    self.advance();
                }
                Some(c) if c == quote => break,
                Some('\n') if quote != '`' => {
                    return TokenKind::Error("unterminated string literal".to_string());
                }
                Some(_) => {}
                None => return TokenKind::Error("unterminated string literal".to_string()),
            }
        }
        TokenKind::Str(self.source[start..self.position].to_string())
    }

    fn scan_number(&mut self) -> TokenKind {
        let start = self.position;
        if self.peek() == Some('-') {
            self.advance();
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
        {
            self.advance();
        }
        TokenKind::Number(self.source[start..self.position].to_string())
    }

    fn scan_ident(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek().is_some_and(is_ident_continue) {
            self.advance();
        }
        TokenKind::Ident(self.source[start..self.position].to_string())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
