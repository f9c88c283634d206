//! Lexer (tokenizer) for Chirp source code.
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the
//! parser. The scan is a single pass over the bytes with one character of
//! lookahead ([`Lexer::peek`]) plus a conditional consume ([`Lexer::expect`]);
//! it never backtracks and it never fails: malformed input is recorded in the
//! [`Reporter`] and scanning continues, so the parser always receives the
//! complete token sequence with a terminal EOF token.

use crate::diagnostics::{DiagnosticKind, Reporter, Severity};
use crate::parser::ast::Span;
use crate::parser::token::{keyword, Token, TokenKind};

/// Single-pass scanner over a source buffer. Tokens borrow the buffer.
pub struct Lexer<'src> {
    source: &'src str,
    cursor: usize,
    line: u32,
    tokens: Vec<Token<'src>>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source string.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            cursor: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire input.
    ///
    /// Diagnostics for malformed lexemes land in `reporter`; the returned
    /// stream always ends with exactly one EOF token.
    pub fn scan(mut self, reporter: &mut Reporter<'src>) -> Vec<Token<'src>> {
        while let Some(byte) = self.bump() {
            let start = self.cursor - 1;
            let line = self.line;

            match byte {
                b' ' | b'\t' | b'\r' => {}
                b'\n' => {
                    self.push(TokenKind::Newline, start, line);
                    self.line += 1;
                }

                b'(' => self.push(TokenKind::LParen, start, line),
                b')' => self.push(TokenKind::RParen, start, line),
                b'[' => self.push(TokenKind::LBracket, start, line),
                b']' => self.push(TokenKind::RBracket, start, line),
                b'{' => self.push(TokenKind::LBrace, start, line),
                b'}' => self.push(TokenKind::RBrace, start, line),
                b',' => self.push(TokenKind::Comma, start, line),
                b'.' => self.push(TokenKind::Dot, start, line),
                b':' => self.push(TokenKind::Colon, start, line),
                b';' => self.push(TokenKind::Semicolon, start, line),
                b'@' => self.push(TokenKind::At, start, line),
                b'?' => self.push(TokenKind::Question, start, line),

                b'+' => {
                    let kind = if self.expect(b'+') {
                        TokenKind::PlusPlus
                    } else if self.expect(b'=') {
                        TokenKind::PlusEqual
                    } else {
                        TokenKind::Plus
                    };
                    self.push(kind, start, line);
                }
                b'-' => {
                    // '->' wins over '--' and '-='.
                    let kind = if self.expect(b'>') {
                        TokenKind::Arrow
                    } else if self.expect(b'-') {
                        TokenKind::MinusMinus
                    } else if self.expect(b'=') {
                        TokenKind::MinusEqual
                    } else {
                        TokenKind::Minus
                    };
                    self.push(kind, start, line);
                }
                b'*' => {
                    let kind = if self.expect(b'*') {
                        TokenKind::StarStar
                    } else if self.expect(b'=') {
                        TokenKind::StarEqual
                    } else {
                        TokenKind::Star
                    };
                    self.push(kind, start, line);
                }
                b'/' => {
                    let kind = if self.expect(b'/') {
                        TokenKind::SlashSlash
                    } else if self.expect(b'=') {
                        TokenKind::SlashEqual
                    } else {
                        TokenKind::Slash
                    };
                    self.push(kind, start, line);
                }
                b'%' => self.push(TokenKind::Modulo, start, line),
                b'=' => {
                    let kind = if self.expect(b'=') {
                        TokenKind::EqualEqual
                    } else {
                        TokenKind::Equal
                    };
                    self.push(kind, start, line);
                }
                b'!' => {
                    let kind = if self.expect(b'=') {
                        TokenKind::BangEqual
                    } else {
                        TokenKind::Bang
                    };
                    self.push(kind, start, line);
                }
                b'<' => {
                    let kind = if self.expect(b'=') {
                        TokenKind::LessEqual
                    } else {
                        TokenKind::Less
                    };
                    self.push(kind, start, line);
                }
                b'>' => {
                    let kind = if self.expect(b'=') {
                        TokenKind::GreaterEqual
                    } else {
                        TokenKind::Greater
                    };
                    self.push(kind, start, line);
                }
                b'&' => {
                    let kind = if self.expect(b'&') {
                        TokenKind::AmpAmp
                    } else {
                        TokenKind::Amp
                    };
                    self.push(kind, start, line);
                }
                b'|' => {
                    let kind = if self.expect(b'|') {
                        TokenKind::BarBar
                    } else {
                        TokenKind::Bar
                    };
                    self.push(kind, start, line);
                }

                b'#' => self.comment_or_marker(start, line),
                b'"' => self.string_literal(start, line, reporter),
                b'0'..=b'9' => self.number_literal(start, line, reporter),
                b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.identifier_or_keyword(start, line),

                _ => {
                    // Skip exactly this one byte and keep scanning.
                    reporter.report(
                        DiagnosticKind::IllegalChar,
                        Span::new(line, start, start),
                        Severity::Abort,
                        "This character is not recognized by the language",
                    );
                }
            }
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, "", self.line, self.source.len()));
        self.tokens
    }

    /// `#` comment to end of line; `#'` keeps the text as a DOC token;
    /// `#[` is the attribute marker.
    fn comment_or_marker(&mut self, start: usize, line: u32) {
        if self.expect(b'[') {
            self.push(TokenKind::HashBracket, start, line);
            return;
        }
        if self.expect(b'\'') {
            let text_start = self.cursor;
            self.skip_to_line_end();
            let lexeme = &self.source[text_start..self.cursor];
            self.tokens
                .push(Token::new(TokenKind::Doc, lexeme, line, text_start));
            return;
        }
        self.skip_to_line_end();
    }

    /// Scan a string literal verbatim. A backslash escapes the following
    /// byte; escape decoding is left to later phases. Reaching EOF first
    /// records a diagnostic but still emits a STRING token spanning to EOF.
    fn string_literal(&mut self, start: usize, line: u32, reporter: &mut Reporter<'src>) {
        loop {
            match self.bump() {
                Some(b'"') => {
                    self.push(TokenKind::Str, start, line);
                    return;
                }
                Some(b'\\') => {
                    if let Some(escaped) = self.bump() {
                        if escaped == b'\n' {
                            self.line += 1;
                        }
                    }
                }
                Some(b'\n') => self.line += 1,
                Some(_) => {}
                None => {
                    let end = self.source.len().saturating_sub(1);
                    reporter.report(
                        DiagnosticKind::NonterminatingStringLiteral,
                        Span::new(line, start, end),
                        Severity::Abort,
                        "This string literal is missing a closing '\"'",
                    );
                    self.push(TokenKind::Str, start, line);
                    return;
                }
            }
        }
    }

    /// Delimit a numeric literal. A `0x`/`0o`/`0b` prefix switches the digit
    /// set; `_` is allowed anywhere as a separator. The lexer only finds the
    /// extent of the lexeme, conversion happens in the parser.
    fn number_literal(&mut self, start: usize, line: u32, reporter: &mut Reporter<'src>) {
        let base = if self.source.as_bytes()[start] == b'0' {
            match self.peek() {
                Some(b'x' | b'X') => {
                    self.cursor += 1;
                    Some(16)
                }
                Some(b'o' | b'O') => {
                    self.cursor += 1;
                    Some(8)
                }
                Some(b'b' | b'B') => {
                    self.cursor += 1;
                    Some(2)
                }
                _ => None,
            }
        } else {
            None
        };

        match base {
            Some(base) => {
                while let Some(byte) = self.peek() {
                    if is_base_digit(byte, base) || byte == b'_' {
                        self.cursor += 1;
                    } else if byte.is_ascii_alphanumeric() || byte == b'.' {
                        // Stop the literal early; the offending byte is
                        // re-scanned as its own token.
                        reporter.report(
                            DiagnosticKind::SyntaxError,
                            Span::new(self.line, self.cursor, self.cursor),
                            Severity::Abort,
                            format!(
                                "'{}' is not a valid digit in a base-{} literal",
                                byte as char, base
                            ),
                        );
                        break;
                    } else {
                        break;
                    }
                }
            }
            None => {
                while let Some(byte) = self.peek() {
                    if byte.is_ascii_digit() || byte == b'_' || byte == b'.' {
                        self.cursor += 1;
                    } else {
                        break;
                    }
                }
            }
        }

        self.push(TokenKind::Number, start, line);
    }

    fn identifier_or_keyword(&mut self, start: usize, line: u32) {
        while let Some(byte) = self.peek() {
            if byte.is_ascii_alphanumeric() || byte == b'_' {
                self.cursor += 1;
            } else {
                break;
            }
        }
        let lexeme = &self.source[start..self.cursor];
        let kind = keyword(lexeme).unwrap_or(TokenKind::Symbol);
        self.push(kind, start, line);
    }

    fn skip_to_line_end(&mut self) {
        while let Some(byte) = self.peek() {
            if byte == b'\n' {
                break;
            }
            self.cursor += 1;
        }
    }

    /// Peek at the current byte without consuming.
    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.cursor).copied()
    }

    /// Consume and return the current byte.
    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.cursor += 1;
        Some(byte)
    }

    /// Consume the current byte only if it matches `want`.
    fn expect(&mut self, want: u8) -> bool {
        if self.peek() == Some(want) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Push a token whose lexeme runs from `start` to the cursor.
    fn push(&mut self, kind: TokenKind, start: usize, line: u32) {
        let lexeme = &self.source[start..self.cursor];
        self.tokens.push(Token::new(kind, lexeme, line, start));
    }
}

fn is_base_digit(byte: u8, base: u32) -> bool {
    (byte as char).to_digit(base).is_some()
}
