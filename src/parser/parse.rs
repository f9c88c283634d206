//! Main parser coordinator.
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure:
//! token-stream helpers, the top-level parse entry point, and statement-level
//! resynchronization.
//!
//! # Parser Architecture
//!
//! Recursive descent with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `statements`: statement dispatch, bindings, if/else, enums, blocks, lists
//! - `expressions`: precedence tiers from assignment down to primary
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! # Failure convention
//!
//! Expression and statement productions return `Option<Node>`. `None` means
//! the production failed after recording a diagnostic in the [`Reporter`];
//! no panic, no exception, no sentinel node. Every caller checks the option
//! before building on top of it. Parsing never aborts: after a failed
//! statement the parser resynchronizes to the next statement boundary and
//! keeps going, so one pass collects every diagnostic in the file.

use crate::diagnostics::{DiagnosticKind, Reporter, Severity};
use crate::parser::ast::{Node, Span};
use crate::parser::token::{Token, TokenKind};

/// Number of entries a parameter, argument, array-element, or enum-variant
/// list may hold before the parser reports an overflow and truncates.
pub const MAX_LIST_ENTRIES: usize = 255;

/// Recursive descent parser over a lexed token stream.
pub struct Parser<'p, 'src> {
    pub(crate) tokens: Vec<Token<'src>>,
    pub(crate) position: usize,
    pub(crate) reporter: &'p mut Reporter<'src>,
}

impl<'p, 'src> Parser<'p, 'src> {
    /// Create a parser over a token stream. The lexer guarantees a terminal
    /// EOF token; an empty stream gets one synthesized so indexing is total.
    pub fn new(tokens: Vec<Token<'src>>, reporter: &'p mut Reporter<'src>) -> Self {
        let mut tokens = tokens;
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, "", 1, 0));
        }
        Self {
            tokens,
            position: 0,
            reporter,
        }
    }

    /// Parse the entire program: a flat list of top-level statements.
    ///
    /// Never fails. Statements that could not be parsed are dropped after
    /// their diagnostics are recorded and parsing resumes at the next
    /// statement boundary.
    pub fn parse_program(&mut self) -> Vec<Node> {
        let mut program = Vec::new();

        loop {
            match self.current().kind {
                TokenKind::Eof => break,
                TokenKind::Newline | TokenKind::Semicolon => self.advance(),
                // Doc comments and attribute markers have no tree shape yet.
                TokenKind::Doc | TokenKind::HashBracket => self.advance(),
                _ => match self.statement() {
                    Some(node) => program.push(node),
                    None => self.synchronize(),
                },
            }
        }

        program
    }

    // ===== Token-stream helpers =====

    /// Current token; indexing past the end yields the terminal EOF token.
    pub(crate) fn current(&self) -> &Token<'src> {
        let index = self.position.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// One token of lookahead, with the same EOF clamping.
    pub(crate) fn peek(&self) -> &Token<'src> {
        let index = (self.position + 1).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub(crate) fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Consume the current token if it matches.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `kind` even when NEWLINE tokens sit in front of it. When the
    /// token is not found the position is restored, newlines included.
    pub(crate) fn eat_ignoring_newlines(&mut self, kind: TokenKind) -> bool {
        let saved = self.position;
        self.skip_newlines();
        if self.eat(kind) {
            true
        } else {
            self.position = saved;
            false
        }
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.current().span()
    }

    /// Record an Abort diagnostic at the given span.
    pub(crate) fn error_at(&mut self, kind: DiagnosticKind, span: Span, message: impl Into<String>) {
        self.reporter.report(kind, span, Severity::Abort, message);
    }

    /// Skip forward to the next statement boundary (NEWLINE, `;`, or EOF).
    /// The boundary token itself is left for the caller to consume.
    pub(crate) fn synchronize(&mut self) {
        while !matches!(
            self.current().kind,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        ) {
            self.advance();
        }
    }
}
