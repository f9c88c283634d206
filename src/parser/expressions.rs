//! Expression parsing implementation.
//!
//! One method per precedence tier, lowest binding power first:
//!
//! assignment → logical_or → logical_and → comparison → equality → term
//! (`+ -`) → factor (`* / // %`) → unary → lookup (`expr[expr]`) → call →
//! function literal → primary
//!
//! Binary and logical tiers parse exactly one operator application and
//! recurse into the same tier for the right operand, which makes same-tier
//! chains right-associative by construction. Call and lookup chains are
//! iterative and group left-to-right.
//!
//! Every tier returns `Option<Node>`: `None` after an ExpectedExpression (or
//! more specific) diagnostic has been recorded. All parsing methods are
//! `pub(crate)` methods on the [`Parser`] struct.

use crate::diagnostics::DiagnosticKind;
use crate::parser::ast::{operator_from_token, Node, Op};
use crate::parser::parse::{Parser, MAX_LIST_ENTRIES};
use crate::parser::token::{Token, TokenKind};

impl<'p, 'src> Parser<'p, 'src> {
    /// Parse an expression (top-level entry point).
    pub(crate) fn expression(&mut self) -> Option<Node> {
        // Expressions may continue on the next line, e.g. after `=`.
        while matches!(
            self.current().kind,
            TokenKind::Newline | TokenKind::Semicolon
        ) {
            self.advance();
        }
        self.assignment()
    }

    /// `expr -> expr`, `expr += expr`, and friends (right-associative).
    fn assignment(&mut self) -> Option<Node> {
        let expr = self.logical_or()?;

        if matches!(
            self.current().kind,
            TokenKind::Arrow
                | TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::StarEqual
                | TokenKind::SlashEqual
        ) {
            let op_token = *self.current();
            let op = operator_from_token(op_token.kind)?;
            self.advance();
            let value = self.expression()?;

            if !matches!(expr, Node::Symbol { .. } | Node::Lookup { .. }) {
                self.error_at(
                    DiagnosticKind::SyntaxError,
                    expr.span(),
                    "Only identifiers and lookups can be assigned to",
                );
                return None;
            }

            return Some(Node::Assignment {
                op,
                assignee: Box::new(expr),
                value: Box::new(value),
                span: op_token.span(),
            });
        }

        Some(expr)
    }

    fn logical_or(&mut self) -> Option<Node> {
        let left = self.logical_and()?;
        if self.check(TokenKind::BarBar) {
            let span = self.current_span();
            self.advance();
            let right = self.logical_or()?;
            return Some(Node::Logical {
                op: Op::LogicalOr,
                left: Box::new(left),
                right: Box::new(right),
                span,
            });
        }
        Some(left)
    }

    fn logical_and(&mut self) -> Option<Node> {
        let left = self.comparison()?;
        if self.check(TokenKind::AmpAmp) {
            let span = self.current_span();
            self.advance();
            let right = self.logical_and()?;
            return Some(Node::Logical {
                op: Op::LogicalAnd,
                left: Box::new(left),
                right: Box::new(right),
                span,
            });
        }
        Some(left)
    }

    /// `< <= > >=`
    fn comparison(&mut self) -> Option<Node> {
        let left = self.equality()?;
        if matches!(
            self.current().kind,
            TokenKind::Less | TokenKind::LessEqual | TokenKind::Greater | TokenKind::GreaterEqual
        ) {
            let op = operator_from_token(self.current().kind)?;
            let span = self.current_span();
            self.advance();
            let right = self.comparison()?;
            return Some(Node::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            });
        }
        Some(left)
    }

    /// `== !=`
    fn equality(&mut self) -> Option<Node> {
        let left = self.term()?;
        if matches!(
            self.current().kind,
            TokenKind::EqualEqual | TokenKind::BangEqual
        ) {
            let op = operator_from_token(self.current().kind)?;
            let span = self.current_span();
            self.advance();
            let right = self.equality()?;
            return Some(Node::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            });
        }
        Some(left)
    }

    /// `+ -`
    fn term(&mut self) -> Option<Node> {
        let left = self.factor()?;
        if matches!(self.current().kind, TokenKind::Plus | TokenKind::Minus) {
            let op = operator_from_token(self.current().kind)?;
            let span = self.current_span();
            self.advance();
            let right = self.term()?;
            return Some(Node::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            });
        }
        Some(left)
    }

    /// `* / // % **`
    fn factor(&mut self) -> Option<Node> {
        let left = self.unary()?;
        if matches!(
            self.current().kind,
            TokenKind::Star
                | TokenKind::StarStar
                | TokenKind::Slash
                | TokenKind::SlashSlash
                | TokenKind::Modulo
        ) {
            let op = operator_from_token(self.current().kind)?;
            let span = self.current_span();
            self.advance();
            let right = self.factor()?;
            return Some(Node::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            });
        }
        Some(left)
    }

    /// Prefix `- ! ++ --`.
    fn unary(&mut self) -> Option<Node> {
        let op = match self.current().kind {
            TokenKind::Minus => Some(Op::Negate),
            TokenKind::Bang => Some(Op::Not),
            TokenKind::PlusPlus => Some(Op::Increment),
            TokenKind::MinusMinus => Some(Op::Decrement),
            _ => None,
        };
        if let Some(op) = op {
            let span = self.current_span();
            self.advance();
            let operand = self.unary()?;
            return Some(Node::Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }
        self.lookup()
    }

    /// Iterative `expr[expr]` chains, grouping left-to-right.
    fn lookup(&mut self) -> Option<Node> {
        let mut expr = self.call()?;
        while self.check(TokenKind::LBracket) {
            let span = self.current_span();
            self.advance();
            let index = self.expression()?;
            if !self.eat_ignoring_newlines(TokenKind::RBracket) {
                // Assume the ']' was intended and continue.
                self.error_at(
                    DiagnosticKind::SyntaxError,
                    self.current_span(),
                    "Expected a ']' to close this lookup",
                );
            }
            expr = Node::Lookup {
                target: Box::new(expr),
                index: Box::new(index),
                span,
            };
        }
        Some(expr)
    }

    /// Iterative `expr(args)` chains, grouping left-to-right.
    fn call(&mut self) -> Option<Node> {
        let mut expr = self.function_literal()?;
        while self.check(TokenKind::LParen) {
            let span = self.current_span();
            self.advance();
            let args = self.call_arguments();
            expr = Node::Call {
                callee: Box::new(expr),
                args,
                span,
            };
        }
        Some(expr)
    }

    /// Comma-separated call arguments, already past the opening `(`.
    ///
    /// `name = expr` builds an Assignment with the initializer operator (a
    /// keyword argument). The list is capped at [`MAX_LIST_ENTRIES`]: the
    /// first overflow records one TooManyArgs diagnostic, entries past the
    /// cap are parsed but discarded so the `)` is still found.
    fn call_arguments(&mut self) -> Vec<Node> {
        let mut args = Vec::new();
        let mut overflowed = false;

        loop {
            self.skip_newlines();
            if self.eat(TokenKind::RParen) {
                break;
            }
            if self.at_end() {
                self.error_at(
                    DiagnosticKind::SyntaxError,
                    self.current_span(),
                    "Expected a ')' to close this call",
                );
                break;
            }

            let entry_span = self.current_span();
            let Some(expr) = self.expression() else {
                // The entry's diagnostics are recorded; resume at the next
                // separator or give the list up rather than retry in place.
                self.recover_in_list();
                if self.eat(TokenKind::Comma) {
                    continue;
                }
                self.eat_ignoring_newlines(TokenKind::RParen);
                break;
            };

            // Keyword argument: name = value.
            let arg = if self.check(TokenKind::Equal) {
                let eq_span = self.current_span();
                self.advance();
                match self.expression() {
                    Some(value) => Node::Assignment {
                        op: Op::Initializer,
                        assignee: Box::new(expr),
                        value: Box::new(value),
                        span: eq_span,
                    },
                    None => {
                        self.recover_in_list();
                        if self.eat(TokenKind::Comma) {
                            continue;
                        }
                        self.eat_ignoring_newlines(TokenKind::RParen);
                        break;
                    }
                }
            } else {
                expr
            };

            if args.len() == MAX_LIST_ENTRIES {
                if !overflowed {
                    self.error_at(
                        DiagnosticKind::TooManyArgs,
                        entry_span,
                        format!("A call takes at most {} arguments", MAX_LIST_ENTRIES),
                    );
                    overflowed = true;
                }
            } else {
                args.push(arg);
            }

            if self.eat(TokenKind::Comma) {
                continue;
            }
            if self.eat_ignoring_newlines(TokenKind::RParen) {
                break;
            }
            self.error_at(
                DiagnosticKind::SyntaxError,
                self.current_span(),
                "Expected a ',' to continue this call's arguments, or a ')' to close it",
            );
            break;
        }

        args
    }

    /// `function (params) [: return-type] { block }`
    fn function_literal(&mut self) -> Option<Node> {
        if !self.check(TokenKind::Function) {
            return self.primary();
        }
        let span = self.current_span();
        self.advance();

        if !self.eat(TokenKind::LParen) {
            // Assume the '(' was intended and parse the list anyway.
            self.error_at(
                DiagnosticKind::SyntaxError,
                self.current_span(),
                "Expected a '(' to open this function's parameters",
            );
        }
        let params = self.function_parameters();

        let return_type = if self.eat(TokenKind::Colon) {
            self.expression().map(Box::new)
        } else {
            None
        };

        let body = if self.eat_ignoring_newlines(TokenKind::LBrace) {
            self.block()
        } else {
            self.error_at(
                DiagnosticKind::SyntaxError,
                self.current_span(),
                "Expected a '{' to open this function's body",
            );
            Node::Block {
                stmts: Vec::new(),
                span,
            }
        };

        Some(Node::Function {
            params,
            return_type,
            body: Box::new(body),
            span,
        })
    }

    /// Literals, symbols, groupings, and array literals.
    fn primary(&mut self) -> Option<Node> {
        let token = *self.current();
        match token.kind {
            TokenKind::Symbol => {
                self.advance();
                Some(Node::Symbol {
                    name: token.lexeme.to_string(),
                    span: token.span(),
                })
            }
            TokenKind::Number => {
                self.advance();
                self.materialize_number(&token)
            }
            TokenKind::Str => {
                self.advance();
                Some(Node::Str {
                    value: unquote(token.lexeme),
                    span: token.span(),
                })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                if !self.eat_ignoring_newlines(TokenKind::RParen) {
                    // Assume the ')' was intended and continue.
                    self.error_at(
                        DiagnosticKind::SyntaxError,
                        self.current_span(),
                        "Expected a ')' to close this grouping",
                    );
                }
                Some(Node::Grouping {
                    inner: Box::new(inner),
                    span: token.span(),
                })
            }
            TokenKind::LBracket => self.array_literal(&token),
            _ => {
                self.error_at(
                    DiagnosticKind::ExpectedExpression,
                    token.span(),
                    format!("Expected an expression, found {}", token),
                );
                None
            }
        }
    }

    /// `[elem, elem, …]`, already at the opening `[`.
    fn array_literal(&mut self, open: &Token<'src>) -> Option<Node> {
        let span = open.span();
        self.advance();
        let mut elems = Vec::new();
        let mut overflowed = false;

        loop {
            self.skip_newlines();
            if self.eat(TokenKind::RBracket) {
                break;
            }
            if self.at_end() {
                self.error_at(
                    DiagnosticKind::SyntaxError,
                    self.current_span(),
                    "Expected a ']' to close this array literal",
                );
                break;
            }

            let entry_span = self.current_span();
            match self.expression() {
                Some(elem) => {
                    if elems.len() == MAX_LIST_ENTRIES {
                        if !overflowed {
                            self.error_at(
                                DiagnosticKind::TooManyMembers,
                                entry_span,
                                format!(
                                    "An array literal holds at most {} members",
                                    MAX_LIST_ENTRIES
                                ),
                            );
                            overflowed = true;
                        }
                    } else {
                        elems.push(elem);
                    }
                }
                None => {
                    self.recover_in_list();
                    if self.eat(TokenKind::Comma) {
                        continue;
                    }
                    self.eat_ignoring_newlines(TokenKind::RBracket);
                    break;
                }
            }

            if self.eat_ignoring_newlines(TokenKind::Comma) {
                continue;
            }
            if self.eat_ignoring_newlines(TokenKind::RBracket) {
                break;
            }
            self.error_at(
                DiagnosticKind::SyntaxError,
                self.current_span(),
                "Expected a ',' to continue this array literal, or a ']' to close it",
            );
            break;
        }

        Some(Node::ArrayLiteral { elems, span })
    }

    /// Convert a NUMBER lexeme into an Integer or Float node. The lexer only
    /// delimits; all conversion happens here. Underscore separators are
    /// stripped, a `0x`/`0o`/`0b` prefix switches the radix, and the radix is
    /// kept on the node for faithful re-rendering.
    fn materialize_number(&mut self, token: &Token<'src>) -> Option<Node> {
        let span = token.span();
        let cleaned: String = token.lexeme.chars().filter(|&c| c != '_').collect();

        let (digits, base) = match cleaned.as_bytes() {
            [b'0', b'x' | b'X', ..] => (&cleaned[2..], 16),
            [b'0', b'o' | b'O', ..] => (&cleaned[2..], 8),
            [b'0', b'b' | b'B', ..] => (&cleaned[2..], 2),
            _ => (cleaned.as_str(), 10),
        };

        if base == 10 && digits.contains('.') {
            return match digits.parse::<f64>() {
                Ok(value) => Some(Node::Float { value, span }),
                Err(_) => {
                    self.error_at(
                        DiagnosticKind::SyntaxError,
                        span,
                        format!("'{}' is not a valid number", token.lexeme),
                    );
                    None
                }
            };
        }

        match i64::from_str_radix(digits, base) {
            Ok(value) => Some(Node::Integer { value, base, span }),
            Err(_) => {
                self.error_at(
                    DiagnosticKind::SyntaxError,
                    span,
                    format!("'{}' is not a valid number", token.lexeme),
                );
                None
            }
        }
    }

    /// After a failed list entry, skip to the next separator, closing
    /// delimiter, or statement boundary.
    pub(crate) fn recover_in_list(&mut self) {
        while !matches!(
            self.current().kind,
            TokenKind::Comma
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::Newline
                | TokenKind::Semicolon
                | TokenKind::Eof
        ) {
            self.advance();
        }
    }
}

/// Strip the surrounding quotes from a STRING lexeme. Unterminated literals
/// are missing the trailing quote; only what is present is stripped.
fn unquote(lexeme: &str) -> String {
    let inner = lexeme.strip_prefix('"').unwrap_or(lexeme);
    inner.strip_suffix('"').unwrap_or(inner).to_string()
}
