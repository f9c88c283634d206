//! Statement parsing implementation.
//!
//! Statement forms:
//!
//! - Bindings: `name = expr` (immutable), `mut name = expr` (mutable)
//! - `return [expr]`
//! - `enum Name { Variant, … }`
//! - `if expr body [else body]` with else-if chains by recursion
//! - Expression statements: only calls and assignments may stand alone
//!
//! Statements are separated by newlines or semicolons. Inside a block the
//! separator is mandatory after every statement. A statement that fails to
//! parse records its diagnostics and the parser resynchronizes to the next
//! boundary, so the rest of the file is still checked.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::diagnostics::DiagnosticKind;
use crate::parser::ast::{Node, Param, ParamKind, Span};
use crate::parser::parse::{Parser, MAX_LIST_ENTRIES};
use crate::parser::token::{Token, TokenKind};

impl<'p, 'src> Parser<'p, 'src> {
    /// Parse a single statement.
    pub(crate) fn statement(&mut self) -> Option<Node> {
        self.skip_newlines();
        let token = *self.current();

        match token.kind {
            TokenKind::Symbol if self.peek().kind == TokenKind::Equal => {
                self.advance();
                self.advance();
                return self.initialized_binding(&token, false);
            }
            TokenKind::Mut => {
                self.advance();
                let name = *self.current();
                if name.kind != TokenKind::Symbol {
                    self.error_at(
                        DiagnosticKind::SyntaxError,
                        name.span(),
                        "Expected an identifier after 'mut'",
                    );
                    self.synchronize();
                    return None;
                }
                self.advance();
                if !self.eat(TokenKind::Equal) {
                    self.error_at(
                        DiagnosticKind::SyntaxError,
                        self.current_span(),
                        "Expected an '=' after 'mut' and its identifier",
                    );
                    self.synchronize();
                    return None;
                }
                return self.initialized_binding(&name, true);
            }
            TokenKind::Return => {
                self.advance();
                let span = token.span();
                if matches!(
                    self.current().kind,
                    TokenKind::Newline | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
                ) {
                    return Some(Node::Return { value: None, span });
                }
                return match self.expression() {
                    Some(value) => Some(Node::Return {
                        value: Some(Box::new(value)),
                        span,
                    }),
                    None => {
                        self.synchronize();
                        Some(Node::Return { value: None, span })
                    }
                };
            }
            TokenKind::Enum => return self.enum_declaration(&token),
            TokenKind::If => return self.if_statement(&token),
            _ => {}
        }

        // Bare expression. Only calls and assignments are allowed to stand
        // alone as statements.
        let expr = self.expression()?;
        if matches!(expr, Node::Call { .. } | Node::Assignment { .. }) {
            return Some(expr);
        }
        self.error_at(
            DiagnosticKind::SyntaxError,
            expr.span(),
            "Expressions must be meaningful and/or have side-effects to exist on their own",
        );
        None
    }

    /// The `= expr` tail of a binding. A malformed initializer keeps the
    /// binding with `init: None`; its diagnostics are already recorded.
    fn initialized_binding(&mut self, name: &Token<'src>, mutable: bool) -> Option<Node> {
        let init = self.expression();
        if init.is_none() {
            self.synchronize();
        }
        Some(Node::Binding {
            mutable,
            name: name.lexeme.to_string(),
            init: init.map(Box::new),
            span: name.span(),
        })
    }

    /// `if expr body [else (if …| body)]`, already at the `if` keyword.
    fn if_statement(&mut self, keyword: &Token<'src>) -> Option<Node> {
        let span = keyword.span();
        self.advance();

        // The condition is parsed even when malformed so the body is still
        // checked; a failed condition leaves `None` in the node.
        let condition = self.expression();
        let then_branch = self.branch_body(span)?;

        let else_branch = if self.eat_ignoring_newlines(TokenKind::Else) {
            self.skip_newlines();
            if self.check(TokenKind::If) {
                // Recursion encodes the else-if chain.
                let nested = *self.current();
                self.if_statement(&nested).map(Box::new)
            } else {
                self.branch_body(span).map(Box::new)
            }
        } else {
            None
        };

        Some(Node::IfStmt {
            condition: condition.map(Box::new),
            then_branch: Box::new(then_branch),
            else_branch,
            span,
        })
    }

    /// A branch body: either a braced block or a single statement.
    fn branch_body(&mut self, anchor: Span) -> Option<Node> {
        if self.eat_ignoring_newlines(TokenKind::LBrace) {
            return Some(self.block());
        }
        self.skip_newlines();
        if self.at_end() {
            self.error_at(
                DiagnosticKind::SyntaxError,
                anchor,
                "There is no body for this selection statement",
            );
            return None;
        }
        self.statement()
    }

    /// Statements until `}` or EOF, already past the opening `{`. The
    /// closing brace is consumed here.
    ///
    /// A NEWLINE or `;` is mandatory after every statement; when it is
    /// missing the partial block is returned immediately after reporting.
    pub(crate) fn block(&mut self) -> Node {
        let span = self.current_span();
        let mut stmts = Vec::new();

        loop {
            if matches!(
                self.current().kind,
                TokenKind::Newline | TokenKind::Semicolon
            ) {
                self.advance();
                continue;
            }
            if self.eat(TokenKind::RBrace) {
                break;
            }
            if self.at_end() {
                self.error_at(
                    DiagnosticKind::SyntaxError,
                    self.current_span(),
                    "Expected a '}' to close this block",
                );
                break;
            }

            match self.statement() {
                Some(stmt) => stmts.push(stmt),
                None => {
                    self.synchronize();
                    continue;
                }
            }

            // The statement must be closed before anything else starts.
            loop {
                match self.current().kind {
                    TokenKind::Newline | TokenKind::Semicolon => {
                        self.advance();
                        break;
                    }
                    TokenKind::RBrace | TokenKind::Eof => {
                        self.error_at(
                            DiagnosticKind::SyntaxError,
                            self.current_span(),
                            "Expected a semicolon or newline to close the previous statement",
                        );
                        self.eat(TokenKind::RBrace);
                        return Node::Block { stmts, span };
                    }
                    // Stray tokens after a finished statement are dropped.
                    _ => self.advance(),
                }
            }
        }

        Node::Block { stmts, span }
    }

    /// `enum Name { Variant, … }`, already at the `enum` keyword.
    ///
    /// Recovery is per entry: a non-symbol reports and skips that entry
    /// only, and the closing brace is always attempted.
    fn enum_declaration(&mut self, keyword: &Token<'src>) -> Option<Node> {
        let span = keyword.span();
        self.advance();

        let name = *self.current();
        if name.kind != TokenKind::Symbol {
            self.error_at(
                DiagnosticKind::SyntaxError,
                name.span(),
                "Expected a name after 'enum'",
            );
            return None;
        }
        self.advance();

        if !self.eat_ignoring_newlines(TokenKind::LBrace) {
            self.error_at(
                DiagnosticKind::SyntaxError,
                self.current_span(),
                "Expected a '{' to open this enum declaration",
            );
            return None;
        }

        let mut variants = Vec::new();
        let mut overflowed = false;
        loop {
            self.skip_newlines();
            if self.eat(TokenKind::RBrace) {
                break;
            }
            if self.at_end() {
                self.error_at(
                    DiagnosticKind::SyntaxError,
                    self.current_span(),
                    "Expected a '}' to close this enum declaration",
                );
                break;
            }

            let entry = *self.current();
            if entry.kind == TokenKind::Symbol {
                if variants.len() == MAX_LIST_ENTRIES {
                    if !overflowed {
                        self.error_at(
                            DiagnosticKind::TooManyVariants,
                            entry.span(),
                            format!("An enum holds at most {} variants", MAX_LIST_ENTRIES),
                        );
                        overflowed = true;
                    }
                } else {
                    variants.push(entry.lexeme.to_string());
                }
                self.advance();
            } else {
                self.error_at(
                    DiagnosticKind::SyntaxError,
                    entry.span(),
                    "Only symbols are allowed in enum declarations",
                );
                self.advance();
            }
            self.eat(TokenKind::Comma);
        }

        Some(Node::EnumDecl {
            name: name.lexeme.to_string(),
            variants,
            span,
        })
    }

    /// Comma-separated function parameters, already past the opening `(`.
    ///
    /// `*`/`**` introduce the variadic catch-alls. The list shares the
    /// 255-entry cap with the other list forms; overflow reports once and
    /// truncates.
    pub(crate) fn function_parameters(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
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
                    "Expected a ')' to close these function parameters",
                );
                break;
            }

            let entry = *self.current();
            let param = match entry.kind {
                TokenKind::Star | TokenKind::StarStar => {
                    self.advance();
                    // The catch-all is named by convention; the name itself
                    // is not kept in the tree.
                    let marker = *self.current();
                    if marker.kind == TokenKind::Symbol {
                        self.advance();
                    } else {
                        self.error_at(
                            DiagnosticKind::SyntaxError,
                            marker.span(),
                            "Expected a symbol to name this variadic parameter",
                        );
                    }
                    let kind = if entry.kind == TokenKind::Star {
                        ParamKind::Args
                    } else {
                        ParamKind::Kwargs
                    };
                    Some(Param {
                        kind,
                        span: entry.span(),
                    })
                }
                TokenKind::Symbol => {
                    self.advance();
                    if !self.eat(TokenKind::Colon) {
                        self.error_at(
                            DiagnosticKind::SyntaxError,
                            entry.span(),
                            "Expected a ':' and a type for this function parameter",
                        );
                        self.recover_in_list();
                        None
                    } else {
                        match self.expression() {
                            Some(type_expr) => Some(Param {
                                kind: ParamKind::Named {
                                    name: entry.lexeme.to_string(),
                                    type_expr: Box::new(type_expr),
                                    default: None,
                                },
                                span: entry.span(),
                            }),
                            None => {
                                self.recover_in_list();
                                None
                            }
                        }
                    }
                }
                _ => {
                    self.error_at(
                        DiagnosticKind::SyntaxError,
                        entry.span(),
                        format!("Expected a symbol for this function parameter, found {}", entry),
                    );
                    self.advance();
                    None
                }
            };

            if let Some(param) = param {
                if params.len() == MAX_LIST_ENTRIES {
                    if !overflowed {
                        self.error_at(
                            DiagnosticKind::TooManyParams,
                            entry.span(),
                            format!("A function takes at most {} parameters", MAX_LIST_ENTRIES),
                        );
                        overflowed = true;
                    }
                } else {
                    params.push(param);
                }
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
                "Expected a ',' to continue these function parameters, or a ')' to close them",
            );
            break;
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Reporter;
    use crate::parser::lexer::Lexer;

    fn parse(source: &str) -> (Vec<Node>, Vec<DiagnosticKind>) {
        let mut reporter = Reporter::new("test.chirp", source);
        let tokens = Lexer::new(source).scan(&mut reporter);
        let program = Parser::new(tokens, &mut reporter).parse_program();
        let kinds = reporter.diagnostics().iter().map(|d| d.kind).collect();
        (program, kinds)
    }

    #[test]
    fn test_immutable_binding() {
        let (program, kinds) = parse("x = 1\n");
        assert!(kinds.is_empty());
        match &program[0] {
            Node::Binding { mutable, name, init, .. } => {
                assert!(!mutable);
                assert_eq!(name, "x");
                assert!(matches!(init.as_deref(), Some(Node::Integer { value: 1, .. })));
            }
            other => panic!("expected binding, got {:?}", other),
        }
    }

    #[test]
    fn test_mutable_binding() {
        let (program, kinds) = parse("mut total = 0\n");
        assert!(kinds.is_empty());
        assert!(matches!(
            &program[0],
            Node::Binding { mutable: true, name, .. } if name == "total"
        ));
    }

    #[test]
    fn test_mut_without_identifier_recovers() {
        let (program, kinds) = parse("mut = 1\ny = 2\n");
        assert_eq!(kinds, vec![DiagnosticKind::SyntaxError]);
        // The next statement still parses.
        assert_eq!(program.len(), 1);
        assert!(matches!(&program[0], Node::Binding { name, .. } if name == "y"));
    }

    #[test]
    fn test_mut_without_equal_recovers() {
        let (program, kinds) = parse("mut x 1\ny = 2\n");
        assert_eq!(kinds, vec![DiagnosticKind::SyntaxError]);
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn test_return_with_and_without_value() {
        let (program, kinds) = parse("f = function () {\n  return\n  return 1\n}\n");
        assert!(kinds.is_empty());
        match &program[0] {
            Node::Binding { init: Some(init), .. } => match &**init {
                Node::Function { body, .. } => match &**body {
                    Node::Block { stmts, .. } => {
                        assert_eq!(stmts.len(), 2);
                        assert!(matches!(&stmts[0], Node::Return { value: None, .. }));
                        assert!(matches!(&stmts[1], Node::Return { value: Some(_), .. }));
                    }
                    other => panic!("expected block, got {:?}", other),
                },
                other => panic!("expected function, got {:?}", other),
            },
            other => panic!("expected binding, got {:?}", other),
        }
    }

    #[test]
    fn test_enum_declaration() {
        let (program, kinds) = parse("enum Color { Red, Green, Blue }\n");
        assert!(kinds.is_empty());
        match &program[0] {
            Node::EnumDecl { name, variants, .. } => {
                assert_eq!(name, "Color");
                assert_eq!(variants, &["Red", "Green", "Blue"]);
            }
            other => panic!("expected enum, got {:?}", other),
        }
    }

    #[test]
    fn test_enum_newline_separated() {
        let (program, kinds) = parse("enum Dir {\n  North\n  South\n}\n");
        assert!(kinds.is_empty());
        assert!(matches!(
            &program[0],
            Node::EnumDecl { variants, .. } if variants.len() == 2
        ));
    }

    #[test]
    fn test_enum_recovers_per_entry() {
        let (program, kinds) = parse("enum E { A, 1, B }\n");
        assert_eq!(kinds, vec![DiagnosticKind::SyntaxError]);
        // The bad entry is skipped, its neighbours survive.
        match &program[0] {
            Node::EnumDecl { variants, .. } => assert_eq!(variants, &["A", "B"]),
            other => panic!("expected enum, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else_if_chain() {
        let source = "if a {\n  f()\n} else if b {\n  g()\n} else {\n  h()\n}\n";
        let (program, kinds) = parse(source);
        assert!(kinds.is_empty(), "{:?}", kinds);
        match &program[0] {
            Node::IfStmt { condition, else_branch, .. } => {
                assert!(condition.is_some());
                match else_branch.as_deref() {
                    Some(Node::IfStmt { else_branch: tail, .. }) => {
                        assert!(matches!(tail.as_deref(), Some(Node::Block { .. })));
                    }
                    other => panic!("expected nested if, got {:?}", other),
                }
            }
            other => panic!("expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_if_condition_parsed_even_when_malformed() {
        let (program, kinds) = parse("if {\n  f()\n}\n");
        assert_eq!(kinds, vec![DiagnosticKind::ExpectedExpression]);
        match &program[0] {
            Node::IfStmt { condition, then_branch, .. } => {
                assert!(condition.is_none());
                assert!(matches!(
                    &**then_branch,
                    Node::Block { stmts, .. } if stmts.len() == 1
                ));
            }
            other => panic!("expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_block_returns_partial() {
        let (program, kinds) = parse("if x {\n  a()");
        // Exactly one complaint: the statement was never closed.
        assert_eq!(kinds, vec![DiagnosticKind::SyntaxError]);
        match &program[0] {
            Node::IfStmt { then_branch, .. } => match &**then_branch {
                Node::Block { stmts, .. } => {
                    assert_eq!(stmts.len(), 1);
                    assert!(matches!(&stmts[0], Node::Call { .. }));
                }
                other => panic!("expected block, got {:?}", other),
            },
            other => panic!("expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_block_requires_terminator_between_statements() {
        let (_, kinds) = parse("if x { a() }\n");
        assert_eq!(kinds, vec![DiagnosticKind::SyntaxError]);
    }

    #[test]
    fn test_bare_value_expression_is_rejected() {
        let (program, kinds) = parse("1 + 2\n");
        assert_eq!(kinds, vec![DiagnosticKind::SyntaxError]);
        assert!(program.is_empty());
    }

    #[test]
    fn test_call_and_assignment_stand_alone() {
        let (program, kinds) = parse("f()\nx -> 5\n");
        assert!(kinds.is_empty());
        assert_eq!(program.len(), 2);
        assert!(matches!(&program[0], Node::Call { .. }));
        assert!(matches!(&program[1], Node::Assignment { .. }));
    }

    #[test]
    fn test_variadic_parameters() {
        let (program, kinds) = parse("f = function (a: Int, *rest, **named) {\n  return\n}\n");
        assert!(kinds.is_empty(), "{:?}", kinds);
        match &program[0] {
            Node::Binding { init: Some(init), .. } => match &**init {
                Node::Function { params, .. } => {
                    assert_eq!(params.len(), 3);
                    assert!(matches!(params[0].kind, ParamKind::Named { .. }));
                    assert!(matches!(params[1].kind, ParamKind::Args));
                    assert!(matches!(params[2].kind, ParamKind::Kwargs));
                }
                other => panic!("expected function, got {:?}", other),
            },
            other => panic!("expected binding, got {:?}", other),
        }
    }

    #[test]
    fn test_parameter_without_type_is_skipped() {
        let (program, kinds) = parse("f = function (a, b: Int) {\n  return\n}\n");
        assert_eq!(kinds, vec![DiagnosticKind::SyntaxError]);
        match &program[0] {
            Node::Binding { init: Some(init), .. } => match &**init {
                Node::Function { params, .. } => {
                    assert_eq!(params.len(), 1);
                    assert!(
                        matches!(&params[0].kind, ParamKind::Named { name, .. } if name == "b")
                    );
                }
                other => panic!("expected function, got {:?}", other),
            },
            other => panic!("expected binding, got {:?}", other),
        }
    }

    #[test]
    fn test_256_parameters_report_one_overflow() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}: T", i)).collect();
        let source = format!("f = function ({}) {{\n  return\n}}\n", params.join(", "));
        let (program, kinds) = parse(&source);

        let overflows = kinds
            .iter()
            .filter(|k| **k == DiagnosticKind::TooManyParams)
            .count();
        assert_eq!(overflows, 1);
        match &program[0] {
            Node::Binding { init: Some(init), .. } => match &**init {
                Node::Function { params, .. } => assert_eq!(params.len(), MAX_LIST_ENTRIES),
                other => panic!("expected function, got {:?}", other),
            },
            other => panic!("expected binding, got {:?}", other),
        }
    }

    #[test]
    fn test_256_variants_report_one_overflow() {
        let variants: Vec<String> = (0..256).map(|i| format!("V{}", i)).collect();
        let source = format!("enum Big {{ {} }}\n", variants.join(", "));
        let (program, kinds) = parse(&source);

        let overflows = kinds
            .iter()
            .filter(|k| **k == DiagnosticKind::TooManyVariants)
            .count();
        assert_eq!(overflows, 1);
        assert!(matches!(
            &program[0],
            Node::EnumDecl { variants, .. } if variants.len() == MAX_LIST_ENTRIES
        ));
    }
}
