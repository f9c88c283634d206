//! AST definitions for the Chirp front end.
//!
//! The tree is a single closed [`Node`] enum with exclusively owned children
//! (`Box`/`Vec`), so consumers dispatch with exhaustive pattern matching and
//! there is no manual teardown. Optional children (else branches, initializers,
//! return values) are `Option`, never sentinels.

use std::fmt;
use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::parser::token::TokenKind;

/// Source range information for tokens, nodes, and diagnostics.
///
/// `start` and `end` are byte offsets into the source buffer; `end` is
/// inclusive, so a one-byte lexeme has `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: u32,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(line: u32, start: usize, end: usize) -> Self {
        Self { line, start, end }
    }

    /// Width of the spanned region in bytes.
    pub fn width(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Semantic operator kinds, shared by binary, logical, unary, and assignment
/// nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // Arithmetic
    Exponent,
    Multiply,
    Divide,
    FloorDivide,
    Modulus,
    Add,
    Subtract,
    // Assignment
    Assign,
    AssignAdd,
    AssignSubtract,
    AssignMultiply,
    AssignDivide,
    /// Keyword-argument initializer inside a call argument list (`name = expr`).
    Initializer,
    // Prefix
    Increment,
    Decrement,
    Negate,
    Not,
    // Logical
    LogicalOr,
    LogicalAnd,
    // Bitwise
    BitwiseOr,
    BitwiseAnd,
    // Comparison
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spelling = match self {
            Op::Exponent => "**",
            Op::Multiply => "*",
            Op::Divide => "/",
            Op::FloorDivide => "//",
            Op::Modulus => "%",
            Op::Add => "+",
            Op::Subtract => "-",
            Op::Assign => "->",
            Op::AssignAdd => "+=",
            Op::AssignSubtract => "-=",
            Op::AssignMultiply => "*=",
            Op::AssignDivide => "/=",
            Op::Initializer => "=",
            Op::Increment => "++",
            Op::Decrement => "--",
            Op::Negate => "-",
            Op::Not => "!",
            Op::LogicalOr => "||",
            Op::LogicalAnd => "&&",
            Op::BitwiseOr => "|",
            Op::BitwiseAnd => "&",
            Op::Equal => "==",
            Op::NotEqual => "!=",
            Op::Less => "<",
            Op::LessEqual => "<=",
            Op::Greater => ">",
            Op::GreaterEqual => ">=",
        };
        write!(f, "{}", spelling)
    }
}

/// Token kind → operator kind, covering every token that can sit at a binary
/// or assignment production site. Built once, read-only afterwards.
static OPERATORS: LazyLock<FxHashMap<TokenKind, Op>> = LazyLock::new(|| {
    let mut table = FxHashMap::default();
    table.insert(TokenKind::StarStar, Op::Exponent);
    table.insert(TokenKind::Star, Op::Multiply);
    table.insert(TokenKind::Slash, Op::Divide);
    table.insert(TokenKind::SlashSlash, Op::FloorDivide);
    table.insert(TokenKind::Modulo, Op::Modulus);
    table.insert(TokenKind::Plus, Op::Add);
    table.insert(TokenKind::Minus, Op::Subtract);
    table.insert(TokenKind::Arrow, Op::Assign);
    table.insert(TokenKind::PlusEqual, Op::AssignAdd);
    table.insert(TokenKind::MinusEqual, Op::AssignSubtract);
    table.insert(TokenKind::StarEqual, Op::AssignMultiply);
    table.insert(TokenKind::SlashEqual, Op::AssignDivide);
    table.insert(TokenKind::PlusPlus, Op::Increment);
    table.insert(TokenKind::MinusMinus, Op::Decrement);
    table.insert(TokenKind::BarBar, Op::LogicalOr);
    table.insert(TokenKind::AmpAmp, Op::LogicalAnd);
    table.insert(TokenKind::Bar, Op::BitwiseOr);
    table.insert(TokenKind::Amp, Op::BitwiseAnd);
    table.insert(TokenKind::EqualEqual, Op::Equal);
    table.insert(TokenKind::BangEqual, Op::NotEqual);
    table.insert(TokenKind::Less, Op::Less);
    table.insert(TokenKind::LessEqual, Op::LessEqual);
    table.insert(TokenKind::Greater, Op::Greater);
    table.insert(TokenKind::GreaterEqual, Op::GreaterEqual);
    table.insert(TokenKind::Bang, Op::Not);
    table
});

/// Look up the semantic operator for a token kind, if it has one.
pub fn operator_from_token(kind: TokenKind) -> Option<Op> {
    OPERATORS.get(&kind).copied()
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub kind: ParamKind,
    pub span: Span,
}

/// Parameter specializations: a named, typed parameter, or one of the two
/// variadic markers.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    Named {
        name: String,
        type_expr: Box<Node>,
        /// Default values are reserved in the grammar but not accepted yet.
        default: Option<Box<Node>>,
    },
    /// `*` marker, captures remaining positional arguments.
    Args,
    /// `**` marker, captures remaining named arguments.
    Kwargs,
}

/// AST nodes for expressions and statements.
///
/// The parser recovers best-effort, so children that could not be parsed are
/// `None` even where the grammar requires them (e.g. a binding whose
/// initializer was malformed). Downstream consumers must tolerate such
/// partial trees.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Symbol {
        name: String,
        span: Span,
    },
    Integer {
        value: i64,
        /// 2, 8, 10, or 16, kept so the literal can be re-rendered faithfully.
        base: u32,
        span: Span,
    },
    Float {
        value: f64,
        span: Span,
    },
    Str {
        value: String,
        span: Span,
    },
    Binary {
        op: Op,
        left: Box<Node>,
        right: Box<Node>,
        span: Span,
    },
    Logical {
        op: Op,
        left: Box<Node>,
        right: Box<Node>,
        span: Span,
    },
    Unary {
        op: Op,
        operand: Box<Node>,
        span: Span,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
        span: Span,
    },
    Grouping {
        inner: Box<Node>,
        span: Span,
    },
    Lookup {
        target: Box<Node>,
        index: Box<Node>,
        span: Span,
    },
    ArrayLiteral {
        elems: Vec<Node>,
        span: Span,
    },
    Block {
        stmts: Vec<Node>,
        span: Span,
    },
    Function {
        params: Vec<Param>,
        return_type: Option<Box<Node>>,
        body: Box<Node>,
        span: Span,
    },
    Binding {
        mutable: bool,
        name: String,
        init: Option<Box<Node>>,
        span: Span,
    },
    Assignment {
        op: Op,
        assignee: Box<Node>,
        value: Box<Node>,
        span: Span,
    },
    IfStmt {
        /// `None` when the condition was malformed; the body is still kept.
        condition: Option<Box<Node>>,
        then_branch: Box<Node>,
        /// May itself be an `IfStmt`, encoding else-if chains.
        else_branch: Option<Box<Node>>,
        span: Span,
    },
    Return {
        value: Option<Box<Node>>,
        span: Span,
    },
    EnumDecl {
        name: String,
        variants: Vec<String>,
        span: Span,
    },
}

impl Node {
    /// Get the source span of this node.
    pub fn span(&self) -> Span {
        match self {
            Node::Symbol { span, .. }
            | Node::Integer { span, .. }
            | Node::Float { span, .. }
            | Node::Str { span, .. }
            | Node::Binary { span, .. }
            | Node::Logical { span, .. }
            | Node::Unary { span, .. }
            | Node::Call { span, .. }
            | Node::Grouping { span, .. }
            | Node::Lookup { span, .. }
            | Node::ArrayLiteral { span, .. }
            | Node::Block { span, .. }
            | Node::Function { span, .. }
            | Node::Binding { span, .. }
            | Node::Assignment { span, .. }
            | Node::IfStmt { span, .. }
            | Node::Return { span, .. }
            | Node::EnumDecl { span, .. } => *span,
        }
    }

    /// Render the tree as indented, tag-delimited text.
    ///
    /// The output is deterministic: the same tree produces byte-identical
    /// text on every call. This is the only serialization the front end
    /// exposes and the one the tests compare against.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, 0);
        out
    }

    fn write(&self, out: &mut String, indent: usize) {
        let pad = "  ".repeat(indent);
        match self {
            Node::Symbol { name, .. } => {
                out.push_str(&format!("{}{{ Symbol {} }}\n", pad, name));
            }
            Node::Integer { value, base, .. } => {
                out.push_str(&format!("{}{{ Integer {} base={} }}\n", pad, value, base));
            }
            Node::Float { value, .. } => {
                out.push_str(&format!("{}{{ Float {} }}\n", pad, value));
            }
            Node::Str { value, .. } => {
                out.push_str(&format!("{}{{ String \"{}\" }}\n", pad, value));
            }
            Node::Binary { op, left, right, .. } => {
                out.push_str(&format!("{}{{ Binary {}\n", pad, op));
                left.write(out, indent + 1);
                right.write(out, indent + 1);
                out.push_str(&format!("{}}}\n", pad));
            }
            Node::Logical { op, left, right, .. } => {
                out.push_str(&format!("{}{{ Logical {}\n", pad, op));
                left.write(out, indent + 1);
                right.write(out, indent + 1);
                out.push_str(&format!("{}}}\n", pad));
            }
            Node::Unary { op, operand, .. } => {
                out.push_str(&format!("{}{{ Unary {}\n", pad, op));
                operand.write(out, indent + 1);
                out.push_str(&format!("{}}}\n", pad));
            }
            Node::Call { callee, args, .. } => {
                out.push_str(&format!("{}{{ Call\n", pad));
                callee.write(out, indent + 1);
                for arg in args {
                    arg.write(out, indent + 1);
                }
                out.push_str(&format!("{}}}\n", pad));
            }
            Node::Grouping { inner, .. } => {
                out.push_str(&format!("{}{{ Grouping\n", pad));
                inner.write(out, indent + 1);
                out.push_str(&format!("{}}}\n", pad));
            }
            Node::Lookup { target, index, .. } => {
                out.push_str(&format!("{}{{ Lookup\n", pad));
                target.write(out, indent + 1);
                index.write(out, indent + 1);
                out.push_str(&format!("{}}}\n", pad));
            }
            Node::ArrayLiteral { elems, .. } => {
                out.push_str(&format!("{}{{ Array\n", pad));
                for elem in elems {
                    elem.write(out, indent + 1);
                }
                out.push_str(&format!("{}}}\n", pad));
            }
            Node::Block { stmts, .. } => {
                out.push_str(&format!("{}{{ Block\n", pad));
                for stmt in stmts {
                    stmt.write(out, indent + 1);
                }
                out.push_str(&format!("{}}}\n", pad));
            }
            Node::Function {
                params,
                return_type,
                body,
                ..
            } => {
                let inner_pad = "  ".repeat(indent + 1);
                out.push_str(&format!("{}{{ Function\n", pad));
                for param in params {
                    param.write(out, indent + 1);
                }
                if let Some(ty) = return_type {
                    out.push_str(&format!("{}{{ ReturnType\n", inner_pad));
                    ty.write(out, indent + 2);
                    out.push_str(&format!("{}}}\n", inner_pad));
                }
                body.write(out, indent + 1);
                out.push_str(&format!("{}}}\n", pad));
            }
            Node::Binding {
                mutable, name, init, ..
            } => {
                out.push_str(&format!("{}{{ Binding {} mut={}\n", pad, name, mutable));
                if let Some(init) = init {
                    init.write(out, indent + 1);
                }
                out.push_str(&format!("{}}}\n", pad));
            }
            Node::Assignment {
                op, assignee, value, ..
            } => {
                out.push_str(&format!("{}{{ Assignment {}\n", pad, op));
                assignee.write(out, indent + 1);
                value.write(out, indent + 1);
                out.push_str(&format!("{}}}\n", pad));
            }
            Node::IfStmt {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let inner_pad = "  ".repeat(indent + 1);
                out.push_str(&format!("{}{{ If\n", pad));
                if let Some(condition) = condition {
                    condition.write(out, indent + 1);
                }
                out.push_str(&format!("{}{{ Then\n", inner_pad));
                then_branch.write(out, indent + 2);
                out.push_str(&format!("{}}}\n", inner_pad));
                if let Some(else_branch) = else_branch {
                    out.push_str(&format!("{}{{ Else\n", inner_pad));
                    else_branch.write(out, indent + 2);
                    out.push_str(&format!("{}}}\n", inner_pad));
                }
                out.push_str(&format!("{}}}\n", pad));
            }
            Node::Return { value, .. } => {
                out.push_str(&format!("{}{{ Return\n", pad));
                if let Some(value) = value {
                    value.write(out, indent + 1);
                }
                out.push_str(&format!("{}}}\n", pad));
            }
            Node::EnumDecl { name, variants, .. } => {
                out.push_str(&format!(
                    "{}{{ Enum {} [{}] }}\n",
                    pad,
                    name,
                    variants.join(" ")
                ));
            }
        }
    }
}

impl Param {
    fn write(&self, out: &mut String, indent: usize) {
        let pad = "  ".repeat(indent);
        match &self.kind {
            ParamKind::Named {
                name,
                type_expr,
                default,
            } => {
                out.push_str(&format!("{}{{ Parameter {}\n", pad, name));
                type_expr.write(out, indent + 1);
                if let Some(default) = default {
                    default.write(out, indent + 1);
                }
                out.push_str(&format!("{}}}\n", pad));
            }
            ParamKind::Args => out.push_str(&format!("{}{{ Args }}\n", pad)),
            ParamKind::Kwargs => out.push_str(&format!("{}{{ Kwargs }}\n", pad)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp() -> Span {
        Span::new(1, 0, 0)
    }

    fn int(value: i64) -> Node {
        Node::Integer {
            value,
            base: 10,
            span: sp(),
        }
    }

    #[test]
    fn test_operator_table_round_trips_spelling() {
        // The op recovered from a token kind renders back to the token's
        // source spelling.
        let cases = [
            (TokenKind::Plus, "+"),
            (TokenKind::StarStar, "**"),
            (TokenKind::SlashSlash, "//"),
            (TokenKind::Arrow, "->"),
            (TokenKind::BarBar, "||"),
            (TokenKind::BangEqual, "!="),
            (TokenKind::LessEqual, "<="),
        ];
        for (kind, spelling) in cases {
            let op = operator_from_token(kind).unwrap();
            assert_eq!(op.to_string(), spelling);
        }
    }

    #[test]
    fn test_non_operator_tokens_have_no_op() {
        assert!(operator_from_token(TokenKind::Symbol).is_none());
        assert!(operator_from_token(TokenKind::LParen).is_none());
        assert!(operator_from_token(TokenKind::If).is_none());
    }

    #[test]
    fn test_render_is_deterministic() {
        let tree = Node::Binding {
            mutable: false,
            name: "x".to_string(),
            init: Some(Box::new(Node::Binary {
                op: Op::Add,
                left: Box::new(int(1)),
                right: Box::new(Node::Binary {
                    op: Op::Multiply,
                    left: Box::new(int(2)),
                    right: Box::new(int(3)),
                    span: sp(),
                }),
                span: sp(),
            })),
            span: sp(),
        };

        let first = tree.render();
        let second = tree.render();
        assert_eq!(first, second);
        assert!(first.contains("{ Binding x mut=false"));
        assert!(first.contains("{ Binary +"));
        assert!(first.contains("{ Binary *"));
    }

    #[test]
    fn test_render_indents_by_fixed_step() {
        let tree = Node::Unary {
            op: Op::Negate,
            operand: Box::new(Node::Symbol {
                name: "x".to_string(),
                span: sp(),
            }),
            span: sp(),
        };
        assert_eq!(tree.render(), "{ Unary -\n  { Symbol x }\n}\n");
    }

    #[test]
    fn test_render_enum_single_line() {
        let tree = Node::EnumDecl {
            name: "Color".to_string(),
            variants: vec!["Red".to_string(), "Green".to_string()],
            span: sp(),
        };
        assert_eq!(tree.render(), "{ Enum Color [Red Green] }\n");
    }
}
