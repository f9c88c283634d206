//! Token definitions for the Chirp lexer.
//!
//! Tokens borrow their lexeme from the source buffer instead of copying it,
//! so the whole token stream is a flat, cheap-to-clone view over the input.

use std::fmt;
use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::parser::ast::Span;

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structure
    Eof,
    Newline,
    /// `#'` documentation comment; the lexeme is the comment text.
    Doc,
    /// `#[` attribute marker.
    HashBracket,

    // Grouping
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // Literals and identifiers
    Symbol,
    Number,
    Str,

    // Arithmetic
    Plus,
    PlusPlus,
    PlusEqual,
    Minus,
    MinusMinus,
    MinusEqual,
    Arrow,
    Star,
    StarStar,
    StarEqual,
    Slash,
    SlashSlash,
    SlashEqual,
    Modulo,

    // Comparison and logic
    Equal,
    EqualEqual,
    Bang,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Amp,
    AmpAmp,
    Bar,
    BarBar,

    // Punctuation
    Colon,
    Semicolon,
    Dot,
    Comma,
    At,
    Question,

    // Keywords
    Function,
    Class,
    Enum,
    Mut,
    True,
    False,
    Nil,
    Switch,
    If,
    Else,
    Continue,
    Break,
    For,
    While,
    Case,
    In,
    Defer,
    Return,
    From,
    Import,
    As,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Eof => "end of file",
            TokenKind::Newline => "newline",
            TokenKind::Doc => "doc comment",
            TokenKind::HashBracket => "'#['",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Symbol => "identifier",
            TokenKind::Number => "number literal",
            TokenKind::Str => "string literal",
            TokenKind::Plus => "'+'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::PlusEqual => "'+='",
            TokenKind::Minus => "'-'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::MinusEqual => "'-='",
            TokenKind::Arrow => "'->'",
            TokenKind::Star => "'*'",
            TokenKind::StarStar => "'**'",
            TokenKind::StarEqual => "'*='",
            TokenKind::Slash => "'/'",
            TokenKind::SlashSlash => "'//'",
            TokenKind::SlashEqual => "'/='",
            TokenKind::Modulo => "'%'",
            TokenKind::Equal => "'='",
            TokenKind::EqualEqual => "'=='",
            TokenKind::Bang => "'!'",
            TokenKind::BangEqual => "'!='",
            TokenKind::Less => "'<'",
            TokenKind::LessEqual => "'<='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::Amp => "'&'",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::Bar => "'|'",
            TokenKind::BarBar => "'||'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Dot => "'.'",
            TokenKind::Comma => "','",
            TokenKind::At => "'@'",
            TokenKind::Question => "'?'",
            TokenKind::Function => "'function'",
            TokenKind::Class => "'class'",
            TokenKind::Enum => "'enum'",
            TokenKind::Mut => "'mut'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Nil => "'nil'",
            TokenKind::Switch => "'switch'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Continue => "'continue'",
            TokenKind::Break => "'break'",
            TokenKind::For => "'for'",
            TokenKind::While => "'while'",
            TokenKind::Case => "'case'",
            TokenKind::In => "'in'",
            TokenKind::Defer => "'defer'",
            TokenKind::Return => "'return'",
            TokenKind::From => "'from'",
            TokenKind::Import => "'import'",
            TokenKind::As => "'as'",
        };
        write!(f, "{}", name)
    }
}

/// Reserved word → token kind. Built once on first identifier lookup.
static KEYWORDS: LazyLock<FxHashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut table = FxHashMap::default();
    table.insert("function", TokenKind::Function);
    table.insert("class", TokenKind::Class);
    table.insert("enum", TokenKind::Enum);
    table.insert("mut", TokenKind::Mut);
    table.insert("true", TokenKind::True);
    table.insert("false", TokenKind::False);
    table.insert("nil", TokenKind::Nil);
    table.insert("switch", TokenKind::Switch);
    table.insert("if", TokenKind::If);
    table.insert("else", TokenKind::Else);
    table.insert("continue", TokenKind::Continue);
    table.insert("break", TokenKind::Break);
    table.insert("for", TokenKind::For);
    table.insert("while", TokenKind::While);
    table.insert("case", TokenKind::Case);
    table.insert("in", TokenKind::In);
    table.insert("defer", TokenKind::Defer);
    table.insert("return", TokenKind::Return);
    table.insert("from", TokenKind::From);
    table.insert("import", TokenKind::Import);
    table.insert("as", TokenKind::As);
    table
});

/// Look up the keyword kind for an identifier, if it is reserved.
pub fn keyword(ident: &str) -> Option<TokenKind> {
    KEYWORDS.get(ident).copied()
}

/// A single lexed token. The lexeme borrows the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub lexeme: &'src str,
    /// 1-based line the token starts on.
    pub line: u32,
    /// Byte offset of the first lexeme byte.
    pub start: usize,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, lexeme: &'src str, line: u32, start: usize) -> Self {
        Self {
            kind,
            lexeme,
            line,
            start,
        }
    }

    /// Inclusive byte offset of the last lexeme byte. Zero-width tokens
    /// (EOF) collapse to their start offset.
    pub fn end(&self) -> usize {
        self.start + self.lexeme.len().saturating_sub(1)
    }

    pub fn span(&self) -> Span {
        Span::new(self.line, self.start, self.end())
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Symbol | TokenKind::Number | TokenKind::Str => {
                write!(f, "{} '{}'", self.kind, self.lexeme)
            }
            _ => write!(f, "{}", self.kind),
        }
    }
}
