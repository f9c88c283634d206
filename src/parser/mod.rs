//! Chirp source code front end.
//!
//! This module transforms Chirp source text into an abstract syntax tree:
//! - [`token`]: token kinds, keyword table, source-borrowing tokens
//! - [`lexer`]: tokenization (source text → tokens)
//! - [`parse`] / [`expressions`] / [`statements`]: parsing (tokens → AST)
//! - [`ast`]: spans, operators, AST node definitions, tree printer
//!
//! # Parser Implementation
//!
//! Hand-written single-pass lexer and recursive descent parser with one
//! method per precedence tier. No parser generator dependencies.
//!
//! The front end never aborts: malformed input produces diagnostics in the
//! shared [`crate::diagnostics::Reporter`] plus a best-effort partial tree,
//! and parsing resumes at the next statement boundary. One pass over a file
//! collects every diagnostic in it.

pub mod ast;
pub mod expressions;
pub mod lexer;
pub mod parse;
pub mod statements;
pub mod token;

pub use ast::{Node, Op, Param, ParamKind, Span};
pub use lexer::Lexer;
pub use parse::Parser;
pub use token::{Token, TokenKind};
