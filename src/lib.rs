//! # Introduction
//!
//! The front end of the Chirp language: a hand-written lexer and recursive
//! descent parser that turn source text into an AST plus a batch of
//! positioned diagnostics. Malformed input never aborts the pass; every
//! problem is recorded and parsing resumes at the next statement boundary,
//! so one run over a file reports everything wrong with it.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser → AST + Diagnostics
//! ```
//!
//! 1. [`parser::lexer`]: single-pass scanner producing tokens that borrow
//!    the source buffer, always ending with a terminal EOF token.
//! 2. [`parser`]: recursive descent over the token stream, one method per
//!    precedence tier, statement-level error recovery.
//! 3. [`diagnostics`]: the shared [`diagnostics::Reporter`], write-only
//!    while the front end runs, rendered once afterwards with source-line
//!    excerpts and caret underlines.
//!
//! Type checking, name resolution, and execution are deliberately out of
//! scope; downstream consumers match on [`parser::Node`] variants and must
//! tolerate structurally partial trees.

pub mod diagnostics;
pub mod parser;
