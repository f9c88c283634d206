//! Batch diagnostic collection and rendering.
//!
//! The lexer and parser never print anything themselves; they append
//! [`Diagnostic`]s to a shared [`Reporter`] and keep going. After the whole
//! front-end pass the CLI renders the batch once, each diagnostic with the
//! offending source line and a caret underline beneath the exact byte range.
//!
//! A diagnostic whose offsets cannot be resolved against the source buffer is
//! skipped during rendering; the rest of the batch still prints.

use std::io::{self, Write};

use crossterm::style::Stylize;
use thiserror::Error;

use crate::parser::ast::Span;

/// Stable diagnostic kinds. The set is part of the external interface;
/// downstream tooling matches on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    #[error("Illegal Character")]
    IllegalChar,
    #[error("Non-terminating String Literal")]
    NonterminatingStringLiteral,
    #[error("Expected Expression")]
    ExpectedExpression,
    #[error("Syntax Error")]
    SyntaxError,
    #[error("Too Many Parameters")]
    TooManyParams,
    #[error("Too Many Arguments")]
    TooManyArgs,
    #[error("Too Many Members")]
    TooManyMembers,
    #[error("Too Many Variants")]
    TooManyVariants,
}

/// How severe a diagnostic is. Severity is informational during the
/// front-end pass; nothing is ever halted because of it. The CLI uses
/// [`Reporter::has_aborts`] to pick its exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Abort,
    Warning,
    Suggestion,
}

/// One recorded problem, immutable once reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
    pub severity: Severity,
    pub message: String,
}

/// Collects diagnostics during lexing and parsing, renders them afterwards.
///
/// Write-only while the front end runs: `report` appends in source order and
/// nothing reads the batch until [`Reporter::render`].
pub struct Reporter<'src> {
    path: String,
    source: &'src str,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Reporter<'src> {
    pub fn new(path: impl Into<String>, source: &'src str) -> Self {
        Self {
            path: path.into(),
            source,
            diagnostics: Vec::new(),
        }
    }

    /// Record a diagnostic. Never fails and never interrupts the caller.
    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        span: Span,
        severity: Severity,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            kind,
            span,
            severity,
            message: message.into(),
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// True when at least one Abort-severity diagnostic was recorded.
    pub fn has_aborts(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Abort)
    }

    /// Resolve a diagnostic against the source buffer: the full line
    /// containing the error's start offset, plus the caret underline.
    ///
    /// Returns `None` when the offsets fall outside the buffer or the
    /// computed line range is inverted; such diagnostics are skipped.
    pub fn excerpt(&self, diagnostic: &Diagnostic) -> Option<(String, String)> {
        let span = diagnostic.span;
        let bytes = self.source.as_bytes();
        if span.end > self.source.len() || span.start > span.end {
            return None;
        }

        // Scan backward from the start offset to the previous newline.
        let mut line_start = 0;
        for i in (1..=span.start.min(self.source.len())).rev() {
            if bytes[i - 1] == b'\n' {
                line_start = i;
                break;
            }
        }

        // Scan forward from the start offset to the next newline.
        let mut line_end = self.source.len();
        for (i, &byte) in bytes.iter().enumerate().skip(span.start) {
            if byte == b'\n' {
                line_end = i;
                break;
            }
        }

        if line_start >= line_end {
            return None;
        }

        let line = self.source[line_start..line_end].to_string();
        // `end` is inclusive, so it may only reach the line's last byte. A
        // span at the very end of the input still gets a single caret just
        // past the line.
        let caret_end = span.end.min(line_end.saturating_sub(1));
        let underline = format!(
            "{}{}",
            " ".repeat(span.start - line_start),
            "^".repeat(caret_end.saturating_sub(span.start) + 1)
        );
        Some((line, underline))
    }

    /// Render every resolvable diagnostic, in insertion order.
    pub fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        for diagnostic in &self.diagnostics {
            let Some((line, underline)) = self.excerpt(diagnostic) else {
                continue;
            };
            writeln!(out)?;
            writeln!(
                out,
                "{} {} {} on line {}",
                "error".dark_red().bold(),
                self.path,
                diagnostic.kind.to_string().cyan(),
                diagnostic.span.line
            )?;
            writeln!(out, "~")?;
            writeln!(out, "~ {}", line)?;
            writeln!(out, "~ {}", underline.yellow().bold())?;
            writeln!(out, "{}", diagnostic.message.as_str().cyan())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter(source: &str) -> Reporter<'_> {
        Reporter::new("test.chirp", source)
    }

    #[test]
    fn test_excerpt_underlines_exact_range() {
        let source = "first line\nsecond line\nthird line\n";
        let mut r = reporter(source);
        // "second" starts at offset 11 and ends at offset 16.
        r.report(
            DiagnosticKind::SyntaxError,
            Span::new(2, 11, 16),
            Severity::Abort,
            "something is off",
        );

        let (line, underline) = r.excerpt(&r.diagnostics()[0]).unwrap();
        assert_eq!(line, "second line");
        assert_eq!(underline, "^^^^^^");
    }

    #[test]
    fn test_excerpt_indents_past_line_start() {
        let source = "aaa bbb ccc";
        let mut r = reporter(source);
        r.report(
            DiagnosticKind::ExpectedExpression,
            Span::new(1, 4, 6),
            Severity::Abort,
            "msg",
        );

        let (line, underline) = r.excerpt(&r.diagnostics()[0]).unwrap();
        assert_eq!(line, "aaa bbb ccc");
        assert_eq!(underline, "    ^^^");
    }

    #[test]
    fn test_caret_run_stays_within_the_line() {
        // An inclusive end of len() is one past the buffer; the carets must
        // still stop at the line's last column.
        let source = "short";
        let mut r = reporter(source);
        r.report(
            DiagnosticKind::SyntaxError,
            Span::new(1, 0, source.len()),
            Severity::Abort,
            "msg",
        );

        let (line, underline) = r.excerpt(&r.diagnostics()[0]).unwrap();
        assert_eq!(line, "short");
        assert_eq!(underline, "^^^^^");
    }

    #[test]
    fn test_end_of_input_diagnostic_gets_one_caret() {
        // Zero-width spans at the end of the input (the EOF token) point one
        // column past the line instead of being dropped.
        let source = "y = 5";
        let mut r = reporter(source);
        r.report(
            DiagnosticKind::ExpectedExpression,
            Span::new(1, source.len(), source.len()),
            Severity::Abort,
            "msg",
        );

        let (line, underline) = r.excerpt(&r.diagnostics()[0]).unwrap();
        assert_eq!(line, "y = 5");
        assert_eq!(underline, "     ^");
    }

    #[test]
    fn test_out_of_bounds_diagnostic_is_skipped() {
        let source = "short";
        let mut r = reporter(source);
        r.report(
            DiagnosticKind::SyntaxError,
            Span::new(1, 2, 99),
            Severity::Abort,
            "bad offsets",
        );
        assert!(r.excerpt(&r.diagnostics()[0]).is_none());

        // Rendering skips it without failing.
        let mut out = Vec::new();
        r.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("bad offsets"));
    }

    #[test]
    fn test_render_keeps_later_diagnostics_after_a_skip() {
        let source = "line one\nline two\n";
        let mut r = reporter(source);
        r.report(
            DiagnosticKind::SyntaxError,
            Span::new(1, 0, 999),
            Severity::Abort,
            "unrenderable",
        );
        r.report(
            DiagnosticKind::IllegalChar,
            Span::new(2, 9, 9),
            Severity::Abort,
            "renderable",
        );

        let mut out = Vec::new();
        r.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("unrenderable"));
        assert!(text.contains("renderable"));
        assert!(text.contains("on line 2"));
    }

    #[test]
    fn test_has_aborts_ignores_warnings() {
        let source = "x";
        let mut r = reporter(source);
        assert!(!r.has_aborts());
        r.report(
            DiagnosticKind::SyntaxError,
            Span::new(1, 0, 0),
            Severity::Warning,
            "just a warning",
        );
        assert!(!r.has_aborts());
        r.report(
            DiagnosticKind::IllegalChar,
            Span::new(1, 0, 0),
            Severity::Abort,
            "now an abort",
        );
        assert!(r.has_aborts());
    }

    #[test]
    fn test_kind_display_names_are_stable() {
        assert_eq!(DiagnosticKind::IllegalChar.to_string(), "Illegal Character");
        assert_eq!(
            DiagnosticKind::NonterminatingStringLiteral.to_string(),
            "Non-terminating String Literal"
        );
        assert_eq!(DiagnosticKind::TooManyArgs.to_string(), "Too Many Arguments");
    }
}
