//! End-to-end tests for the Chirp front end: source text in, AST and
//! diagnostics out.

use chirp::diagnostics::{DiagnosticKind, Reporter};
use chirp::parser::{Lexer, Node, Parser};

fn parse(source: &str) -> (Vec<Node>, Vec<DiagnosticKind>) {
    let mut reporter = Reporter::new("test.chirp", source);
    let tokens = Lexer::new(source).scan(&mut reporter);
    let program = Parser::new(tokens, &mut reporter).parse_program();
    let kinds = reporter.diagnostics().iter().map(|d| d.kind).collect();
    (program, kinds)
}

#[test]
fn test_parses_a_small_program() {
    let source = r#"
#' Greets a name a few times.
greet = function (name: String, times: Int) {
    mut i = 0
    if times > 0 {
        print("hello ", name)
        i -> i + 1
    }
    return i
}

enum Mood { Happy, Grumpy }

result = greet("world", 3)
"#;

    let (program, kinds) = parse(source);
    assert!(kinds.is_empty(), "unexpected diagnostics: {:?}", kinds);
    assert_eq!(program.len(), 3);
    assert!(matches!(&program[0], Node::Binding { name, .. } if name == "greet"));
    assert!(matches!(&program[1], Node::EnumDecl { .. }));
    assert!(matches!(&program[2], Node::Binding { name, .. } if name == "result"));
}

#[test]
fn test_one_pass_collects_every_diagnostic() {
    // Four independent problems across three lines; all reported in one pass.
    let source = "q $\nmut = 2\nenum E { 1 }\n";
    let (_, kinds) = parse(source);

    // One illegal byte from the lexer, then a bare-expression statement, a
    // malformed mut binding, and a bad enum entry from the parser.
    assert_eq!(
        kinds
            .iter()
            .filter(|k| **k == DiagnosticKind::IllegalChar)
            .count(),
        1
    );
    assert_eq!(
        kinds
            .iter()
            .filter(|k| **k == DiagnosticKind::SyntaxError)
            .count(),
        3
    );
}

#[test]
fn test_unterminated_string_does_not_stop_the_file() {
    let source = "a = 1\nb = \"oops";
    let (program, kinds) = parse(source);

    assert_eq!(kinds, vec![DiagnosticKind::NonterminatingStringLiteral]);
    // Both bindings survive; the second gets the string up to EOF.
    assert_eq!(program.len(), 2);
    match &program[1] {
        Node::Binding { init: Some(init), .. } => {
            assert!(matches!(&**init, Node::Str { value, .. } if value == "oops"));
        }
        other => panic!("expected binding, got {:?}", other),
    }
}

#[test]
fn test_printer_output_is_exact_and_repeatable() {
    let (program, kinds) = parse("x = 1 + 2 * 3\n");
    assert!(kinds.is_empty());

    let expected = "\
{ Binding x mut=false
  { Binary +
    { Integer 1 base=10 }
    { Binary *
      { Integer 2 base=10 }
      { Integer 3 base=10 }
    }
  }
}
";
    assert_eq!(program[0].render(), expected);
    assert_eq!(program[0].render(), program[0].render());
}

#[test]
fn test_whole_program_render_is_deterministic() {
    let source = r#"
f = function (a: Int): Int {
    if a < 10 {
        return a
    } else {
        return f(a - 1)
    }
}
values = [1, 2, f(30)]
"#;
    let (program, kinds) = parse(source);
    assert!(kinds.is_empty(), "{:?}", kinds);

    let render = |nodes: &[Node]| -> String { nodes.iter().map(Node::render).collect() };
    assert_eq!(render(&program), render(&program));
}

#[test]
fn test_diagnostics_render_with_caret_underlines() {
    let source = "x = 1\ny = $\n";
    let mut reporter = Reporter::new("bad.chirp", source);
    let tokens = Lexer::new(source).scan(&mut reporter);
    let _ = Parser::new(tokens, &mut reporter).parse_program();

    assert!(reporter.has_aborts());
    let diagnostic = &reporter.diagnostics()[0];
    let (line, underline) = reporter
        .excerpt(diagnostic)
        .expect("diagnostic should resolve to a source line");
    assert_eq!(line, "y = $");
    assert_eq!(underline, "    ^");
}

#[test]
fn test_else_if_chain_nests_to_the_right() {
    let source = r#"
if a {
    f()
} else if b {
    g()
} else if c {
    h()
}
"#;
    let (program, kinds) = parse(source);
    assert!(kinds.is_empty(), "{:?}", kinds);

    let mut depth = 0;
    let mut current = Some(&program[0]);
    while let Some(Node::IfStmt { else_branch, .. }) = current {
        depth += 1;
        current = else_branch.as_deref();
    }
    assert_eq!(depth, 3);
}

#[test]
fn test_clean_parse_has_no_aborts() {
    let source = "x = 1\nf()\n";
    let mut reporter = Reporter::new("ok.chirp", source);
    let tokens = Lexer::new(source).scan(&mut reporter);
    let _ = Parser::new(tokens, &mut reporter).parse_program();
    assert!(!reporter.has_aborts());
}
