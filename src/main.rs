// Chirp front end: lex and parse a source file, print the tree, report
// every diagnostic found in one pass.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

use chirp::diagnostics::Reporter;
use chirp::parser::{Lexer, Parser};

#[derive(Debug, Error)]
enum LoadError {
    #[error("File '{0}' not found")]
    Missing(String),
    #[error("Could not read '{0}': {1}")]
    Io(String, #[source] io::Error),
}

fn read_source(path: &str) -> Result<String, LoadError> {
    if !Path::new(path).exists() {
        return Err(LoadError::Missing(path.to_string()));
    }
    fs::read_to_string(path).map_err(|e| LoadError::Io(path.to_string(), e))
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        let program_name = args.first().map(|s| s.as_str()).unwrap_or("chirp");
        eprintln!("Error: No input file provided");
        eprintln!();
        eprintln!("Usage: {} <file.chirp>", program_name);
        eprintln!();
        eprintln!("Examples:");
        eprintln!(
            "  {} myprogram.chirp          # Parse and print the syntax tree",
            program_name
        );
        std::process::exit(1);
    }

    let path = &args[1];
    let source = match read_source(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut reporter = Reporter::new(path.as_str(), &source);
    let tokens = Lexer::new(&source).scan(&mut reporter);
    let program = Parser::new(tokens, &mut reporter).parse_program();

    let mut stdout = io::stdout();
    for node in &program {
        if write!(stdout, "{}", node.render()).is_err() {
            break;
        }
    }

    let mut stderr = io::stderr();
    if let Err(e) = reporter.render(&mut stderr) {
        eprintln!("Error: could not render diagnostics: {}", e);
    }

    if reporter.has_aborts() {
        std::process::exit(1);
    }
}
