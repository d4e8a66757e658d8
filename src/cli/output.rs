//! Handles all user-facing output for the CLI.
//!
//! Colorized status lines go to stdout through `termcolor`; errors are
//! rendered as `miette` reports on stderr.

use miette::Report;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ast::Ast;
use crate::evaluator::Evaluator;
use crate::DecodeError;

/// Prints a finished derivation.
pub fn print_complete(ast: &Ast, actions: usize) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    print_status(&mut stdout, Color::Green, "complete", &format!("{actions} action(s)"));
    println!("{}", ast.pretty());
}

/// Prints where an unfinished derivation stopped.
pub fn print_incomplete(evaluator: &Evaluator) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let detail = match (evaluator.head(), evaluator.head_field()) {
        (Some(head), Some(field)) => format!(
            "{} action(s); next slot is field {} of action {}, expecting {}",
            evaluator.len(),
            head.field,
            head.action,
            field
        ),
        _ => "no action applied".to_string(),
    };
    print_status(&mut stdout, Color::Yellow, "incomplete", &detail);
}

/// Renders an error as a `miette` report on stderr.
pub fn print_error(err: DecodeError) {
    eprintln!("{:?}", Report::new(err));
}

fn print_status(stdout: &mut StandardStream, color: Color, label: &str, detail: &str) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(stdout, "{label}");
    let _ = stdout.reset();
    let _ = writeln!(stdout, ": {detail}");
}
