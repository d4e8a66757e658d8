//! The treebeam Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use clap::Parser;
use std::path::Path;
use std::{fs, process};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::ast::{ast_to_action_sequence, Ast};
use crate::cli::args::{Command, TokenizerKind, TreebeamArgs};
use crate::evaluator::Evaluator;
use crate::grammar::tokenize::{split_graphemes, split_words};
use crate::grammar::{Action, ActionOptions, GrammarSamples};
use crate::search::SynthesizerConfig;
use crate::DecodeError;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = TreebeamArgs::parse();

    let result = resolve_options(&args).and_then(|options| match &args.command {
        Command::Replay { file, json } => handle_replay(file, options, *json),
        Command::Flatten { file, tokenizer } => handle_flatten(file, options, *tokenizer),
        Command::Samples { dir, tokenizer } => handle_samples(dir, options, *tokenizer),
    });

    if let Err(e) = result {
        output::print_error(e);
        process::exit(1);
    }
}

/// Options from `--config`, overridden by the `--no-*` flags.
fn resolve_options(args: &TreebeamArgs) -> Result<ActionOptions, DecodeError> {
    let mut options = match &args.config {
        Some(path) => SynthesizerConfig::load(path)?.options,
        None => ActionOptions::default(),
    };
    if args.no_variadic {
        options.retain_variadic_fields = false;
    }
    if args.no_split {
        options.split_non_terminal = false;
    }
    debug!(?options, "resolved action options");
    Ok(options)
}

fn tokenizer(kind: TokenizerKind) -> fn(&str) -> Vec<String> {
    match kind {
        TokenizerKind::Words => split_words,
        TokenizerKind::Graphemes => split_graphemes,
    }
}

/// Handles the `replay` subcommand.
fn handle_replay(path: &Path, options: ActionOptions, json: bool) -> Result<(), DecodeError> {
    let actions: Vec<Action> = serde_json::from_str(&fs::read_to_string(path)?)?;
    let mut evaluator = Evaluator::new(options);
    for action in actions {
        evaluator.eval(action)?;
    }

    if !evaluator.is_complete() {
        output::print_incomplete(&evaluator);
        return Ok(());
    }
    let ast = evaluator.generate_ast()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ast)?);
    } else {
        output::print_complete(&ast, evaluator.len());
    }
    Ok(())
}

/// Handles the `flatten` subcommand.
fn handle_flatten(path: &Path, options: ActionOptions, kind: TokenizerKind) -> Result<(), DecodeError> {
    let ast: Ast = serde_json::from_str(&fs::read_to_string(path)?)?;
    let actions = ast_to_action_sequence(&ast, options, tokenizer(kind))?;
    println!("{}", serde_json::to_string_pretty(&actions)?);
    Ok(())
}

/// Handles the `samples` subcommand.
fn handle_samples(dir: &Path, options: ActionOptions, kind: TokenizerKind) -> Result<(), DecodeError> {
    let mut samples = GrammarSamples::new();
    let mut files = 0usize;
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| DecodeError::from(std::io::Error::from(e)))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        let ast: Ast = serde_json::from_str(&fs::read_to_string(path)?).map_err(|e| {
            DecodeError::from(e).with_help(format!("while reading {}", path.display()))
        })?;
        // Leaves stay whole here so `record` splits each of them exactly once.
        let whole_leaves = ActionOptions {
            split_non_terminal: false,
            ..options
        };
        let actions = ast_to_action_sequence(&ast, whole_leaves, tokenizer(kind))?;
        if options.split_non_terminal {
            samples.record(&actions, tokenizer(kind));
        } else {
            samples.record(&actions, |text: &str| vec![text.to_string()]);
        }
        files += 1;
    }
    info!(files, rules = samples.rules.len(), tokens = samples.tokens.len(), "collected samples");
    println!("{}", serde_json::to_string_pretty(&samples)?);
    Ok(())
}
