//! Defines the command-line arguments and subcommands for the treebeam CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "treebeam",
    version,
    about = "Replay, flatten and inspect grammar action sequences."
)]
pub struct TreebeamArgs {
    #[command(subcommand)]
    pub command: Command,

    /// YAML or JSON synthesizer config to read action options from.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Encode lists as one expansion instead of closed variadic fields.
    #[arg(long, global = true)]
    pub no_variadic: bool,

    /// Emit every leaf as a single token instead of splitting it.
    #[arg(long, global = true)]
    pub no_split: bool,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a JSON action sequence and print the reconstructed AST.
    Replay {
        /// The path to the JSON array of actions.
        #[arg(required = true)]
        file: PathBuf,
        /// Print the AST as JSON instead of the compact form.
        #[arg(long)]
        json: bool,
    },
    /// Print the action sequence that derives a JSON AST.
    Flatten {
        /// The path to the JSON AST.
        #[arg(required = true)]
        file: PathBuf,
        /// How leaf values are split into tokens.
        #[arg(long, value_enum, default_value_t = TokenizerKind::Words)]
        tokenizer: TokenizerKind,
    },
    /// Collect the rules, node types and tokens of every JSON AST in a directory.
    Samples {
        /// The directory to search recursively for `.json` files.
        #[arg(required = true)]
        dir: PathBuf,
        /// How leaf values are split into tokens.
        #[arg(long, value_enum, default_value_t = TokenizerKind::Words)]
        tokenizer: TokenizerKind,
    },
}

/// Leaf tokenizers selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TokenizerKind {
    /// Word, whitespace and punctuation runs.
    Words,
    /// Unicode grapheme clusters.
    Graphemes,
}
