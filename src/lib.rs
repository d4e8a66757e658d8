pub use crate::diagnostics::{DecodeError, ErrorContext, ErrorType};

pub mod ast;
pub mod cli;
pub mod diagnostics;
pub mod evaluator;
pub mod grammar;
pub mod search;

pub use crate::ast::{Ast, Field, FieldValue};
pub use crate::evaluator::{Evaluator, Parent};
pub use crate::grammar::{Action, ActionOptions, NodeConstraint, NodeType, Rule, Token};
