//! Beam search state and result types.

use serde::{Deserialize, Serialize};

use crate::ast::Ast;
use crate::evaluator::Evaluator;
use crate::grammar::Action;

/// One live branch of the beam.
///
/// Each hypothesis exclusively owns its evaluator; branching clones it before
/// applying the next action.
#[derive(Debug, Clone)]
pub struct Hypothesis<S> {
    pub id: usize,
    pub parent: Option<usize>,
    /// Cumulative log-probability.
    pub score: f64,
    pub evaluator: Evaluator,
    /// Oracle-defined state.
    pub state: S,
}

/// A completed, scored AST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub score: f64,
    pub ast: Ast,
}

/// Audit record of one expansion, whether or not the hypothesis it created
/// survives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub id: usize,
    pub parent: Option<usize>,
    pub score: f64,
    pub action: Action,
    pub is_complete: bool,
}

/// Everything one search round produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub candidates: Vec<Candidate>,
    pub progress: Vec<Progress>,
}
