//! # Search Test Fixtures
//!
//! A toy grammar and a scripted oracle that replays fixed score tables, one
//! table per `batch_update` call.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use treebeam::search::{Hypothesis, LazyLogProbability, Oracle, RuleScores, TokenScores};
use treebeam::{DecodeError, NodeType, Rule, Token};

pub fn ln(p: f64) -> f64 {
    p.ln()
}

/// `Ysub` may stand in for `Y`; every type is its own subtype.
pub fn is_subtype(candidate: &str, expected: &str) -> bool {
    candidate == expected || (candidate == "Ysub" && expected == "Y")
}

/// `X -> (value: Y)`
pub fn x_to_y() -> Rule {
    Rule::expand(NodeType::node("X"), vec![("value", NodeType::node("Y"))])
}

/// `X -> (value: Y*)`
pub fn x_to_ys() -> Rule {
    Rule::expand(NodeType::node("X"), vec![("value", NodeType::variadic("Y"))])
}

/// `X -> (value: Str:token)`
pub fn x_to_str() -> Rule {
    Rule::expand(NodeType::node("X"), vec![("value", NodeType::token("Str"))])
}

/// `Ysub -> ()`
pub fn y_sub() -> Rule {
    Rule::expand(NodeType::node("Ysub"), vec![])
}

/// `Y* -> (0: Y, .., n-1: Y)`, a whole list in one expansion.
pub fn y_list(n: usize) -> Rule {
    let names: Vec<String> = (0..n).map(|i| i.to_string()).collect();
    Rule::expand(
        NodeType::variadic("Y"),
        names.iter().map(|name| (name.as_str(), NodeType::node("Y"))).collect(),
    )
}

pub fn token(text: &str) -> Token {
    Token::value(text)
}

/// Counters shared between a [`ScriptedOracle`] and the views it hands out.
#[derive(Debug, Default, Clone)]
pub struct ForceCounts {
    pub rules: Rc<Cell<usize>>,
    pub tokens: Rc<Cell<usize>>,
}

/// Returns `script[n]` to every hypothesis of the `n`-th `batch_update` call,
/// and empty tables once the script runs out.
pub struct ScriptedOracle {
    script: Vec<(RuleScores, TokenScores)>,
    pub queries: Vec<String>,
    pub batch_sizes: Vec<usize>,
    pub forced: ForceCounts,
    /// Drop the last result of every batch, breaking the length contract.
    pub truncate: bool,
}

impl ScriptedOracle {
    pub fn new(script: Vec<(RuleScores, TokenScores)>) -> Self {
        Self {
            script,
            queries: Vec::new(),
            batch_sizes: Vec::new(),
            forced: ForceCounts::default(),
            truncate: false,
        }
    }

    /// A script made only of rule tables.
    pub fn rules(script: Vec<RuleScores>) -> Self {
        Self::new(script.into_iter().map(|rules| (rules, vec![])).collect())
    }

    pub fn calls(&self) -> usize {
        self.batch_sizes.len()
    }
}

impl Oracle for ScriptedOracle {
    type Query = str;
    type State = usize;

    fn initialize(&mut self, query: &str) -> Result<usize, DecodeError> {
        self.queries.push(query.to_string());
        Ok(0)
    }

    fn batch_update(
        &mut self,
        hypotheses: &[Hypothesis<usize>],
    ) -> Result<Vec<(usize, LazyLogProbability)>, DecodeError> {
        let call = self.calls();
        self.batch_sizes.push(hypotheses.len());
        let (rules, tokens) = self.script.get(call).cloned().unwrap_or_default();

        let mut results: Vec<_> = hypotheses
            .iter()
            .map(|hypothesis| {
                let (rules, tokens) = (rules.clone(), tokens.clone());
                let (rule_count, token_count) =
                    (Rc::clone(&self.forced.rules), Rc::clone(&self.forced.tokens));
                let probs = LazyLogProbability::new(
                    move || {
                        rule_count.set(rule_count.get() + 1);
                        rules
                    },
                    move || {
                        token_count.set(token_count.get() + 1);
                        tokens
                    },
                );
                (hypothesis.state + 1, probs)
            })
            .collect();
        if self.truncate {
            results.pop();
        }
        Ok(results)
    }
}
