//! Vocabulary gathered from a corpus of action sequences.
//!
//! An oracle scores over a fixed set of rules and tokens; this module collects
//! that set from ground-truth derivations.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{Action, NodeType, Rule, Token};

/// Rules, node types and tokens seen in a corpus, de-duplicated in
/// first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrammarSamples {
    pub rules: Vec<Rule>,
    pub node_types: Vec<NodeType>,
    pub tokens: Vec<String>,
}

impl GrammarSamples {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects samples from every sequence, passing each token value through
    /// `tokenize` before recording it.
    pub fn from_action_sequences<'a, I, F>(sequences: I, tokenize: F) -> Self
    where
        I: IntoIterator<Item = &'a [Action]>,
        F: Fn(&str) -> Vec<String>,
    {
        let mut samples = Self::new();
        for sequence in sequences {
            samples.record(sequence, &tokenize);
        }
        samples
    }

    /// Adds the rules, node types and tokens of one sequence.
    pub fn record<F>(&mut self, sequence: &[Action], tokenize: F)
    where
        F: Fn(&str) -> Vec<String>,
    {
        let mut seen_rules: HashSet<Rule> = self.rules.iter().cloned().collect();
        let mut seen_types: HashSet<NodeType> = self.node_types.iter().cloned().collect();
        let mut seen_tokens: HashSet<String> = self.tokens.iter().cloned().collect();

        for action in sequence {
            match action {
                Action::ApplyRule(Rule::CloseVariadicField) => {}
                Action::ApplyRule(rule @ Rule::ExpandTree(expand)) => {
                    if seen_rules.insert(rule.clone()) {
                        self.rules.push(rule.clone());
                    }
                    let field_types = expand.children.iter().map(|(_, ty)| ty);
                    for ty in std::iter::once(&expand.parent).chain(field_types) {
                        if seen_types.insert(ty.clone()) {
                            self.node_types.push(ty.clone());
                        }
                    }
                }
                Action::GenerateToken(Token::CloseNode) => {}
                Action::GenerateToken(Token::Value(text)) => {
                    for piece in tokenize(text) {
                        if seen_tokens.insert(piece.clone()) {
                            self.tokens.push(piece);
                        }
                    }
                }
            }
        }
    }
}
