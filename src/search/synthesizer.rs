//! Beam Search Algorithm
//!
//! Drives evaluators with an external [`Oracle`] to produce up to `beam_size`
//! completed ASTs, ranked by cumulative log-probability.
//!
//! ## Algorithm Overview
//!
//! Each round:
//! 1. Stop if the beam is full, the step budget is spent, or nothing is live
//! 2. Score every live hypothesis with one `batch_update` call
//! 3. Enumerate the admissible next actions of each hypothesis and offer
//!    them, scored cumulatively, to a top-k selector sized to the remaining
//!    beam
//! 4. Replay each selected action into a clone of its parent's evaluator;
//!    finished derivations become candidates, the rest stay live
//! 5. Yield the round's candidates and progress records
//!
//! The search is a plain [`Iterator`]: the caller may stop pulling rounds at
//! any time, and dropping a [`Synthesis`] needs no cleanup.

use tracing::{debug, trace, warn};

use super::config::SynthesizerConfig;
use super::hypothesis::{Candidate, Hypothesis, Progress, Round};
use super::oracle::{LazyLogProbability, Oracle, SubtypeRelation};
use super::topk::TopKElement;
use crate::ast::Ast;
use crate::err_msg;
use crate::evaluator::Evaluator;
use crate::grammar::{Action, ActionOptions, NodeConstraint, NodeType, Rule};
use crate::DecodeError;

// ============================================================================
// ADMISSIBILITY
// ============================================================================

/// Whether applying `rule` at a head expecting `head_field` is legal.
///
/// `head_field` is `None` for an empty derivation. With
/// `retain_variadic_fields` off, variadic-typed expansions encode whole lists
/// and must match a head of the very same type, so they are never admitted by
/// subtyping alone.
pub fn is_admissible<T>(
    rule: &Rule,
    head_field: Option<&NodeType>,
    options: ActionOptions,
    subtypes: &T,
) -> bool
where
    T: SubtypeRelation + ?Sized,
{
    match rule {
        Rule::ExpandTree(rule) => {
            let parent = &rule.parent;
            let Some(head_field) = head_field else {
                return options.retain_variadic_fields
                    || parent.constraint != NodeConstraint::Variadic;
            };
            if options.retain_variadic_fields {
                return subtypes.is_subtype(&parent.type_name, &head_field.type_name);
            }
            if head_field.constraint == NodeConstraint::Variadic
                || parent.constraint == NodeConstraint::Variadic
            {
                return parent == head_field;
            }
            subtypes.is_subtype(&parent.type_name, &head_field.type_name)
        }
        Rule::CloseVariadicField => {
            options.retain_variadic_fields
                && head_field.is_some_and(|field| field.constraint == NodeConstraint::Variadic)
        }
    }
}

// ============================================================================
// SYNTHESIZER
// ============================================================================

/// Beam search over grammar actions scored by an [`Oracle`].
pub struct BeamSearchSynthesizer<O, T> {
    config: SynthesizerConfig,
    oracle: O,
    subtypes: T,
}

impl<O, T> BeamSearchSynthesizer<O, T>
where
    O: Oracle,
    T: SubtypeRelation,
{
    pub fn new(beam_size: usize, oracle: O, subtypes: T) -> Self {
        Self {
            config: SynthesizerConfig {
                beam_size,
                ..SynthesizerConfig::default()
            },
            oracle,
            subtypes,
        }
    }

    /// Builds a synthesizer from a validated configuration.
    pub fn from_config(config: SynthesizerConfig, oracle: O, subtypes: T) -> Result<Self, DecodeError> {
        Ok(Self {
            config: config.validate()?,
            oracle,
            subtypes,
        })
    }

    pub fn with_options(mut self, options: ActionOptions) -> Self {
        self.config.options = options;
        self
    }

    pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.config.max_steps = max_steps;
        self
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Starts a search for `query`. The oracle's `initialize` runs now; every
    /// round runs when the returned iterator is advanced.
    pub fn synthesize(&mut self, query: &O::Query) -> Result<Synthesis<'_, O, T>, DecodeError> {
        let state = self.oracle.initialize(query)?;
        let root = Hypothesis {
            id: 0,
            parent: None,
            score: 0.0,
            evaluator: Evaluator::new(self.config.options),
            state,
        };
        Ok(Synthesis {
            synthesizer: self,
            hypotheses: vec![root],
            n_candidates: 0,
            next_id: 1,
            steps: 0,
            finished: false,
        })
    }
}

// ============================================================================
// SYNTHESIS: one search, one round per `next()`
// ============================================================================

/// Which entry of a hypothesis's oracle scores was selected.
#[derive(Debug, Clone, Copy)]
enum Choice {
    Rule(usize),
    Token(usize),
}

/// A running search. Yields one [`Round`] per iteration.
///
/// An error ends the search: it is yielded once and the iterator is then
/// exhausted.
pub struct Synthesis<'a, O: Oracle, T> {
    synthesizer: &'a mut BeamSearchSynthesizer<O, T>,
    hypotheses: Vec<Hypothesis<O::State>>,
    n_candidates: usize,
    next_id: usize,
    steps: usize,
    finished: bool,
}

impl<O, T> Synthesis<'_, O, T>
where
    O: Oracle,
    T: SubtypeRelation,
{
    /// Hypotheses that will be expanded by the next round.
    pub fn live(&self) -> &[Hypothesis<O::State>] {
        &self.hypotheses
    }

    /// Number of oracle calls made so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn round(&mut self) -> Result<Option<Round>, DecodeError> {
        let config = self.synthesizer.config;
        if self.n_candidates >= config.beam_size || self.hypotheses.is_empty() {
            return Ok(None);
        }
        if config.max_steps.is_some_and(|max| self.steps >= max) {
            debug!(steps = self.steps, "step budget exhausted");
            return Ok(None);
        }
        self.steps += 1;

        let results = self.synthesizer.oracle.batch_update(&self.hypotheses)?;
        if results.len() != self.hypotheses.len() {
            warn!(
                expected = self.hypotheses.len(),
                actual = results.len(),
                "oracle broke the batch_update length contract"
            );
            return Err(err_msg!(
                Oracle,
                "batch_update returned {} results for {} hypotheses",
                results.len(),
                self.hypotheses.len()
            ));
        }

        let remaining = config.beam_size - self.n_candidates;
        let selected = self.select(&results, remaining);
        let round = self.expand(selected, &results)?;

        debug!(
            round = self.steps,
            candidates = round.candidates.len(),
            live = self.hypotheses.len(),
            total_candidates = self.n_candidates,
            "search round finished"
        );
        Ok(Some(round))
    }

    /// Offers every admissible next action to a selector of size `remaining`.
    fn select(
        &self,
        results: &[(O::State, LazyLogProbability)],
        remaining: usize,
    ) -> Vec<(f64, (usize, Choice))> {
        let options = self.synthesizer.config.options;
        let mut topk = TopKElement::new(remaining);
        let mut offered = 0usize;

        for (i, (hypothesis, (_, probs))) in self.hypotheses.iter().zip(results).enumerate() {
            let evaluator = &hypothesis.evaluator;
            if evaluator.is_complete() {
                continue;
            }
            let head_field = evaluator.head_field();
            match head_field {
                Some(field) if field.constraint == NodeConstraint::Token => {
                    for (j, (_, log_prob)) in probs.token_prob().iter().enumerate() {
                        topk.add(hypothesis.score + log_prob, (i, Choice::Token(j)));
                        offered += 1;
                    }
                }
                _ => {
                    for (j, (rule, log_prob)) in probs.rule_prob().iter().enumerate() {
                        if is_admissible(rule, head_field, options, &self.synthesizer.subtypes) {
                            topk.add(hypothesis.score + log_prob, (i, Choice::Rule(j)));
                            offered += 1;
                        }
                    }
                }
            }
        }
        trace!(offered, kept = topk.len(), "selected next actions");
        topk.into_sorted_vec()
    }

    /// Replays each selected action into a clone of its parent's evaluator.
    fn expand(
        &mut self,
        selected: Vec<(f64, (usize, Choice))>,
        results: &[(O::State, LazyLogProbability)],
    ) -> Result<Round, DecodeError> {
        let mut round = Round::default();
        let mut survivors = Vec::with_capacity(selected.len());

        for (score, (i, choice)) in selected {
            let parent = &self.hypotheses[i];
            let (state, probs) = &results[i];
            let action = match choice {
                Choice::Rule(j) => Action::ApplyRule(probs.rule_prob()[j].0.clone()),
                Choice::Token(j) => Action::GenerateToken(probs.token_prob()[j].0.clone()),
            };

            let id = self.next_id;
            self.next_id += 1;
            let mut evaluator = parent.evaluator.clone();
            evaluator.eval(action.clone())?;
            let is_complete = evaluator.is_complete();
            trace!(id, parent = parent.id, score, %action, is_complete, "expanded hypothesis");

            if is_complete {
                round.candidates.push(Candidate {
                    score,
                    ast: evaluator.generate_ast()?,
                });
            } else {
                survivors.push(Hypothesis {
                    id,
                    parent: Some(parent.id),
                    score,
                    evaluator,
                    state: state.clone(),
                });
            }
            round.progress.push(Progress {
                id,
                parent: Some(parent.id),
                score,
                action,
                is_complete,
            });
        }

        self.n_candidates += round.candidates.len();
        self.hypotheses = survivors;
        Ok(round)
    }
}

impl<O, T> Iterator for Synthesis<'_, O, T>
where
    O: Oracle,
    T: SubtypeRelation,
{
    type Item = Result<Round, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.round() {
            Ok(Some(round)) => Some(Ok(round)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl<O, T> std::iter::FusedIterator for Synthesis<'_, O, T>
where
    O: Oracle,
    T: SubtypeRelation,
{
}

// ============================================================================
// COLLECTION
// ============================================================================

/// The drained output of a whole search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collected {
    /// Progress records, one list per round.
    pub progress: Vec<Vec<Progress>>,
    /// All candidates, best score first.
    pub candidates: Vec<Candidate>,
}

impl Collected {
    pub fn asts(&self) -> Vec<&Ast> {
        self.candidates.iter().map(|candidate| &candidate.ast).collect()
    }
}

/// Drains a search, sorting candidates by descending score (stable, so equal
/// scores keep emission order).
pub fn collect<I>(rounds: I) -> Result<Collected, DecodeError>
where
    I: IntoIterator<Item = Result<Round, DecodeError>>,
{
    let mut collected = Collected::default();
    for round in rounds {
        let round = round?;
        collected.candidates.extend(round.candidates);
        collected.progress.push(round.progress);
    }
    collected
        .candidates
        .sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(collected)
}
