//! The capabilities the beam search consumes from the outside world.
//!
//! The scoring model is not part of this crate. It is reached through the
//! [`Oracle`] trait, and the type lattice through [`SubtypeRelation`]. Scores
//! come back as a [`LazyLogProbability`]: two independently forced, memoized
//! views, so an oracle only pays for the view the search actually reads.

use once_cell::unsync::OnceCell;
use std::cell::Cell;
use std::fmt;

use super::Hypothesis;
use crate::grammar::{Rule, Token};
use crate::DecodeError;

/// Log-probabilities of rules, in the oracle's enumeration order.
pub type RuleScores = Vec<(Rule, f64)>;

/// Log-probabilities of tokens (including [`Token::CloseNode`]), in the
/// oracle's enumeration order.
pub type TokenScores = Vec<(Token, f64)>;

type Thunk<T> = Box<dyn FnOnce() -> Vec<T>>;

/// A list computed on first access and cached afterwards.
struct Memo<T> {
    value: OnceCell<Vec<T>>,
    init: Cell<Option<Thunk<T>>>,
}

impl<T> Memo<T> {
    fn deferred(init: Thunk<T>) -> Self {
        Self {
            value: OnceCell::new(),
            init: Cell::new(Some(init)),
        }
    }

    fn ready(value: Vec<T>) -> Self {
        Self {
            value: OnceCell::with_value(value),
            init: Cell::new(None),
        }
    }

    fn force(&self) -> &[T] {
        self.value
            .get_or_init(|| self.init.take().map_or_else(Vec::new, |init| init()))
    }

    fn is_forced(&self) -> bool {
        self.value.get().is_some()
    }
}

/// Deferred rule and token log-probabilities for one hypothesis.
pub struct LazyLogProbability {
    rule_prob: Memo<(Rule, f64)>,
    token_prob: Memo<(Token, f64)>,
}

impl LazyLogProbability {
    /// Defers both views until first read.
    pub fn new<R, K>(rule_prob: R, token_prob: K) -> Self
    where
        R: FnOnce() -> RuleScores + 'static,
        K: FnOnce() -> TokenScores + 'static,
    {
        Self {
            rule_prob: Memo::deferred(Box::new(rule_prob)),
            token_prob: Memo::deferred(Box::new(token_prob)),
        }
    }

    /// Wraps scores that are already computed.
    pub fn from_scores(rule_prob: RuleScores, token_prob: TokenScores) -> Self {
        Self {
            rule_prob: Memo::ready(rule_prob),
            token_prob: Memo::ready(token_prob),
        }
    }

    pub fn rule_prob(&self) -> &[(Rule, f64)] {
        self.rule_prob.force()
    }

    pub fn token_prob(&self) -> &[(Token, f64)] {
        self.token_prob.force()
    }

    pub fn is_rule_prob_forced(&self) -> bool {
        self.rule_prob.is_forced()
    }

    pub fn is_token_prob_forced(&self) -> bool {
        self.token_prob.is_forced()
    }
}

impl fmt::Debug for LazyLogProbability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyLogProbability")
            .field("rule_prob", &self.rule_prob.value.get())
            .field("token_prob", &self.token_prob.value.get())
            .finish()
    }
}

/// The external scoring model.
///
/// `batch_update` must return exactly one result per input hypothesis, in the
/// same order. Errors are propagated to the caller of the search and never
/// retried.
pub trait Oracle {
    /// The raw query a search starts from.
    type Query: ?Sized;
    /// Opaque per-hypothesis state threaded from round to round.
    type State: Clone;

    /// Produces the first hypothesis's state. Called once per search.
    fn initialize(&mut self, query: &Self::Query) -> Result<Self::State, DecodeError>;

    /// Scores every live hypothesis in one call.
    fn batch_update(
        &mut self,
        hypotheses: &[Hypothesis<Self::State>],
    ) -> Result<Vec<(Self::State, LazyLogProbability)>, DecodeError>;
}

/// `is_subtype(candidate, expected)`: true if a node of type `candidate` may
/// fill a field expecting `expected`. Must be reflexive.
pub trait SubtypeRelation {
    fn is_subtype(&self, candidate: &str, expected: &str) -> bool;
}

impl<F> SubtypeRelation for F
where
    F: Fn(&str, &str) -> bool,
{
    fn is_subtype(&self, candidate: &str, expected: &str) -> bool {
        self(candidate, expected)
    }
}

/// The relation in which every type is only a subtype of itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactTypes;

impl SubtypeRelation for ExactTypes {
    fn is_subtype(&self, candidate: &str, expected: &str) -> bool {
        candidate == expected
    }
}
