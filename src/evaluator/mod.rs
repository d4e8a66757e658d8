//! Incremental evaluation of action sequences.
//!
//! ## Core Responsibility: Action → Tree Mutation
//!
//! The [`Evaluator`] consumes one [`Action`] at a time, rejects actions that do
//! not fit the open insertion point (the *head*), and links accepted actions
//! into an arena of integer-indexed nodes. Once the head resolves to `None`
//! after the first action, the derivation is complete and
//! [`Evaluator::generate_ast`] rebuilds the tree.
//!
//! ## Representation
//!
//! - `action_sequence`: append-only; an action's index is its identity
//! - `children[i]`: one slot per field of action `i`'s rule, each slot the
//!   ordered child indices
//! - `parent[i]`: the `(action, field)` slot action `i` was linked into
//! - `head_children_index[i]`: next field of action `i` to fill
//!
//! All of these are `im` persistent structures, so [`Clone`] shares
//! structure with the original while every later mutation stays private to
//! the copy that made it. The beam search clones one evaluator per branch
//! each round.
//!
//! ## Closing fields
//!
//! A node closes once all of its fields are filled; closing it records a
//! finished child in the parent's field, which may close the parent too. This
//! cascade runs as a loop so arbitrarily long variadic or token chains never
//! grow the stack.

use im::{HashMap, Vector};
use serde::{Deserialize, Serialize};

use crate::grammar::{Action, ActionOptions, ExpandTreeRule, NodeConstraint, NodeType, Rule};
use crate::DecodeError;

mod reconstruct;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// A slot in the partial tree: field `field` of the node created by action
/// `action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parent {
    pub action: usize,
    pub field: usize,
}

/// The mutable derivation state.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    options: ActionOptions,
    action_sequence: Vector<Action>,
    children: Vector<Vector<Vector<usize>>>,
    parent: Vector<Option<Parent>>,
    head_action: Option<usize>,
    head_children_index: HashMap<usize, usize>,
}

/// What an accepted action does to the head once it is linked.
enum Effect {
    /// A new node with this many fields becomes the head.
    Open(usize),
    /// The field under the head is finished.
    CloseField,
    /// The field under the head stays open.
    Stay,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Evaluator {
    pub fn new(options: ActionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// The slot the next action will fill, or `None` when the tree is empty
    /// or complete.
    pub fn head(&self) -> Option<Parent> {
        self.head_action.map(|action| Parent {
            action,
            field: self.head_children_index.get(&action).copied().unwrap_or(0),
        })
    }

    /// The type constraint the next action must satisfy, or `None` when there
    /// is no head.
    pub fn head_field(&self) -> Option<&NodeType> {
        let head = self.head()?;
        self.rule_at(head.action)?.field_type(head.field)
    }

    /// True once at least one action was applied and no field is open.
    pub fn is_complete(&self) -> bool {
        self.head_action.is_none() && !self.action_sequence.is_empty()
    }

    pub fn action_sequence(&self) -> &Vector<Action> {
        &self.action_sequence
    }

    pub fn len(&self) -> usize {
        self.action_sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.action_sequence.is_empty()
    }

    /// The most recently applied action.
    pub fn last_action(&self) -> Option<&Action> {
        self.action_sequence.last()
    }

    /// The slot action `index` was linked into; `None` for the root or an
    /// unknown index.
    pub fn parent(&self, index: usize) -> Option<Parent> {
        self.parent.get(index).copied().flatten()
    }

    /// The field slots of action `index`.
    pub fn children(&self, index: usize) -> Option<&Vector<Vector<usize>>> {
        self.children.get(index)
    }

    /// Applies one action.
    ///
    /// Fails with `InvalidAction` when the action does not fit the head: a
    /// rule where a token is required, a token where a rule is required, a
    /// variadic close outside an open variadic field, or any action after the
    /// derivation completed. A rejected action leaves the evaluator unchanged.
    pub fn eval(&mut self, action: Action) -> Result<(), DecodeError> {
        let index = self.action_sequence.len();
        let head = self.head();
        if head.is_none() && !self.action_sequence.is_empty() {
            return Err(DecodeError::invalid_action(
                "no further action (derivation is complete)",
                &action,
                index,
            ));
        }
        let head_constraint = self.head_field().map(|field| field.constraint);

        let effect = match &action {
            Action::ApplyRule(Rule::ExpandTree(rule)) => {
                if head_constraint == Some(NodeConstraint::Token) {
                    return Err(DecodeError::invalid_action("GenerateToken", &action, index));
                }
                Effect::Open(rule.children.len())
            }
            Action::ApplyRule(Rule::CloseVariadicField) => match head_constraint {
                Some(NodeConstraint::Variadic) if self.options.retain_variadic_fields => Effect::CloseField,
                Some(NodeConstraint::Token) => {
                    return Err(DecodeError::invalid_action("GenerateToken", &action, index));
                }
                Some(NodeConstraint::Node | NodeConstraint::Variadic) | None => {
                    return Err(DecodeError::invalid_action(
                        "ApplyRule(ExpandTreeRule)",
                        &action,
                        index,
                    ));
                }
            },
            Action::GenerateToken(token) => match head_constraint {
                Some(NodeConstraint::Token) => {
                    if token.is_close() || !self.options.split_non_terminal {
                        Effect::CloseField
                    } else {
                        Effect::Stay
                    }
                }
                Some(_) => return Err(DecodeError::invalid_action("ApplyRule", &action, index)),
                None => {
                    return Err(DecodeError::invalid_action(
                        "ApplyRule(ExpandTreeRule)",
                        &action,
                        index,
                    ));
                }
            },
        };

        let n_slots = match effect {
            Effect::Open(n_fields) => n_fields,
            Effect::CloseField | Effect::Stay => 0,
        };
        self.append(action, head, n_slots);

        match effect {
            Effect::Open(_) => {
                self.head_children_index.insert(index, 0);
                self.head_action = Some(index);
                self.close_filled_nodes();
            }
            Effect::CloseField => {
                if let Some(head) = head {
                    self.head_children_index.insert(head.action, head.field + 1);
                }
                self.close_filled_nodes();
            }
            Effect::Stay => {}
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Tree bookkeeping
    // ------------------------------------------------------------------------

    pub(crate) fn rule_at(&self, index: usize) -> Option<&ExpandTreeRule> {
        match self.action_sequence.get(index)? {
            Action::ApplyRule(Rule::ExpandTree(rule)) => Some(rule),
            _ => None,
        }
    }

    /// Appends `action`, gives it `n_slots` empty field slots and links it
    /// into the head's current field.
    fn append(&mut self, action: Action, head: Option<Parent>, n_slots: usize) {
        let index = self.action_sequence.len();
        self.action_sequence.push_back(action);
        self.children
            .push_back((0..n_slots).map(|_| Vector::new()).collect());
        self.parent.push_back(head);
        if let Some(head) = head {
            if let Some(slot) = self
                .children
                .get_mut(head.action)
                .and_then(|slots| slots.get_mut(head.field))
            {
                slot.push_back(index);
            }
        }
    }

    /// Closes every node, from the head upward, whose fields are all filled.
    ///
    /// Each closed node is a finished child of its parent's current field.
    /// That field advances unless it is a retained variadic field, which only
    /// closes through an explicit sentinel. Without retention a variadic field
    /// holds exactly one child: the expansion encoding the whole list.
    fn close_filled_nodes(&mut self) {
        while let Some(head) = self.head() {
            let n_fields = self.rule_at(head.action).map_or(0, |rule| rule.children.len());
            if head.field < n_fields {
                return;
            }
            self.head_action = self.parent(head.action).map(|parent| parent.action);

            let Some(parent) = self.head() else { return };
            let stays_open = self.options.retain_variadic_fields
                && self
                    .rule_at(parent.action)
                    .and_then(|rule| rule.field_type(parent.field))
                    .is_some_and(|field| field.constraint == NodeConstraint::Variadic);
            if !stays_open {
                self.head_children_index.insert(parent.action, parent.field + 1);
            }
        }
    }
}
