//! Rebuilding the AST of a finished derivation.

use super::Evaluator;
use crate::ast::{Ast, Field, FieldValue};
use crate::err_msg;
use crate::grammar::{Action, NodeConstraint, Rule, Token};
use crate::DecodeError;

impl Evaluator {
    /// Rebuilds the AST rooted at action 0.
    ///
    /// Fails with `Incomplete` unless [`Evaluator::is_complete`] holds; a
    /// partial tree is never returned.
    pub fn generate_ast(&self) -> Result<Ast, DecodeError> {
        if !self.is_complete() {
            return Err(err_msg!(
                Incomplete,
                "{} action(s) applied and the head is still open at {:?}",
                self.len(),
                self.head()
            )
            .with_help("check Evaluator::is_complete before reconstructing"));
        }
        self.build_node(0)
    }

    fn build_node(&self, index: usize) -> Result<Ast, DecodeError> {
        let rule = self
            .rule_at(index)
            .ok_or_else(|| err_msg!(Incomplete, "action {} does not expand a node", index))?;
        let slots = self
            .children(index)
            .ok_or_else(|| err_msg!(Incomplete, "action {} has no field slots", index))?;

        let mut fields = Vec::with_capacity(rule.children.len());
        for ((name, field_type), slot) in rule.children.iter().zip(slots.iter()) {
            let value = match field_type.constraint {
                NodeConstraint::Node => {
                    let child = slot.front().copied().ok_or_else(|| {
                        err_msg!(Incomplete, "field '{}' of action {} is empty", name, index)
                    })?;
                    FieldValue::Single(Box::new(self.build_node(child)?))
                }
                NodeConstraint::Variadic if !self.options.retain_variadic_fields => {
                    let child = slot.front().copied().ok_or_else(|| {
                        err_msg!(Incomplete, "list field '{}' of action {} is empty", name, index)
                    })?;
                    FieldValue::List(self.build_encoded_list(child)?)
                }
                NodeConstraint::Variadic => FieldValue::List(
                    slot.iter()
                        .take_while(|&&child| {
                            !matches!(
                                self.action_sequence.get(child),
                                Some(Action::ApplyRule(Rule::CloseVariadicField))
                            )
                        })
                        .map(|&child| self.build_node(child))
                        .collect::<Result<_, _>>()?,
                ),
                NodeConstraint::Token => {
                    let value: String = slot
                        .iter()
                        .map_while(|&child| match self.action_sequence.get(child) {
                            Some(Action::GenerateToken(Token::Value(text))) => Some(text.as_str()),
                            _ => None,
                        })
                        .collect();
                    FieldValue::Single(Box::new(Ast::leaf(field_type.type_name.clone(), value)))
                }
            };
            fields.push(Field {
                name: name.clone(),
                type_name: field_type.type_name.clone(),
                value,
            });
        }
        Ok(Ast::node(rule.parent.type_name.clone(), fields))
    }

    /// Elements of a list encoded as one expansion with a field per element.
    fn build_encoded_list(&self, index: usize) -> Result<Vec<Ast>, DecodeError> {
        let slots = self
            .children(index)
            .ok_or_else(|| err_msg!(Incomplete, "action {} has no field slots", index))?;
        slots
            .iter()
            .map(|slot| {
                let child = slot.front().copied().ok_or_else(|| {
                    err_msg!(Incomplete, "list element of action {} is empty", index)
                })?;
                self.build_node(child)
            })
            .collect()
    }
}
