//! Grammar-driven decomposition of an AST into the actions that derive it.
//!
//! Replaying the produced sequence through a fresh [`Evaluator`] built with
//! the same options reconstructs an equal tree.
//!
//! [`Evaluator`]: crate::evaluator::Evaluator

use super::{Ast, FieldValue, Node};
use crate::err_msg;
use crate::grammar::{Action, ActionOptions, ExpandTreeRule, NodeType, Rule, Token};
use crate::DecodeError;

/// Flattens `ast` into a pre-order action sequence.
///
/// `tokenize` splits leaf values when `options.split_non_terminal` is on; it
/// must be concatenation-preserving for the round trip to hold.
pub fn ast_to_action_sequence<F>(
    ast: &Ast,
    options: ActionOptions,
    tokenize: F,
) -> Result<Vec<Action>, DecodeError>
where
    F: Fn(&str) -> Vec<String>,
{
    let Ast::Node(root) = ast else {
        return Err(err_msg!(Grammar, "the root of a derivation must be a node, found leaf '{}'", ast.type_name()));
    };
    let mut actions = Vec::new();
    flatten_node(root, options, &tokenize, &mut actions)?;
    Ok(actions)
}

fn field_type(type_name: &str, value: &FieldValue) -> NodeType {
    match value {
        FieldValue::List(_) => NodeType::variadic(type_name),
        FieldValue::Single(inner) => match inner.as_ref() {
            Ast::Node(_) => NodeType::node(type_name),
            Ast::Leaf(_) => NodeType::token(type_name),
        },
    }
}

fn flatten_node<F>(
    node: &Node,
    options: ActionOptions,
    tokenize: &F,
    out: &mut Vec<Action>,
) -> Result<(), DecodeError>
where
    F: Fn(&str) -> Vec<String>,
{
    let children = node
        .fields
        .iter()
        .map(|field| {
            (
                field.name.clone(),
                field_type(&field.type_name, &field.value),
            )
        })
        .collect();
    out.push(Action::ApplyRule(Rule::ExpandTree(ExpandTreeRule {
        parent: NodeType::node(&node.type_name),
        children,
    })));

    for field in &node.fields {
        match &field.value {
            FieldValue::List(items) => {
                if !options.retain_variadic_fields {
                    let element = NodeType::node(&field.type_name);
                    out.push(Action::ApplyRule(Rule::ExpandTree(ExpandTreeRule {
                        parent: NodeType::variadic(&field.type_name),
                        children: (0..items.len())
                            .map(|i| (i.to_string(), element.clone()))
                            .collect(),
                    })));
                }
                for item in items {
                    let Ast::Node(child) = item else {
                        return Err(err_msg!(
                            Grammar,
                            "list field '{}' of '{}' contains a leaf",
                            field.name,
                            node.type_name
                        ));
                    };
                    flatten_node(child, options, tokenize, out)?;
                }
                if options.retain_variadic_fields {
                    out.push(Action::close_variadic());
                }
            }
            FieldValue::Single(inner) => match inner.as_ref() {
                Ast::Node(child) => flatten_node(child, options, tokenize, out)?,
                Ast::Leaf(leaf) if leaf.type_name != field.type_name => {
                    return Err(err_msg!(
                        Grammar,
                        "leaf of type '{}' in field '{}' of '{}' expecting '{}'",
                        leaf.type_name,
                        field.name,
                        node.type_name,
                        field.type_name
                    ));
                }
                Ast::Leaf(leaf) if options.split_non_terminal => {
                    out.extend(tokenize(&leaf.value).into_iter().map(Action::token));
                    out.push(Action::GenerateToken(Token::CloseNode));
                }
                Ast::Leaf(leaf) => out.push(Action::token(leaf.value.clone())),
            },
        }
    }
    Ok(())
}
