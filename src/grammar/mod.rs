//! Grammar model: node types, rules, and the actions the evaluator consumes.
//!
//! This module is pure data. It has no dependencies on the evaluator or the
//! search, making it the foundation layer.
//!
//! ## Vocabulary
//!
//! - A [`NodeType`] names a type and says what may fill a field of that type:
//!   one node, an open-ended list of nodes, or a token string.
//! - A [`Rule`] either expands a parent type into ordered child fields, or is
//!   the sentinel that closes an open variadic field.
//! - An [`Action`] applies a rule or emits one token fragment.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod samples;
pub mod tokenize;

pub use samples::GrammarSamples;

// ============================================================================
// NODE TYPES
// ============================================================================

/// What may fill a field of a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeConstraint {
    /// Exactly one child node.
    Node,
    /// Zero or more child nodes, closed by [`Rule::CloseVariadicField`].
    Variadic,
    /// A string accumulated from tokens, closed by [`Token::CloseNode`].
    Token,
}

/// A type name together with its field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeType {
    pub type_name: String,
    pub constraint: NodeConstraint,
}

impl NodeType {
    pub fn new(type_name: impl Into<String>, constraint: NodeConstraint) -> Self {
        Self {
            type_name: type_name.into(),
            constraint,
        }
    }

    pub fn node(type_name: impl Into<String>) -> Self {
        Self::new(type_name, NodeConstraint::Node)
    }

    pub fn variadic(type_name: impl Into<String>) -> Self {
        Self::new(type_name, NodeConstraint::Variadic)
    }

    pub fn token(type_name: impl Into<String>) -> Self {
        Self::new(type_name, NodeConstraint::Token)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constraint {
            NodeConstraint::Node => write!(f, "{}", self.type_name),
            NodeConstraint::Variadic => write!(f, "{}*", self.type_name),
            NodeConstraint::Token => write!(f, "{}:token", self.type_name),
        }
    }
}

// ============================================================================
// RULES
// ============================================================================

/// Expands `parent` into the ordered `children` fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpandTreeRule {
    pub parent: NodeType,
    pub children: Vec<(String, NodeType)>,
}

impl ExpandTreeRule {
    pub fn new(parent: NodeType, children: Vec<(&str, NodeType)>) -> Self {
        Self {
            parent,
            children: children
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty))
                .collect(),
        }
    }

    /// The constraint of the field at `index`, if the rule declares one.
    pub fn field_type(&self, index: usize) -> Option<&NodeType> {
        self.children.get(index).map(|(_, ty)| ty)
    }
}

/// A grammar rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    ExpandTree(ExpandTreeRule),
    /// Terminates an open variadic field. All instances compare equal.
    CloseVariadicField,
}

impl Rule {
    pub fn expand(parent: NodeType, children: Vec<(&str, NodeType)>) -> Self {
        Rule::ExpandTree(ExpandTreeRule::new(parent, children))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::ExpandTree(rule) => {
                write!(f, "{} -> ", rule.parent)?;
                if rule.children.is_empty() {
                    return write!(f, "()");
                }
                let fields = rule
                    .children
                    .iter()
                    .map(|(name, ty)| format!("{name}: {ty}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "({fields})")
            }
            Rule::CloseVariadicField => write!(f, "<close-variadic>"),
        }
    }
}

// ============================================================================
// ACTIONS
// ============================================================================

/// A token fragment, or the sentinel closing a token field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Token {
    Value(String),
    CloseNode,
}

impl Token {
    pub fn value(text: impl Into<String>) -> Self {
        Token::Value(text.into())
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Token::CloseNode)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Value(text) => write!(f, "{text:?}"),
            Token::CloseNode => write!(f, "<CloseNode>"),
        }
    }
}

/// One grammar-level decision consumed by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ApplyRule(Rule),
    GenerateToken(Token),
}

impl Action {
    pub fn close_variadic() -> Self {
        Action::ApplyRule(Rule::CloseVariadicField)
    }

    pub fn close_node() -> Self {
        Action::GenerateToken(Token::CloseNode)
    }

    pub fn token(text: impl Into<String>) -> Self {
        Action::GenerateToken(Token::value(text))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::ApplyRule(rule) => write!(f, "ApplyRule({rule})"),
            Action::GenerateToken(token) => write!(f, "GenerateToken({token})"),
        }
    }
}

// ============================================================================
// OPTIONS
// ============================================================================

/// How lists and leaf strings are encoded as actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionOptions {
    /// Keep list fields as variadic fields closed by
    /// [`Rule::CloseVariadicField`]. When off, a list of `n` elements is one
    /// expansion of a variadic-typed parent into `n` node fields.
    pub retain_variadic_fields: bool,
    /// Split leaf strings into several tokens terminated by
    /// [`Token::CloseNode`]. When off, a leaf is exactly one token.
    pub split_non_terminal: bool,
}

impl Default for ActionOptions {
    fn default() -> Self {
        Self {
            retain_variadic_fields: true,
            split_non_terminal: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_variadic_rules_compare_equal() {
        assert_eq!(Rule::CloseVariadicField, Rule::CloseVariadicField);
        assert_eq!(Action::close_variadic(), Action::ApplyRule(Rule::CloseVariadicField));
    }

    #[test]
    fn test_display() {
        let rule = Rule::expand(
            NodeType::node("X"),
            vec![("value", NodeType::node("Y")), ("names", NodeType::variadic("Str"))],
        );
        assert_eq!(rule.to_string(), "X -> (value: Y, names: Str*)");
        assert_eq!(
            Rule::expand(NodeType::node("Ysub"), vec![]).to_string(),
            "Ysub -> ()"
        );
        assert_eq!(Action::close_node().to_string(), "GenerateToken(<CloseNode>)");
    }

    #[test]
    fn test_action_json_shape() {
        let action = Action::ApplyRule(Rule::expand(
            NodeType::node("X"),
            vec![("value", NodeType::token("Str"))],
        ));
        let json = serde_json::to_string(&action).unwrap();
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);

        let close: Action = serde_json::from_str(r#"{"generate_token":"close_node"}"#).unwrap();
        assert_eq!(close, Action::close_node());
    }

    #[test]
    fn test_options_default_from_partial_yaml() {
        let opts: ActionOptions = serde_yaml::from_str("split_non_terminal: false").unwrap();
        assert!(opts.retain_variadic_fields);
        assert!(!opts.split_non_terminal);
    }
}
