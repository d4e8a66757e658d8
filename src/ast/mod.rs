//! AST module for treebeam
//!
//! The tree the evaluator reconstructs from a finished derivation, and the
//! decomposition that turns such a tree back into actions (see [`flatten`]).

// ============================================================================
// IMPORTS
// ============================================================================

use serde::{Deserialize, Serialize};

pub mod flatten;

pub use flatten::ast_to_action_sequence;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// A reconstructed abstract syntax tree.
///
/// # Examples
///
/// ```rust
/// use treebeam::ast::{Ast, Field};
/// let tree = Ast::node("X", vec![Field::single("value", "Y", Ast::node("Ysub", vec![]))]);
/// assert_eq!(tree.pretty(), "X(value=Ysub())");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ast {
    Node(Node),
    Leaf(Leaf),
}

/// An interior node with named, ordered fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub type_name: String,
    pub fields: Vec<Field>,
}

/// A string-valued leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    pub type_name: String,
    pub value: String,
}

/// One named field of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub type_name: String,
    pub value: FieldValue,
}

/// The content of a field: one subtree (a node or a leaf) or a list of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Single(Box<Ast>),
    List(Vec<Ast>),
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Ast {
    pub fn node(type_name: impl Into<String>, fields: Vec<Field>) -> Self {
        Ast::Node(Node {
            type_name: type_name.into(),
            fields,
        })
    }

    pub fn leaf(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Ast::Leaf(Leaf {
            type_name: type_name.into(),
            value: value.into(),
        })
    }

    pub fn type_name(&self) -> &str {
        match self {
            Ast::Node(node) => &node.type_name,
            Ast::Leaf(leaf) => &leaf.type_name,
        }
    }

    /// Pretty-prints the tree on one line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use treebeam::ast::{Ast, Field};
    /// let tree = Ast::node("Call", vec![
    ///     Field::single("func", "str", Ast::leaf("str", "print")),
    ///     Field::list("args", "expr", vec![Ast::node("Name", vec![])]),
    /// ]);
    /// assert_eq!(tree.pretty(), r#"Call(func="print", args=[Name()])"#);
    /// ```
    pub fn pretty(&self) -> String {
        match self {
            Ast::Node(node) => {
                let fields = node
                    .fields
                    .iter()
                    .map(|field| format!("{}={}", field.name, field.value.pretty()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({})", node.type_name, fields)
            }
            Ast::Leaf(leaf) => format!("{:?}", leaf.value),
        }
    }
}

impl Field {
    pub fn single(name: impl Into<String>, type_name: impl Into<String>, value: Ast) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            value: FieldValue::Single(Box::new(value)),
        }
    }

    pub fn list(name: impl Into<String>, type_name: impl Into<String>, values: Vec<Ast>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            value: FieldValue::List(values),
        }
    }
}

impl FieldValue {
    pub fn pretty(&self) -> String {
        match self {
            FieldValue::Single(ast) => ast.pretty(),
            FieldValue::List(items) => {
                let inner = items.iter().map(Ast::pretty).collect::<Vec<_>>().join(", ");
                format!("[{inner}]")
            }
        }
    }
}

impl std::fmt::Display for Ast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pretty())
    }
}
