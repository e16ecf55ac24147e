//! Condition tree: the input model of the NoSQL-style filter compiler.
//!
//! A tree is produced upstream from a JSON-like filter object and handed to
//! [`WhereClause::query`](crate::WhereClause::query) for a single read-only
//! compilation pass. Nodes live in an arena owned by [`ConditionTree`]; each
//! node owns the ordered list of its children and keeps a non-owning
//! back-reference to its parent.
//!
//! ```ignore
//! use sqlwhere::ConditionTree;
//! use serde_json::json;
//!
//! // { age: { $gt: 18 }, status: { $in: ["A", "B"] } }
//! let mut tree = ConditionTree::new();
//! let age = tree.field(tree.root(), "age");
//! tree.logical(age, "$gt", json!(18))?;
//! let status = tree.field(tree.root(), "status");
//! tree.logical(status, "$in", json!(["A", "B"]))?;
//! # Ok::<(), sqlwhere::FilterError>(())
//! ```

use crate::dialect::{AggregateFn, CompareOp, LikePattern};
use crate::error::{FilterError, FilterResult};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Operator vocabulary of `Logical` nodes, decoded once from its `$tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Gt,
    Gteq,
    Lt,
    Lteq,
    NotEq,
    Like,
    Start,
    End,
    Null,
    In,
    NotIn,
    And,
    Or,
    Not,
    Min,
    Max,
    Sum,
    Count,
    NotNull,
    Ref,
}

impl Operator {
    pub const ALL: [Operator; 21] = [
        Operator::Eq,
        Operator::Gt,
        Operator::Gteq,
        Operator::Lt,
        Operator::Lteq,
        Operator::NotEq,
        Operator::Like,
        Operator::Start,
        Operator::End,
        Operator::Null,
        Operator::In,
        Operator::NotIn,
        Operator::And,
        Operator::Or,
        Operator::Not,
        Operator::Min,
        Operator::Max,
        Operator::Sum,
        Operator::Count,
        Operator::NotNull,
        Operator::Ref,
    ];

    /// The `$tag` this operator is spelled as in filter objects.
    pub fn tag(self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Gt => "$gt",
            Operator::Gteq => "$gteq",
            Operator::Lt => "$lt",
            Operator::Lteq => "$lteq",
            Operator::NotEq => "$noteq",
            Operator::Like => "$like",
            Operator::Start => "$start",
            Operator::End => "$end",
            Operator::Null => "$null",
            Operator::In => "$in",
            Operator::NotIn => "$notin",
            Operator::And => "$and",
            Operator::Or => "$or",
            Operator::Not => "$not",
            Operator::Min => "$min",
            Operator::Max => "$max",
            Operator::Sum => "$sum",
            Operator::Count => "$count",
            Operator::NotNull => "$notnull",
            Operator::Ref => "$ref",
        }
    }

    pub fn compare_op(self) -> Option<CompareOp> {
        match self {
            Operator::Eq => Some(CompareOp::Eq),
            Operator::Gt => Some(CompareOp::Gt),
            Operator::Gteq => Some(CompareOp::Gte),
            Operator::Lt => Some(CompareOp::Lt),
            Operator::Lteq => Some(CompareOp::Lte),
            Operator::NotEq => Some(CompareOp::NotEq),
            _ => None,
        }
    }

    pub fn like_pattern(self) -> Option<LikePattern> {
        match self {
            Operator::Like => Some(LikePattern::Contains),
            Operator::Start => Some(LikePattern::StartsWith),
            Operator::End => Some(LikePattern::EndsWith),
            _ => None,
        }
    }

    pub fn aggregate(self) -> Option<AggregateFn> {
        match self {
            Operator::Min => Some(AggregateFn::Min),
            Operator::Max => Some(AggregateFn::Max),
            Operator::Sum => Some(AggregateFn::Sum),
            Operator::Count => Some(AggregateFn::Count),
            _ => None,
        }
    }

    /// Field-scoped tags rendered as part of the field itself rather than as
    /// a standalone comparison.
    pub fn is_virtual(self) -> bool {
        self.aggregate().is_some()
            || self.like_pattern().is_some()
            || matches!(self, Operator::NotNull | Operator::Ref)
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(tag: &str) -> FilterResult<Self> {
        Operator::ALL
            .into_iter()
            .find(|op| op.tag() == tag)
            .ok_or_else(|| FilterError::unsupported_operator(tag))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Index of a node inside its [`ConditionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    /// A column, possibly a dotted path.
    Field(String),
    Logical(Operator),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    value: Value,
    children: Vec<NodeId>,
    children_is_array: bool,
    parent: Option<NodeId>,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Field name, operator tag, or `""` for the root.
    pub fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Root => "",
            NodeKind::Field(name) => name,
            NodeKind::Logical(op) => op.tag(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// True for an `$or` whose children are alternatives from a JSON array.
    pub fn children_is_array(&self) -> bool {
        self.children_is_array
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, NodeKind::Field(_))
    }

    pub fn operator(&self) -> Option<Operator> {
        match self.kind {
            NodeKind::Logical(op) => Some(op),
            _ => None,
        }
    }
}

/// Arena-backed condition tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionTree {
    nodes: Vec<Node>,
}

impl Default for ConditionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                value: Value::Null,
                children: Vec::new(),
                children_is_array: false,
                parent: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree. See [`get`](Self::get).
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// The node behind `id`, or `None` if `id` is out of range for this tree.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// Add a field node under `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not issued by this tree.
    pub fn field(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        self.push(parent, NodeKind::Field(name.into()), Value::Null)
    }

    /// Add a field node carrying a value, such as the `reverse` flag beside a
    /// `$like` tag.
    pub fn field_with_value(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> NodeId {
        self.push(parent, NodeKind::Field(name.into()), value.into())
    }

    /// Decode `tag` and add a logical node under `parent`.
    ///
    /// Fails with [`FilterError::UnsupportedOperator`] for tags outside the
    /// operator vocabulary; the tree is left unchanged.
    pub fn logical(
        &mut self,
        parent: NodeId,
        tag: &str,
        value: impl Into<Value>,
    ) -> FilterResult<NodeId> {
        let op = tag.parse::<Operator>()?;
        Ok(self.op(parent, op, value))
    }

    /// Add a logical node with an already decoded operator.
    pub fn op(&mut self, parent: NodeId, op: Operator, value: impl Into<Value>) -> NodeId {
        self.push(parent, NodeKind::Logical(op), value.into())
    }

    /// Add an `$or` whose children are alternatives joined with `or`.
    pub fn or_array(&mut self, parent: NodeId) -> NodeId {
        let id = self.op(parent, Operator::Or, Value::Null);
        self.set_children_is_array(id, true);
        id
    }

    pub fn set_children_is_array(&mut self, id: NodeId, is_array: bool) {
        self.nodes[id.0].children_is_array = is_array;
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind, value: Value) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes[parent.0].children.push(id);
        self.nodes.push(Node {
            kind,
            value,
            children: Vec::new(),
            children_is_array: false,
            parent: Some(parent),
        });
        id
    }
}
