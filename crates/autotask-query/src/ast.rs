//! Filter tree (AST) for compiled query expressions.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// A comparison operator in the Autotask query grammar.
///
/// These are the wire-level operator names; the expression syntax accepts
/// the SQL-like spellings (`ne`, `ge`, `le`, `like`) and maps them here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// Equal.
    Eq,
    /// Not equal (`ne` in expression syntax).
    NotEq,
    /// Greater than.
    Gt,
    /// Greater than or equal (`ge` in expression syntax).
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal (`le` in expression syntax).
    Lte,
    /// Substring match.
    Contains,
    /// Prefix match (`like 'A*'`).
    BeginsWith,
    /// Suffix match (`like '*A'`).
    EndsWith,
    /// Membership in a value list.
    In,
}

impl ComparisonOp {
    /// Returns the wire-level name of the operator.
    pub fn as_wire(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::NotEq => "noteq",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Gte => "gte",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Lte => "lte",
            ComparisonOp::Contains => "contains",
            ComparisonOp::BeginsWith => "beginsWith",
            ComparisonOp::EndsWith => "endsWith",
            ComparisonOp::In => "in",
        }
    }

    /// Parses a wire-level operator name.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(ComparisonOp::Eq),
            "noteq" => Some(ComparisonOp::NotEq),
            "gt" => Some(ComparisonOp::Gt),
            "gte" => Some(ComparisonOp::Gte),
            "lt" => Some(ComparisonOp::Lt),
            "lte" => Some(ComparisonOp::Lte),
            "contains" => Some(ComparisonOp::Contains),
            "beginsWith" => Some(ComparisonOp::BeginsWith),
            "endsWith" => Some(ComparisonOp::EndsWith),
            "in" => Some(ComparisonOp::In),
        _ => None,
        }
    }
}

impl std::fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// The kind of a conjunction group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOp {
    /// All items must match.
    And,
    /// At least one item must match.
    Or,
}

impl GroupOp {
    /// Returns the wire-level name of the group operator.
    pub fn as_wire(self) -> &'static str {
        match self {
            GroupOp::And => "and",
            GroupOp::Or => "or",
        }
    }
}

/// A filter value: string, integer, float, or a list of values.
///
/// Values are kept tagged so serialization and comparison stay exhaustive
/// instead of sniffing JSON shapes at each call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// An integer literal.
    Int(i64),
    /// A decimal literal.
    Float(f64),
    /// A string (quoted content or raw bareword).
    String(String),
    /// A value list, as produced by an `in` clause.
    List(Vec<FilterValue>),
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Int(n)
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Float(n)
    }
}

/// A node in a compiled filter tree.
///
/// Comparison leaves serialize with keys `field`, `op`, `value` and an
/// optional `"udf":"true"` marker; conjunction groups serialize with keys
/// `op` (`"and"`/`"or"`) and `items`.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// A single field comparison.
    Comparison {
        /// The field name being compared.
        field: String,
        /// The comparison operator.
        op: ComparisonOp,
        /// The value to compare against.
        value: FilterValue,
        /// Whether the field is a user-defined field.
        udf: bool,
    },
    /// A flattened AND/OR conjunction of two or more nodes.
    Group {
        /// The conjunction kind.
        op: GroupOp,
        /// The conjoined nodes, in source order.
        items: Vec<FilterNode>,
    },
}

impl FilterNode {
    /// Creates a comparison leaf for a standard (non-UDF) field.
    pub fn comparison(
        field: impl Into<String>,
        op: ComparisonOp,
        value: impl Into<FilterValue>,
    ) -> Self {
        FilterNode::Comparison {
            field: field.into(),
            op,
            value: value.into(),
            udf: false,
        }
    }

    /// Combines two nodes with AND, flattening a same-kind left operand.
    ///
    /// Consecutive ANDs fold into a single group with one `items` list,
    /// matching the flat-list semantics of the wire representation.
    ///
    /// # Example
    ///
    /// ```
    /// use autotask_query_rs::{ComparisonOp, FilterNode, GroupOp};
    ///
    /// let a = FilterNode::comparison("a", ComparisonOp::Eq, 1);
    /// let b = FilterNode::comparison("b", ComparisonOp::Eq, 2);
    /// let c = FilterNode::comparison("c", ComparisonOp::Eq, 3);
    ///
    /// let node = FilterNode::and(FilterNode::and(a, b), c);
    /// match node {
    ///     FilterNode::Group { op: GroupOp::And, items } => assert_eq!(items.len(), 3),
    ///     _ => panic!("expected a flattened AND group"),
    /// }
    /// ```
    pub fn and(left: FilterNode, right: FilterNode) -> Self {
        Self::conjoin(GroupOp::And, left, right)
    }

    /// Combines two nodes with OR, flattening a same-kind left operand.
    pub fn or(left: FilterNode, right: FilterNode) -> Self {
        Self::conjoin(GroupOp::Or, left, right)
    }

    fn conjoin(kind: GroupOp, left: FilterNode, right: FilterNode) -> Self {
        match left {
            FilterNode::Group { op, mut items } if op == kind => {
                items.push(right);
                FilterNode::Group { op, items }
            }
            other => FilterNode::Group {
                op: kind,
                items: vec![other, right],
            },
        }
    }

    /// Marks every comparison leaf whose field matches the predicate as a
    /// UDF lookup. Leaves already tagged stay tagged.
    pub fn mark_udfs<F>(&mut self, is_udf: &F)
    where
        F: Fn(&str) -> bool,
    {
        match self {
            FilterNode::Comparison { field, udf, .. } => {
                if !*udf && is_udf(field) {
                    *udf = true;
                }
            }
            FilterNode::Group { items, .. } => {
                for item in items {
                    item.mark_udfs(is_udf);
                }
            }
        }
    }
}

impl Serialize for FilterNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterNode::Comparison {
                field,
                op,
                value,
                udf,
            } => {
                let len = if *udf { 4 } else { 3 };
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("op", op.as_wire())?;
                map.serialize_entry("field", field)?;
                map.serialize_entry("value", value)?;
                if *udf {
                    // The API expects the marker as the string "true".
                    map.serialize_entry("udf", "true")?;
                }
                map.end()
            }
            FilterNode::Group { op, items } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("op", op.as_wire())?;
                map.serialize_entry("items", items)?;
                map.end()
            }
        }
    }
}

/// Raw wire shape used to deserialize both node kinds.
#[derive(Deserialize)]
struct RawNode {
    op: String,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    value: Option<FilterValue>,
    #[serde(default)]
    items: Option<Vec<FilterNode>>,
    #[serde(default)]
    udf: Option<String>,
}

impl<'de> Deserialize<'de> for FilterNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawNode::deserialize(deserializer)?;
        match raw.op.as_str() {
            "and" | "or" => {
                let items = raw
                    .items
                    .ok_or_else(|| de::Error::missing_field("items"))?;
                let op = if raw.op == "and" {
                    GroupOp::And
                } else {
                    GroupOp::Or
                };
                Ok(FilterNode::Group { op, items })
            }
            other => {
                let op = ComparisonOp::from_wire(other).ok_or_else(|| {
                    de::Error::custom(format!("unknown filter operator '{other}'"))
                })?;
                let field = raw
                    .field
                    .ok_or_else(|| de::Error::missing_field("field"))?;
                let value = raw
                    .value
                    .ok_or_else(|| de::Error::missing_field("value"))?;
                let udf = raw.udf.as_deref() == Some("true");
                Ok(FilterNode::Comparison {
                    field,
                    op,
                    value,
                    udf,
                })
            }
        }
    }
}

/// A complete compiled query: a single root node wrapped in the
/// `{"filter":[<node>]}` document the query endpoints accept.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTree {
    root: FilterNode,
}

impl FilterTree {
    /// Wraps a root node into a filter document.
    pub fn new(root: FilterNode) -> Self {
        Self { root }
    }

    /// Returns the root node.
    pub fn root(&self) -> &FilterNode {
        &self.root
    }

    /// Returns a mutable reference to the root node.
    pub fn root_mut(&mut self) -> &mut FilterNode {
        &mut self.root
    }

    /// Serializes the tree to the compact wire document.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parses a wire document back into a tree.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Serialize for FilterTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("filter", std::slice::from_ref(&self.root))?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for FilterTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RawTree {
            filter: Vec<FilterNode>,
        }

        let raw = RawTree::deserialize(deserializer)?;
        let mut nodes = raw.filter;
        match nodes.len() {
            0 => Err(de::Error::custom("filter document has no nodes")),
            1 => Ok(FilterTree::new(nodes.remove(0))),
            // Multiple root nodes are an implicit AND on the wire.
            _ => {
                let mut iter = nodes.into_iter();
                let mut root = iter.next().expect("len checked above");
                for node in iter {
                    root = FilterNode::and(root, node);
                }
                Ok(FilterTree::new(root))
            }
        }
    }
}
