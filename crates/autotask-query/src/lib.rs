//! Filter expression compiler for the Autotask REST API query grammar.
//!
//! This crate turns a SQL-like filter expression into the nested AND/OR
//! filter tree that the Autotask query endpoints accept as their `search`
//! payload, without any network dependencies.
//!
//! # Supported Syntax
//!
//! ## Comparisons
//! - `eq`, `ne`, `gt`, `ge`, `lt`, `le` - equality and ordering
//! - `contains` - substring match
//! - `like` - wildcard match (`*` maps to contains/beginsWith/endsWith)
//! - `in` - membership in a parenthesized value list
//!
//! Operators also accept a `-` prefix (`-eq`, `-and`, ...) and are matched
//! case-insensitively.
//!
//! ## Values
//! - Quoted strings (single or double quotes)
//! - Integer and decimal literals (optional sign)
//! - Bare words (treated as raw strings)
//!
//! ## Boolean Operators
//! - `and` - conjunction (binds tighter than `or`)
//! - `or` - disjunction
//! - `()` - grouping
//!
//! # Example
//!
//! ```
//! use autotask_query_rs::{QueryParser, FilterNode, GroupOp};
//!
//! let tree = QueryParser::parse("status eq 1 and priority gt 2").unwrap();
//! assert!(matches!(tree.root(), FilterNode::Group { op: GroupOp::And, .. }));
//!
//! // The wire form is exactly what the query endpoint expects.
//! let json = tree.to_json().unwrap();
//! assert!(json.starts_with(r#"{"filter":["#));
//! ```

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{ComparisonOp, FilterNode, FilterTree, FilterValue, GroupOp};
pub use error::{QueryError, QueryResult};
pub use lexer::{Lexer, OperatorKeyword, PositionedToken, Token};
pub use parser::QueryParser;
