//! # sqlwhere
//!
//! A dialect-agnostic WHERE clause builder.
//!
//! ## Features
//!
//! - **Fluent predicates**: `eq`, `gt`, `like`, `in_list`, ... with values bound through a
//!   pluggable [`ParamSink`]
//! - **NoSQL-style filters**: a [`ConditionTree`] of `$eq` / `$in` / `$or` / ... nodes compiles
//!   into parameterized SQL
//! - **Nested groups**: `and(|w| ...)` / `or(|w| ...)` scopes render as indented, balanced
//!   parenthesized fragments
//! - **Resilient input**: blank values, empty lists and unsupported field chains are dropped
//!   instead of producing broken or always-false SQL
//! - **Dialects**: quoting, LIKE and concatenation syntax for ANSI, PostgreSQL, MySQL and
//!   SQL Server
//!
//! ## Example
//!
//! ```ignore
//! use sqlwhere::prelude::*;
//! use serde_json::json;
//!
//! // { status: { $in: ["A", "B"] }, $or: [{ age: { $gt: 60 } }, { vip: { $eq: true } }] }
//! let mut tree = ConditionTree::new();
//! let status = tree.field(tree.root(), "status");
//! tree.logical(status, "$in", json!(["A", "B"]))?;
//! let or = tree.or_array(tree.root());
//! let age = tree.field(or, "age");
//! tree.logical(age, "$gt", 60)?;
//! let vip = tree.field(or, "vip");
//! tree.logical(vip, "$eq", true)?;
//!
//! let mut params = ParamList::with_style(PlaceholderStyle::Dollar);
//! let mut clause = WhereClause::new(&PostgresDialect, &mut params);
//! clause.eq("tenant_id", 7).query(&tree);
//!
//! let sql = format!("SELECT * FROM customers WHERE {}", clause.build_where());
//! # Ok::<(), sqlwhere::FilterError>(())
//! ```

/// Trace-level diagnostics for silently omitted input.
macro_rules! compile_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "sqlwhere.compile", $($arg)*);
    };
}

/// Debug-level diagnostics for compiled trees.
macro_rules! compile_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "sqlwhere.compile", $($arg)*);
    };
}

pub mod clause;
pub mod config;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod param;
pub mod prelude;
pub mod tree;

pub use clause::{Connector, Fragment, FragmentList, WhereClause};
pub use config::{FormatConfig, LineEnding};
pub use dialect::{
    AggregateFn, CompareOp, Dialect, GenericDialect, HOLE, LikePattern, MySqlDialect,
    PostgresDialect, SqlServerDialect,
};
pub use error::{FilterError, FilterResult};
pub use ident::{Ident, IdentPart, QuoteChars};
pub use param::{ParamList, ParamSink, PlaceholderStyle};
pub use tree::{ConditionTree, Node, NodeId, NodeKind, Operator};
