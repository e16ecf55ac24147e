//! Convenient imports for typical `sqlwhere` usage.
//!
//! ```ignore
//! use sqlwhere::prelude::*;
//! ```

pub use crate::{
    CompareOp, ConditionTree, Connector, Dialect, FilterError, FilterResult, FormatConfig,
    GenericDialect, LikePattern, MySqlDialect, Operator, ParamList, ParamSink, PlaceholderStyle,
    PostgresDialect, SqlServerDialect, WhereClause,
};
