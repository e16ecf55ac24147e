//! SQL dialect primitives used by the clause builder and the tree compiler.
//!
//! A [`Dialect`] only supplies the handful of pieces whose syntax differs
//! between databases: identifier quoting, comparison tokens, LIKE templates,
//! string concatenation and aggregate calls. Everything else is plain text.

use crate::ident::{Ident, QuoteChars};

/// The value hole in templates accepted by
/// [`WhereClause::where_if`](crate::WhereClause::where_if).
pub const HOLE: &str = "{0}";

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    /// ANSI token for this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }
}

/// Where the `%` wildcards go around a LIKE value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikePattern {
    /// `%value%`
    Contains,
    /// `value%`
    StartsWith,
    /// `%value`
    EndsWith,
}

impl LikePattern {
    /// `(left, right)` wildcard flags.
    pub fn wildcards(self) -> (bool, bool) {
        match self {
            LikePattern::Contains => (true, true),
            LikePattern::StartsWith => (false, true),
            LikePattern::EndsWith => (true, false),
        }
    }
}

/// Aggregate function usable as a field-level virtual operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFn {
    Min,
    Max,
    Sum,
    Count,
}

impl AggregateFn {
    pub fn name(self) -> &'static str {
        match self {
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
            AggregateFn::Sum => "sum",
            AggregateFn::Count => "count",
        }
    }
}

/// Dialect-specific rendering primitives.
///
/// Implementations must be stateless (or internally synchronized): one
/// dialect value is shared by a builder and all of its nested scopes.
pub trait Dialect: Send + Sync {
    /// Short dialect name, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Quote a column name or dotted path.
    fn pre_name(&self, name: &str) -> String;

    /// Render a comparison operator.
    fn match_operator_grammar(&self, op: CompareOp) -> String {
        op.as_str().to_string()
    }

    /// Concatenate SQL string expressions.
    fn string_concat(&self, parts: &[&str]) -> String {
        parts.join(" || ")
    }

    /// SQL written before and after the bound value of a LIKE match on `field`.
    ///
    /// Normally `field like ` then the value. With `reverse` the bound value
    /// is the subject and the column becomes the pattern, wrapped in `%` per
    /// the wildcard flags.
    fn like_grammar(&self, field: &str, left: bool, right: bool, reverse: bool) -> (String, String) {
        if !reverse {
            return (format!("{field} like "), String::new());
        }
        let mut parts = Vec::with_capacity(3);
        if left {
            parts.push("'%'");
        }
        parts.push(field);
        if right {
            parts.push("'%'");
        }
        let pattern = if parts.len() == 1 {
            field.to_string()
        } else {
            self.string_concat(&parts)
        };
        (String::new(), format!(" like {pattern}"))
    }

    /// Wrap a LIKE value in `%` per the wildcard flags. Reversed matches put
    /// the wildcards on the column, so the value passes through untouched.
    fn like_value_filter(&self, value: &str, left: bool, right: bool, reverse: bool) -> String {
        if reverse {
            return value.to_string();
        }
        let mut out = String::with_capacity(value.len() + 2);
        if left {
            out.push('%');
        }
        out.push_str(value);
        if right {
            out.push('%');
        }
        out
    }

    /// Render an aggregate call over `expr`.
    fn aggregate(&self, func: AggregateFn, expr: &str) -> String {
        format!("{}({expr})", func.name())
    }
}

fn quote_path(name: &str, quote: QuoteChars, always: bool) -> String {
    match Ident::lenient(name) {
        Some(ident) => {
            let mut out = String::with_capacity(ident.estimated_len());
            ident.write_quoted(&mut out, quote, always);
            out
        }
        None => String::new(),
    }
}

/// ANSI dialect that leaves plain identifiers unquoted.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericDialect;

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn pre_name(&self, name: &str) -> String {
        quote_path(name, QuoteChars::DOUBLE, false)
    }
}

/// PostgreSQL: every identifier part double-quoted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn pre_name(&self, name: &str) -> String {
        quote_path(name, QuoteChars::DOUBLE, true)
    }
}

/// MySQL: backtick quoting and `concat()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn pre_name(&self, name: &str) -> String {
        quote_path(name, QuoteChars::BACKTICK, true)
    }

    fn string_concat(&self, parts: &[&str]) -> String {
        format!("concat({})", parts.join(", "))
    }
}

/// SQL Server: bracket quoting and `+` concatenation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn pre_name(&self, name: &str) -> String {
        quote_path(name, QuoteChars::BRACKET, true)
    }

    fn string_concat(&self, parts: &[&str]) -> String {
        parts.join(" + ")
    }
}
