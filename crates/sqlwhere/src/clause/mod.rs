//! WHERE clause builder.
//!
//! [`WhereClause`] accumulates boolean-connected fragments from two sources:
//! fluent predicate calls (`eq`, `like`, `in_list`, ...) and compiled
//! [`ConditionTree`]s passed to [`WhereClause::query`]. Both paths append to
//! the same ordered, text-deduplicated [`FragmentList`], which
//! [`WhereClause::build_where`] serializes with per-layer indentation.
//!
//! Values are bound through the [`ParamSink`] only when a predicate is
//! accepted by a top-level builder. Predicates inside a nested scope stay
//! unbound until the scope is spliced into its parent.
//!
//! # Example
//!
//! ```ignore
//! use sqlwhere::{GenericDialect, ParamList, WhereClause};
//!
//! let mut params = ParamList::new();
//! let mut clause = WhereClause::new(&GenericDialect, &mut params);
//! clause
//!     .eq("status", "active")
//!     .gt("age", 18)
//!     .or(|w| {
//!         w.eq("role", "admin").eq("team", "ops");
//!     });
//!
//! let sql = format!("SELECT * FROM users WHERE {}", clause.build_where());
//! ```

mod compile;
mod fragment;
mod template;


pub use fragment::{Connector, Fragment, FragmentList};

use crate::config::FormatConfig;
use crate::dialect::{CompareOp, Dialect, LikePattern};
use crate::param::ParamSink;
use crate::tree::ConditionTree;
use compile::{compile_tree, is_blank, value_text};
use serde_json::Value;
use template::Template;

/// Fluent WHERE clause builder over a dialect and a parameter sink.
///
/// Nested [`and`](WhereClause::and) / [`or`](WhereClause::or) scopes run on a
/// separate builder one layer deeper that shares the dialect, and are spliced
/// back in as a single parenthesized fragment. A scope builder has no sink of
/// its own: its slots are bound when the parent accepts the group.
pub struct WhereClause<'a> {
    dialect: &'a dyn Dialect,
    sink: Option<&'a mut dyn ParamSink>,
    config: FormatConfig,
    layer: usize,
    fragments: FragmentList,
}

impl<'a> WhereClause<'a> {
    /// Create a top-level builder with default formatting.
    pub fn new(dialect: &'a dyn Dialect, sink: &'a mut dyn ParamSink) -> Self {
        Self::with_config(dialect, sink, FormatConfig::default())
    }

    /// Create a top-level builder with the given formatting.
    pub fn with_config(
        dialect: &'a dyn Dialect,
        sink: &'a mut dyn ParamSink,
        config: FormatConfig,
    ) -> Self {
        Self {
            dialect,
            sink: Some(sink),
            config,
            layer: 0,
            fragments: FragmentList::new(),
        }
    }

    /// Nesting depth; 0 for a top-level builder.
    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Check if any fragments have been added.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Fragments in insertion order. Inside a scope, unbound values show as
    /// [`HOLE`](crate::dialect::HOLE).
    pub fn fragments(&self) -> impl Iterator<Item = Fragment<'_>> {
        self.fragments.iter()
    }

    // ==================== Raw fragments ====================

    /// Append each non-blank expression verbatim.
    ///
    /// # Safety
    ///
    /// This directly concatenates SQL. The caller must ensure safety.
    pub fn where_raw<I, S>(&mut self, connector: Connector, expressions: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for expr in expressions {
            self.push(Template::text(expr), connector);
        }
        self
    }

    /// Append `template` with its `{0}` hole bound to `value`, unless the
    /// value is null or an empty string.
    pub fn where_if(
        &mut self,
        template: &str,
        value: impl Into<Value>,
        connector: Connector,
    ) -> &mut Self {
        self.where_if_with(template, value, connector, |v| v)
    }

    /// Like [`where_if`](Self::where_if), passing the value through `filter`
    /// before it is bound.
    pub fn where_if_with<F>(
        &mut self,
        template: &str,
        value: impl Into<Value>,
        connector: Connector,
        filter: F,
    ) -> &mut Self
    where
        F: FnOnce(Value) -> Value,
    {
        self.push_if(value.into(), connector, |v| {
            Template::with_holes(template, filter(v))
        })
    }

    /// Push the template built from `value`, unless the value is null or an
    /// empty string.
    fn push_if<F>(&mut self, value: Value, connector: Connector, build: F) -> &mut Self
    where
        F: FnOnce(Value) -> Template,
    {
        if is_blank(&value) {
            compile_trace!("skipping predicate with empty value");
            return self;
        }
        self.push(build(value), connector);
        self
    }

    /// Append `template` unless it is blank or already present. Top-level
    /// builders bind accepted templates right away.
    fn push(&mut self, template: Template, connector: Connector) -> bool {
        let sink = self.sink.as_deref_mut();
        self.fragments.insert_with(template, connector, |t| match sink {
            Some(sink) => Template::text(t.bind(sink)),
            None => t,
        })
    }

    // ==================== Comparisons ====================

    /// `field op value` with an explicit connector.
    pub fn compare(
        &mut self,
        connector: Connector,
        field: &str,
        op: CompareOp,
        value: impl Into<Value>,
    ) -> &mut Self {
        let Some(column) = self.column(field) else {
            return self;
        };
        let grammar = self.dialect.match_operator_grammar(op);
        self.push_if(value.into(), connector, |v| {
            Template::text(format!("{column}{grammar}")).with_param(v)
        })
    }

    /// `field op value`, ANDed.
    pub fn match_op(&mut self, field: &str, op: CompareOp, value: impl Into<Value>) -> &mut Self {
        self.compare(Connector::And, field, op, value)
    }

    pub fn eq(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.match_op(field, CompareOp::Eq, value)
    }

    pub fn not_eq(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.match_op(field, CompareOp::NotEq, value)
    }

    pub fn lt(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.match_op(field, CompareOp::Lt, value)
    }

    pub fn lte(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.match_op(field, CompareOp::Lte, value)
    }

    pub fn gt(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.match_op(field, CompareOp::Gt, value)
    }

    pub fn gte(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.match_op(field, CompareOp::Gte, value)
    }

    pub fn is_null(&mut self, field: &str) -> &mut Self {
        if let Some(column) = self.column(field) {
            self.push(Template::text(format!("{column} is null")), Connector::And);
        }
        self
    }

    pub fn is_not_null(&mut self, field: &str) -> &mut Self {
        if let Some(column) = self.column(field) {
            self.push(Template::text(format!("{column} is not null")), Connector::And);
        }
        self
    }

    // ==================== Pattern matching ====================

    /// `field like %value%`
    pub fn like(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.like_with(field, value, LikePattern::Contains, false)
    }

    /// `field like value%`
    pub fn starts_with(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.like_with(field, value, LikePattern::StartsWith, false)
    }

    /// `field like %value`
    pub fn ends_with(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.like_with(field, value, LikePattern::EndsWith, false)
    }

    /// LIKE match with explicit wildcards. With `reverse` the value is
    /// matched against the column as a pattern (`value like '%' || field || '%'`).
    pub fn like_with(
        &mut self,
        field: &str,
        value: impl Into<Value>,
        pattern: LikePattern,
        reverse: bool,
    ) -> &mut Self {
        let Some(column) = self.column(field) else {
            return self;
        };
        let dialect = self.dialect;
        let (left, right) = pattern.wildcards();
        let (before, after) = dialect.like_grammar(&column, left, right, reverse);
        self.push_if(value.into(), Connector::And, |v| {
            let filtered = dialect.like_value_filter(&value_text(&v), left, right, reverse);
            Template::text(before)
                .with_param(Value::String(filtered))
                .with_text(&after)
        })
    }

    // ==================== Lists ====================

    /// `field in(...)` over the non-blank members of `values`.
    ///
    /// When no member survives, nothing is appended: the predicate is
    /// dropped rather than turned into an always-false clause.
    pub fn in_list<I, T>(&mut self, field: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.list(field, values, "in")
    }

    /// `field not in(...)`, with the same emptiness rule as [`in_list`](Self::in_list).
    pub fn not_in<I, T>(&mut self, field: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.list(field, values, "not in")
    }

    fn list<I, T>(&mut self, field: &str, values: I, keyword: &str) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let Some(column) = self.column(field) else {
            return self;
        };
        let head = format!("{column} {keyword}(");
        match Template::list(head, values.into_iter().map(Into::into)) {
            Some(template) => {
                self.push(template, Connector::And);
            }
            None => {
                compile_trace!(column = %column, "skipping empty {keyword} list");
            }
        }
        self
    }

    // ==================== Scopes ====================

    /// Build a nested group and append it with `and`.
    pub fn and<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut WhereClause<'_>),
    {
        self.scope(Connector::And, build)
    }

    /// Build a nested group and append it with `or`.
    pub fn or<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut WhereClause<'_>),
    {
        self.scope(Connector::Or, build)
    }

    fn scope<F>(&mut self, connector: Connector, build: F) -> &mut Self
    where
        F: FnOnce(&mut WhereClause<'_>),
    {
        let mut child = WhereClause {
            dialect: self.dialect,
            sink: None,
            config: self.config,
            layer: self.layer + 1,
            fragments: FragmentList::new(),
        };
        build(&mut child);
        if child.is_empty() {
            return self;
        }

        let line_ending = self.config.line_ending.as_str();
        let mut group = Template::text(format!("({line_ending}"));
        group.append(
            child
                .fragments
                .assemble(&self.config.indent(child.layer), line_ending),
        );
        group.push_str(&self.config.indent(self.layer));
        group.push_str(")");
        self.push(group, connector);
        self
    }

    // ==================== Condition trees ====================

    /// Compile `tree` and append it as one `and`-connected fragment.
    ///
    /// An empty tree, or one whose every predicate is omitted, appends nothing.
    pub fn query(&mut self, tree: &ConditionTree) -> &mut Self {
        if tree.is_empty() {
            return self;
        }
        let body = compile_tree(tree, self.dialect);
        if body.is_blank() {
            return self;
        }
        let mut text = Template::text(" ( ");
        text.append(body);
        text.push_str(" ) ");
        self.push(text, Connector::And);
        self
    }

    // ==================== Output ====================

    /// Serialize the fragments as a WHERE body (without the `WHERE` keyword).
    ///
    /// Inside a scope, unbound values show as [`HOLE`](crate::dialect::HOLE).
    pub fn build_where(&self) -> String {
        self.fragments.render(
            &self.config.indent(self.layer),
            self.config.line_ending.as_str(),
        )
    }

    fn column(&self, field: &str) -> Option<String> {
        if field.trim().is_empty() {
            return None;
        }
        let column = self.dialect.pre_name(field);
        (!column.is_empty()).then_some(column)
    }
}

impl std::fmt::Debug for WhereClause<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhereClause")
            .field("dialect", &self.dialect.name())
            .field("layer", &self.layer)
            .field("fragments", &self.fragments)
            .finish()
    }
}
