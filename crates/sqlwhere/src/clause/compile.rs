//! Condition tree to SQL compiler.
//!
//! The compiler walks a [`ConditionTree`] depth first and produces a
//! [`Template`] whose value slots appear in the order they must be bound.
//! Rendering goes through a small intermediate form ([`Term`]) so groups can
//! be unwrapped and joined without re-parsing generated text.

use super::Connector;
use super::template::Template;
use crate::dialect::Dialect;
use crate::tree::{ConditionTree, Node, NodeId, NodeKind, Operator};
use serde_json::Value;

/// A rendered predicate, before joining.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Term {
    /// Finished predicate text.
    Text(Template),
    /// `$and` / `$or` group: `joiner` links it to its preceding sibling,
    /// `inner` joins its own terms.
    Group {
        joiner: Connector,
        inner: Connector,
        terms: Vec<Term>,
    },
    /// `$not` group, linked to its sibling with the enclosing list's connector.
    Not(Vec<Term>),
}

impl Term {
    fn write(&self, out: &mut Template) {
        match self {
            Term::Text(text) => out.append(text.clone()),
            Term::Group { inner, terms, .. } => {
                out.push_str("( ");
                join_into(out, terms, *inner);
                out.push_str(" )");
            }
            Term::Not(terms) => {
                out.push_str("not ( ");
                join_into(out, terms, Connector::And);
                out.push_str(" )");
            }
        }
    }
}

fn join_into(out: &mut Template, terms: &[Term], connector: Connector) {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            let link = match term {
                Term::Group { joiner, .. } => *joiner,
                _ => connector,
            };
            out.push_str(" ");
            out.push_str(link.keyword());
            out.push_str(" ");
        }
        term.write(out);
    }
}

pub(crate) fn join(terms: &[Term], connector: Connector) -> Template {
    let mut out = Template::new();
    join_into(&mut out, terms, connector);
    out
}

/// Strip outer groups while the whole list is a single group.
///
/// Compiling `{$and: [A, B]}` and compiling `A, B` as plain root fields
/// produce the same text.
pub(crate) fn unwrap_groups(mut terms: Vec<Term>) -> (Vec<Term>, Connector) {
    let mut connector = Connector::And;
    loop {
        match <[Term; 1]>::try_from(terms) {
            Ok([Term::Group { inner, terms: body, .. }]) => {
                terms = body;
                connector = inner;
            }
            Ok([single]) => return (vec![single], connector),
            Err(rest) => return (rest, connector),
        }
    }
}

/// Compile all root children of `tree` into one predicate text.
///
/// Returns a blank template when nothing survives omission.
pub(crate) fn compile_tree(tree: &ConditionTree, dialect: &dyn Dialect) -> Template {
    let root = tree.node(tree.root());
    let compiler = TreeCompiler { tree, dialect };
    let terms = compiler.render_children(root.children(), None);
    let (terms, connector) = unwrap_groups(terms);
    let text = join(&terms, connector);

    compile_debug!(
        dialect = dialect.name(),
        nodes = tree.len(),
        params = text.param_count(),
        text = %text.preview(),
        "compiled condition tree"
    );
    text
}

struct TreeCompiler<'t> {
    tree: &'t ConditionTree,
    dialect: &'t dyn Dialect,
}

impl<'t> TreeCompiler<'t> {
    /// Render `ids` in order. `column` is the expression comparisons apply to
    /// when the list sits under a field.
    fn render_children(&self, ids: &[NodeId], column: Option<&str>) -> Vec<Term> {
        let tree = self.tree;
        let mut terms = Vec::with_capacity(ids.len());
        for &id in ids {
            let node = tree.node(id);
            let term = match node.kind() {
                NodeKind::Field(name) => self.render_field(node, name),
                NodeKind::Logical(op) => self.render_logical(node, *op, column),
                NodeKind::Root => None,
            };
            terms.extend(term);
        }
        terms
    }

    fn render_field(&self, node: &Node, name: &str) -> Option<Term> {
        let tree = self.tree;
        if node.parent().is_some_and(|p| tree.node(p).is_field()) {
            compile_trace!(field = name, "skipping nested field path");
            return None;
        }
        let children = node.children();
        if let [only] = children {
            if tree.node(*only).is_field() {
                compile_trace!(field = name, "skipping chained field alias");
                return None;
            }
        }
        if name.trim().is_empty() {
            compile_trace!("skipping field with empty name");
            return None;
        }
        let column = self.dialect.pre_name(name);
        if column.is_empty() {
            return None;
        }

        if let [only] = children {
            let child = tree.node(*only);
            if let Some(op) = child.operator().filter(|op| op.is_virtual()) {
                return self.render_virtual(&column, child, op);
            }
        }
        self.qualify(column, children)
    }

    /// Apply `children` to `expr`: a bare expression when there are none,
    /// otherwise their comparisons ANDed together.
    fn qualify(&self, expr: String, children: &[NodeId]) -> Option<Term> {
        if children.is_empty() {
            return Some(Term::Text(Template::text(expr)));
        }
        let mut terms = self.render_children(children, Some(&expr));
        match terms.len() {
            0 => None,
            1 => terms.pop(),
            _ => Some(Term::Text(join(&terms, Connector::And))),
        }
    }

    fn render_virtual(&self, column: &str, tag: &Node, op: Operator) -> Option<Term> {
        if let Some(func) = op.aggregate() {
            let expr = self.dialect.aggregate(func, column);
            return self.qualify(expr, tag.children());
        }
        if let Some(pattern) = op.like_pattern() {
            let value = tag.value();
            if is_blank(value) {
                compile_trace!(column, "skipping like with empty value");
                return None;
            }
            let (left, right) = pattern.wildcards();
            let reverse = self.reverse_flag(tag);
            let (before, after) = self.dialect.like_grammar(column, left, right, reverse);
            let filtered =
                self.dialect
                    .like_value_filter(&value_text(value), left, right, reverse);
            let text = Template::text(before)
                .with_param(Value::String(filtered))
                .with_text(&after);
            return Some(Term::Text(text));
        }
        match op {
            Operator::NotNull => Some(Term::Text(Template::text(format!("not {column} is null")))),
            Operator::Ref => {
                let target = tag.value().as_str().unwrap_or_default();
                let other = self.dialect.pre_name(target);
                if other.is_empty() {
                    compile_trace!(column, "skipping $ref without a target");
                    return None;
                }
                Some(Term::Text(Template::text(format!("{column}={other}"))))
            }
            _ => None,
        }
    }

    /// A `reverse` field under a like tag with a truthy value.
    fn reverse_flag(&self, tag: &Node) -> bool {
        tag.children().iter().any(|&id| {
            let node = self.tree.node(id);
            matches!(node.kind(), NodeKind::Field(name) if name == "reverse")
                && is_truthy(node.value())
        })
    }

    fn render_logical(&self, node: &Node, op: Operator, column: Option<&str>) -> Option<Term> {
        let col = column.unwrap_or_default();
        if let Some(cmp) = op.compare_op() {
            let grammar = self.dialect.match_operator_grammar(cmp);
            let mut text = Template::text(format!("{col}{grammar}"));
            if node.children().is_empty() {
                text.push_param(node.value().clone());
            } else {
                let terms = self.render_children(node.children(), None);
                if terms.is_empty() {
                    return None;
                }
                text.append(join(&terms, Connector::And));
            }
            return Some(Term::Text(text));
        }

        match op {
            Operator::Null => Some(Term::Text(Template::text(format!("{col} is null")))),
            Operator::In | Operator::NotIn => {
                let items: Vec<Value> = match node.value() {
                    Value::Array(items) => items.clone(),
                    other => vec![other.clone()],
                };
                let keyword = if op == Operator::In { "in" } else { "not in" };
                let Some(text) = Template::list(format!("{col} {keyword}("), items) else {
                    compile_trace!(column = col, "skipping empty {} list", op.tag());
                    return None;
                };
                Some(Term::Text(text))
            }
            Operator::And => self.group(node, Connector::And, Connector::And, column),
            Operator::Or if node.children_is_array() => {
                self.group(node, Connector::And, Connector::Or, column)
            }
            Operator::Or => self.group(node, Connector::Or, Connector::And, column),
            Operator::Not => {
                let terms = self.render_children(node.children(), column);
                (!terms.is_empty()).then_some(Term::Not(terms))
            }
            // Field-level tags only mean something as a field's sole child.
            _ => {
                compile_trace!(column = col, "ignoring {} outside field position", op.tag());
                None
            }
        }
    }

    fn group(
        &self,
        node: &Node,
        joiner: Connector,
        inner: Connector,
        column: Option<&str>,
    ) -> Option<Term> {
        let terms = self.render_children(node.children(), column);
        if terms.is_empty() {
            compile_trace!("skipping empty {} group", node.name());
            return None;
        }
        Some(Term::Group {
            joiner,
            inner,
            terms,
        })
    }
}

/// Null or the empty string.
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Text of a scalar for LIKE patterns: strings unquoted, everything else as JSON.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => s.eq_ignore_ascii_case("true") || s == "1",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;
    use crate::param::ParamList;
    use serde_json::json;

    fn compile(tree: &ConditionTree) -> (String, Vec<Value>) {
        let mut params = ParamList::new();
        let text = compile_tree(tree, &GenericDialect).bind(&mut params);
        (text, params.into_values())
    }

    fn raw(sql: &str) -> Term {
        Term::Text(Template::text(sql))
    }

    #[test]
    fn join_uses_group_joiner() {
        let terms = vec![
            raw("x=@p1"),
            Term::Group {
                joiner: Connector::Or,
                inner: Connector::And,
                terms: vec![raw("a=@p2"), raw("b=@p3")],
            },
            Term::Not(vec![raw("c=@p4")]),
        ];
        assert_eq!(
            join(&terms, Connector::And).preview(),
            "x=@p1 or ( a=@p2 and b=@p3 ) and not ( c=@p4 )"
        );
    }

    #[test]
    fn unwrap_strips_nested_single_groups() {
        let inner = Term::Group {
            joiner: Connector::And,
            inner: Connector::Or,
            terms: vec![raw("a"), raw("b")],
        };
        let outer = Term::Group {
            joiner: Connector::And,
            inner: Connector::And,
            terms: vec![inner],
        };
        let (terms, connector) = unwrap_groups(vec![outer]);
        assert_eq!(connector, Connector::Or);
        assert_eq!(join(&terms, connector).preview(), "a or b");
    }

    #[test]
    fn unwrap_keeps_not_groups() {
        let (terms, connector) = unwrap_groups(vec![Term::Not(vec![raw("a")])]);
        assert_eq!(join(&terms, connector).preview(), "not ( a )");
    }

    #[test]
    fn multiple_comparisons_on_one_field() {
        let mut tree = ConditionTree::new();
        let age = tree.field(tree.root(), "age");
        tree.op(age, Operator::Gteq, 18);
        tree.op(age, Operator::Lt, 65);
        let (text, values) = compile(&tree);
        assert_eq!(text, "age>=@p1 and age<@p2");
        assert_eq!(values, vec![json!(18), json!(65)]);
    }

    #[test]
    fn column_to_column_comparison() {
        let mut tree = ConditionTree::new();
        let a = tree.field(tree.root(), "shipped_at");
        let gt = tree.op(a, Operator::Gt, Value::Null);
        tree.field(gt, "ordered_at");
        let (text, values) = compile(&tree);
        assert_eq!(text, "shipped_at>ordered_at");
        assert!(values.is_empty());
    }

    #[test]
    fn braces_in_field_name_are_not_holes() {
        let mut tree = ConditionTree::new();
        let a = tree.field(tree.root(), "a{0}");
        tree.op(a, Operator::Eq, 1);
        let n = tree.field(tree.root(), "n{0}");
        tree.op(n, Operator::Like, "z");
        let (text, values) = compile(&tree);
        assert_eq!(text, r#""a{0}"=@p1 and "n{0}" like @p2"#);
        assert_eq!(values, vec![json!(1), json!("%z%")]);
    }

    #[test]
    fn bare_field_is_boolean_column() {
        let mut tree = ConditionTree::new();
        tree.field(tree.root(), "active");
        assert_eq!(compile(&tree).0, "active");
    }

    #[test]
    fn aggregate_with_qualifier() {
        let mut tree = ConditionTree::new();
        let price = tree.field(tree.root(), "price");
        let max = tree.op(price, Operator::Max, Value::Null);
        tree.op(max, Operator::Gt, 100);
        let (text, values) = compile(&tree);
        assert_eq!(text, "max(price)>@p1");
        assert_eq!(values, vec![json!(100)]);
    }

    #[test]
    fn notnull_and_ref() {
        let mut tree = ConditionTree::new();
        let email = tree.field(tree.root(), "email");
        tree.op(email, Operator::NotNull, true);
        let owner = tree.field(tree.root(), "owner_id");
        tree.op(owner, Operator::Ref, "users.id");
        let (text, values) = compile(&tree);
        assert_eq!(text, "not email is null and owner_id=users.id");
        assert!(values.is_empty());
    }

    #[test]
    fn like_variants() {
        let mut tree = ConditionTree::new();
        let name = tree.field(tree.root(), "name");
        tree.op(name, Operator::Start, "Tom");
        let city = tree.field(tree.root(), "city");
        tree.op(city, Operator::End, "burg");
        let (text, values) = compile(&tree);
        assert_eq!(text, "name like @p1 and city like @p2");
        assert_eq!(values, vec![json!("Tom%"), json!("%burg")]);
    }

    #[test]
    fn reversed_like_reads_sibling_flag() {
        let mut tree = ConditionTree::new();
        let keyword = tree.field(tree.root(), "keyword");
        let like = tree.op(keyword, Operator::Like, "red shoes");
        tree.field_with_value(like, "reverse", true);
        let (text, values) = compile(&tree);
        assert_eq!(text, "@p1 like '%' || keyword || '%'");
        assert_eq!(values, vec![json!("red shoes")]);
    }

    #[test]
    fn like_with_empty_value_is_omitted() {
        let mut tree = ConditionTree::new();
        let name = tree.field(tree.root(), "name");
        tree.op(name, Operator::Like, "");
        assert_eq!(compile(&tree), (String::new(), vec![]));
    }

    #[test]
    fn like_beside_other_comparisons_is_ignored() {
        let mut tree = ConditionTree::new();
        let name = tree.field(tree.root(), "name");
        tree.op(name, Operator::Like, "Tom");
        tree.op(name, Operator::NotEq, "Jerry");
        let (text, values) = compile(&tree);
        assert_eq!(text, "name<>@p1");
        assert_eq!(values, vec![json!("Jerry")]);
    }

    #[test]
    fn nested_and_chained_fields_are_skipped() {
        let mut tree = ConditionTree::new();
        let alias = tree.field(tree.root(), "customer");
        let inner = tree.field(alias, "address");
        tree.op(inner, Operator::Eq, "x");
        let ok = tree.field(tree.root(), "id");
        tree.op(ok, Operator::Eq, 7);
        let (text, values) = compile(&tree);
        assert_eq!(text, "id=@p1");
        assert_eq!(values, vec![json!(7)]);
    }

    #[test]
    fn not_group_in_field_context() {
        let mut tree = ConditionTree::new();
        let status = tree.field(tree.root(), "status");
        let not = tree.op(status, Operator::Not, Value::Null);
        tree.op(not, Operator::In, json!(["closed", "void"]));
        let (text, _) = compile(&tree);
        assert_eq!(text, "not ( status in(@p1,@p2) )");
    }

    #[test]
    fn scalar_in_is_single_element_list() {
        let mut tree = ConditionTree::new();
        let id = tree.field(tree.root(), "id");
        tree.op(id, Operator::NotIn, 5);
        assert_eq!(compile(&tree).0, "id not in(@p1)");
    }

    #[test]
    fn null_check() {
        let mut tree = ConditionTree::new();
        let deleted = tree.field(tree.root(), "deleted_at");
        tree.op(deleted, Operator::Null, true);
        assert_eq!(compile(&tree).0, "deleted_at is null");
    }

    #[test]
    fn plain_or_links_to_previous_sibling() {
        let mut tree = ConditionTree::new();
        let a = tree.field(tree.root(), "a");
        tree.op(a, Operator::Eq, 1);
        let or = tree.op(tree.root(), Operator::Or, Value::Null);
        let b = tree.field(or, "b");
        tree.op(b, Operator::Eq, 2);
        let c = tree.field(or, "c");
        tree.op(c, Operator::Eq, 3);
        assert_eq!(compile(&tree).0, "a=@p1 or ( b=@p2 and c=@p3 )");
    }

    #[test]
    fn empty_groups_vanish() {
        let mut tree = ConditionTree::new();
        let and = tree.op(tree.root(), Operator::And, Value::Null);
        let s = tree.field(and, "s");
        tree.op(s, Operator::In, json!([]));
        let a = tree.field(tree.root(), "a");
        tree.op(a, Operator::Eq, 1);
        assert_eq!(compile(&tree), ("a=@p1".to_string(), vec![json!(1)]));
    }

    #[test]
    fn truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("TRUE")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("no")));
        assert!(!is_truthy(&Value::Null));
    }
}
