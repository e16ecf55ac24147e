//! Predicate text with unbound value slots.
//!
//! Predicates are assembled as a [`Template`] first and only bound through a
//! [`ParamSink`] once the owning builder has accepted them, so a predicate
//! that is dropped as a duplicate never registers a value.

use super::compile::is_blank;
use crate::dialect::HOLE;
use crate::param::ParamSink;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Raw(String),
    Param(Value),
}

/// Identity of a template: its raw text and the JSON text of each slot value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum PartKey {
    Raw(String),
    Param(String),
}

pub(crate) type TemplateKey = Vec<PartKey>;

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Template {
    parts: Vec<Part>,
}

impl Template {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A template with no slots.
    pub(crate) fn text(sql: impl Into<String>) -> Self {
        let sql: String = sql.into();
        let mut t = Self::new();
        t.push_str(&sql);
        t
    }

    /// Split `template` at every [`HOLE`], giving each hole its own slot
    /// for `value`.
    pub(crate) fn with_holes(template: &str, value: Value) -> Self {
        let mut t = Self::new();
        for (i, piece) in template.split(HOLE).enumerate() {
            if i > 0 {
                t.push_param(value.clone());
            }
            t.push_str(piece);
        }
        t
    }

    /// `head` followed by a comma-separated slot for every non-blank value
    /// and a closing `)`. `None` when no value survives.
    pub(crate) fn list<I>(head: String, values: I) -> Option<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut t = Self::text(head);
        let mut any = false;
        for value in values.into_iter().filter(|v| !is_blank(v)) {
            if any {
                t.push_str(",");
            }
            t.push_param(value);
            any = true;
        }
        any.then(|| t.with_text(")"))
    }

    pub(crate) fn with_text(mut self, sql: &str) -> Self {
        self.push_str(sql);
        self
    }

    pub(crate) fn with_param(mut self, value: Value) -> Self {
        self.push_param(value);
        self
    }

    pub(crate) fn push_str(&mut self, sql: &str) {
        if sql.is_empty() {
            return;
        }
        match self.parts.last_mut() {
            Some(Part::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(Part::Raw(sql.to_string())),
        }
    }

    pub(crate) fn push_param(&mut self, value: Value) {
        self.parts.push(Part::Param(value));
    }

    pub(crate) fn append(&mut self, other: Template) {
        for part in other.parts {
            match part {
                Part::Raw(sql) => self.push_str(&sql),
                Part::Param(value) => self.push_param(value),
            }
        }
    }

    /// Number of value slots.
    pub(crate) fn param_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, Part::Param(_)))
            .count()
    }

    /// No slots and only whitespace text.
    pub(crate) fn is_blank(&self) -> bool {
        self.parts.iter().all(|p| match p {
            Part::Raw(sql) => sql.trim().is_empty(),
            Part::Param(_) => false,
        })
    }

    /// The text of a template without slots.
    pub(crate) fn as_literal(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [] => Some(""),
            [Part::Raw(sql)] => Some(sql),
            _ => None,
        }
    }

    pub(crate) fn key(&self) -> TemplateKey {
        self.parts
            .iter()
            .map(|p| match p {
                Part::Raw(sql) => PartKey::Raw(sql.clone()),
                Part::Param(value) => PartKey::Param(value.to_string()),
            })
            .collect()
    }

    /// Bind every slot through `sink` in textual order.
    pub(crate) fn bind(self, sink: &mut dyn ParamSink) -> String {
        let mut out = String::new();
        for part in self.parts {
            match part {
                Part::Raw(sql) => out.push_str(&sql),
                Part::Param(value) => out.push_str(&sink.bind(value)),
            }
        }
        out
    }

    /// Text with every slot shown as [`HOLE`].
    pub(crate) fn preview(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Raw(sql) => out.push_str(sql),
                Part::Param(_) => out.push_str(HOLE),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParamList;
    use serde_json::json;

    #[test]
    fn binds_in_textual_order() {
        let t = Template::text("a=")
            .with_param(json!(1))
            .with_text(" and b in(")
            .with_param(json!("x"))
            .with_text(")");
        assert_eq!(t.param_count(), 2);
        assert_eq!(t.preview(), "a={0} and b in({0})");

        let mut params = ParamList::new();
        assert_eq!(t.bind(&mut params), "a=@p1 and b in(@p2)");
        assert_eq!(params.values(), &[json!(1), json!("x")]);
    }

    #[test]
    fn every_hole_gets_a_slot() {
        let t = Template::with_holes("{0} between lo and {0}", json!(5));
        assert_eq!(t.param_count(), 2);
        assert_eq!(Template::with_holes("deleted = 0", json!(5)).param_count(), 0);
    }

    #[test]
    fn list_drops_blank_values() {
        let t = Template::list("id in(".to_string(), vec![json!(1), Value::Null, json!(""), json!(2)]);
        assert_eq!(t.map(|t| t.preview()), Some("id in({0},{0})".to_string()));
        assert!(Template::list("id in(".to_string(), vec![Value::Null]).is_none());
    }

    #[test]
    fn key_distinguishes_values() {
        let a = Template::text("a=").with_param(json!(1));
        let b = Template::text("a=").with_param(json!(2));
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), a.clone().key());
        assert_ne!(Template::text("a=1").key(), a.key());
    }

    #[test]
    fn append_merges_adjacent_text() {
        let mut t = Template::text("( ");
        t.append(Template::text("a=").with_param(json!(1)));
        t.push_str(" )");
        assert_eq!(t.preview(), "( a={0} )");
        assert_eq!(Template::text("x").with_text("y").as_literal(), Some("xy"));
        assert!(t.as_literal().is_none());
    }

    #[test]
    fn blank_templates() {
        assert!(Template::new().is_blank());
        assert!(Template::text("  ").is_blank());
        assert!(!Template::new().with_param(Value::Null).is_blank());
    }
}
