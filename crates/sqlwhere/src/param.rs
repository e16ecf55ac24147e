//! Parameter sinks: where bound values leave the builder.
//!
//! Every value-bearing predicate hands its value to a [`ParamSink`] and embeds
//! the returned placeholder in the SQL text. Values are bound in the exact
//! left-to-right order their placeholders appear in the rendered clause.

use serde_json::Value;

/// Accepts a value and returns the placeholder token to embed in SQL.
pub trait ParamSink {
    fn bind(&mut self, value: Value) -> String;
}

impl<F> ParamSink for F
where
    F: FnMut(Value) -> String,
{
    fn bind(&mut self, value: Value) -> String {
        self(value)
    }
}

/// Placeholder syntax produced by [`ParamList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// `@p1`, `@p2`, ... (SQL Server, most ADO-style drivers)
    #[default]
    At,
    /// `$1`, `$2`, ... (PostgreSQL)
    Dollar,
    /// `:p1`, `:p2`, ... (Oracle, named binds)
    Colon,
    /// `?` (SQLite, MySQL); positional
    Question,
}

impl PlaceholderStyle {
    /// Render the placeholder for a 1-based ordinal.
    pub fn render(self, ordinal: usize) -> String {
        match self {
            PlaceholderStyle::At => format!("@p{ordinal}"),
            PlaceholderStyle::Dollar => format!("${ordinal}"),
            PlaceholderStyle::Colon => format!(":p{ordinal}"),
            PlaceholderStyle::Question => "?".to_string(),
        }
    }
}

/// A recording sink that owns the parameter ordinal sequence.
///
/// Every bind allocates a new ordinal, so the values line up one-to-one with
/// the placeholders in the rendered text.
#[derive(Debug, Clone, Default)]
pub struct ParamList {
    style: PlaceholderStyle,
    values: Vec<Value>,
}

impl ParamList {
    /// Create an empty list using `@pN` placeholders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty list with the given placeholder style.
    pub fn with_style(style: PlaceholderStyle) -> Self {
        Self {
            style,
            values: Vec::new(),
        }
    }

    pub fn style(&self) -> PlaceholderStyle {
        self.style
    }

    /// Bound values in ordinal order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Add a value and return its 1-based ordinal.
    pub fn push(&mut self, value: Value) -> usize {
        self.values.push(value);
        self.values.len()
    }
}

impl ParamSink for ParamList {
    fn bind(&mut self, value: Value) -> String {
        let ordinal = self.push(value);
        self.style.render(ordinal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbered_placeholders() {
        let mut params = ParamList::with_style(PlaceholderStyle::Dollar);
        assert_eq!(params.bind(json!(18)), "$1");
        assert_eq!(params.bind(json!("A")), "$2");
        assert_eq!(params.values(), &[json!(18), json!("A")]);
    }

    #[test]
    fn equal_values_get_their_own_ordinal() {
        let mut params = ParamList::new();
        assert_eq!(params.bind(json!("Tom")), "@p1");
        assert_eq!(params.bind(json!("Tom")), "@p2");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn positional_style() {
        let mut params = ParamList::with_style(PlaceholderStyle::Question);
        assert_eq!(params.bind(json!(1)), "?");
        assert_eq!(params.bind(json!(1)), "?");
        assert_eq!(params.into_values(), vec![json!(1), json!(1)]);
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        let mut sink = |v: Value| {
            seen.push(v);
            format!(":v{}", seen.len())
        };
        assert_eq!(sink.bind(json!(true)), ":v1");
        assert_eq!(sink.bind(json!(false)), ":v2");
        drop(sink);
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn colon_style() {
        assert_eq!(PlaceholderStyle::Colon.render(4), ":p4");
    }
}
