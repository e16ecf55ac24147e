//! Ordered, text-deduplicated fragment storage.

use super::template::{Template, TemplateKey};
use indexmap::IndexMap;
use std::borrow::Cow;

/// Boolean connector between a fragment and the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Connector {
    /// Only meaningful for the first fragment of a list.
    #[default]
    None,
    And,
    Or,
}

impl Connector {
    /// Lowercase keyword, empty for [`Connector::None`].
    pub fn keyword(self) -> &'static str {
        match self {
            Connector::None => "",
            Connector::And => "and",
            Connector::Or => "or",
        }
    }
}

/// One boolean sub-expression and its connector.
///
/// Inside a nested scope values are not bound yet; their slots show as
/// [`HOLE`](crate::dialect::HOLE).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub text: Cow<'a, str>,
    pub connector: Connector,
}

/// Fragments in insertion order, deduplicated by their text.
///
/// Two parameterized fragments are the same when their text matches and
/// their slots hold equal values. Inserting a fragment that is already
/// present is a no-op. Equivalent but differently spelled predicates are
/// kept apart.
#[derive(Debug, Clone, Default)]
pub struct FragmentList {
    entries: IndexMap<TemplateKey, (Template, Connector)>,
}

impl FragmentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment. Returns `false` when `text` is blank or already present.
    ///
    /// A fragment appended after the first one never keeps [`Connector::None`];
    /// it is connected with `and` instead.
    pub fn insert(&mut self, text: impl Into<String>, connector: Connector) -> bool {
        self.insert_with(Template::text(text), connector, |t| t)
    }

    /// Append `template` unless it is blank or a duplicate. `finish` runs only
    /// for accepted templates, before they are stored.
    pub(crate) fn insert_with<F>(&mut self, template: Template, connector: Connector, finish: F) -> bool
    where
        F: FnOnce(Template) -> Template,
    {
        if template.is_blank() {
            return false;
        }
        let key = template.key();
        if self.entries.contains_key(&key) {
            return false;
        }
        let connector = match connector {
            Connector::None if !self.entries.is_empty() => Connector::And,
            other => other,
        };
        self.entries.insert(key, (finish(template), connector));
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.iter().any(|f| f.text == text)
    }

    pub fn iter(&self) -> impl Iterator<Item = Fragment<'_>> {
        self.entries.values().map(|(template, connector)| Fragment {
            text: match template.as_literal() {
                Some(text) => Cow::Borrowed(text),
                None => Cow::Owned(template.preview()),
            },
            connector: *connector,
        })
    }

    /// Serialize in insertion order: indent, connector (skipped for the first
    /// fragment), text, line ending.
    pub fn render(&self, indent: &str, line_ending: &str) -> String {
        self.assemble(indent, line_ending).preview()
    }

    /// Like [`render`](Self::render), keeping unbound slots.
    pub(crate) fn assemble(&self, indent: &str, line_ending: &str) -> Template {
        let mut out = Template::new();
        for (i, (template, connector)) in self.entries.values().enumerate() {
            out.push_str(indent);
            if i > 0 && *connector != Connector::None {
                out.push_str(connector.keyword());
                out.push_str(" ");
            }
            out.append(template.clone());
            out.push_str(line_ending);
        }
        out
    }
}
