use serde::{Deserialize, Serialize};

/// Line terminator written after every fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\r\n`
    #[default]
    Crlf,
    /// `\n`
    Lf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

/// Output formatting for [`WhereClause::build_where`](crate::WhereClause::build_where).
///
/// Nested scopes inherit the configuration of the builder that opened them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Spaces of indentation per nesting layer.
    pub indent_width: usize,
    /// Line terminator after each fragment.
    pub line_ending: LineEnding,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            line_ending: LineEnding::Crlf,
        }
    }
}

impl FormatConfig {
    /// Create a new configuration with defaults (4 spaces, CRLF).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation width per layer.
    pub fn indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Set the line terminator.
    pub fn line_ending(mut self, ending: LineEnding) -> Self {
        self.line_ending = ending;
        self
    }

    pub(crate) fn indent(&self, layer: usize) -> String {
        " ".repeat(self.indent_width * layer)
    }
}
