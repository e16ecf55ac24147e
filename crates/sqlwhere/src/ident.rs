//! SQL identifier handling for field paths.
//!
//! This module provides [`Ident`] which represents a column reference, supporting
//! dotted notation (`table.column`) and quoted parts (`"CamelCase".id`).
//!
//! - Unquoted parts are validated against: `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted parts allow any characters except NUL and escape `"` as `""`
//!
//! Dialects render the parsed parts with their own quote characters, see
//! [`Ident::write_quoted`].
//!
//! # Example
//! ```ignore
//! use sqlwhere::Ident;
//!
//! let c = Ident::parse("orders.total")?;
//! let q = Ident::parse(r#""Order Lines"."UnitPrice""#)?;
//! # Ok::<(), sqlwhere::FilterError>(())
//! ```

use crate::error::{FilterError, FilterResult};

/// A part of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// Unquoted identifier: must match `[A-Za-z_][A-Za-z0-9_$]*`.
    Unquoted(String),
    /// Quoted identifier: allows any characters except NUL.
    Quoted(String),
}

impl IdentPart {
    /// The raw name, without quotes or escapes.
    pub fn name(&self) -> &str {
        match self {
            IdentPart::Unquoted(s) | IdentPart::Quoted(s) => s,
        }
    }
}

/// Opening and closing quote characters of a dialect.
///
/// A closing character inside a name is escaped by doubling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteChars {
    pub open: char,
    pub close: char,
}

impl QuoteChars {
    /// ANSI double quotes.
    pub const DOUBLE: QuoteChars = QuoteChars { open: '"', close: '"' };
    /// MySQL backticks.
    pub const BACKTICK: QuoteChars = QuoteChars { open: '`', close: '`' };
    /// SQL Server brackets.
    pub const BRACKET: QuoteChars = QuoteChars { open: '[', close: ']' };
}

/// A column reference, possibly qualified (`schema.table.column`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

impl Ident {
    /// Parse an identifier string, supporting dotted and quoted forms.
    ///
    /// - Dotted: `table.column`
    /// - Quoted: `"CamelCase"."UserTable"`
    /// - Mixed: `public."UserTable".id`
    pub fn parse(s: &str) -> FilterResult<Self> {
        if s.is_empty() {
            return Err(FilterError::invalid_identifier("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(FilterError::invalid_identifier(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(FilterError::invalid_identifier(
                                "Trailing '.' in identifier",
                            ));
                        }
                    }
                    Some(c) => {
                        return Err(FilterError::invalid_identifier(format!(
                            "Expected '.' between identifier parts, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            if chars.peek() == Some(&'"') {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('"') => {
                            // "" is an escaped quote
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                name.push('"');
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => {
                            return Err(FilterError::invalid_identifier(
                                "Unclosed quoted identifier",
                            ));
                        }
                    }
                }
                if name.is_empty() {
                    return Err(FilterError::invalid_identifier("Empty quoted identifier"));
                }
                parts.push(IdentPart::Quoted(name));
                continue;
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let valid = if name.is_empty() {
                    c == '_' || c.is_ascii_alphabetic()
                } else {
                    c == '_' || c == '$' || c.is_ascii_alphanumeric()
                };
                if !valid {
                    return Err(FilterError::invalid_identifier(format!(
                        "Invalid character in identifier: '{c}'"
                    )));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(FilterError::invalid_identifier("Empty identifier segment"));
            }
            parts.push(IdentPart::Unquoted(name));
        }

        if parts.is_empty() {
            return Err(FilterError::invalid_identifier("Empty identifier"));
        }

        Ok(Self { parts })
    }

    /// Parse `s`, falling back to treating every non-empty dot segment as a
    /// quoted part when `s` is not a well-formed identifier.
    ///
    /// Returns `None` only when nothing usable remains.
    pub fn lenient(s: &str) -> Option<Self> {
        if let Ok(ident) = Self::parse(s) {
            return Some(ident);
        }
        let parts: Vec<IdentPart> = s
            .split('.')
            .map(|seg| seg.replace('\0', ""))
            .filter(|seg| !seg.trim().is_empty())
            .map(IdentPart::Quoted)
            .collect();
        (!parts.is_empty()).then_some(Self { parts })
    }

    /// Render the identifier as ANSI SQL, quoting only the parts that were quoted.
    pub fn to_sql(&self) -> String {
        let mut out = String::with_capacity(self.estimated_len());
        self.write_quoted(&mut out, QuoteChars::DOUBLE, false);
        out
    }

    /// Write the identifier using `quote`.
    ///
    /// With `always` set every part is quoted; otherwise only parts that
    /// were quoted in the input are.
    pub fn write_quoted(&self, out: &mut String, quote: QuoteChars, always: bool) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(s) if !always => out.push_str(s),
                IdentPart::Unquoted(s) | IdentPart::Quoted(s) => {
                    out.push(quote.open);
                    for ch in s.chars() {
                        if ch == quote.close {
                            out.push(ch);
                        }
                        out.push(ch);
                    }
                    out.push(quote.close);
                }
            }
        }
    }

    pub(crate) fn estimated_len(&self) -> usize {
        let mut cap = self.parts.len().saturating_sub(1);
        for part in &self.parts {
            cap += part.name().len() + 2;
        }
        cap
    }
}
