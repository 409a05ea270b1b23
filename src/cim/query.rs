//! Narrow select-expression parsing.
//!
//! Subscription filters are expected to look like
//! `SELECT * FROM <IndicationClass> WHERE SourceInstance ISA <WatchedClass> [AND ...]`.
//! Only the first `ISA` predicate is honored for determining the watched
//! class; compound boolean expressions are not parsed beyond that. This is a
//! hard contract, not a bug: which objects get watched depends on it, so any
//! broadening of the supported syntax is a deliberate feature change.

use serde::Deserialize;
use serde::Serialize;

use crate::FilterError;
use crate::ObjectPath;
use crate::Result;

/// A parsed subscription filter query.
///
/// Keeps the raw query text: filter removal matches on it exactly
/// (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectExpression {
    raw: String,
    isa_class: String,
}

impl SelectExpression {
    /// Parse a filter query, extracting the first `ISA` target.
    ///
    /// The `ISA` keyword is matched case-insensitively; the class name is
    /// kept verbatim.
    pub fn parse(query: &str) -> Result<Self> {
        let mut tokens = query.split_whitespace();
        while let Some(token) = tokens.next() {
            if token.eq_ignore_ascii_case("isa") {
                let target = tokens.next().map(trim_operand).unwrap_or_default();
                if target.is_empty() {
                    return Err(FilterError::InvalidSelectExpression(format!(
                        "ISA predicate has no target class: {query}"
                    ))
                    .into());
                }
                return Ok(Self {
                    raw: query.to_string(),
                    isa_class: target,
                });
            }
        }
        Err(FilterError::InvalidSelectExpression(format!("no ISA predicate found: {query}")).into())
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The watched class, taken from the first `ISA` predicate.
    pub fn isa_class(&self) -> &str {
        &self.isa_class
    }

    /// The object path this filter watches, in the given namespace.
    pub fn object_path(
        &self,
        namespace: &str,
    ) -> ObjectPath {
        ObjectPath::new(namespace, self.isa_class.clone())
    }
}

fn trim_operand(token: &str) -> String {
    token
        .trim_matches(|c| matches!(c, '"' | '\'' | '(' | ')' | ',' | ';'))
        .to_string()
}
