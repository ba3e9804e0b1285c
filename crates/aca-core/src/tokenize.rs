//! Parsing of `KEY=VALUE` lists given as a single shell-like string.
//!
//! Tokens are whitespace-separated; a double-quoted segment keeps its
//! whitespace and loses its quotes, so `FOO=bar "BAZ=qux quux"` yields
//! `FOO=bar` and `BAZ=qux quux`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:[^\s"]+|"[^"]*")+"#).expect("token pattern is valid"));

static BUILDER_ARG_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"?(BP|ORYX)_[-._a-zA-Z0-9]+"?$"#).expect("builder arg pattern is valid")
});

/// A single `NAME=VALUE` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub name: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Split `raw` into shell-like tokens with quotes removed.
///
/// `input` names the task input in error messages. Anything the grammar
/// cannot account for (an unterminated quote) is rejected rather than dropped.
///
/// # Examples
///
/// ```
/// use aca_core::tokenize::tokenize;
///
/// let tokens = tokenize("environmentVariables", r#"FOO=bar "BAZ=qux quux""#).unwrap();
/// assert_eq!(tokens, vec!["FOO=bar", "BAZ=qux quux"]);
/// ```
pub fn tokenize(input: &'static str, raw: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for m in TOKEN.find_iter(raw) {
        ensure_blank(input, &raw[cursor..m.start()])?;
        tokens.push(m.as_str().replace('"', ""));
        cursor = m.end();
    }
    ensure_blank(input, &raw[cursor..])?;

    Ok(tokens)
}

fn ensure_blank(input: &'static str, gap: &str) -> Result<()> {
    if gap.chars().all(char::is_whitespace) {
        Ok(())
    } else {
        Err(Error::invalid(
            input,
            format!("unbalanced quotes near {:?}", gap.trim()),
        ))
    }
}

/// Parse a whitespace-separated list of `NAME=VALUE` assignments.
pub fn parse_assignments(input: &'static str, raw: &str) -> Result<Vec<KeyValue>> {
    tokenize(input, raw)?
        .into_iter()
        .map(|token| match token.split_once('=') {
            Some((name, value)) if !name.is_empty() => Ok(KeyValue::new(name, value)),
            _ => Err(Error::invalid(
                input,
                format!("expected NAME=VALUE, got {token:?}"),
            )),
        })
        .collect()
}

/// Whether `name` is accepted as a build argument by the buildpack builder.
pub fn is_builder_arg_name(name: &str) -> bool {
    BUILDER_ARG_NAME.is_match(name)
}
