//! Two-stage entry tokenizer.
//!
//! A merged entry looks like `12 aanbieden  to offer`. The index matcher
//! peels off the leading list number at the first space; the field matcher
//! splits the remainder at the column separator the layout extraction left
//! between the word and its meaning.

use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, trace};

pub const DEFAULT_FIELD_SEPARATOR: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexIssue {
    #[error("no space after index token")]
    MissingSeparator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexToken<'a> {
    Number(&'a str),
    Unexpected(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedLine<'a> {
    pub index: IndexToken<'a>,
    pub body: &'a str,
}

/// Split `line` at its first space into the index token and the trimmed body.
pub fn split_index(line: &str) -> Result<IndexedLine<'_>, IndexIssue> {
    let (token, rest) = line.split_once(' ').ok_or(IndexIssue::MissingSeparator)?;
    let index = if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        IndexToken::Number(token)
    } else {
        IndexToken::Unexpected(token)
    };
    Ok(IndexedLine {
        index,
        body: rest.trim(),
    })
}

pub fn trim_index_line(line: &str) -> &str {
    match split_index(line) {
        Ok(IndexedLine {
            index: IndexToken::Unexpected(token),
            body,
        }) => {
            debug!(token, line, "index token is not numeric");
            body
        }
        Ok(IndexedLine {
            index: IndexToken::Number(index),
            body,
        }) => {
            trace!(index, "stripped index");
            body
        }
        Err(issue) => {
            debug!(line, %issue, "leaving line as is");
            line.trim()
        }
    }
}

/// Drop the leading index token from every line.
pub fn trim_index<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .map(|l| trim_index_line(l.as_ref()).to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fields {
    pub word: String,
    pub meaning: String,
}

pub fn split_fields(body: &str, separator: &str) -> Fields {
    let mut segments = body.split(separator);
    let word = segments.next().unwrap_or_default().to_string();
    let rest: Vec<&str> = segments.collect();
    if rest.is_empty() {
        trace!(body, "no meaning separator");
    }
    Fields {
        word,
        meaning: rest.into_iter().join("").trim().to_string(),
    }
}
