//! Query shaping for the SQLite FTS5 search index.
//!
//! # Responsibility
//! - Turn user query text into a safe FTS5 `MATCH` expression.
//! - Flatten entity JSON into the text column the index tokenizes.
//! - Classify FTS5 failures into user errors and transport errors.
//!
//! # Invariants
//! - Non-raw queries never reach FTS5 with unescaped user syntax.
//! - `field:value` terms restrict matches to that attribute only when the
//!   entity has such a field; otherwise the word is plain free text.
//! - Words without any letter or digit never reach FTS5.

use crate::db::DbError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::error::Error;
use std::fmt::{Display, Formatter};

static FIELD_TERM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<field>[A-Za-z][A-Za-z0-9]*):(?P<value>.+)$").expect("valid field term regex")
});

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error for query parsing, index interaction and result decoding.
#[derive(Debug)]
pub enum SearchError {
    /// User-provided query cannot be parsed by FTS5 syntax.
    InvalidQuery {
        query: String,
        message: String,
    },
    /// Indexing attempted on an entity without id.
    MissingId(&'static str),
    Serialization(serde_json::Error),
    Db(DbError),
    InvalidData(String),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid full-text query `{query}`: {message}")
            }
            Self::MissingId(entity) => write!(f, "cannot index {entity} without id"),
            Self::Serialization(err) => write!(f, "failed to encode indexed document: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid search row: {message}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidQuery { .. } | Self::MissingId(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for SearchError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Search options for full-text query behavior.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// User query text.
    pub text: String,
    /// Maximum number of hits to return; `None` returns every hit.
    pub limit: Option<u32>,
    /// Number of leading hits to skip.
    pub offset: u32,
    /// Whether to pass text directly as raw FTS5 expression.
    ///
    /// Default is `false` so free text never fails on syntax.
    pub raw_fts_syntax: bool,
}

impl SearchQuery {
    /// Creates an unpaginated query.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: None,
            offset: 0,
            raw_fts_syntax: false,
        }
    }
}

/// Parsed form of a [`SearchQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MatchPlan {
    /// Blank query, nothing matches.
    Empty,
    /// `*`: every document in the collection.
    All,
    /// Every document in the collection that passes the field filters.
    Scan {
        field_filters: Vec<(String, String)>,
    },
    Fts {
        expression: String,
        /// `(field, lowercase value)` pairs checked against the JSON body.
        field_filters: Vec<(String, String)>,
    },
}

/// Plans `query`; `is_field` tells whether a `name:` prefix names a real field.
pub(crate) fn plan_query(query: &SearchQuery, is_field: impl Fn(&str) -> bool) -> MatchPlan {
    let text = query.text.trim();
    if text.is_empty() {
        return MatchPlan::Empty;
    }

    if text == "*" {
        return MatchPlan::All;
    }

    if query.raw_fts_syntax {
        return MatchPlan::Fts {
            expression: text.to_string(),
            field_filters: Vec::new(),
        };
    }

    let mut terms = Vec::new();
    let mut field_filters = Vec::new();
    for raw in text.split_whitespace() {
        if let Some(captures) = FIELD_TERM_RE.captures(raw) {
            if is_field(&captures["field"]) {
                field_filters.push((
                    captures["field"].to_string(),
                    captures["value"].to_lowercase(),
                ));
                continue;
            }
        }
        // unicode61 drops punctuation, leaving an empty phrase that matches nothing.
        if raw.chars().any(char::is_alphanumeric) {
            terms.push(escape_fts_term(raw));
        }
    }

    if terms.is_empty() {
        if field_filters.is_empty() {
            return MatchPlan::Empty;
        }
        return MatchPlan::Scan { field_filters };
    }

    MatchPlan::Fts {
        expression: terms.join(" AND "),
        field_filters,
    }
}

/// Returns whether `body[field]` contains `needle` (already lowercase).
pub(crate) fn field_matches(body: &JsonValue, field: &str, needle: &str) -> bool {
    match body.get(field) {
        Some(JsonValue::String(value)) => value.to_lowercase().contains(needle),
        Some(JsonValue::Number(value)) => value.to_string() == needle,
        Some(JsonValue::Bool(value)) => value.to_string() == needle,
        _ => false,
    }
}

/// Flattens every scalar value of a JSON document into whitespace-separated text.
pub(crate) fn searchable_text(body: &JsonValue) -> String {
    let mut parts = Vec::new();
    collect_scalars(body, &mut parts);
    parts.join(" ")
}

fn collect_scalars(value: &JsonValue, parts: &mut Vec<String>) {
    match value {
        JsonValue::Null => {}
        JsonValue::Bool(flag) => parts.push(flag.to_string()),
        JsonValue::Number(number) => parts.push(number.to_string()),
        JsonValue::String(text) => parts.push(text.clone()),
        JsonValue::Array(items) => items.iter().for_each(|item| collect_scalars(item, parts)),
        JsonValue::Object(map) => map.values().for_each(|item| collect_scalars(item, parts)),
    }
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

pub(crate) fn map_query_error(err: rusqlite::Error, query: &str) -> SearchError {
    if is_match_syntax_error(&err) {
        return SearchError::InvalidQuery {
            query: query.to_string(),
            message: err.to_string(),
        };
    }

    SearchError::Db(DbError::Sqlite(err))
}

fn is_match_syntax_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            let msg = message.to_lowercase();
            (msg.contains("fts5") && msg.contains("syntax"))
                || msg.contains("malformed match expression")
                || msg.contains("unterminated")
                || msg.contains("no such column")
        }
        _ => false,
    }
}
