use thiserror::Error;

/// Failures raised by a tree implementation while probing a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("rendered geometry unavailable for <{tag}>")]
    GeometryUnavailable { tag: String },

    #[error("node is detached from the document")]
    Detached,

    #[error("structural query failed: {0}")]
    Query(String),
}

/// Errors produced while parsing a selector string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected character '{found}' at offset {offset} in '{selector}'")]
    Unexpected {
        selector: String,
        offset: usize,
        found: char,
    },

    #[error("unterminated attribute predicate in '{0}'")]
    UnterminatedAttribute(String),

    #[error("combinators are not supported: '{0}'")]
    Combinator(String),
}

/// Errors produced while compiling an `ExtractorConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid selector for {field}: {source}")]
    Selector {
        field: String,
        #[source]
        source: SelectorError,
    },

    #[error("invalid pattern for {field}: {source}")]
    Pattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("{0} must not be empty")]
    EmptyTable(&'static str),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
