use thiserror::Error;

/// Errors raised while loading a network or answering a query.
///
/// A failing query never touches the [`Network`][crate::network::Network]:
/// every engine builds its factors and counters locally, so an error only
/// aborts the query that produced it.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// A variable name or key does not exist in the network.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// A value label or index does not exist in the variable's domain.
    #[error("unknown value '{value}' for variable '{variable}'")]
    UnknownValue { variable: String, value: String },

    /// The query is malformed (evidence on the query variable, duplicate evidence, bad syntax).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Every accumulated probability is zero, so the answer cannot be normalized.
    #[error("normalization denominator is zero")]
    DegenerateNormalization,

    /// The network description cannot be indexed consistently.
    #[error("invalid network: {0}")]
    InvalidNetwork(String),

    /// A factor operation was called outside its contract.
    #[error("invalid factor: {0}")]
    InvalidFactor(String),

    /// The XMLBIF document is not well-formed.
    #[error("xml error: {0}")]
    Xml(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
