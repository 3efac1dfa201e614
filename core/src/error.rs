use crate::{flags::Flag, types::EntityKind};
use thiserror::Error;

/// Every outcome a request can end in other than success.
///
/// Ownership and existence checks resolve to these variants inside the
/// core; nothing here is allowed to escape as a panic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{kind} '{id}' is owned by another user")]
    Forbidden { kind: EntityKind, id: String },

    #[error("no authenticated caller")]
    Unauthenticated,

    #[error("feature '{flag}' is disabled")]
    FeatureDisabled { flag: Flag },

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Context is for the log line only. Callers get `public_message()`.
    #[error("internal error: {0}")]
    Internal(String),
}

impl QueryError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        QueryError::NotFound { kind, id: id.into() }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::InvalidInput { field: field.into(), reason: reason.into() }
    }

    /// HTTP-equivalent status the transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            QueryError::NotFound { .. }        => 404,
            QueryError::Forbidden { .. }       => 403,
            QueryError::Unauthenticated        => 401,
            QueryError::FeatureDisabled { .. } => 503,
            QueryError::InvalidInput { .. }    => 400,
            QueryError::Internal(_)            => 500,
        }
    }

    /// Stable machine-readable code for error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::NotFound { .. }        => "not_found",
            QueryError::Forbidden { .. }       => "forbidden",
            QueryError::Unauthenticated        => "unauthenticated",
            QueryError::FeatureDisabled { .. } => "service_unavailable",
            QueryError::InvalidInput { .. }    => "bad_request",
            QueryError::Internal(_)            => "internal_error",
        }
    }

    /// Message safe to return to a caller. Never leaks internal state.
    pub fn public_message(&self) -> String {
        match self {
            QueryError::NotFound { kind, .. } => format!("{} not found", capitalize(kind.as_str())),
            QueryError::Forbidden { kind, .. } => format!("You do not have access to this {kind}"),
            QueryError::Unauthenticated => "Unauthorized".to_string(),
            QueryError::FeatureDisabled { flag } => {
                format!("{} is currently disabled", flag.label())
            }
            QueryError::InvalidInput { .. } => self.to_string(),
            QueryError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Startup failures. Any of these aborts the process before it serves.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate {kind} id '{id}' in snapshot")]
    DuplicateId { kind: EntityKind, id: String },

    #[error("repository already {0}")]
    AlreadyLoaded(&'static str),

    #[error("repository not loaded yet")]
    NotLoaded,

    #[error("repository lock poisoned")]
    Poisoned,
}

pub type LoadResult<T> = Result<T, LoadError>;
