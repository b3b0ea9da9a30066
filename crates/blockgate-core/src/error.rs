//! Gateway error taxonomy.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Boxed lower-level cause attached to a [`GatewayError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The closed set of error kinds. Drives both internal handling and the
/// status code an HTTP layer answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unexpected local failure: serialization, decoding, client setup.
    Internal,
    /// Failure attributable to the upstream node.
    Blockchain,
    /// The caller supplied malformed input.
    Validation,
    /// A deadline expired before the upstream answered.
    Timeout,
    /// A well-formed, successfully decoded "absent" result.
    NotFound,
    Permission,
    Auth,
    Authorization,
}

impl ErrorKind {
    /// Stable tag used in logs and JSON error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal_error",
            Self::Blockchain => "blockchain_error",
            Self::Validation => "validation_error",
            Self::Timeout => "timeout_error",
            Self::NotFound => "not_found_error",
            Self::Permission => "permission_error",
            Self::Auth => "auth_error",
            Self::Authorization => "authorization_error",
        }
    }

    /// HTTP status an outer routing layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Internal => 500,
            Self::Blockchain => 503,
            Self::Validation => 400,
            Self::Timeout => 504,
            Self::NotFound => 404,
            Self::Auth => 401,
            Self::Permission | Self::Authorization => 403,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed gateway error: kind, message, optional cause and a diagnostic
/// context bag.
///
/// Context only ever grows; wrapping an error copies the cause's context
/// into the new one so nothing attached lower down is lost.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct GatewayError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<BoxError>,
    context: BTreeMap<String, Value>,
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            context: BTreeMap::new(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn blockchain(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Blockchain, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Permission, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Wrap `cause` in a new error of `kind`, inheriting its context.
    pub fn wrap(cause: GatewayError, kind: ErrorKind, message: impl Into<String>) -> Self {
        let context = cause.context.clone();
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(cause)),
            context,
        }
    }

    /// Attach a lower-level cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        self.source = Some(source.into());
        self
    }

    /// Add one context entry. An existing key is overwritten, others are kept.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Merge several context entries into the existing bag.
    pub fn extend_context<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.context
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &BTreeMap<String, Value> {
        &self.context
    }

    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    /// Returns `true` if this error or any [`GatewayError`] in its cause chain
    /// has the given kind.
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self);
        while let Some(err) = current {
            if let Some(gw) = err.downcast_ref::<GatewayError>() {
                if gw.kind == kind {
                    return true;
                }
            }
            current = err.source();
        }
        false
    }

    /// Returns `true` if a deadline expiry sits anywhere in the chain.
    pub fn is_timeout(&self) -> bool {
        self.has_kind(ErrorKind::Timeout)
    }
}
