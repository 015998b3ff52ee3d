use realm_database::DatabaseError;
use std::borrow::Cow;
use std::time::Duration;

/// Failures originating at the persistence boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying query failed: connectivity, malformed statement, or an
    /// unexpected constraint. Expected uniqueness rejections are mapped to
    /// `false` results before this error is ever produced.
    #[error("Store query failed{}: {source}", format_context(.context))]
    Query {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    /// The configured per-request timeout elapsed before the store answered.
    #[error("Store call exceeded the configured deadline of {limit:?}")]
    Timeout { limit: Duration },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal store error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<surrealdb::Error> for StoreError {
    fn from(source: surrealdb::Error) -> Self {
        Self::Query { source, context: None }
    }
}

/// Attaches contextual information to store errors.
pub trait StoreErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, StoreError>;
}

impl<T, E: Into<StoreError>> StoreErrorExt<T> for Result<T, E> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, StoreError> {
        self.map_err(|e| {
            let mut err = e.into();
            match &mut err {
                StoreError::Query { context: c, .. } | StoreError::Internal { context: c, .. } => {
                    *c = Some(context.into());
                },
                StoreError::Timeout { .. } => {},
            }
            err
        })
    }
}

/// Failures surfaced to registry callers.
///
/// Genuine absence is never an error: lookups resolve to `Ok(None)` and set
/// queries to `Ok` with an empty set. Callers that want the historical
/// error-absorbing behavior use [`Pending::absorb`](crate::Pending::absorb).
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The registry builder was given an incomplete configuration.
    #[error("Registry validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Connection establishment or migration failed.
    #[error("Registry database error{}: {source}", format_context(.context))]
    Database {
        #[source]
        source: DatabaseError,
        context: Option<Cow<'static, str>>,
    },

    /// A store call failed after the request was dispatched.
    #[error("Registry store error{}: {source}", format_context(.context))]
    Store {
        #[source]
        source: StoreError,
        context: Option<Cow<'static, str>>,
    },

    /// The operation exists on the surface but has no implementation; callers
    /// must be able to tell this apart from success or absence.
    #[error("Operation `{operation}` is not supported by this registry")]
    Unsupported { operation: Cow<'static, str> },

    /// The result channel closed before a completion was delivered, e.g. the
    /// worker pool was torn down while the request was in flight.
    #[error("Registry request was disconnected before completion")]
    Disconnected,

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal registry error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<StoreError> for RegistryError {
    fn from(source: StoreError) -> Self {
        Self::Store { source, context: None }
    }
}

impl From<DatabaseError> for RegistryError {
    fn from(source: DatabaseError) -> Self {
        Self::Database { source, context: None }
    }
}

pub(crate) fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
