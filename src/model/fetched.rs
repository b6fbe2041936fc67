//! Result of a single remote fetch

use super::error::ErrorCause;

/// The outcome of one remote fetch. Every repository method returns one of
/// these instead of propagating an error, so callers always get a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchedResource<T, E = ErrorCause> {
    Success { data: T },
    Failure { cause: E },
}

impl<T, E> FetchedResource<T, E> {
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    pub fn failure(cause: E) -> Self {
        Self::Failure { cause }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchedResource<U, E> {
        match self {
            Self::Success { data } => FetchedResource::Success { data: f(data) },
            Self::Failure { cause } => FetchedResource::Failure { cause },
        }
    }

    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> FetchedResource<T, F> {
        match self {
            Self::Success { data } => FetchedResource::Success { data },
            Self::Failure { cause } => FetchedResource::Failure { cause: f(cause) },
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Success { data } => Ok(data),
            Self::Failure { cause } => Err(cause),
        }
    }
}

impl<T, E> From<Result<T, E>> for FetchedResource<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Success { data },
            Err(cause) => Self::Failure { cause },
        }
    }
}
