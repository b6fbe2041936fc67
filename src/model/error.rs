//! Failure classification for remote fetches

use rspotify::ClientError;
use rspotify::http::HttpError;

/// Why a remote fetch failed.
///
/// Every fetch failure is converted to one of these before it reaches a
/// controller, so nothing above the repository layer ever sees a transport
/// error type.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCause {
    #[error("the request was malformed")]
    InvalidRequest,
    #[error("the access token is invalid or has expired")]
    ExpiredOrBadToken,
    #[error("the authorization request was rejected")]
    BadAuthRequest,
    #[error("too many requests, try again later")]
    RateLimitExceeded,
    #[error("the requested resource was not found")]
    ResourceNotFound,
    #[error("could not reach the music service")]
    ConnectivityFailure,
    #[error("the response could not be read")]
    DeserializationFailure,
    #[error("an unknown error occurred")]
    Unknown,
}

/// Map an HTTP status code to an [`ErrorCause`]. Total: anything outside
/// the table is `Unknown`.
pub fn classify(status: u16) -> ErrorCause {
    match status {
        400 => ErrorCause::InvalidRequest,
        401 => ErrorCause::ExpiredOrBadToken,
        403 => ErrorCause::BadAuthRequest,
        404 => ErrorCause::ResourceNotFound,
        429 => ErrorCause::RateLimitExceeded,
        _ => ErrorCause::Unknown,
    }
}

/// What the transport saw when a request failed.
///
/// Only `Status` carries a response; `Connectivity` and `Decode` are local
/// failures and never go through the status table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusInfo {
    Status(u16),
    Connectivity,
    Decode,
    Other(String),
}

impl From<StatusInfo> for ErrorCause {
    fn from(info: StatusInfo) -> Self {
        match info {
            StatusInfo::Status(code) => classify(code),
            StatusInfo::Connectivity => ErrorCause::ConnectivityFailure,
            StatusInfo::Decode => ErrorCause::DeserializationFailure,
            StatusInfo::Other(_) => ErrorCause::Unknown,
        }
    }
}

impl From<&ClientError> for StatusInfo {
    fn from(error: &ClientError) -> Self {
        match error {
            ClientError::Http(http) => match http.as_ref() {
                HttpError::StatusCode(response) => StatusInfo::Status(response.status().as_u16()),
                HttpError::Client(_) => StatusInfo::Connectivity,
            },
            ClientError::Io(_) => StatusInfo::Connectivity,
            ClientError::ParseJson(_) => StatusInfo::Decode,
            other => StatusInfo::Other(other.to_string()),
        }
    }
}

impl From<&ClientError> for ErrorCause {
    fn from(error: &ClientError) -> Self {
        StatusInfo::from(error).into()
    }
}
