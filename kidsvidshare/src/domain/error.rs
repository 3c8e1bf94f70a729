//! Service error payload shared by every domain service.
//!
//! Policy denials are plain return values; this type only appears once a
//! service call cannot go ahead. Hosts map [`ErrorCode`] to their own
//! envelope (an HTTP status, a UI toast).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error as ThisError;

/// Failure category, serialised in snake case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    /// Stale revision or a disallowed review transition.
    Conflict,
    /// A port adapter could not reach its backend.
    ServiceUnavailable,
    InternalError,
}

/// Error returned by the content, account and supervision services.
///
/// The message is never blank. `details` carries machine-readable context,
/// for example the expected and actual revisions of a conflict.
///
/// # Examples
/// ```
/// use kidsvidshare::domain::{Error, ErrorCode};
///
/// let err = Error::forbidden("uploads are switched off for this account");
/// assert_eq!(err.code(), ErrorCode::Forbidden);
/// assert!(err.details().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ErrorPayload", try_from = "ErrorPayload")]
pub struct Error {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
}

/// Raised when an [`Error`] is built with a blank message.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ErrorValidationError {
    #[error("error message is blank")]
    EmptyMessage,
}

impl Error {
    /// Build an error from a literal message.
    ///
    /// # Panics
    /// Panics when `message` is blank; use [`Error::try_new`] for
    /// caller-supplied text.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Build an error, rejecting blank messages.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message: String = message.into();
        match message.trim() {
            "" => Err(ErrorValidationError::EmptyMessage),
            _ => Ok(Self {
                code,
                message,
                details: None,
            }),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message safe to show to a parent.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured context such as revisions or limits.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Replace the structured context.
    ///
    /// # Examples
    /// ```
    /// use kidsvidshare::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::conflict("revision mismatch")
    ///     .with_details(json!({ "expectedRevision": 2, "actualRevision": 3 }));
    /// assert_eq!(err.details().map(|d| d["actualRevision"].clone()), Some(json!(3)));
    /// ```
    pub fn with_details(self, details: Value) -> Self {
        Self {
            details: Some(details),
            ..self
        }
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        self.code == ErrorCode::ServiceUnavailable
    }
}

macro_rules! code_constructors {
    ($($name:ident => $code:ident: $doc:literal),* $(,)?) => {
        impl Error {
            $(
                #[doc = $doc]
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::new(ErrorCode::$code, message)
                }
            )*
        }
    };
}

code_constructors! {
    invalid_request => InvalidRequest: "Input failed validation: bad metadata, oversized upload, unknown format.",
    unauthorized => Unauthorized: "No signed-in viewer, or the provider refused the credentials.",
    forbidden => Forbidden: "The viewer is known but the policy denies the action.",
    not_found => NotFound: "Missing, or hidden from this viewer.",
    conflict => Conflict: "Stale revision or a transition the review state does not allow.",
    service_unavailable => ServiceUnavailable: "A port adapter could not reach its backing service.",
    internal => InternalError: "A port adapter failed in an unexpected way.",
}

impl ErrorCode {
    /// Wire name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::ServiceUnavailable => "service_unavailable",
            Self::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

/// Wire shape shared with hosts.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ErrorPayload {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorPayload {
    fn from(Error { code, message, details }: Error) -> Self {
        Self {
            code,
            message,
            details,
        }
    }
}

impl TryFrom<ErrorPayload> for Error {
    type Error = ErrorValidationError;

    fn try_from(payload: ErrorPayload) -> Result<Self, Self::Error> {
        let error = Error::try_new(payload.code, payload.message)?;
        Ok(match payload.details {
            Some(details) => error.with_details(details),
            None => error,
        })
    }
}
