//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses or any other protocol-specific envelope. Messages are returned to
//! clients verbatim (except for internal errors), so they are written in French.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::TraceId;

/// Message returned when a request needs an identified caller.
pub const NO_USER_MESSAGE: &str = "Utilisateur non identifié";
/// Message returned when a room identifier is missing or malformed.
pub const NO_ROOM_MESSAGE: &str = "Identifiant de salle manquant ou invalide";
/// Message returned when a date parameter cannot be parsed.
pub const INVALID_DATE_MESSAGE: &str = "Format de date invalide";
/// Message returned when a room is already booked on the requested window.
pub const ROOM_UNAVAILABLE_MESSAGE: &str = "La salle n'est pas disponible sur ce créneau";
/// Message returned when a reservation window is empty or reversed.
pub const INVALID_WINDOW_MESSAGE: &str = "La date de début doit précéder la date de fin";
/// Message returned when login attempts are throttled.
pub const TOO_MANY_ATTEMPTS_MESSAGE: &str =
    "Trop de tentatives de connexion, réessayez plus tard";
/// Message returned to authenticated callers without the admin role.
pub const ADMIN_ONLY_MESSAGE: &str = "Accès réservé aux administrateurs";

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The request conflicts with existing state.
    Conflict,
    /// Too many attempts; the caller must wait before retrying.
    TooManyRequests,
    /// A backing service is temporarily unreachable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
/// - `trace_id`, when present, must be non-empty once trimmed.
///
/// The serialised form names the message `error`, matching the
/// `{ "error": "..." }` body clients expect.
///
/// # Examples
/// ```
/// use roombook::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::NotFound, "missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    details: Option<Value>,
}

/// Validation errors emitted by the fallible constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was blank.
    #[error("error message must not be empty")]
    EmptyMessage,
    /// The trace identifier was blank.
    #[error("trace identifier must not be empty")]
    EmptyTraceId,
}

impl Error {
    /// Create a new error, panicking if validation fails.
    ///
    /// Captures the current trace identifier if one is in scope.
    ///
    /// # Panics
    /// Panics when `message` is blank. Use [`Error::try_new`] for caller
    /// supplied messages.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Correlation identifier captured when the error was built.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach a trace identifier, panicking when it is blank.
    ///
    /// # Panics
    /// Panics when `id` is blank.
    pub fn with_trace_id(self, id: impl Into<String>) -> Self {
        match self.try_with_trace_id(id) {
            Ok(value) => value,
            Err(err) => panic!("trace identifiers must satisfy validation: {err}"),
        }
    }

    /// Attach a trace identifier after validating it.
    pub fn try_with_trace_id(
        mut self,
        id: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ErrorValidationError::EmptyTraceId);
        }
        self.trace_id = Some(id);
        Ok(self)
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use roombook::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "name" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::TooManyRequests`].
    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TooManyRequests, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// The caller identity is missing or could not be established.
    ///
    /// # Examples
    /// ```
    /// use roombook::domain::{Error, ErrorCode};
    ///
    /// let err = Error::no_user();
    /// assert_eq!(err.code(), ErrorCode::InvalidRequest);
    /// assert!(err.message().to_lowercase().contains("utilisateur"));
    /// ```
    pub fn no_user() -> Self {
        Self::invalid_request(NO_USER_MESSAGE).with_details(json!({ "code": "no_user" }))
    }

    /// The room identifier is missing or malformed.
    pub fn no_room() -> Self {
        Self::invalid_request(NO_ROOM_MESSAGE).with_details(json!({ "code": "no_room" }))
    }

    /// A date parameter failed to parse.
    pub fn invalid_date(value: &str) -> Self {
        Self::invalid_request(INVALID_DATE_MESSAGE).with_details(json!({
            "code": "invalid_date",
            "value": value,
        }))
    }

    /// The requested reservation window is empty or reversed.
    pub fn invalid_window() -> Self {
        Self::invalid_request(INVALID_WINDOW_MESSAGE)
            .with_details(json!({ "code": "invalid_window" }))
    }

    /// The caller is authenticated but lacks the admin role.
    pub fn admin_only() -> Self {
        Self::forbidden(ADMIN_ONLY_MESSAGE)
    }

    /// The requested window overlaps a confirmed reservation.
    pub fn room_unavailable() -> Self {
        Self::conflict(ROOM_UNAVAILABLE_MESSAGE).with_details(json!({ "code": "room_unavailable" }))
    }

    /// Login is throttled for another `retry_after_seconds` seconds.
    ///
    /// # Examples
    /// ```
    /// use roombook::domain::{Error, ErrorCode};
    ///
    /// let err = Error::too_many_attempts(90);
    /// assert_eq!(err.code(), ErrorCode::TooManyRequests);
    /// assert_eq!(err.retry_after_seconds(), Some(90));
    /// ```
    pub fn too_many_attempts(retry_after_seconds: u64) -> Self {
        Self::too_many_requests(TOO_MANY_ATTEMPTS_MESSAGE).with_details(json!({
            "code": "too_many_attempts",
            "retryAfterSeconds": retry_after_seconds,
        }))
    }

    /// Seconds the caller should wait, for throttled requests.
    pub fn retry_after_seconds(&self) -> Option<u64> {
        if self.code != ErrorCode::TooManyRequests {
            return None;
        }
        self.details
            .as_ref()
            .and_then(|details| details.get("retryAfterSeconds"))
            .and_then(Value::as_u64)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    #[serde(rename = "error")]
    message: String,
    code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            message: value.message,
            code: value.code,
            trace_id: value.trace_id,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            message,
            code,
            trace_id,
            details,
        } = value;

        let mut error = Error::try_new(code, message)?;
        // The payload is authoritative; do not inherit the ambient trace.
        error.trace_id = None;
        if let Some(id) = trace_id {
            error = error.try_with_trace_id(id)?;
        }
        error.details = details;
        Ok(error)
    }
}
