//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper returns an `invalid_request` domain error whose `details`
//! name the offending field and a machine-readable code.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{
    Error, LoginValidationError, ReservationId, RoomId, RoomValidationError, UserId,
    UserValidationError,
};
use crate::inbound::http::INVALID_BODY_MESSAGE;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidTimestamp,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidTimestamp => "invalid_timestamp",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    const fn as_str(self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn with_code(self, code: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code,
        }))
    }

    fn with_value(self, code: ErrorCode, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code.as_str(),
        }))
    }

    fn with_index(self, code: &str, index: usize) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "index": index,
            "code": code,
        }))
    }
}

/// Unwrap a body or query string that was extracted as a `Result`.
///
/// Handlers needing an identity take their payload this way so the caller
/// check runs before any decoding error is reported. Errors raised by the
/// configured JSON and query handlers come back unchanged.
pub(crate) fn decoded<T>(extracted: Result<T, actix_web::Error>) -> Result<T, Error> {
    extracted.map_err(|err| {
        err.as_error::<Error>()
            .cloned()
            .unwrap_or_else(|| Error::invalid_request(INVALID_BODY_MESSAGE))
    })
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} doit être un UUID valide"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_room_id(value: &str, field: FieldName) -> Result<RoomId, Error> {
    RoomId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_reservation_id(value: &str, field: FieldName) -> Result<ReservationId, Error> {
    ReservationId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn invalid_timestamp_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(
        field,
        format!("{field} doit être une date RFC 3339 (ex. 2026-02-01T10:00:00Z)"),
    )
    .with_value(ErrorCode::InvalidTimestamp, value)
}

pub(crate) fn parse_rfc3339_timestamp(value: &str, field: FieldName) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| invalid_timestamp_error(field, value))
}

pub(crate) fn user_validation_error(err: &UserValidationError) -> Error {
    ValidationError::new(err.field(), err.to_string()).with_code(err.code())
}

pub(crate) fn room_validation_error(err: &RoomValidationError) -> Error {
    let builder = ValidationError::new(err.field(), err.to_string());
    match err {
        RoomValidationError::EmptyEquipment { index } => builder.with_index(err.code(), *index),
        _ => builder.with_code(err.code()),
    }
}

pub(crate) fn login_validation_error(err: &LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyEmail => ("email", "empty_email"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    ValidationError::new(field, err.to_string()).with_code(code)
}

#[cfg(test)]
mod tests {
    //! Detail payload coverage.
    use rstest::rstest;
    use serde_json::Value;

    use super::*;

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a Value> {
        error.details().and_then(|details| details.get(key))
    }

    #[rstest]
    fn invalid_uuid_carries_field_and_value() {
        let error = parse_room_id("salle-1", FieldName::new("roomId")).expect_err("not a uuid");

        assert_eq!(detail(&error, "field"), Some(&json!("roomId")));
        assert_eq!(detail(&error, "value"), Some(&json!("salle-1")));
        assert_eq!(detail(&error, "code"), Some(&json!("invalid_uuid")));
    }

    #[rstest]
    #[case("2026-02-01T10:00:00Z", true)]
    #[case("2026-02-01T11:00:00+01:00", true)]
    #[case("2026-02-01", false)]
    #[case("demain", false)]
    fn timestamps_must_be_rfc3339(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(
            parse_rfc3339_timestamp(raw, FieldName::new("startTime")).is_ok(),
            ok
        );
    }

    #[rstest]
    fn offsets_are_normalised_to_utc() {
        let parsed = parse_rfc3339_timestamp("2026-02-01T11:00:00+01:00", FieldName::new("start"))
            .expect("valid timestamp");

        assert_eq!(parsed.to_rfc3339(), "2026-02-01T10:00:00+00:00");
    }

    #[rstest]
    fn decoding_errors_keep_their_domain_form() {
        let original = Error::invalid_request("Corps illisible");
        let extracted: Result<(), actix_web::Error> = Err(original.clone().into());

        assert_eq!(decoded(extracted), Err(original));
    }

    #[rstest]
    fn foreign_decoding_errors_become_invalid_requests() {
        let extracted: Result<(), actix_web::Error> =
            Err(actix_web::error::ErrorBadRequest("raw"));

        let error = decoded(extracted).expect_err("decoding failed");
        assert_eq!(error.message(), INVALID_BODY_MESSAGE);
    }

    #[rstest]
    fn equipment_errors_report_the_index() {
        let error = room_validation_error(&RoomValidationError::EmptyEquipment { index: 2 });

        assert_eq!(detail(&error, "field"), Some(&json!("equipment")));
        assert_eq!(detail(&error, "index"), Some(&json!(2)));
    }

    #[rstest]
    fn user_errors_use_the_domain_code() {
        let error = user_validation_error(&UserValidationError::PasswordTooShort { min: 8 });

        assert_eq!(detail(&error, "field"), Some(&json!("password")));
        assert_eq!(detail(&error, "code"), Some(&json!("password_too_short")));
        assert!(error.message().contains('8'));
    }
}
