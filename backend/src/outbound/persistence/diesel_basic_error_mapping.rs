//! Shared Diesel error mapping for the booking repositories.
//!
//! Every repository port has `Connection` and `Query` variants; these helpers
//! pick between them and recognise the named constraints that carry domain
//! meaning (duplicate e-mail, overlapping reservation).

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Unique index on `users.email`.
pub const USERS_EMAIL_KEY: &str = "users_email_key";
/// Exclusion constraint forbidding overlapping confirmed reservations.
pub const RESERVATIONS_NO_OVERLAP: &str = "reservations_no_overlap";

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Closed connections become connection errors; everything else, including
/// `NotFound`, is a query error. Database messages are logged at debug level
/// and never forwarded, since they can quote row values.
pub fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(%error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::DatabaseError(DatabaseErrorKind::UnableToSendCommand, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// Whether `info` reports a violation of the constraint called `name`.
///
/// PostgreSQL reports the constraint name separately; the message is checked
/// too because some drivers only surface the text.
pub fn violates_constraint(info: &dyn DatabaseErrorInformation, name: &str) -> bool {
    info.constraint_name() == Some(name) || info.message().contains(name)
}

/// Whether `error` is PostgreSQL's exclusion violation (SQLSTATE 23P01) on
/// the given constraint. Diesel has no dedicated kind for it.
pub fn is_exclusion_violation(error: &DieselError, name: &str) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(_, info) if violates_constraint(info.as_ref(), name)
    )
}

#[cfg(test)]
mod tests {
    //! Error classification coverage.
    use rstest::rstest;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum ExampleError {
        Query(&'static str),
        Connection(String),
    }

    fn database_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(message.to_owned()))
    }

    #[rstest]
    #[case(DieselError::NotFound, ExampleError::Query("record not found"))]
    #[case(
        database_error(DatabaseErrorKind::ClosedConnection, "server closed"),
        ExampleError::Connection("database connection error".to_owned())
    )]
    #[case(
        database_error(DatabaseErrorKind::CheckViolation, "reservations_window_check"),
        ExampleError::Query("database error")
    )]
    fn diesel_errors_are_classified(#[case] error: DieselError, #[case] expected: ExampleError) {
        let mapped = map_basic_diesel_error(error, ExampleError::Query, |message| {
            ExampleError::Connection(message.to_owned())
        });

        assert_eq!(mapped, expected);
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped = map_basic_pool_error(PoolError::checkout("timed out"), ExampleError::Connection);

        assert_eq!(mapped, ExampleError::Connection("timed out".to_owned()));
    }

    #[rstest]
    #[case(
        "conflicting key value violates exclusion constraint \"reservations_no_overlap\"",
        true
    )]
    #[case("duplicate key value violates unique constraint \"users_email_key\"", false)]
    fn exclusion_violation_is_recognised_by_name(#[case] message: &str, #[case] expected: bool) {
        let error = database_error(DatabaseErrorKind::Unknown, message);

        assert_eq!(is_exclusion_violation(&error, RESERVATIONS_NO_OVERLAP), expected);
    }
}
