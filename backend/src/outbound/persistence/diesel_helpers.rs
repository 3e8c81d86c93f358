//! Shared helpers for Diesel repository implementations.
//!
//! Every repository maps failures onto its own port error enum, which all
//! share `Connection` and `Query` variants. The helpers here take those
//! constructors so each adapter keeps a one-line `map_*` function.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map a pool failure through the repository's connection constructor.
pub(crate) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map Diesel errors onto query/connection constructors.
///
/// Messages are stable and never carry raw database text; the detail is
/// logged at debug level instead.
pub(crate) fn map_diesel_error<E>(
    error: DieselError,
    operation: &'static str,
    query: impl FnOnce(String) -> E,
    connection: impl FnOnce(String) -> E,
) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            operation,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query(format!("{operation}: record not found")),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection(format!("{operation}: database connection error"))
        }
        _ => query(format!("{operation}: database error")),
    }
}

/// Constraint name of a unique violation, if `error` is one.
pub(crate) fn unique_violation(error: &DieselError) -> Option<&str> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(info.constraint_name().unwrap_or_default())
        }
        _ => None,
    }
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub(crate) fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq)]
    enum LookupError {
        Query(String),
        Connection(String),
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("timed out"), LookupError::Connection);
        assert_eq!(mapped, LookupError::Connection("timed out".to_owned()));
    }

    #[rstest]
    fn not_found_is_a_query_error_with_the_operation() {
        let mapped = map_diesel_error(
            DieselError::NotFound,
            "load job",
            LookupError::Query,
            LookupError::Connection,
        );
        assert_eq!(mapped, LookupError::Query("load job: record not found".to_owned()));
    }

    #[rstest]
    fn non_database_errors_are_not_unique_violations() {
        assert!(unique_violation(&DieselError::NotFound).is_none());
    }

    #[rstest]
    fn collect_rows_stops_at_the_first_bad_row() {
        let rows = vec![Ok(1), Err("row 2 broken".to_owned()), Err("row 3".to_owned())];
        let result: Result<Vec<i32>, LookupError> = collect_rows(rows.into_iter(), LookupError::Query);
        assert_eq!(result, Err(LookupError::Query("row 2 broken".to_owned())));
    }
}
