use std::time::Duration;

use sqlx::PgConnection;

use crate::common::error::AppError;

// ---
// Per-transaction timeouts
// ---
/// Bounds every statement and every row-lock wait on the current
/// transaction. `set_config(.., true)` is transaction-local, so the pooled
/// connection goes back to the pool with its defaults.
pub(crate) async fn apply_transaction_timeouts(
    conn: &mut PgConnection,
    timeout: Duration,
) -> Result<(), AppError> {
    let millis = timeout.as_millis().to_string();

    sqlx::query("SELECT set_config('statement_timeout', $1, true)")
        .bind(&millis)
        .execute(&mut *conn)
        .await?;

    sqlx::query("SELECT set_config('lock_timeout', $1, true)")
        .bind(&millis)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

// SQLSTATEs raised when the timeouts above fire.
const QUERY_CANCELED: &str = "57014";
const LOCK_NOT_AVAILABLE: &str = "55P03";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// True when Postgres aborted the statement because of
/// `statement_timeout` or `lock_timeout`.
pub(crate) fn is_timeout(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == QUERY_CANCELED || code == LOCK_NOT_AVAILABLE)
}

/// True when a value did not fit its `NUMERIC` column.
pub(crate) fn is_numeric_overflow(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == NUMERIC_VALUE_OUT_OF_RANGE)
}
