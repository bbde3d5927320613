mod connection;
mod driver;
mod extract;
mod prepared;
mod sql_writer;

pub use connection::*;
pub use driver::*;
pub use prepared::*;
pub use sql_writer::*;

use rusqlite::ErrorCode;
use vessel_core::DriverError;

/// Whether the driver failure is a UNIQUE or PRIMARY KEY constraint violation.
pub fn is_unique_violation(error: &DriverError) -> bool {
    error
        .find_cause::<rusqlite::Error>()
        .is_some_and(|e| match e {
            rusqlite::Error::SqliteFailure(e, ..) => {
                e.code == ErrorCode::ConstraintViolation
                    && matches!(
                        e.extended_code,
                        rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                            | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    )
            }
            _ => false,
        })
}
