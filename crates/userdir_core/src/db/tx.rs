//! Scoped transaction helper.
//!
//! # Responsibility
//! - Run one unit of work inside a SQLite transaction.
//! - Resolve the transaction to commit or rollback exactly once.
//!
//! # Invariants
//! - `Ok` from the work closure commits; `Err` rolls back and returns the
//!   closure error unchanged.
//! - A panic inside the closure unwinds through the guard, whose drop
//!   behavior is rollback, so the connection never keeps a dangling
//!   transaction.
//! - Works on a shared `&Connection`; callers never need `&mut` access.

use log::{debug, warn};
use rusqlite::{Connection, DropBehavior, Transaction};

/// Runs `work` inside a new transaction on `conn`.
///
/// # Errors
/// - Returns the begin/commit failure converted into `E`.
/// - Returns the closure error after the transaction is rolled back.
pub fn run_in_transaction<T, E, F>(conn: &Connection, work: F) -> Result<T, E>
where
    E: From<rusqlite::Error>,
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
{
    let mut tx = conn.unchecked_transaction()?;
    tx.set_drop_behavior(DropBehavior::Rollback);

    match work(&tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(
                    "event=tx_rollback module=db status=error error={}",
                    rollback_err
                );
            } else {
                debug!("event=tx_rollback module=db status=ok");
            }
            Err(err)
        }
    }
}
