//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide record-local CRUD APIs over the `users` table.
//! - Run every call in its own transaction via `run_in_transaction`.
//! - Translate SQLite failures into `RepoError::Storage` tagged with the
//!   operation that failed.
//!
//! # Invariants
//! - Absence is `Ok(None)` for lookups, never an error.
//! - `delete` is idempotent; `update` does not check that the row exists.
//! - No cross-call atomicity: a lookup followed by a write is two
//!   transactions, and uniqueness is not enforced here.
//! - Read paths reject invalid persisted ids instead of masking them.

use crate::db::run_in_transaction;
use crate::model::user::{NewUser, User, UserId};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    surname,
    email,
    phone_number,
    created_at
FROM users";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository operation names, used to tag storage failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoOp {
    Save,
    Update,
    Delete,
    FindById,
    FindByEmail,
    FindByPhoneNumber,
    FindAll,
}

impl RepoOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::FindById => "find_by_id",
            Self::FindByEmail => "find_by_email",
            Self::FindByPhoneNumber => "find_by_phone_number",
            Self::FindAll => "find_all",
        }
    }
}

impl Display for RepoOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository error for user persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// SQLite failed while executing `op` (the transaction was rolled back).
    Storage { op: RepoOp, source: rusqlite::Error },
    /// A stored row does not decode into a valid `User`.
    InvalidData(String),
}

impl RepoError {
    /// Operation the failure happened in, when known.
    pub fn op(&self) -> Option<RepoOp> {
        match self {
            Self::Storage { op, .. } => Some(*op),
            Self::InvalidData(_) => None,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage { op, source } => write!(f, "user {op} failed: {source}"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage { source, .. } => Some(source),
            Self::InvalidData(_) => None,
        }
    }
}

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    /// Inserts a new row under a freshly generated id and returns that id.
    fn save(&self, user: &NewUser) -> RepoResult<UserId>;
    /// Overwrites the mutable columns of the row matching `id`.
    fn update(&self, id: UserId, user: &User) -> RepoResult<()>;
    /// Removes the row matching `id`; zero matches is not an error.
    fn delete(&self, id: UserId) -> RepoResult<()>;
    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn find_by_phone_number(&self, phone_number: &str) -> RepoResult<Option<User>>;
    /// Returns every row in unspecified order.
    fn find_all(&self) -> RepoResult<Vec<User>>;
}

/// SQLite-backed user repository.
///
/// Borrows its connection; one repository per connection, one connection
/// per concurrent caller.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn transact<T>(
        &self,
        op: RepoOp,
        work: impl FnOnce(&Transaction<'_>) -> rusqlite::Result<T>,
    ) -> RepoResult<T> {
        run_in_transaction(self.conn, work).map_err(|source| {
            debug!(
                "event=repo_call module=repo status=error op={} error={}",
                op, source
            );
            RepoError::Storage { op, source }
        })
    }

    fn find_one(
        &self,
        op: RepoOp,
        column: &'static str,
        value: &str,
    ) -> RepoResult<Option<User>> {
        let row = self.transact(op, |tx| {
            tx.query_row(
                &format!("{USER_SELECT_SQL} WHERE {column} = ?1 LIMIT 1;"),
                [value],
                read_user_row,
            )
            .optional()
        })?;
        row.map(UserRow::into_user).transpose()
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn save(&self, user: &NewUser) -> RepoResult<UserId> {
        let id = Uuid::new_v4();
        self.transact(RepoOp::Save, |tx| {
            tx.execute(
                "INSERT INTO users (
                    id,
                    name,
                    surname,
                    email,
                    phone_number,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    id.to_string(),
                    user.name.as_str(),
                    user.surname.as_str(),
                    user.email.as_str(),
                    user.phone_number.as_str(),
                    user.created_at,
                ],
            )
        })?;

        Ok(id)
    }

    fn update(&self, id: UserId, user: &User) -> RepoResult<()> {
        self.transact(RepoOp::Update, |tx| {
            tx.execute(
                "UPDATE users
                 SET
                    name = ?1,
                    surname = ?2,
                    email = ?3,
                    phone_number = ?4
                 WHERE id = ?5;",
                params![
                    user.name.as_str(),
                    user.surname.as_str(),
                    user.email.as_str(),
                    user.phone_number.as_str(),
                    id.to_string(),
                ],
            )
        })?;

        Ok(())
    }

    fn delete(&self, id: UserId) -> RepoResult<()> {
        self.transact(RepoOp::Delete, |tx| {
            tx.execute("DELETE FROM users WHERE id = ?1;", [id.to_string()])
        })?;

        Ok(())
    }

    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        self.find_one(RepoOp::FindById, "id", &id.to_string())
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.find_one(RepoOp::FindByEmail, "email", email)
    }

    fn find_by_phone_number(&self, phone_number: &str) -> RepoResult<Option<User>> {
        self.find_one(RepoOp::FindByPhoneNumber, "phone_number", phone_number)
    }

    fn find_all(&self) -> RepoResult<Vec<User>> {
        let rows = self.transact(RepoOp::FindAll, |tx| {
            let mut stmt = tx.prepare(&format!("{USER_SELECT_SQL};"))?;
            let rows = stmt.query_map([], read_user_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })?;

        rows.into_iter().map(UserRow::into_user).collect()
    }
}

/// Raw row as stored; decoded outside the transaction.
struct UserRow {
    id: String,
    name: String,
    surname: String,
    email: String,
    phone_number: String,
    created_at: i64,
}

impl UserRow {
    fn into_user(self) -> RepoResult<User> {
        let id = Uuid::parse_str(&self.id).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{}` in users.id", self.id))
        })?;

        Ok(User {
            id,
            name: self.name,
            surname: self.surname,
            email: self.email,
            phone_number: self.phone_number,
            created_at: self.created_at,
        })
    }
}

fn read_user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get("id")?,
        name: row.get("name")?,
        surname: row.get("surname")?,
        email: row.get("email")?,
        phone_number: row.get("phone_number")?,
        created_at: row.get("created_at")?,
    })
}
