//! SQLite-backed credential storage.

use super::PutOutcome;
use crate::error::StorageError;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Access tokens keyed by provider user id.
///
/// # Schema
/// ```sql
/// CREATE TABLE users (
///     id           TEXT NOT NULL PRIMARY KEY,
///     access_token TEXT NOT NULL UNIQUE
/// );
/// ```
///
/// Records are never updated in place: a second, different token for an id
/// is rejected by the primary key, and a token already bound to another id
/// is rejected by the unique index.
///
/// # Thread Safety
/// The store holds only the database path. Each call opens a fresh
/// connection, so the handle is freely cloned across requests.
#[derive(Clone, Debug)]
pub struct CredentialStore {
    db_path: PathBuf,
}

impl CredentialStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Whether the backing file exists yet.
    pub fn exists(&self) -> bool {
        self.db_path.exists()
    }

    /// Create the `users` table if needed and verify its shape.
    ///
    /// Safe to run against an existing store; existing rows are untouched.
    pub fn initialize(&self) -> Result<(), StorageError> {
        let conn = self.open(OpenFlags::SQLITE_OPEN_CREATE)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id           TEXT NOT NULL PRIMARY KEY,
                access_token TEXT NOT NULL UNIQUE
            );",
        )?;

        // A pre-existing table with the wrong columns fails here instead of on first request
        conn.prepare("SELECT id, access_token FROM users LIMIT 0")
            .map_err(StorageError::Schema)?;

        tracing::debug!(path = %self.db_path.display(), "Credential store initialized");
        Ok(())
    }

    /// Insert a credential.
    ///
    /// Storing a pair that is already present succeeds without changes.
    /// Any other uniqueness conflict is `StorageError::ConstraintViolation`.
    pub fn put(&self, user_id: &str, access_token: &str) -> Result<PutOutcome, StorageError> {
        let conn = self.open(OpenFlags::empty())?;

        let inserted = conn.execute(
            "INSERT INTO users (id, access_token) VALUES (?1, ?2)",
            params![user_id, access_token],
        );

        match inserted {
            Ok(_) => Ok(PutOutcome::Inserted),
            Err(err) => match StorageError::from_sqlite(err) {
                StorageError::ConstraintViolation(msg) => {
                    let same_pair = conn
                        .query_row(
                            "SELECT 1 FROM users WHERE id = ?1 AND access_token = ?2",
                            params![user_id, access_token],
                            |_| Ok(()),
                        )
                        .optional()?
                        .is_some();

                    if same_pair {
                        Ok(PutOutcome::Unchanged)
                    } else {
                        Err(StorageError::ConstraintViolation(msg))
                    }
                }
                other => Err(other),
            },
        }
    }

    /// Look up the token stored for `user_id`.
    pub fn get(&self, user_id: &str) -> Result<Option<String>, StorageError> {
        let conn = self.open(OpenFlags::empty())?;
        let token = conn
            .query_row(
                "SELECT access_token FROM users WHERE id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(token)
    }

    fn open(&self, extra: OpenFlags) -> Result<Connection, StorageError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI
            | extra;

        let conn = Connection::open_with_flags(&self.db_path, flags).map_err(|source| {
            StorageError::Open {
                path: self.db_path.clone(),
                source,
            }
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }
}
