//! Durable mapping from provider user id to access token.
//!
//! Backed by a single SQLite table. Every operation opens its own
//! connection and drops it before returning, so no connection outlives the
//! call that needed it and concurrency control is left to SQLite's locking.
//!
//! # Usage
//!
//! ```no_run
//! use instawidget::credentials::{CredentialStore, PutOutcome};
//!
//! # fn main() -> Result<(), instawidget::error::StorageError> {
//! let store = CredentialStore::new("data.db");
//! store.initialize()?;
//!
//! assert_eq!(store.put("42", "tok1")?, PutOutcome::Inserted);
//! assert_eq!(store.put("42", "tok1")?, PutOutcome::Unchanged);
//! assert_eq!(store.get("42")?.as_deref(), Some("tok1"));
//! # Ok(())
//! # }
//! ```

mod storage;

pub use storage::CredentialStore;

/// Result of a successful `put`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PutOutcome {
    /// A new record was written
    Inserted,
    /// The exact `(id, token)` pair was already stored
    Unchanged,
}
