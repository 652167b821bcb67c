//! The file-backed transaction log.

use std::{path::PathBuf, time::Duration};

use rusqlite::Connection;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::{
    Error,
    ledger::{
        core::{LedgerEntry, count_entries, create_ledger_table, insert_transfer, list_entries},
        input::{ResourcePolicy, TransferDraft},
    },
    timezone::get_local_offset,
};

/// How long a write waits for another connection to release the database lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// An append-only log of resource transfers stored in a single SQLite file.
///
/// The file is opened at the start of each operation and closed when the
/// operation returns, no connection is kept open between calls.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    db_path: PathBuf,
    resource_policy: ResourcePolicy,
    local_timezone: String,
}

impl LedgerStore {
    /// Create a store for the database file at `db_path`.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g.
    /// "Pacific/Auckland", and is used to timestamp new entries.
    pub fn new(
        db_path: impl Into<PathBuf>,
        resource_policy: ResourcePolicy,
        local_timezone: &str,
    ) -> Self {
        Self {
            db_path: db_path.into(),
            resource_policy,
            local_timezone: local_timezone.to_owned(),
        }
    }

    /// The resource names this store accepts.
    pub fn resource_policy(&self) -> ResourcePolicy {
        self.resource_policy
    }

    /// Create the ledger table, or migrate an existing one.
    ///
    /// # Errors
    /// Returns an [Error::StorageUnavailable] if the file cannot be opened or
    /// the table cannot be created.
    pub fn initialize(&self) -> Result<(), Error> {
        let connection = self.connect()?;
        create_ledger_table(&connection)?;

        Ok(())
    }

    /// Validate `draft` and record one entry per giver, receiver and resource
    /// combination, all stamped with the current local time.
    ///
    /// Returns the number of entries written.
    ///
    /// # Errors
    /// Returns an:
    /// - [Error::InvalidInput] if the draft is invalid, nothing is written,
    /// - [Error::InvalidTimezone] if the configured timezone is unknown,
    /// - [Error::StorageUnavailable] if the entries could not be written, nothing is written.
    pub fn append(&self, draft: &TransferDraft) -> Result<usize, Error> {
        let transfer = draft.validate(self.resource_policy)?;
        let now = self.local_now()?;

        let connection = self.connect()?;
        let written = insert_transfer(&transfer, now, &connection)?;
        tracing::info!("Recorded {written} ledger entries");

        Ok(written)
    }

    /// Every entry in the ledger, oldest first.
    ///
    /// # Errors
    /// Returns an [Error::StorageUnavailable] if the ledger cannot be read.
    pub fn list_all(&self) -> Result<Vec<LedgerEntry>, Error> {
        let connection = self.connect()?;

        list_entries(&connection)
    }

    /// The number of entries in the ledger.
    ///
    /// # Errors
    /// Returns an [Error::StorageUnavailable] if the ledger cannot be read.
    pub fn count(&self) -> Result<u64, Error> {
        let connection = self.connect()?;

        count_entries(&connection)
    }

    fn connect(&self) -> Result<Connection, Error> {
        let connection = Connection::open(&self.db_path).inspect_err(|error| {
            tracing::error!(
                "Could not open the ledger database {}: {error}",
                self.db_path.display()
            )
        })?;
        connection.busy_timeout(BUSY_TIMEOUT)?;

        Ok(connection)
    }

    fn local_now(&self) -> Result<PrimitiveDateTime, Error> {
        let offset = get_local_offset(&self.local_timezone)
            .ok_or_else(|| Error::InvalidTimezone(self.local_timezone.clone()))?;
        let now = OffsetDateTime::now_utc().to_offset(offset);

        Ok(PrimitiveDateTime::new(now.date(), now.time()))
    }
}
