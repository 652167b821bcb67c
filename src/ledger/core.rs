//! Defines the ledger entry model and the database queries for the `logs` table.

use rusqlite::{Connection, Row, types::Type};
use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, ledger::input::Transfer};

// ============================================================================
// MODELS
// ============================================================================

/// One logged transfer of a resource from a giver to a receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// Assigned by SQLite, never reused.
    pub id: i64,
    /// The name of the sending party.
    pub giver: String,
    /// The name of the receiving party.
    pub receiver: String,
    /// The resource that changed hands, e.g. "Steel".
    pub resource: String,
    /// How much of the resource changed hands.
    pub amount: f64,
    /// When the transfer was recorded, in the server's local timezone.
    pub date: PrimitiveDateTime,
    /// An optional free-form comment.
    pub note: Option<String>,
}

/// The format of the `date` column, e.g. "2025-06-12 21:04:09".
pub const DATE_TIME_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// The columns of the `logs` table other than `id`, with their SQL types.
///
/// Older databases may be missing some of these and are migrated by
/// [create_ledger_table].
const LEDGER_COLUMNS: [(&str, &str); 6] = [
    ("giver", "TEXT"),
    ("receiver", "TEXT"),
    ("resource", "TEXT"),
    ("amount", "REAL"),
    ("date", "TEXT"),
    ("note", "TEXT"),
];

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the `logs` table if it does not exist and add any missing columns
/// to an existing table.
///
/// Existing rows are never touched, so calling this on every start up is safe.
///
/// # Errors
/// Returns an error if the table cannot be created or altered.
pub fn create_ledger_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                giver TEXT,
                receiver TEXT,
                resource TEXT,
                amount REAL,
                date TEXT,
                note TEXT
                )",
        (),
    )?;

    for (column, column_type) in LEDGER_COLUMNS {
        if !table_has_column(connection, "logs", column)? {
            tracing::info!("Adding missing column \"{column}\" to the logs table");
            connection.execute(
                &format!("ALTER TABLE logs ADD COLUMN {column} {column_type} DEFAULT NULL"),
                (),
            )?;
        }
    }

    Ok(())
}

fn table_has_column(
    connection: &Connection,
    table: &str,
    column: &str,
) -> Result<bool, rusqlite::Error> {
    let mut statement = connection.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut columns = statement.query_map([], |row| row.get::<_, String>(1))?;

    columns.try_fold(false, |found, name| Ok(found || name? == column))
}

/// Write one row for every giver, receiver and resource combination of
/// `transfer`, all stamped with `date`.
///
/// The rows are written in a single SQL transaction, so either all of them
/// are stored or none are.
///
/// Returns the number of rows written.
///
/// # Errors
/// Returns an [Error::StorageUnavailable] if any row cannot be written.
pub fn insert_transfer(
    transfer: &Transfer,
    date: PrimitiveDateTime,
    connection: &Connection,
) -> Result<usize, Error> {
    let date = date
        .format(DATE_TIME_FORMAT)
        .map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))?;

    let transaction = connection.unchecked_transaction()?;
    let mut written = 0;

    {
        let mut statement = transaction.prepare_cached(
            "INSERT INTO logs (giver, receiver, resource, amount, date, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;

        for (giver, receiver, resource) in transfer.combinations() {
            written += statement.execute((
                giver,
                receiver,
                resource,
                transfer.amount,
                &date,
                transfer.note.as_deref(),
            ))?;
        }
    }

    transaction.commit()?;

    Ok(written)
}

/// Retrieve every ledger entry, oldest first.
///
/// Rows without a `date` cannot be placed in time and are skipped, the same
/// rows are left out of [count_entries].
///
/// # Errors
/// Returns an [Error::StorageUnavailable] if the table cannot be read.
pub fn list_entries(connection: &Connection) -> Result<Vec<LedgerEntry>, Error> {
    connection
        .prepare(
            "SELECT id, giver, receiver, resource, amount, date, note FROM logs \
            WHERE date IS NOT NULL ORDER BY id ASC",
        )?
        .query_map([], map_entry_row)?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

/// Get the total number of ledger entries that have a `date`.
///
/// # Errors
/// Returns an [Error::StorageUnavailable] if the table cannot be read.
pub fn count_entries(connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM logs WHERE date IS NOT NULL;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Map a database row to a [LedgerEntry].
///
/// Rows written by older versions may have `NULL` names or amounts, these are
/// read as empty strings and zero. A `date` that is present but not in
/// [DATE_TIME_FORMAT] is an error.
pub fn map_entry_row(row: &Row) -> Result<LedgerEntry, rusqlite::Error> {
    let id = row.get(0)?;
    let giver: Option<String> = row.get(1)?;
    let receiver: Option<String> = row.get(2)?;
    let resource: Option<String> = row.get(3)?;
    let amount: Option<f64> = row.get(4)?;
    let raw_date: String = row.get(5)?;
    let note = row.get(6)?;

    let date = PrimitiveDateTime::parse(&raw_date, DATE_TIME_FORMAT)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(error)))?;

    Ok(LedgerEntry {
        id,
        giver: giver.unwrap_or_default(),
        receiver: receiver.unwrap_or_default(),
        resource: resource.unwrap_or_default(),
        amount: amount.unwrap_or_default(),
        date,
        note,
    })
}

// ============================================================================
// TESTS
// ============================================================================
