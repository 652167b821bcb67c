//! The transaction log.
//!
//! This module contains everything related to recording transfers:
//! - The `LedgerEntry` model and the queries on the `logs` table
//! - Validation of the add-transaction form
//! - The `LedgerStore` that owns the database file
//! - View handlers for the ledger page, the add endpoint and the CSV export

mod core;
mod create_endpoint;
mod export;
mod input;
mod page;
mod store;

use axum::extract::FromRef;

use crate::AppState;

pub use core::{DATE_TIME_FORMAT, LedgerEntry};
pub use create_endpoint::create_entries_endpoint;
pub use export::get_entries_csv;
pub use input::{Resource, ResourcePolicy, Transfer, TransferDraft};
pub use page::get_ledger_page;
pub use store::LedgerStore;

/// The state needed by the ledger routes.
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub store: LedgerStore,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}
