//! Defines the endpoint for appending transfers to the ledger.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since axum's Form cannot collect repeated keys,
// e.g. one `resource` per checked checkbox, into a `Vec`.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    Error, endpoints,
    ledger::{LedgerState, TransferDraft},
};

/// A route handler for recording a transfer, redirects to the ledger view on success.
///
/// Invalid input is answered with a 400 alert and storage failures with a 500
/// alert. In both cases nothing is written.
pub async fn create_entries_endpoint(
    State(state): State<LedgerState>,
    Form(draft): Form<TransferDraft>,
) -> Response {
    match state.store.append(&draft) {
        Ok(written) => (
            HxRedirect(format!("{}?added={written}", endpoints::LEDGER_VIEW)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            match &error {
                Error::InvalidInput(reason) => tracing::debug!("rejected transfer: {reason}"),
                // Already logged when converted from the rusqlite error.
                Error::StorageUnavailable(_) => {}
                _ => tracing::error!("could not record transfer: {error}"),
            }

            error.into_alert_response()
        }
    }
}
