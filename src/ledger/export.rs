//! Download of the ledger as a CSV file.

use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    Error,
    ledger::{DATE_TIME_FORMAT, LedgerEntry, LedgerState},
};

const CSV_HEADER: [&str; 7] = ["id", "giver", "receiver", "resource", "amount", "date", "note"];

#[derive(Serialize)]
struct CsvRow<'a> {
    id: i64,
    giver: &'a str,
    receiver: &'a str,
    resource: &'a str,
    amount: f64,
    date: String,
    note: Option<&'a str>,
}

/// Serialize `entries` as CSV with a header row.
///
/// # Errors
/// Returns an [Error::CsvError] if a row cannot be written.
pub fn entries_to_csv(entries: &[LedgerEntry]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for entry in entries {
        let date = entry
            .date
            .format(DATE_TIME_FORMAT)
            .map_err(|error| Error::CsvError(error.to_string()))?;

        writer
            .serialize(CsvRow {
                id: entry.id,
                giver: &entry.giver,
                receiver: &entry.receiver,
                resource: &entry.resource,
                amount: entry.amount,
                date,
                note: entry.note.as_deref(),
            })
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

/// A route handler that returns every ledger entry as a CSV attachment.
pub async fn get_entries_csv(State(state): State<LedgerState>) -> Response {
    let csv = state
        .store
        .list_all()
        .and_then(|entries| entries_to_csv(&entries));

    match csv {
        Ok(body) => (
            [
                (CONTENT_TYPE, "text/csv; charset=utf-8"),
                (CONTENT_DISPOSITION, "attachment; filename=\"pnw_logs.csv\""),
            ],
            body,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not export the ledger: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, routing::get};
    use axum_test::TestServer;
    use time::macros::datetime;

    use crate::{
        endpoints,
        ledger::{LedgerEntry, LedgerState, LedgerStore, ResourcePolicy},
    };

    use super::{entries_to_csv, get_entries_csv};

    #[test]
    fn writes_header_and_rows() {
        let entries = vec![
            LedgerEntry {
                id: 1,
                giver: "Alice".to_owned(),
                receiver: "Bob".to_owned(),
                resource: "Steel".to_owned(),
                amount: 1500.5,
                date: datetime!(2025-06-12 21:04:09),
                note: Some("war, chest".to_owned()),
            },
            LedgerEntry {
                id: 2,
                giver: "Alice".to_owned(),
                receiver: "Carol".to_owned(),
                resource: "Food".to_owned(),
                amount: 3.0,
                date: datetime!(2025-06-13 08:00:00),
                note: None,
            },
        ];

        let csv = String::from_utf8(entries_to_csv(&entries).unwrap()).unwrap();

        assert_eq!(
            csv,
            "id,giver,receiver,resource,amount,date,note\n\
             1,Alice,Bob,Steel,1500.5,2025-06-12 21:04:09,\"war, chest\"\n\
             2,Alice,Carol,Food,3.0,2025-06-13 08:00:00,\n"
        );
    }

    #[test]
    fn empty_ledger_has_only_header() {
        let csv = String::from_utf8(entries_to_csv(&[]).unwrap()).unwrap();

        assert_eq!(csv, "id,giver,receiver,resource,amount,date,note\n");
    }

    #[tokio::test]
    async fn download_has_csv_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(
            dir.path().join("pnw_logs.db"),
            ResourcePolicy::Strict,
            "Etc/UTC",
        );
        store.initialize().unwrap();
        let app = Router::new()
            .route(endpoints::ENTRIES_CSV, get(get_entries_csv))
            .with_state(LedgerState { store });
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server.get(endpoints::ENTRIES_CSV).await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "text/csv; charset=utf-8");
        response.assert_text("id,giver,receiver,resource,amount,date,note\n");
    }
}
