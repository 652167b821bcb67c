//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The submitted transfer could not be recorded because one of its fields
    /// is missing or malformed.
    ///
    /// The string describes which field is wrong and is safe to show to the
    /// user. Nothing is written to the ledger when this error is returned.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The ledger database could not be opened, read or written.
    ///
    /// The wrapped error should only be logged on the server. When
    /// communicating with the client, a generic message is shown instead.
    #[error("the ledger storage is unavailable: {0}")]
    StorageUnavailable(rusqlite::Error),

    /// The user provided an invalid combination of username and password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token could not be serialized, deserialized or had an
    /// expiry that could not be represented.
    #[error("invalid auth token: {0}")]
    InvalidToken(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The ledger could not be written as CSV.
    #[error("could not export the ledger as CSV: {0}")]
    CsvError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("a ledger storage error occurred: {}", value);
        Error::StorageUnavailable(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::StorageUnavailable(_) => InternalServerError {
                description: "Storage Unavailable",
                fix: "The ledger database could not be read. Check that the database file \
                    exists and is writable, then try again.",
            }
            .into_response(),
            Error::InvalidTimezone(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidInput(reason) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid transaction".to_owned(),
                    details: format!("{reason}. Nothing was recorded."),
                },
            ),
            Error::StorageUnavailable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Storage unavailable".to_owned(),
                    details: "The ledger database could not be written. \
                        Nothing was recorded, check the server logs for more details."
                        .to_owned(),
                },
            ),
            Error::InvalidTimezone(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        Error,
        test_utils::{assert_valid_html, parse_html_fragment},
    };

    #[tokio::test]
    async fn invalid_input_alert_is_bad_request_with_reason() {
        let response =
            Error::InvalidInput("amount \"abc\" is not a number".to_owned()).into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("amount \"abc\" is not a number"),
            "alert should include the reason, got {text:?}"
        );
    }

    #[tokio::test]
    async fn storage_unavailable_alert_is_server_error() {
        let response = Error::StorageUnavailable(rusqlite::Error::InvalidQuery).into_alert_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_renders_404_page() {
        let response = Error::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn sql_errors_become_storage_unavailable() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(
            error,
            Error::StorageUnavailable(rusqlite::Error::QueryReturnedNoRows)
        );
    }
}
