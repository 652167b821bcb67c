//! The API endpoints URIs.

/// The root route which redirects to the ledger page.
pub const ROOT: &str = "/";
/// The page listing every logged transaction with the form for adding more.
pub const LEDGER_VIEW: &str = "/ledger";
/// The page with the aggregate charts and totals.
pub const BREAKDOWN_VIEW: &str = "/breakdown";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to append transactions to the ledger.
pub const ENTRIES_API: &str = "/api/entries";
/// The route to download the ledger as a CSV file.
pub const ENTRIES_CSV: &str = "/api/entries.csv";
