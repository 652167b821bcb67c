//! Implements a struct that holds the state of the REST server.

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error,
    auth::{Credentials, DEFAULT_COOKIE_DURATION},
    ledger::LedgerStore,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The only username and password pair that may log in.
    pub credentials: Credentials,

    /// The transaction ledger.
    pub store: LedgerStore,
}

impl AppState {
    /// Create a new [AppState] around `store`.
    ///
    /// This function will initialize the ledger storage, creating or
    /// migrating the table as needed.
    ///
    /// # Errors
    /// Returns an error if the ledger storage cannot be initialized.
    pub fn new(
        store: LedgerStore,
        cookie_secret: &str,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        store.initialize()?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            credentials,
            store,
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        auth::Credentials,
        ledger::{LedgerStore, ResourcePolicy},
    };

    use super::AppState;

    #[test]
    fn new_initializes_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(
            dir.path().join("pnw_logs.db"),
            ResourcePolicy::Strict,
            "Etc/UTC",
        );

        let state = AppState::new(store, "secret", Credentials::new("sumnor", "pw")).unwrap();

        assert_eq!(state.store.count(), Ok(0));
    }

    #[test]
    fn new_fails_when_storage_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(
            dir.path().join("missing").join("pnw_logs.db"),
            ResourcePolicy::Strict,
            "Etc/UTC",
        );

        let result = AppState::new(store, "secret", Credentials::new("sumnor", "pw"));

        assert!(matches!(result, Err(Error::StorageUnavailable(_))));
    }
}
