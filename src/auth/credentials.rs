//! The single username and password pair that may log in.

use std::fmt;

use sha2::{Digest, Sha512};

/// The configured log-in credentials.
///
/// Only SHA-512 digests are kept, so the plain password never lives past
/// [Credentials::new].
#[derive(Clone)]
pub struct Credentials {
    username: String,
    username_digest: [u8; 64],
    password_digest: [u8; 64],
}

impl Credentials {
    /// Create the credentials that [Credentials::verify] will accept.
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_owned(),
            username_digest: digest(username),
            password_digest: digest(password),
        }
    }

    /// The configured username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether `username` and `password` match the configured pair.
    ///
    /// Both fields are always compared so the time taken does not reveal
    /// which one was wrong.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let username_matches = constant_time_eq(&digest(username), &self.username_digest);
        let password_matches = constant_time_eq(&digest(password), &self.password_digest);

        username_matches & password_matches
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn digest(value: &str) -> [u8; 64] {
    let mut digest = [0u8; 64];
    digest.copy_from_slice(&Sha512::digest(value.as_bytes()));

    digest
}

fn constant_time_eq(left: &[u8; 64], right: &[u8; 64]) -> bool {
    let mut result = 0u8;
    for (x, y) in left.iter().zip(right.iter()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::{Credentials, constant_time_eq, digest};

    #[test]
    fn accepts_configured_pair() {
        let credentials = Credentials::new("sumnor", "hunter2");

        assert!(credentials.verify("sumnor", "hunter2"));
    }

    #[test]
    fn rejects_wrong_password() {
        let credentials = Credentials::new("sumnor", "hunter2");

        assert!(!credentials.verify("sumnor", "hunter3"));
        assert!(!credentials.verify("sumnor", ""));
    }

    #[test]
    fn rejects_wrong_username() {
        let credentials = Credentials::new("sumnor", "hunter2");

        assert!(!credentials.verify("Sumnor", "hunter2"));
        assert!(!credentials.verify("", "hunter2"));
    }

    #[test]
    fn digests_compare_by_value() {
        assert!(constant_time_eq(&digest("abc"), &digest("abc")));
        assert!(!constant_time_eq(&digest("abc"), &digest("abd")));
    }

    #[test]
    fn debug_output_hides_password() {
        let credentials = Credentials::new("sumnor", "hunter2");

        let debug = format!("{credentials:?}");

        assert!(debug.contains("sumnor"));
        assert!(!debug.contains("hunter2"));
    }
}
