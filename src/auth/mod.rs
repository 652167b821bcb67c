//! The log-in gate in front of the ledger.
//!
//! A single configured username and password pair may log in. A successful
//! log-in stores a [Token] in a private cookie, and the middleware turns that
//! cookie into a [Session] for each request.

mod cookie;
mod credentials;
mod log_in;
mod log_out;
mod middleware;
mod redirect;
mod token;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use credentials::Credentials;
pub use log_in::{LoginState, get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, Session, auth_guard, auth_guard_hx};
pub(crate) use token::Token;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
