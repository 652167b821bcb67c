//! Helpers for the redirect URLs passed through the log-in page.
//!
//! Only local paths are accepted so that a crafted log-in link cannot send
//! the user to another site.

use axum::{
    extract::Request,
    http::{Method, Uri},
};
use tracing::{error, warn};

use crate::endpoints;

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map_or(redirect_url, |(path, _)| path);

    path != endpoints::LOG_IN_VIEW
}

/// Parse `raw_url` and return its path and query if it is a local path other
/// than the log-in page.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    local_path_and_query(&uri)
}

/// Build the log-in page URL that sends the user back to where `request`
/// was headed once they have logged in.
///
/// Requests under `/api` usually come from htmx, so the page the user was
/// looking at is taken from the `HX-Current-URL` header instead of the request
/// URI. Plain GET requests under `/api`, such as a download link, redirect back
/// to themselves.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let is_plain_get = request.method() == Method::GET && !is_hx_request(request);

    let redirect_target = if request.uri().path().starts_with("/api") && !is_plain_get {
        redirect_target_from_hx_request(request)?
    } else {
        redirect_target_from_request_uri(request)?
    };

    build_log_in_redirect_url_from_target(&redirect_target)
}

/// The log-in page URL with `redirect_target` in its query string.
pub fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN_VIEW, param)),
        Err(error) => {
            error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

fn local_path_and_query(uri: &Uri) -> Option<String> {
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

fn redirect_target_from_request_uri(request: &Request) -> Option<String> {
    let path_and_query = request.uri().path_and_query()?.as_str();
    normalize_redirect_url(path_and_query)
}

fn is_hx_request(request: &Request) -> bool {
    request
        .headers()
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"))
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();

    if !is_hx_request(request) {
        warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    else {
        warn!("Missing HX-Current-URL header for /api request.");
        return None;
    };

    // htmx sends the full URL of the page, so only keep the local part.
    let redirect_url = current_url
        .parse::<Uri>()
        .ok()
        .and_then(|uri| local_path_and_query(&uri));
    if redirect_url.is_none() {
        warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::Request};

    use crate::endpoints;

    use super::{build_log_in_redirect_url, normalize_redirect_url};

    #[test]
    fn keeps_local_paths_with_query() {
        assert_eq!(
            normalize_redirect_url("/ledger?added=2"),
            Some("/ledger?added=2".to_owned())
        );
    }

    #[test]
    fn rejects_other_sites() {
        assert_eq!(normalize_redirect_url("https://example.com/ledger"), None);
        assert_eq!(normalize_redirect_url("//example.com/ledger"), None);
        assert_eq!(normalize_redirect_url("ledger"), None);
    }

    #[test]
    fn rejects_log_in_page() {
        assert_eq!(normalize_redirect_url(endpoints::LOG_IN_VIEW), None);
        assert_eq!(
            normalize_redirect_url(&format!("{}?redirect_url=%2F", endpoints::LOG_IN_VIEW)),
            None
        );
    }

    #[test]
    fn page_request_redirects_back_to_itself() {
        let request = Request::builder()
            .uri("/breakdown")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            Some(format!("{}?redirect_url=%2Fbreakdown", endpoints::LOG_IN_VIEW))
        );
    }

    #[test]
    fn api_request_redirects_to_current_page() {
        let request = Request::builder()
            .uri(endpoints::ENTRIES_API)
            .header("HX-Request", "true")
            .header("HX-Current-URL", "http://localhost:3000/ledger")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            Some(format!("{}?redirect_url=%2Fledger", endpoints::LOG_IN_VIEW))
        );
    }

    #[test]
    fn api_request_without_htmx_headers_has_no_target() {
        let request = Request::builder()
            .method("POST")
            .uri(endpoints::ENTRIES_API)
            .body(Body::empty())
            .unwrap();

        assert_eq!(build_log_in_redirect_url(&request), None);
    }

    #[test]
    fn download_link_redirects_back_to_itself() {
        let request = Request::builder()
            .uri(endpoints::ENTRIES_CSV)
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            Some(format!(
                "{}?redirect_url=%2Fapi%2Fentries.csv",
                endpoints::LOG_IN_VIEW
            ))
        );
    }
}
