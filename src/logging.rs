//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{Method, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// The `password` field of submitted forms is never logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (headers, body_text) = match extract_header_and_body_text_from_request(request).await {
        Ok(parts) => parts,
        Err((headers, error)) => {
            tracing::error!("Could not read request body: {error}");
            return next.run(Request::from_parts(headers, Body::empty())).await;
        }
    };

    let is_form = headers
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    if headers.method == Method::POST && is_form {
        let display_text = redact_password(&body_text, "password");
        log_request(&headers, &display_text);
    } else {
        log_request(&headers, &body_text);
    }

    let request = Request::from_parts(headers, body_text.into());
    let response = next.run(request).await;

    let (headers, body) = response.into_parts();
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(body_bytes) => {
            let body_text = String::from_utf8_lossy(&body_bytes);
            log_response(&headers, &body_text);
            Response::from_parts(headers, Body::from(body_bytes))
        }
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            Response::from_parts(headers, Body::empty())
        }
    }
}

fn redact_password(form_text: &str, field_name: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key == field_name => format!("{field_name}=********"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> Result<(axum::http::request::Parts, String), (axum::http::request::Parts, axum::Error)> {
    let (headers, body) = request.into_parts();

    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(body_bytes) => Ok((headers, String::from_utf8_lossy(&body_bytes).to_string())),
        Err(error) => Err((headers, error)),
    }
}

const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Cut `body` to at most [LOG_BODY_LENGTH_LIMIT] bytes without splitting a character.
fn truncate(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {headers:#?}\nbody: {:}...",
            truncate(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {headers:#?}\nbody: {:}...",
            truncate(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}
