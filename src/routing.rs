//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};

use crate::{
    AppState,
    auth::{auth_guard, auth_guard_hx, get_log_in_page, get_log_out, post_log_in},
    breakdown::get_breakdown_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    ledger::{create_entries_endpoint, get_entries_csv, get_ledger_page},
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::LEDGER_VIEW, get(get_ledger_page))
        .route(endpoints::BREAKDOWN_VIEW, get(get_breakdown_page))
        .route(endpoints::ENTRIES_CSV, get(get_entries_csv))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // This route is called by htmx, so auth redirects must use the HX-Redirect header.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::ENTRIES_API, post(create_entries_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the ledger page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::LEDGER_VIEW)
}
