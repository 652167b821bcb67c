//! Defines the route handler for the page that lists the ledger and the form for adding to it.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    alert::Alert,
    auth::Session,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        RESOURCE_BADGE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_amount, link, loading_spinner,
    },
    ledger::{
        DATE_TIME_FORMAT, LedgerEntry, LedgerState,
        input::{Resource, ResourcePolicy},
    },
    navigation::NavBar,
};

/// The query parameters for the ledger page.
#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    /// The number of entries written by the last submission, set by the add endpoint.
    pub added: Option<usize>,
}

/// Render the ledger page.
pub async fn get_ledger_page(
    State(state): State<LedgerState>,
    Extension(session): Extension<Session>,
    Query(query): Query<LedgerQuery>,
) -> Response {
    let entries = match state.store.list_all() {
        Ok(entries) => entries,
        Err(error) => {
            tracing::error!("Could not list the ledger: {error}");
            return error.into_response();
        }
    };

    ledger_view(
        &entries,
        &session.username,
        state.store.resource_policy(),
        query.added,
    )
    .into_response()
}

fn ledger_view(
    entries: &[LedgerEntry],
    username: &str,
    resource_policy: ResourcePolicy,
    added: Option<usize>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::LEDGER_VIEW).into_html();
    let added_alert = added.map(|count| {
        let noun = if count == 1 { "entry" } else { "entries" };

        Alert::Success {
            message: "Transaction added!".to_owned(),
            details: format!("Recorded {count} {noun}."),
        }
        .into_markup()
    });

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-8"
            {
                div
                {
                    h1 class="text-2xl font-bold" { "🏛 Politics & War Transaction Tracker" }
                    p { "Logged in as " strong { (username) } }
                }

                @if let Some(alert) = added_alert {
                    div class="max-w-md" { (alert) }
                }

                section class="space-y-4"
                {
                    div class="flex justify-between items-center"
                    {
                        h2 class="text-xl font-semibold" { "📜 Transaction Logs" }

                        @if !entries.is_empty() {
                            p { (link(endpoints::ENTRIES_CSV, "Download CSV")) }
                        }
                    }

                    @if entries.is_empty() {
                        p { "No logs found." }
                    } @else {
                        (entries_table(entries))
                    }
                }

                section class="max-w-md space-y-4"
                {
                    h2 class="text-xl font-semibold" { "➕ Add New Transaction" }

                    (add_transaction_form(resource_policy))
                }
            }
        }
    };

    base("Ledger", &[], &content)
}

fn entries_table(entries: &[LedgerEntry]) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Giver" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Receiver" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Resource" }
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                    }
                }

                tbody
                {
                    @for entry in entries {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (entry.id) }
                            td class=(TABLE_CELL_STYLE) { (entry.giver) }
                            td class=(TABLE_CELL_STYLE) { (entry.receiver) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                span class=(RESOURCE_BADGE_STYLE) { (entry.resource) }
                            }
                            td class={(TABLE_CELL_STYLE) " text-right"} { (format_amount(entry.amount)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                (entry.date.format(DATE_TIME_FORMAT).unwrap_or_else(|_| entry.date.to_string()))
                            }
                            td class=(TABLE_CELL_STYLE) { (entry.note.as_deref().unwrap_or_default()) }
                        }
                    }
                }
            }
        }
    }
}

fn add_transaction_form(resource_policy: ResourcePolicy) -> Markup {
    html! {
        form
            hx-post=(endpoints::ENTRIES_API)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="giver" class=(FORM_LABEL_STYLE) { "Giver" }
                input
                    id="giver"
                    type="text"
                    name="giver"
                    placeholder="Alice, Bob"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="receiver" class=(FORM_LABEL_STYLE) { "Receiver" }
                input
                    id="receiver"
                    type="text"
                    name="receiver"
                    placeholder="Carol"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @match resource_policy {
                ResourcePolicy::Strict => {
                    fieldset
                    {
                        legend class=(FORM_LABEL_STYLE) { "Resource" }

                        div class="grid grid-cols-2 gap-2"
                        {
                            @for resource in Resource::ALL {
                                label class="flex items-center gap-x-2 text-sm"
                                {
                                    input
                                        type="checkbox"
                                        name="resource"
                                        value=(resource.as_str())
                                        checked[resource == Resource::Money]
                                        class="rounded-xs";
                                    (resource.as_str())
                                }
                            }
                        }
                    }
                }
                ResourcePolicy::FreeText => {
                    div
                    {
                        label for="resource" class=(FORM_LABEL_STYLE) { "Resource" }
                        input
                            id="resource"
                            type="text"
                            name="resource"
                            placeholder="Money, Steel"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                input
                    id="amount"
                    type="number"
                    name="amount"
                    min="0"
                    step="any"
                    value="0"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="note" class=(FORM_LABEL_STYLE) { "Note" }
                input
                    id="note"
                    type="text"
                    name="note"
                    placeholder="Optional"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Add Log"
            }
        }
    }
}
