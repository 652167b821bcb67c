//! Breakdown HTTP handler and view rendering.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    breakdown::{
        aggregation::{AggregationSnapshot, aggregate},
        charts::{BreakdownChart, breakdown_charts, charts_script, charts_view},
    },
    endpoints,
    html::{
        HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_amount, link,
    },
    ledger::LedgerStore,
    navigation::NavBar,
};

/// The URL of the ECharts build used to draw the charts.
const ECHARTS_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// The state needed for displaying the breakdown page.
#[derive(Debug, Clone)]
pub struct BreakdownState {
    pub store: LedgerStore,
}

impl FromRef<AppState> for BreakdownState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// Display the charts and totals for the whole ledger.
pub async fn get_breakdown_page(State(state): State<BreakdownState>) -> Result<Response, Error> {
    let entries = state
        .store
        .list_all()
        .inspect_err(|error| tracing::error!("Could not list the ledger: {error}"))?;

    let snapshot = aggregate(&entries);

    if snapshot.is_empty() {
        return Ok(breakdown_no_data_view().into_response());
    }

    let charts = breakdown_charts(&snapshot);

    Ok(breakdown_view(&snapshot, &charts).into_response())
}

fn breakdown_no_data_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::BREAKDOWN_VIEW).into_html();
    let ledger_link = link(endpoints::LEDGER_VIEW, "ledger page");

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold"
            {
                "No data to show."
            }

            p
            {
                "Charts will show up here once you add some transactions on the " (ledger_link) "."
            }
        }
    );

    base("Breakdown", &[], &content)
}

fn breakdown_view(snapshot: &AggregationSnapshot, charts: &[BreakdownChart]) -> Markup {
    let nav_bar = NavBar::new(endpoints::BREAKDOWN_VIEW).into_html();
    let givers = snapshot
        .givers_by_total_desc()
        .into_iter()
        .map(|(giver, total)| (giver.to_owned(), total))
        .collect::<Vec<_>>();
    let resources = snapshot
        .totals_by_resource
        .iter()
        .map(|(resource, &total)| (resource.clone(), total))
        .collect::<Vec<_>>();

    let content = html!(
        (nav_bar)

        div
            id="breakdown-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold mb-4" { "Breakdown of Transactions" }

            (charts_view(charts))

            div class="grid grid-cols-1 md:grid-cols-2 gap-4 w-full"
            {
                (totals_table("Total by Giver", "Giver", &givers))
                (totals_table("Total by Resource", "Resource", &resources))
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
        charts_script(charts),
    ];

    base("Breakdown", &scripts, &content)
}

fn totals_table(title: &str, label: &str, rows: &[(String, f64)]) -> Markup {
    html! {
        div
        {
            h3 class="text-xl font-semibold mb-4" { (title) }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { (label) }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Total" }
                        }
                    }

                    tbody
                    {
                        @for (name, total) in rows {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (name) }
                                td class={(TABLE_CELL_STYLE) " text-right"} { (format_amount(*total)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode};
    use scraper::Selector;
    use tempfile::TempDir;

    use crate::{
        ledger::{LedgerStore, ResourcePolicy, TransferDraft},
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{BreakdownState, get_breakdown_page};

    fn get_test_state() -> (TempDir, BreakdownState) {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(
            dir.path().join("pnw_logs.db"),
            ResourcePolicy::Strict,
            "Etc/UTC",
        );
        store.initialize().unwrap();

        (dir, BreakdownState { store })
    }

    #[tokio::test]
    async fn empty_ledger_shows_no_data_message() {
        let (_dir, state) = get_test_state();

        let response = get_breakdown_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("No data to show."));
        assert_eq!(html.select(&Selector::parse("#charts").unwrap()).count(), 0);
    }

    #[tokio::test]
    async fn shows_charts_and_totals() {
        let (_dir, state) = get_test_state();
        state
            .store
            .append(&TransferDraft {
                giver: vec!["Alice, Bob".to_owned()],
                receiver: vec!["Carol".to_owned()],
                resource: vec!["Money".to_owned(), "Oil".to_owned()],
                amount: "10".to_owned(),
                note: None,
            })
            .unwrap();

        let response = get_breakdown_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        for id in ["#giver-chart", "#resource-chart", "#time-chart"] {
            assert_eq!(
                html.select(&Selector::parse(id).unwrap()).count(),
                1,
                "want one {id} container"
            );
        }
        let totals = html
            .select(&Selector::parse("tbody tr").unwrap())
            .map(|row| row.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(totals.len(), 4, "want 2 givers and 2 resources, got {totals:?}");
        assert!(totals.iter().all(|row| row.contains("20.00")));
    }
}
