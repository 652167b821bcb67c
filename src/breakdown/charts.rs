//! Chart generation and rendering for the breakdown page.
//!
//! This module creates interactive ECharts visualizations of the ledger:
//! - **Giver Chart**: Bar chart of the total given by each player
//! - **Resource Chart**: Pie chart of the share of each resource
//! - **Time Chart**: Line chart of the daily total of each resource
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, Tooltip, Trigger},
    series::{Line, Pie, bar},
};
use maud::{Markup, PreEscaped, html};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{breakdown::aggregation::AggregationSnapshot, html::HeadElement};

/// The format of the time chart's x axis labels, e.g. "2025-06-12".
const DATE_LABEL_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// A breakdown chart with its HTML container ID and ECharts configuration.
pub(super) struct BreakdownChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Build the three breakdown charts for `snapshot`.
pub(super) fn breakdown_charts(snapshot: &AggregationSnapshot) -> [BreakdownChart; 3] {
    [
        BreakdownChart {
            id: "giver-chart",
            options: script_safe_json(&giver_chart(snapshot).to_string()),
        },
        BreakdownChart {
            id: "resource-chart",
            options: script_safe_json(&resource_chart(snapshot).to_string()),
        },
        BreakdownChart {
            id: "time-chart",
            options: script_safe_json(&time_chart(snapshot).to_string()),
        },
    ]
}

/// Escape the characters that could end an inline `<script>` element early.
///
/// Only JSON string contents can hold these characters, and `\u003c` and
/// friends decode to the same text in JavaScript.
fn script_safe_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Renders the HTML containers for breakdown charts.
pub(super) fn charts_view(charts: &[BreakdownChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for breakdown charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[BreakdownChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

pub(super) fn giver_chart(snapshot: &AggregationSnapshot) -> Chart {
    let (givers, totals): (Vec<&str>, Vec<f64>) = snapshot.givers_by_total_desc().into_iter().unzip();

    Chart::new()
        .title(Title::new().text("Total Given by Each Player"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(givers))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(bar::Bar::new().name("Total given").data(totals))
}

pub(super) fn resource_chart(snapshot: &AggregationSnapshot) -> Chart {
    let slices = snapshot
        .totals_by_resource
        .iter()
        .map(|(resource, &total)| (total, resource.as_str()))
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Distribution by Resource"))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().left("right").top("10%"))
        .series(
            Pie::new()
                .name("Resource")
                .radius(vec!["40%", "70%"])
                .data(slices),
        )
}

pub(super) fn time_chart(snapshot: &AggregationSnapshot) -> Chart {
    let dates = snapshot.dates();
    let labels = dates.iter().map(format_date_label).collect::<Vec<_>>();

    let mut chart = Chart::new()
        .title(Title::new().text("Transactions Over Time").left(20).top("1%"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value));

    for (resource, data) in snapshot.daily_series_by_resource(&dates) {
        chart = chart.series(
            Line::new()
                .name(resource)
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(data),
        );
    }

    chart
}

fn format_date_label(date: &Date) -> String {
    date.format(DATE_LABEL_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use maud::PreEscaped;

    use crate::{
        breakdown::aggregation::{AggregationSnapshot, aggregate},
        html::HeadElement,
        ledger::LedgerEntry,
    };

    use super::{breakdown_charts, charts_script, giver_chart, resource_chart, time_chart};

    fn entry(
        id: i64,
        giver: &str,
        resource: &str,
        amount: f64,
        date: time::PrimitiveDateTime,
    ) -> LedgerEntry {
        LedgerEntry {
            id,
            giver: giver.to_owned(),
            receiver: "Bank".to_owned(),
            resource: resource.to_owned(),
            amount,
            date,
            note: None,
        }
    }

    fn sample_snapshot() -> AggregationSnapshot {
        aggregate(&[
            entry(1, "Alice", "Money", 100.0, datetime!(2025-06-12 09:00:00)),
            entry(2, "Bob", "Steel", 250.0, datetime!(2025-06-13 10:00:00)),
        ])
    }

    #[test]
    fn chart_titles_match_sections() {
        let snapshot = sample_snapshot();

        assert!(giver_chart(&snapshot).to_string().contains("Total Given by Each Player"));
        assert!(resource_chart(&snapshot).to_string().contains("Distribution by Resource"));
        assert!(time_chart(&snapshot).to_string().contains("Transactions Over Time"));
    }

    #[test]
    fn giver_chart_orders_bars_by_total() {
        let options = giver_chart(&sample_snapshot()).to_string();

        let bob = options.find("\"Bob\"").expect("Bob missing from chart");
        let alice = options.find("\"Alice\"").expect("Alice missing from chart");
        assert!(bob < alice, "want Bob (250) before Alice (100): {options}");
    }

    #[test]
    fn time_chart_has_series_per_resource_and_date_labels() {
        let options = time_chart(&sample_snapshot()).to_string();

        assert!(options.contains("\"Money\""));
        assert!(options.contains("\"Steel\""));
        assert!(options.contains("\"2025-06-12\""));
        assert!(options.contains("\"2025-06-13\""));
    }

    #[test]
    fn chart_ids_are_unique() {
        let charts = breakdown_charts(&sample_snapshot());

        assert_ne!(charts[0].id, charts[1].id);
        assert_ne!(charts[1].id, charts[2].id);
        assert_ne!(charts[0].id, charts[2].id);
    }

    #[test]
    fn names_cannot_close_the_script_element() {
        let hostile = "</script><script>alert(1)</script><!--";
        let snapshot = aggregate(&[entry(
            1,
            hostile,
            hostile,
            5.0,
            datetime!(2025-06-12 09:00:00),
        )]);

        let HeadElement::ScriptSource(PreEscaped(script)) =
            charts_script(&breakdown_charts(&snapshot))
        else {
            panic!("want inline script source");
        };

        let lowercase = script.to_lowercase();
        assert!(!lowercase.contains("</script"), "got script {script}");
        assert!(!lowercase.contains("<!--"), "got script {script}");
        assert!(script.contains("\\u003c/script\\u003e\\u003cscript\\u003ealert(1)"));
    }
}
