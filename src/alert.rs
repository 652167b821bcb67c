//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered as HTML fragments that htmx swaps into the
//! `#alert-container` element of the base page.

use axum::response::Html;
use maud::{Markup, html};

/// A dismissable message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with extra details.
    Success { message: String, details: String },
    /// An error message with extra details.
    Error { message: String, details: String },
}

const SUCCESS_STYLE: &str = "flex items-start p-4 mb-4 text-green-800 border \
    border-green-300 rounded-lg bg-green-50 dark:bg-gray-800 dark:text-green-400 \
    dark:border-green-800";
const ERROR_STYLE: &str = "flex items-start p-4 mb-4 text-red-800 border \
    border-red-300 rounded-lg bg-red-50 dark:bg-gray-800 dark:text-red-400 \
    dark:border-red-800";

impl Alert {
    pub fn into_markup(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, details),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
        };

        html! {
            div
                role="alert"
                class=(style)
            {
                div class="flex-1 text-sm"
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty() {
                        p class="mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Close"
                    class="ms-3 text-sm font-semibold"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        }
    }

    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn error_alert_renders_message_and_details() {
        let markup = Alert::Error {
            message: "Invalid transaction".to_owned(),
            details: "giver is missing".to_owned(),
        }
        .into_markup()
        .into_string();

        let html = Html::parse_fragment(&markup);
        let paragraphs = html
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();

        assert_eq!(paragraphs, vec!["Invalid transaction", "giver is missing"]);
    }

    #[test]
    fn alert_omits_empty_details() {
        let markup = Alert::Success {
            message: "Transaction added!".to_owned(),
            details: String::new(),
        }
        .into_markup()
        .into_string();

        let html = Html::parse_fragment(&markup);
        let count = html.select(&Selector::parse("p").unwrap()).count();

        assert_eq!(count, 1);
    }
}
