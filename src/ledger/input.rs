//! Parsing and validation of the add-transaction form.
//!
//! Everything the user submits is checked here before the database is
//! touched, so an [Error::InvalidInput] always means nothing was written.

use std::fmt;

use serde::Deserialize;

use crate::Error;

/// The tradeable resources in Politics & War.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Money,
    Food,
    Oil,
    Uranium,
    Steel,
    Aluminum,
    Gasoline,
    Munitions,
}

impl Resource {
    /// Every resource, in the order they are offered in the form.
    pub const ALL: [Resource; 8] = [
        Resource::Money,
        Resource::Food,
        Resource::Oil,
        Resource::Uranium,
        Resource::Steel,
        Resource::Aluminum,
        Resource::Gasoline,
        Resource::Munitions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Money => "Money",
            Resource::Food => "Food",
            Resource::Oil => "Oil",
            Resource::Uranium => "Uranium",
            Resource::Steel => "Steel",
            Resource::Aluminum => "Aluminum",
            Resource::Gasoline => "Gasoline",
            Resource::Munitions => "Munitions",
        }
    }

    /// Find the resource called `name`, ignoring case.
    pub fn from_name(name: &str) -> Option<Resource> {
        Resource::ALL
            .into_iter()
            .find(|resource| resource.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which resource names the ledger accepts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ResourcePolicy {
    /// Only the names in [Resource::ALL], stored with their canonical spelling.
    #[default]
    Strict,
    /// Any non-empty name, stored as entered.
    FreeText,
}

/// The raw data entered by the user in the add-transaction form.
///
/// Each name field may be repeated and each value may hold a comma separated
/// list, e.g. `giver=Alice,Bob&giver=Carol` names three givers.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct TransferDraft {
    #[serde(default)]
    pub giver: Vec<String>,
    #[serde(default)]
    pub receiver: Vec<String>,
    #[serde(default)]
    pub resource: Vec<String>,
    /// Kept as text so that a non-numeric amount is reported to the user
    /// instead of being rejected by the form extractor.
    #[serde(default)]
    pub amount: String,
    pub note: Option<String>,
}

/// A validated transfer, ready to be written to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub givers: Vec<String>,
    pub receivers: Vec<String>,
    pub resources: Vec<String>,
    pub amount: f64,
    pub note: Option<String>,
}

impl Transfer {
    /// Every (giver, receiver, resource) combination, iterating resources
    /// fastest and givers slowest.
    pub fn combinations(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.givers.iter().flat_map(move |giver| {
            self.receivers.iter().flat_map(move |receiver| {
                self.resources
                    .iter()
                    .map(move |resource| (giver.as_str(), receiver.as_str(), resource.as_str()))
            })
        })
    }
}

impl TransferDraft {
    /// Check the draft and turn it into a [Transfer].
    ///
    /// # Errors
    /// Returns an [Error::InvalidInput] describing the first problem found:
    /// - the amount is not a finite, non-negative number,
    /// - no giver, receiver or resource was given,
    /// - or, under [ResourcePolicy::Strict], a resource is not one of [Resource::ALL].
    pub fn validate(&self, policy: ResourcePolicy) -> Result<Transfer, Error> {
        let amount = parse_amount(&self.amount)?;

        let givers = split_names(&self.giver);
        if givers.is_empty() {
            return Err(Error::InvalidInput("At least one giver is required".to_owned()));
        }

        let receivers = split_names(&self.receiver);
        if receivers.is_empty() {
            return Err(Error::InvalidInput(
                "At least one receiver is required".to_owned(),
            ));
        }

        let resources = split_names(&self.resource);
        if resources.is_empty() {
            return Err(Error::InvalidInput(
                "At least one resource is required".to_owned(),
            ));
        }
        let resources = match policy {
            ResourcePolicy::Strict => canonicalize_resources(resources)?,
            ResourcePolicy::FreeText => resources,
        };

        let note = self
            .note
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .map(str::to_owned);

        Ok(Transfer {
            givers,
            receivers,
            resources,
            amount,
            note,
        })
    }
}

/// Split every input on commas, trim the pieces and drop the empty ones.
pub fn split_names(inputs: &[String]) -> Vec<String> {
    inputs
        .iter()
        .flat_map(|input| input.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_amount(raw_amount: &str) -> Result<f64, Error> {
    let raw_amount = raw_amount.trim();

    if raw_amount.is_empty() {
        return Err(Error::InvalidInput("An amount is required".to_owned()));
    }

    let amount: f64 = raw_amount.parse().map_err(|_| {
        Error::InvalidInput(format!("The amount \"{raw_amount}\" is not a number"))
    })?;

    if !amount.is_finite() {
        return Err(Error::InvalidInput(format!(
            "The amount \"{raw_amount}\" is not a finite number"
        )));
    }

    if amount < 0.0 {
        return Err(Error::InvalidInput(format!(
            "The amount {amount} is negative"
        )));
    }

    Ok(amount)
}

fn canonicalize_resources(names: Vec<String>) -> Result<Vec<String>, Error> {
    names
        .into_iter()
        .map(|name| match Resource::from_name(&name) {
            Some(resource) => Ok(resource.as_str().to_owned()),
            None => {
                let known = Resource::ALL.map(|resource| resource.as_str()).join(", ");
                Err(Error::InvalidInput(format!(
                    "Unknown resource \"{name}\", expected one of {known}"
                )))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{Resource, ResourcePolicy, Transfer, TransferDraft, split_names};

    fn to_strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|&name| name.to_owned()).collect()
    }

    fn draft(givers: &[&str], receivers: &[&str], resources: &[&str], amount: &str) -> TransferDraft {
        TransferDraft {
            giver: to_strings(givers),
            receiver: to_strings(receivers),
            resource: to_strings(resources),
            amount: amount.to_owned(),
            note: None,
        }
    }

    #[track_caller]
    fn assert_invalid_input(result: Result<Transfer, Error>) {
        assert!(
            matches!(result, Err(Error::InvalidInput(_))),
            "want invalid input error, got {result:?}"
        );
    }

    #[test]
    fn split_names_trims_and_drops_empty_tokens() {
        let inputs = vec![" Alice, Bob ,, ".to_owned(), "Carol".to_owned(), "  ".to_owned()];

        assert_eq!(split_names(&inputs), vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn validate_succeeds() {
        let transfer = draft(&["A, B"], &["X"], &["Money", "steel"], "10")
            .validate(ResourcePolicy::Strict)
            .unwrap();

        assert_eq!(
            transfer,
            Transfer {
                givers: vec!["A".to_owned(), "B".to_owned()],
                receivers: vec!["X".to_owned()],
                resources: vec!["Money".to_owned(), "Steel".to_owned()],
                amount: 10.0,
                note: None,
            }
        );
    }

    #[test]
    fn combinations_nest_giver_receiver_resource() {
        let transfer = draft(&["A", "B"], &["X"], &["Money", "Steel"], "10")
            .validate(ResourcePolicy::Strict)
            .unwrap();

        let got = transfer.combinations().collect::<Vec<_>>();

        assert_eq!(
            got,
            vec![
                ("A", "X", "Money"),
                ("A", "X", "Steel"),
                ("B", "X", "Money"),
                ("B", "X", "Steel"),
            ]
        );
    }

    #[test]
    fn rejects_non_numeric_amount() {
        assert_invalid_input(
            draft(&["A"], &["X"], &["Money"], "abc").validate(ResourcePolicy::Strict),
        );
    }

    #[test]
    fn rejects_missing_amount() {
        assert_invalid_input(draft(&["A"], &["X"], &["Money"], " ").validate(ResourcePolicy::Strict));
    }

    #[test]
    fn rejects_negative_and_non_finite_amounts() {
        for amount in ["-1", "NaN", "inf", "-inf"] {
            assert_invalid_input(
                draft(&["A"], &["X"], &["Money"], amount).validate(ResourcePolicy::Strict),
            );
        }
    }

    #[test]
    fn accepts_zero_amount() {
        let transfer = draft(&["A"], &["X"], &["Money"], "0")
            .validate(ResourcePolicy::Strict)
            .unwrap();

        assert_eq!(transfer.amount, 0.0);
    }

    #[test]
    fn rejects_empty_name_lists() {
        assert_invalid_input(draft(&[], &["X"], &["Money"], "1").validate(ResourcePolicy::Strict));
        assert_invalid_input(draft(&[" , "], &["X"], &["Money"], "1").validate(ResourcePolicy::Strict));
        assert_invalid_input(draft(&["A"], &[], &["Money"], "1").validate(ResourcePolicy::Strict));
        assert_invalid_input(draft(&["A"], &["X"], &[], "1").validate(ResourcePolicy::Strict));
    }

    #[test]
    fn strict_policy_rejects_unknown_resource() {
        assert_invalid_input(
            draft(&["A"], &["X"], &["Money", "Gold"], "1").validate(ResourcePolicy::Strict),
        );
    }

    #[test]
    fn free_text_policy_accepts_any_resource() {
        let transfer = draft(&["A"], &["X"], &["gold bars"], "1")
            .validate(ResourcePolicy::FreeText)
            .unwrap();

        assert_eq!(transfer.resources, vec!["gold bars"]);
    }

    #[test]
    fn blank_note_becomes_none() {
        let mut draft = draft(&["A"], &["X"], &["Money"], "1");
        draft.note = Some("   ".to_owned());

        let transfer = draft.validate(ResourcePolicy::Strict).unwrap();

        assert_eq!(transfer.note, None);
    }

    #[test]
    fn resource_lookup_ignores_case() {
        assert_eq!(Resource::from_name("MUNITIONS"), Some(Resource::Munitions));
        assert_eq!(Resource::from_name("Gold"), None);
    }

    #[test]
    fn form_with_repeated_keys_deserializes() {
        let form = "giver=A%2C+B&receiver=X&resource=Money&resource=Steel&amount=10&note=";

        let draft: TransferDraft = serde_html_form::from_str(form).unwrap();

        assert_eq!(draft.giver, vec!["A, B"]);
        assert_eq!(draft.resource, vec!["Money", "Steel"]);
        assert_eq!(draft.amount, "10");
    }
}
