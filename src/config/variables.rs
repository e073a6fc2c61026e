//! Parsing for the `variables` step input.

use std::collections::BTreeMap;

use crate::reporter::Reporter;

/// Parses `KEY=value` entries into a variable mapping.
///
/// Entries are split on the first `=`, so values may themselves contain `=`.
/// Keys are trimmed and later duplicates overwrite earlier ones. Entries
/// without `=` or with an empty key are skipped and reported.
///
/// # Example
///
/// ```
/// use synthetics_step::config::parse_variables;
/// use synthetics_step::reporter::NoopReporter;
///
/// let entries = vec!["A=1".to_owned(), "B=two words".to_owned()];
/// let variables = parse_variables(&entries, &NoopReporter);
///
/// assert_eq!(variables.get("A").map(String::as_str), Some("1"));
/// assert_eq!(variables.get("B").map(String::as_str), Some("two words"));
/// ```
#[must_use]
pub fn parse_variables(entries: &[String], reporter: &dyn Reporter) -> BTreeMap<String, String> {
    let mut variables = BTreeMap::new();

    for entry in entries {
        let Some((key, value)) = entry.split_once('=') else {
            reporter.info(&format!("Ignoring variable without '=': {entry}"));
            continue;
        };

        let trimmed_key = key.trim();
        if trimmed_key.is_empty() {
            reporter.info(&format!("Ignoring variable with empty name: {entry}"));
            continue;
        }

        variables.insert(trimmed_key.to_owned(), value.to_owned());
    }

    variables
}
