//! Step inputs read from the invoking pipeline environment.
//!
//! The CI host exposes every declared step input as an environment variable
//! named `INPUT_<NAME>`, where `<NAME>` is the input name upper-cased with
//! spaces replaced by underscores. Values are always strings; this module
//! re-types them at the boundary so that nothing past the resolver handles
//! untyped input.
//!
//! Environment access goes through [`InputSource`] so resolution can run
//! against a fixed snapshot in tests instead of the live process
//! environment.

use std::collections::BTreeMap;
use std::env;

use crate::error::ResolveError;

/// Prefix the CI host adds to every step input variable.
pub const INPUT_PREFIX: &str = "INPUT_";

/// Names of the inputs the step declares.
pub mod names {
    /// Datadog API key (required).
    pub const API_KEY: &str = "api_key";
    /// Datadog application key (required).
    pub const APP_KEY: &str = "app_key";
    /// Path of the project configuration file.
    pub const CONFIG_PATH: &str = "config_path";
    /// Datadog site.
    pub const DATADOG_SITE: &str = "datadog_site";
    /// Fail on critical errors.
    pub const FAIL_ON_CRITICAL_ERRORS: &str = "fail_on_critical_errors";
    /// Fail when requested tests are missing.
    pub const FAIL_ON_MISSING_TESTS: &str = "fail_on_missing_tests";
    /// Fail when results time out.
    pub const FAIL_ON_TIMEOUT: &str = "fail_on_timeout";
    /// Glob locating test definition files.
    pub const FILES: &str = "files";
    /// `JUnit` report path.
    pub const JUNIT_REPORT: &str = "junit_report";
    /// Polling timeout in milliseconds.
    pub const POLLING_TIMEOUT: &str = "polling_timeout";
    /// Comma-separated public IDs.
    pub const PUBLIC_IDS: &str = "public_ids";
    /// Organisation subdomain.
    pub const SUBDOMAIN: &str = "subdomain";
    /// Test search query.
    pub const TEST_SEARCH_QUERY: &str = "test_search_query";
    /// Testing tunnel toggle.
    pub const TUNNEL: &str = "tunnel";
    /// Comma-separated `KEY=value` variables.
    pub const VARIABLES: &str = "variables";
}

const TRUE_LITERALS: [&str; 4] = ["true", "yes", "on", "1"];
const FALSE_LITERALS: [&str; 4] = ["false", "no", "off", "0"];

/// Read-only key/value lookup over the environment the step runs in.
pub trait InputSource: Send + Sync {
    /// Returns the raw value stored under `key`, if any.
    fn lookup(&self, key: &str) -> Option<String>;
}

/// [`InputSource`] backed by the live process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl ProcessEnvironment {
    /// Copies every `INPUT_`-prefixed variable into an owned snapshot.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    #[must_use]
    pub fn snapshot() -> BTreeMap<String, String> {
        env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .filter(|(key, _)| key.starts_with(INPUT_PREFIX))
            .collect()
    }
}

impl InputSource for ProcessEnvironment {
    fn lookup(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl InputSource for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Returns the environment variable name that carries input `name`.
///
/// # Example
///
/// ```
/// use synthetics_step::inputs::input_variable_name;
///
/// assert_eq!(input_variable_name("api_key"), "INPUT_API_KEY");
/// assert_eq!(input_variable_name("test search query"), "INPUT_TEST_SEARCH_QUERY");
/// ```
#[must_use]
pub fn input_variable_name(name: &str) -> String {
    format!("{INPUT_PREFIX}{}", name.replace(' ', "_").to_uppercase())
}

/// Typed accessors over the step inputs exposed by an [`InputSource`].
#[derive(Clone, Copy)]
pub struct StepInputs<'a> {
    source: &'a dyn InputSource,
}

impl<'a> StepInputs<'a> {
    /// Wraps an input source.
    #[must_use]
    pub const fn new(source: &'a dyn InputSource) -> Self {
        Self { source }
    }

    /// Returns the trimmed value of input `name`, or `None` when it is unset
    /// or blank.
    #[must_use]
    pub fn defined_input(&self, name: &str) -> Option<String> {
        self.source
            .lookup(&input_variable_name(name))
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    /// Parses input `name` as an integer.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidIntegerInput`] when the input is set but
    /// is not an integer (for example `1.2`).
    pub fn defined_integer(&self, name: &str) -> Result<Option<i64>, ResolveError> {
        self.defined_input(name)
            .map(|raw| {
                raw.parse::<i64>()
                    .map_err(|_| ResolveError::InvalidIntegerInput {
                        name: name.to_owned(),
                        value: raw.clone(),
                    })
            })
            .transpose()
    }

    /// Parses input `name` as a boolean literal.
    ///
    /// Accepts `true`, `yes`, `on`, `1` and `false`, `no`, `off`, `0` in any
    /// letter case.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidBooleanInput`] when the input is set to
    /// anything else.
    pub fn defined_boolean(&self, name: &str) -> Result<Option<bool>, ResolveError> {
        self.defined_input(name)
            .map(|raw| {
                parse_boolean_literal(&raw).ok_or_else(|| ResolveError::InvalidBooleanInput {
                    name: name.to_owned(),
                    value: raw.clone(),
                })
            })
            .transpose()
    }

    /// Splits a comma-separated input into trimmed, non-empty entries.
    #[must_use]
    pub fn defined_list(&self, name: &str) -> Option<Vec<String>> {
        self.defined_input(name).map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
    }
}

fn parse_boolean_literal(raw: &str) -> Option<bool> {
    let lowered = raw.to_ascii_lowercase();
    if TRUE_LITERALS.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSE_LITERALS.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}
