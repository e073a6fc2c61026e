//! Shared test helpers for configuration tests.

use std::collections::BTreeMap;

use camino::Utf8Path;

use crate::config::{MockConfigFileSource, ResolvedConfig, resolve_config};
use crate::error::ResolveError;
use crate::inputs::input_variable_name;
use crate::reporter::test_support::RecordingReporter;

/// Both required inputs, for tests that exercise something else.
pub const REQUIRED: [(&str, &str); 2] = [("api_key", "test-api-key"), ("app_key", "test-app-key")];

/// Builds an input snapshot from `(input name, value)` pairs.
pub fn inputs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(name, value)| (input_variable_name(name), (*value).to_owned()))
        .collect()
}

/// Builds an input snapshot holding the required inputs plus `pairs`.
pub fn inputs_with_required(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    let mut snapshot = inputs(&REQUIRED);
    snapshot.extend(inputs(pairs));
    snapshot
}

/// Config file source that serves `contents` for `expected_path` only.
pub fn config_file(expected_path: &str, contents: Option<&str>) -> MockConfigFileSource {
    let expected = expected_path.to_owned();
    let served = contents.map(ToOwned::to_owned);

    let mut files = MockConfigFileSource::new();
    files
        .expect_read_config_file()
        .withf(move |path: &Utf8Path| path.as_str() == expected)
        .times(1)
        .returning(move |_| Ok(served.clone()));
    files
}

/// Config file source for the default path with no file present.
pub fn no_config_file() -> MockConfigFileSource {
    config_file("datadog-ci.json", None)
}

/// Resolves against `snapshot` and `files`, returning the reporter as well.
pub async fn resolve_with(
    snapshot: &BTreeMap<String, String>,
    files: &MockConfigFileSource,
) -> (Result<ResolvedConfig, ResolveError>, RecordingReporter) {
    let reporter = RecordingReporter::default();
    let result = resolve_config(&reporter, snapshot, files).await;
    (result, reporter)
}

/// Resolves and expects success.
pub async fn resolve_ok(
    snapshot: &BTreeMap<String, String>,
    files: &MockConfigFileSource,
) -> ResolvedConfig {
    let (result, _reporter) = resolve_with(snapshot, files).await;
    result.expect("resolution should succeed")
}
