//! Tests for the top-level versus nested polling timeout rule.

use rstest::rstest;
use serde_json::json;

use super::helpers::{REQUIRED, config_file, inputs, inputs_with_required, no_config_file, resolve_ok};

#[rstest]
#[tokio::test]
async fn unset_input_uses_default_and_leaves_nested_unset() {
    let config = resolve_ok(&inputs(&REQUIRED), &no_config_file()).await;

    assert_eq!(config.polling_timeout, 1_800_000);
    assert_eq!(config.global.polling_timeout, None);
}

#[rstest]
#[tokio::test]
async fn input_sets_top_level_only() {
    let config = resolve_ok(&inputs_with_required(&[("polling_timeout", "1")]), &no_config_file()).await;

    assert_eq!(config.polling_timeout, 1);
    assert_eq!(config.global.polling_timeout, None);

    let serialised = serde_json::to_value(&config).expect("config serialises");
    assert!(
        serialised["global"].get("pollingTimeout").is_none(),
        "nested timeout must not be written"
    );
}

#[rstest]
#[case::file_top_level(r#"{"pollingTimeout": 60000}"#, 60_000, None)]
#[case::file_nested(r#"{"global": {"pollingTimeout": 90000}}"#, 90_000, Some(90_000))]
#[case::nested_beats_top_level(
    r#"{"pollingTimeout": 60000, "global": {"pollingTimeout": 90000}}"#,
    90_000,
    Some(90_000)
)]
#[tokio::test]
async fn file_values_feed_top_level_when_input_unset(
    #[case] contents: &str,
    #[case] top_level: i64,
    #[case] nested: Option<i64>,
) {
    let config = resolve_ok(&inputs(&REQUIRED), &config_file("datadog-ci.json", Some(contents))).await;

    assert_eq!(config.polling_timeout, top_level);
    assert_eq!(config.global.polling_timeout, nested);
}

#[rstest]
#[tokio::test]
async fn input_beats_file_nested_value_without_touching_it() {
    let files = config_file("datadog-ci.json", Some(r#"{"global": {"pollingTimeout": 90000}}"#));

    let config = resolve_ok(&inputs_with_required(&[("polling_timeout", "5000")]), &files).await;

    assert_eq!(config.polling_timeout, 5_000);
    assert_eq!(config.global.polling_timeout, Some(90_000));
    assert_eq!(
        serde_json::to_value(&config.global).expect("global serialises"),
        json!({ "pollingTimeout": 90_000 })
    );
}
