//! Tests for resolution with only the required inputs set.

use rstest::rstest;
use serde_json::json;

use super::helpers::{REQUIRED, inputs, no_config_file, resolve_ok};
use crate::config::{
    DEFAULT_FILES_GLOB, DEFAULT_POLLING_TIMEOUT_MS, GlobalConfig, ResolvedConfig,
};

#[rstest]
#[tokio::test]
async fn resolves_to_defaults_plus_required_keys() {
    let config = resolve_ok(&inputs(&REQUIRED), &no_config_file()).await;

    let expected = ResolvedConfig {
        api_key: "test-api-key".to_owned(),
        app_key: "test-app-key".to_owned(),
        ..ResolvedConfig::default()
    };
    assert_eq!(config, expected);
}

#[rstest]
fn default_table_matches_documented_values() {
    let defaults = ResolvedConfig::default();

    assert!(defaults.api_key.is_empty());
    assert!(defaults.app_key.is_empty());
    assert_eq!(defaults.config_path, "datadog-ci.json");
    assert_eq!(defaults.datadog_site, "datadoghq.com");
    assert!(!defaults.fail_on_critical_errors);
    assert!(!defaults.fail_on_missing_tests);
    assert!(defaults.fail_on_timeout);
    assert_eq!(defaults.files, [DEFAULT_FILES_GLOB]);
    assert_eq!(defaults.global, GlobalConfig::default());
    assert_eq!(defaults.polling_timeout, 1_800_000);
    assert_eq!(DEFAULT_POLLING_TIMEOUT_MS, 1_800_000);
    assert!(defaults.public_ids.is_empty());
    assert_eq!(defaults.subdomain, "app");
    assert!(!defaults.tunnel);
    assert!(defaults.junit_report.is_none());
    assert!(defaults.test_search_query.is_none());
}

#[rstest]
fn serialises_with_camel_case_keys_and_omits_unset_fields() {
    let value = serde_json::to_value(ResolvedConfig::default()).expect("defaults serialise");

    assert_eq!(value["configPath"], json!("datadog-ci.json"));
    assert_eq!(value["pollingTimeout"], json!(1_800_000));
    assert_eq!(value["proxy"], json!({ "protocol": "http" }));
    assert_eq!(value["global"], json!({}));
    assert!(value.get("jUnitReport").is_none(), "unset report is omitted");
    assert!(value.get("testSearchQuery").is_none(), "unset query is omitted");
}
