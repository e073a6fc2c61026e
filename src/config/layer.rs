//! Field-by-field overlay of the configuration file onto the defaults.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::{GlobalConfig, ResolvedConfig, keys};
use crate::reporter::Reporter;

const STRING: &str = "a string";
const BOOLEAN: &str = "a boolean";
const STRING_LIST: &str = "a list of strings";
const INTEGER: &str = "an integer";

/// What happened to one file field.
enum Overlay {
    /// The value replaced the lower layer.
    Applied,
    /// `null` in a modelled field; the lower layer is kept.
    Absent,
    /// The value does not fit the modelled field, which expects the given
    /// kind of value.
    Untyped(&'static str),
    /// The key is not modelled.
    Unmodelled,
}

/// Overlays the file's top-level `fields` onto `config`.
///
/// Values the model cannot hold, and keys it does not know, land in
/// [`ResolvedConfig::extra`] under their own key.
pub(super) fn overlay_file_fields(
    config: &mut ResolvedConfig,
    fields: Map<String, Value>,
    reporter: &dyn Reporter,
) {
    for (key, value) in fields {
        match overlay_field(config, &key, &value, reporter) {
            Overlay::Applied => {
                config.extra.remove(&key);
            }
            Overlay::Absent => {}
            Overlay::Untyped(expected) => {
                report_untyped(reporter, &key, expected);
                config.extra.insert(key, value);
            }
            Overlay::Unmodelled => {
                config.extra.insert(key, value);
            }
        }
    }
}

fn overlay_field(
    config: &mut ResolvedConfig,
    key: &str,
    value: &Value,
    reporter: &dyn Reporter,
) -> Overlay {
    match key {
        keys::API_KEY => assign(&mut config.api_key, value, text, STRING),
        keys::APP_KEY => assign(&mut config.app_key, value, text, STRING),
        keys::CONFIG_PATH => assign(&mut config.config_path, value, text, STRING),
        keys::DATADOG_SITE => assign(&mut config.datadog_site, value, text, STRING),
        keys::SUBDOMAIN => assign(&mut config.subdomain, value, text, STRING),
        keys::JUNIT_REPORT => assign(&mut config.junit_report, value, some(text), STRING),
        keys::TEST_SEARCH_QUERY => {
            assign(&mut config.test_search_query, value, some(text), STRING)
        }
        keys::FAIL_ON_CRITICAL_ERRORS => {
            assign(&mut config.fail_on_critical_errors, value, Value::as_bool, BOOLEAN)
        }
        keys::FAIL_ON_MISSING_TESTS => {
            assign(&mut config.fail_on_missing_tests, value, Value::as_bool, BOOLEAN)
        }
        keys::FAIL_ON_TIMEOUT => assign(&mut config.fail_on_timeout, value, Value::as_bool, BOOLEAN),
        keys::TUNNEL => assign(&mut config.tunnel, value, Value::as_bool, BOOLEAN),
        keys::FILES => assign(&mut config.files, value, strings, STRING_LIST),
        keys::LOCATIONS => assign(&mut config.locations, value, strings, STRING_LIST),
        keys::PUBLIC_IDS => assign(&mut config.public_ids, value, strings, STRING_LIST),
        keys::POLLING_TIMEOUT => assign(&mut config.polling_timeout, value, integral, INTEGER),
        keys::GLOBAL => match value {
            Value::Null => Overlay::Absent,
            Value::Object(fields) => {
                config.global = global_config(fields, reporter);
                Overlay::Applied
            }
            _ => Overlay::Untyped("an object"),
        },
        _ => Overlay::Unmodelled,
    }
}

fn global_config(fields: &Map<String, Value>, reporter: &dyn Reporter) -> GlobalConfig {
    let mut global = GlobalConfig::default();

    for (key, value) in fields {
        let overlay = match key.as_str() {
            keys::POLLING_TIMEOUT => {
                assign(&mut global.polling_timeout, value, some(integral), INTEGER)
            }
            keys::VARIABLES => assign(
                &mut global.variables,
                value,
                some(string_map),
                "an object of string values",
            ),
            _ => Overlay::Unmodelled,
        };

        match overlay {
            Overlay::Applied | Overlay::Absent => {}
            Overlay::Untyped(expected) => {
                report_untyped(reporter, &format!("{}.{key}", keys::GLOBAL), expected);
                global.extra.insert(key.clone(), value.clone());
            }
            Overlay::Unmodelled => {
                global.extra.insert(key.clone(), value.clone());
            }
        }
    }
    global
}

fn assign<T>(
    field: &mut T,
    value: &Value,
    convert: impl FnOnce(&Value) -> Option<T>,
    expected: &'static str,
) -> Overlay {
    if value.is_null() {
        return Overlay::Absent;
    }
    convert(value).map_or(Overlay::Untyped(expected), |typed| {
        *field = typed;
        Overlay::Applied
    })
}

fn some<T>(convert: impl FnOnce(&Value) -> Option<T>) -> impl FnOnce(&Value) -> Option<Option<T>> {
    move |value| convert(value).map(Some)
}

fn text(value: &Value) -> Option<String> {
    value.as_str().map(ToOwned::to_owned)
}

fn strings(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(text)
        .collect()
}

fn string_map(value: &Value) -> Option<BTreeMap<String, String>> {
    value
        .as_object()?
        .iter()
        .map(|(key, entry)| text(entry).map(|entry| (key.clone(), entry)))
        .collect()
}

/// Reads a JSON number with no fractional part, such as `120000` or
/// `120000.0`, as an `i64`.
fn integral(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    number
        .as_i64()
        .or_else(|| number.as_f64().and_then(|float| float.to_string().parse().ok()))
}

fn report_untyped(reporter: &dyn Reporter, key: &str, expected: &str) {
    reporter.info(&format!(
        "Config file field '{key}' is not {expected}, passing it through unchanged"
    ));
}
