//! Layered resolution of [`ResolvedConfig`].

use camino::Utf8Path;
use serde_json::{Map, Value};

use super::file::ConfigFileSource;
use super::layer::overlay_file_fields;
use super::variables::parse_variables;
use super::{ResolvedConfig, keys};
use crate::error::ResolveError;
use crate::inputs::{InputSource, StepInputs, names};
use crate::reporter::Reporter;

/// Resolves the run configuration from defaults, the configuration file, and
/// the step inputs.
///
/// Layers are applied in order: defaults, then the file's top-level fields
/// (shallow), then the step inputs. A `null` file field leaves the default in
/// place; a file value the model cannot hold is carried through as is until
/// an input replaces it. `configPath` always reports the path that was read. The `variables` input is merged into
/// `global.variables` only when it yields at least one pair.
///
/// The polling timeout does not follow the generic precedence. The top-level
/// `pollingTimeout` is the `polling_timeout` input, else the file's
/// `global.pollingTimeout`, else the merged top-level value. The nested
/// `global.pollingTimeout` is left exactly as the file set it, because the
/// orchestration client falls back to the top-level value when the nested
/// one is absent.
///
/// # Errors
///
/// - [`ResolveError::ConfigFileRead`] when the configuration file exists but
///   cannot be read.
/// - [`ResolveError::ConfigFileParse`] when the file is not valid JSON or is
///   not a JSON object.
/// - [`ResolveError::MissingRequiredInput`] when `api_key` or `app_key` is
///   empty after merging.
/// - [`ResolveError::InvalidBooleanInput`] or
///   [`ResolveError::InvalidIntegerInput`] when a typed input is malformed.
pub async fn resolve_config(
    reporter: &dyn Reporter,
    source: &dyn InputSource,
    files: &dyn ConfigFileSource,
) -> Result<ResolvedConfig, ResolveError> {
    let inputs = StepInputs::new(source);
    let defaults = ResolvedConfig::default();

    let config_path = inputs
        .defined_input(names::CONFIG_PATH)
        .unwrap_or_else(|| defaults.config_path.clone());

    let mut config = merge_config_file(defaults, &config_path, reporter, files).await?;
    override_field(&mut config.extra, keys::CONFIG_PATH, &mut config.config_path, config_path);

    apply_required_inputs(&mut config, &inputs)?;
    apply_optional_inputs(&mut config, &inputs);
    apply_typed_inputs(&mut config, &inputs)?;
    let polling_timeout = inputs.defined_integer(names::POLLING_TIMEOUT)?;

    if let Some(entries) = inputs.defined_list(names::VARIABLES) {
        merge_variables(&mut config, &entries, reporter);
    }
    apply_polling_timeout(&mut config, polling_timeout);

    tracing::debug!(
        config_path = %config.config_path,
        datadog_site = %config.datadog_site,
        polling_timeout = config.polling_timeout,
        "resolved synthetics configuration"
    );
    Ok(config)
}

async fn merge_config_file(
    defaults: ResolvedConfig,
    config_path: &str,
    reporter: &dyn Reporter,
    files: &dyn ConfigFileSource,
) -> Result<ResolvedConfig, ResolveError> {
    let Some(contents) = files.read_config_file(Utf8Path::new(config_path)).await? else {
        reporter.info(&format!(
            "No config file found at '{config_path}', continuing with defaults"
        ));
        return Ok(defaults);
    };

    let fields = parse_file_contents(&contents, config_path).inspect_err(|_| {
        reporter.error(&format!(
            "Unable to parse config file! Please verify config path: {config_path}"
        ));
    })?;

    let mut config = defaults;
    overlay_file_fields(&mut config, fields, reporter);
    Ok(config)
}

fn parse_file_contents(contents: &str, config_path: &str) -> Result<Map<String, Value>, ResolveError> {
    let parse_error = |message: String| ResolveError::ConfigFileParse {
        path: config_path.to_owned(),
        message,
    };

    match serde_json::from_str::<Value>(contents) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(parse_error("expected a JSON object".to_owned())),
        Err(error) => Err(parse_error(error.to_string())),
    }
}

/// Replaces `field` with an input value, dropping any file value carried
/// through under the same key.
fn override_field<T>(extra: &mut Map<String, Value>, key: &str, field: &mut T, value: T) {
    *field = value;
    extra.remove(key);
}

fn apply_required_inputs(
    config: &mut ResolvedConfig,
    inputs: &StepInputs<'_>,
) -> Result<(), ResolveError> {
    for (name, key, field) in [
        (names::API_KEY, keys::API_KEY, &mut config.api_key),
        (names::APP_KEY, keys::APP_KEY, &mut config.app_key),
    ] {
        if let Some(value) = inputs.defined_input(name) {
            override_field(&mut config.extra, key, field, value);
        }
        if field.trim().is_empty() {
            return Err(ResolveError::MissingRequiredInput {
                name: name.to_owned(),
            });
        }
    }
    Ok(())
}

fn apply_optional_inputs(config: &mut ResolvedConfig, inputs: &StepInputs<'_>) {
    let extra = &mut config.extra;

    if let Some(subdomain) = inputs.defined_input(names::SUBDOMAIN) {
        override_field(extra, keys::SUBDOMAIN, &mut config.subdomain, subdomain);
    }
    if let Some(site) = inputs.defined_input(names::DATADOG_SITE) {
        override_field(extra, keys::DATADOG_SITE, &mut config.datadog_site, site);
    }
    if let Some(glob) = inputs.defined_input(names::FILES) {
        override_field(extra, keys::FILES, &mut config.files, vec![glob]);
    }
    if let Some(public_ids) = inputs
        .defined_list(names::PUBLIC_IDS)
        .filter(|ids| !ids.is_empty())
    {
        override_field(extra, keys::PUBLIC_IDS, &mut config.public_ids, public_ids);
    }
    if let Some(query) = inputs.defined_input(names::TEST_SEARCH_QUERY) {
        override_field(extra, keys::TEST_SEARCH_QUERY, &mut config.test_search_query, Some(query));
    }
    if let Some(report) = inputs.defined_input(names::JUNIT_REPORT) {
        override_field(extra, keys::JUNIT_REPORT, &mut config.junit_report, Some(report));
    }
}

fn apply_typed_inputs(
    config: &mut ResolvedConfig,
    inputs: &StepInputs<'_>,
) -> Result<(), ResolveError> {
    for (name, key, field) in [
        (
            names::FAIL_ON_CRITICAL_ERRORS,
            keys::FAIL_ON_CRITICAL_ERRORS,
            &mut config.fail_on_critical_errors,
        ),
        (
            names::FAIL_ON_MISSING_TESTS,
            keys::FAIL_ON_MISSING_TESTS,
            &mut config.fail_on_missing_tests,
        ),
        (names::FAIL_ON_TIMEOUT, keys::FAIL_ON_TIMEOUT, &mut config.fail_on_timeout),
        (names::TUNNEL, keys::TUNNEL, &mut config.tunnel),
    ] {
        if let Some(value) = inputs.defined_boolean(name)? {
            override_field(&mut config.extra, key, field, value);
        }
    }
    Ok(())
}

fn merge_variables(config: &mut ResolvedConfig, entries: &[String], reporter: &dyn Reporter) {
    let parsed = parse_variables(entries, reporter);
    if parsed.is_empty() {
        return;
    }

    // Typed variables only reach the output once nothing shadows them.
    config.extra.remove(keys::GLOBAL);
    config.global.extra.remove(keys::VARIABLES);
    config.global.variables.get_or_insert_with(Default::default).extend(parsed);
}

fn apply_polling_timeout(config: &mut ResolvedConfig, input: Option<i64>) {
    if let Some(timeout) = input.or(config.global.polling_timeout) {
        override_field(&mut config.extra, keys::POLLING_TIMEOUT, &mut config.polling_timeout, timeout);
    }
}
