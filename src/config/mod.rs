//! Run configuration handed to the Synthetic test orchestration client.
//!
//! This module owns the configuration schema, its built-in defaults, and the
//! resolver that layers the project configuration file and the step inputs
//! over those defaults.
//!
//! # Precedence
//!
//! Configuration values are merged field by field with the following
//! precedence (lowest to highest):
//!
//! 1. **Defaults** – [`ResolvedConfig::default`]
//! 2. **Configuration file** – `datadog-ci.json` in the working directory,
//!    or the path given by the `config_path` input
//! 3. **Step inputs** – `INPUT_API_KEY`, `INPUT_FILES`, and friends
//!
//! The polling timeout is the one exception; see [`resolve_config`].
//!
//! # Configuration File
//!
//! ```json
//! {
//!   "apiKey": "<api key>",
//!   "files": ["e2e/**/*.synthetics.json"],
//!   "global": {
//!     "pollingTimeout": 120000,
//!     "variables": { "START_URL": "https://staging.example.com" }
//!   }
//! }
//! ```
//!
//! The file is only required to be a JSON object. `null` in a field this
//! module models counts as absent, and a value of a type the model cannot
//! hold is passed through to the orchestration client unchanged.

mod file;
mod layer;
mod resolve;
mod variables;

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};

pub use file::{ConfigFileSource, WorkspaceConfigFiles};
pub use resolve::resolve_config;
pub use variables::parse_variables;

#[cfg(test)]
pub use file::MockConfigFileSource;

/// Default location of the project configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "datadog-ci.json";

/// Default Datadog site.
pub const DEFAULT_DATADOG_SITE: &str = "datadoghq.com";

/// Default glob used to discover test definition files.
pub const DEFAULT_FILES_GLOB: &str = "{,!(node_modules)/**/}*.synthetics.json";

/// Default time to wait for results, in milliseconds (30 minutes).
pub const DEFAULT_POLLING_TIMEOUT_MS: i64 = 30 * 60 * 1000;

/// Default custom subdomain of the Datadog organisation.
pub const DEFAULT_SUBDOMAIN: &str = "app";

/// Serialised key names shared by the file format and the output.
pub(crate) mod keys {
    pub const API_KEY: &str = "apiKey";
    pub const APP_KEY: &str = "appKey";
    pub const CONFIG_PATH: &str = "configPath";
    pub const DATADOG_SITE: &str = "datadogSite";
    pub const FAIL_ON_CRITICAL_ERRORS: &str = "failOnCriticalErrors";
    pub const FAIL_ON_MISSING_TESTS: &str = "failOnMissingTests";
    pub const FAIL_ON_TIMEOUT: &str = "failOnTimeout";
    pub const FILES: &str = "files";
    pub const GLOBAL: &str = "global";
    pub const JUNIT_REPORT: &str = "jUnitReport";
    pub const LOCATIONS: &str = "locations";
    pub const POLLING_TIMEOUT: &str = "pollingTimeout";
    pub const PUBLIC_IDS: &str = "publicIds";
    pub const SUBDOMAIN: &str = "subdomain";
    pub const TEST_SEARCH_QUERY: &str = "testSearchQuery";
    pub const TUNNEL: &str = "tunnel";
    pub const VARIABLES: &str = "variables";
}

/// Fully merged configuration consumed by the orchestration client.
///
/// Serialises with the camelCase keys the client and the configuration file
/// use. Keys that this crate does not model are kept in [`Self::extra`] and
/// passed through untouched. A file value that a modelled field cannot hold
/// is also kept there, and takes the place of that field when serialised.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    /// Datadog API key. Never empty once resolved.
    pub api_key: String,
    /// Datadog application key. Never empty once resolved.
    pub app_key: String,
    /// Path of the configuration file that was consulted.
    pub config_path: String,
    /// Datadog site the tests are triggered on (e.g. `datadoghq.eu`).
    pub datadog_site: String,
    /// Fail the run when tests cannot be triggered or results fetched.
    pub fail_on_critical_errors: bool,
    /// Fail the run when a requested public ID does not exist.
    pub fail_on_missing_tests: bool,
    /// Fail the run when results are not available within the timeout.
    pub fail_on_timeout: bool,
    /// Globs locating test definition files.
    pub files: Vec<String>,
    /// Overrides applied to every triggered test.
    pub global: GlobalConfig,
    /// Path of the `JUnit` report to write, if any.
    #[serde(rename = "jUnitReport", default)]
    pub junit_report: Option<String>,
    /// Locations override for triggered tests.
    pub locations: Vec<String>,
    /// Time to wait for results, in milliseconds.
    pub polling_timeout: i64,
    /// Public IDs of the tests to trigger.
    pub public_ids: Vec<String>,
    /// Custom subdomain of the Datadog organisation.
    pub subdomain: String,
    /// Search query selecting the tests to trigger.
    #[serde(default)]
    pub test_search_query: Option<String>,
    /// Run the tests through the testing tunnel.
    pub tunnel: bool,
    /// Unmodelled keys carried through from the defaults and the file.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Overrides applied to every triggered test (`global` in the file).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    /// Per-test polling timeout. Only ever populated by the file.
    #[serde(default)]
    pub polling_timeout: Option<i64>,
    /// Variables injected into every test.
    #[serde(default)]
    pub variables: Option<BTreeMap<String, String>>,
    /// Unmodelled override keys carried through from the file.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let mut extra = Map::new();
        extra.insert("proxy".to_owned(), json!({ "protocol": "http" }));

        Self {
            api_key: String::new(),
            app_key: String::new(),
            config_path: DEFAULT_CONFIG_PATH.to_owned(),
            datadog_site: DEFAULT_DATADOG_SITE.to_owned(),
            fail_on_critical_errors: false,
            fail_on_missing_tests: false,
            fail_on_timeout: true,
            files: vec![DEFAULT_FILES_GLOB.to_owned()],
            global: GlobalConfig::default(),
            junit_report: None,
            locations: Vec::new(),
            polling_timeout: DEFAULT_POLLING_TIMEOUT_MS,
            public_ids: Vec::new(),
            subdomain: DEFAULT_SUBDOMAIN.to_owned(),
            test_search_query: None,
            tunnel: false,
            extra,
        }
    }
}

impl Serialize for ResolvedConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        let mut typed = TypedEntries {
            map: &mut map,
            passthrough: &self.extra,
        };
        typed.entry(keys::API_KEY, &self.api_key)?;
        typed.entry(keys::APP_KEY, &self.app_key)?;
        typed.entry(keys::CONFIG_PATH, &self.config_path)?;
        typed.entry(keys::DATADOG_SITE, &self.datadog_site)?;
        typed.entry(keys::FAIL_ON_CRITICAL_ERRORS, &self.fail_on_critical_errors)?;
        typed.entry(keys::FAIL_ON_MISSING_TESTS, &self.fail_on_missing_tests)?;
        typed.entry(keys::FAIL_ON_TIMEOUT, &self.fail_on_timeout)?;
        typed.entry(keys::FILES, &self.files)?;
        typed.entry(keys::GLOBAL, &self.global)?;
        typed.optional(keys::JUNIT_REPORT, self.junit_report.as_ref())?;
        typed.entry(keys::LOCATIONS, &self.locations)?;
        typed.entry(keys::POLLING_TIMEOUT, &self.polling_timeout)?;
        typed.entry(keys::PUBLIC_IDS, &self.public_ids)?;
        typed.entry(keys::SUBDOMAIN, &self.subdomain)?;
        typed.optional(keys::TEST_SEARCH_QUERY, self.test_search_query.as_ref())?;
        typed.entry(keys::TUNNEL, &self.tunnel)?;

        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for GlobalConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        let mut typed = TypedEntries {
            map: &mut map,
            passthrough: &self.extra,
        };
        typed.optional(keys::POLLING_TIMEOUT, self.polling_timeout.as_ref())?;
        typed.optional(keys::VARIABLES, self.variables.as_ref())?;

        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Writes typed fields, skipping any key shadowed by a passthrough value.
struct TypedEntries<'a, M> {
    map: &'a mut M,
    passthrough: &'a Map<String, Value>,
}

impl<M: SerializeMap> TypedEntries<'_, M> {
    fn entry<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), M::Error> {
        if self.passthrough.contains_key(key) {
            return Ok(());
        }
        self.map.serialize_entry(key, value)
    }

    fn optional<T: Serialize>(&mut self, key: &str, value: Option<&T>) -> Result<(), M::Error> {
        value.map_or(Ok(()), |present| self.entry(key, present))
    }
}

#[cfg(test)]
mod tests;
