//! Unit tests for configuration resolution.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `defaults`: Resolution with only the required inputs
//! - `precedence`: Layer precedence tests
//! - `polling_timeout`: Top-level versus nested polling timeout
//! - `variables`: `variables` input nesting under `global`
//! - `validation`: Required, integer, and boolean input failures
//! - `config_file`: Config file discovery and parse failures

mod defaults;
mod helpers;
mod polling_timeout;
