//! Error types surfaced while resolving the step configuration.

use thiserror::Error;

/// Errors that abort configuration resolution.
///
/// Resolution either produces a complete [`crate::ResolvedConfig`] or fails
/// with one of these; no partially merged configuration is ever returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// A required input was unset or blank after every layer was merged.
    #[error("Input required and not supplied: {name}")]
    MissingRequiredInput {
        /// Input name as declared by the step (e.g. `api_key`).
        name: String,
    },

    /// An integer-typed input held something other than an integer.
    #[error("{name} is not an integer: `{value}`")]
    InvalidIntegerInput {
        /// Input name as declared by the step.
        name: String,
        /// Raw value read from the environment.
        value: String,
    },

    /// A boolean-typed input held an unrecognised literal.
    #[error(
        "Input does not meet YAML 1.2 \"Core Schema\" specification: {name} (got `{value}`)\n\
         Support boolean input list: `true | false | yes | no | on | off | 1 | 0` \
         (case-insensitive)"
    )]
    InvalidBooleanInput {
        /// Input name as declared by the step.
        name: String,
        /// Raw value read from the environment.
        value: String,
    },

    /// The configuration file exists but is not a usable JSON object.
    #[error("failed to parse config file '{path}': {message}")]
    ConfigFileParse {
        /// Path of the configuration file.
        path: String,
        /// Parser error detail.
        message: String,
    },

    /// The configuration file exists but could not be read.
    #[error("failed to read config file '{path}': {message}")]
    ConfigFileRead {
        /// Path of the configuration file.
        path: String,
        /// I/O error detail.
        message: String,
    },
}
