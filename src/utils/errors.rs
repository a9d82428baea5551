#![forbid(unsafe_code)]

use thiserror::Error;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Errors {
    /// Input parameter logging.
    #[error("edition_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Inaccessible logger configuration file.
    #[error("Unable to access the Log4rs configuration file: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    #[error("Unable to load the edition template: {}", .0)]
    TemplateLoad(String),

    // ------------------ Request errors ------------------
    // The display strings of these variants are returned verbatim
    // as the plain text body of 400 responses.
    #[error("Error: Invalid or missing lang parameter")]
    InvalidLang,

    #[error("Error: No name provided")]
    MissingName,

    #[error("Error: Invalid or missing local_delivery_time")]
    InvalidDeliveryTime,

    #[error("There is no config to validate.")]
    MissingConfig,

    #[error("The config could not be parsed as JSON.")]
    MalformedConfig,

    #[error("Error: Unable to render edition")]
    RenderEdition,
}
