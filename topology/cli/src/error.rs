use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;
use topology_operator::{admission::AdmissionError, definition::DefinitionError};

pub(crate) type CliResult<T, E = CliError> = core::result::Result<T, E>;

#[derive(Debug, Error, Diagnostic)]
pub(crate) enum CliError {
    #[error("failed to read manifest `{path}`: {source}")]
    #[diagnostic(help("Check that the file exists and is readable."))]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("manifest is not valid YAML: {0}")]
    #[diagnostic(help("Every document of the manifest has to be a YAML mapping."))]
    ManifestParse(#[source] serde_yaml::Error),

    #[error("document {index} of the manifest is not a Shovel: {source}")]
    #[diagnostic(help("Run `topology verify` on the manifest to see every malformed document."))]
    ShovelParse {
        index: usize,
        source: serde_yaml::Error,
    },

    #[error("failed to read config `{path}`: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config `{path}` is invalid: {source}")]
    #[diagnostic(help("The only supported key is `errorReporting`, either `first` or `all`."))]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    #[diagnostic(help("Fix the listed fields, or run `topology verify` for a full report."))]
    Admission(#[from] AdmissionError),

    #[error(transparent)]
    #[diagnostic(help(
        "Opaque documents have to be JSON objects, and both URI lists need at least one entry."
    ))]
    Definition(#[from] DefinitionError),

    #[error("{failed} of {total} shovels were rejected")]
    #[diagnostic(help("See the `Fail` entries of the report on stdout."))]
    VerificationFailed { failed: usize, total: usize },

    #[error("failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}
