use std::{fs, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use topology_operator::admission::{AdmissionConfig, ErrorReporting};

use crate::error::{CliError, CliResult};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(super) struct Cli {
    /// Log filter, in `RUST_LOG` syntax. `RUST_LOG` itself is used when left out.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub commands: Commands,
}

#[derive(Subcommand, Debug)]
pub(super) enum Commands {
    /// Run every `Shovel` of a manifest through admission and report the outcome as JSON.
    Verify(Box<VerifyArgs>),

    /// Print the broker parameter document of every `Shovel` of a manifest.
    Definition(Box<DefinitionArgs>),
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub(super) enum LogFormat {
    Text,
    Json,
}

/// [`ErrorReporting`] on the command line.
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub(super) enum ErrorReportingArg {
    /// Report the first broken rule only.
    First,
    /// Report every broken rule.
    All,
}

impl From<ErrorReportingArg> for ErrorReporting {
    fn from(arg: ErrorReportingArg) -> Self {
        match arg {
            ErrorReportingArg::First => ErrorReporting::First,
            ErrorReportingArg::All => ErrorReporting::All,
        }
    }
}

#[derive(Args, Debug)]
pub(super) struct AdmissionArgs {
    /// YAML or JSON file with the admission config, e.g. `errorReporting: all`.
    #[arg(short = 'f', long = "config", value_hint = ValueHint::FilePath)]
    pub config_file: Option<PathBuf>,

    /// Overrides `errorReporting` of `--config`.
    #[arg(long, value_enum)]
    pub error_reporting: Option<ErrorReportingArg>,
}

impl AdmissionArgs {
    /// Loads `--config` (or the defaults), then applies the flags on top of it.
    pub fn admission_config(&self) -> CliResult<AdmissionConfig> {
        let mut config = match &self.config_file {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|fail| CliError::ConfigRead {
                    path: path.clone(),
                    source: fail,
                })?;

                serde_yaml::from_str(&contents).map_err(|fail| CliError::ConfigParse {
                    path: path.clone(),
                    source: fail,
                })?
            }
            None => AdmissionConfig::default(),
        };

        if let Some(error_reporting) = self.error_reporting {
            config.error_reporting = error_reporting.into();
        }

        Ok(config)
    }
}

#[derive(Args, Debug)]
pub(super) struct VerifyArgs {
    #[command(flatten)]
    pub admission: AdmissionArgs,

    /// Manifest with one or more YAML documents.
    #[arg(value_hint = ValueHint::FilePath)]
    pub manifest: PathBuf,
}

#[derive(Args, Debug)]
pub(super) struct DefinitionArgs {
    #[command(flatten)]
    pub admission: AdmissionArgs,

    /// Comma separated source URIs, as stored under `srcUri` of the shovel's URI secret.
    #[arg(long, env = "SHOVEL_SRC_URI")]
    pub src_uri: String,

    /// Comma separated destination URIs, as stored under `destUri` of the shovel's URI secret.
    #[arg(long, env = "SHOVEL_DEST_URI")]
    pub dest_uri: String,

    /// Manifest with one or more YAML documents.
    #[arg(value_hint = ValueHint::FilePath)]
    pub manifest: PathBuf,
}
