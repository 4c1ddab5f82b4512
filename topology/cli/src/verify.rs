//! `topology verify [--config {file}] [--error-reporting first|all] {manifest}` runs every `Shovel`
//! of a manifest through create admission, without a cluster.
use serde::Serialize;
use topology_operator::{
    admission::ShovelAdmission,
    crd::{ShovelCrd, Teardown},
};
use tracing::info;

use crate::{
    config::VerifyArgs,
    error::{CliError, CliResult},
    manifest::{read_manifest, ShovelDocument},
};

/// Outcome of admitting one document of the manifest.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
enum VerifiedShovel {
    /// The resource would be accepted, as it is stored after defaulting.
    Success {
        /// Position of the document in the manifest.
        document: usize,
        shovel: ShovelCrd,
        /// What happens on the broker once the resource is deleted.
        teardown: Teardown,
    },

    /// The resource would be rejected.
    ///
    /// Either it doesn't parse as a `Shovel`, or admission refused it.
    Fail {
        document: usize,
        name: Option<String>,
        errors: Vec<String>,
    },
}

impl VerifiedShovel {
    fn is_fail(&self) -> bool {
        matches!(self, VerifiedShovel::Fail { .. })
    }
}

/// Verifies the manifest at `manifest`, printing one report entry per `Shovel` document.
///
/// ## Usage
///
/// ```sh
/// topology verify ./shovels.yaml
///
///
/// [
///   {
///     "type": "Success",
///     "document": 0,
///     "shovel": {
///       "apiVersion": "rabbitmq.com/v1beta1",
///       "kind": "Shovel",
///       "metadata": { "name": "test-shovel" },
///       "spec": {
///         "name": "test-shovel",
///         "vhost": "/",
///         "rabbitmqClusterReference": { "name": "some-cluster" },
///         "deletionPolicy": "delete"
///       }
///     },
///     "teardown": "remove-from-broker"
///   },
///   {
///     "type": "Fail",
///     "document": 1,
///     "name": "an-invalid-ackmode",
///     "errors": [
///       "spec.ackMode: Unsupported value: \"sometimes\": supported values: \"on-confirm\", \"on-publish\", \"no-ack\""
///     ]
///   }
/// ]
/// ```
pub(super) fn verify(VerifyArgs { admission, manifest }: VerifyArgs) -> CliResult<()> {
    let admission = ShovelAdmission::new(admission.admission_config()?);

    let report = verify_documents(&admission, read_manifest(&manifest)?);
    println!("{}", serde_json::to_string_pretty(&report)?);

    let failed = report.iter().filter(|verified| verified.is_fail()).count();
    info!(failed, total = report.len(), "verified manifest");

    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::VerificationFailed {
            failed,
            total: report.len(),
        })
    }
}

fn verify_documents(
    admission: &ShovelAdmission,
    documents: Vec<ShovelDocument>,
) -> Vec<VerifiedShovel> {
    documents
        .into_iter()
        .map(|ShovelDocument { index, shovel }| match shovel {
            Ok(shovel) => {
                let name = shovel.metadata.name.clone();

                match admission.create(shovel) {
                    Ok(shovel) => VerifiedShovel::Success {
                        document: index,
                        teardown: shovel.teardown(),
                        shovel,
                    },
                    Err(fail) => VerifiedShovel::Fail {
                        document: index,
                        name,
                        errors: fail
                            .field_errors()
                            .iter()
                            .map(ToString::to_string)
                            .collect(),
                    },
                }
            }
            Err(fail) => VerifiedShovel::Fail {
                document: index,
                name: None,
                errors: vec![fail.to_string()],
            },
        })
        .collect()
}
