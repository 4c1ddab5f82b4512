//! Multi-document YAML manifests, as fed to `kubectl apply -f`.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_yaml::Value;
use topology_operator::crd::ShovelCrd;
use tracing::warn;

use crate::error::{CliError, CliResult};

/// A `Shovel` document of a manifest, `index` counting from 0 over every document of the file.
#[derive(Debug)]
pub(crate) struct ShovelDocument {
    pub index: usize,
    pub shovel: Result<ShovelCrd, serde_yaml::Error>,
}

pub(crate) fn read_manifest(path: &Path) -> CliResult<Vec<ShovelDocument>> {
    let contents = fs::read_to_string(path).map_err(|fail| CliError::ManifestRead {
        path: path.to_path_buf(),
        source: fail,
    })?;

    parse_manifest(&contents)
}

/// Splits `contents` into its `Shovel` documents.
///
/// Empty documents are dropped, and so are documents of any other kind, with a warning. A
/// `Shovel` document that doesn't fit [`ShovelCrd`] is kept, with its error.
pub(crate) fn parse_manifest(contents: &str) -> CliResult<Vec<ShovelDocument>> {
    let mut documents = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(contents).enumerate() {
        let value = Value::deserialize(document).map_err(CliError::ManifestParse)?;

        if value.is_null() {
            continue;
        }

        match value.get("kind").and_then(Value::as_str) {
            Some("Shovel") => documents.push(ShovelDocument {
                index,
                shovel: serde_yaml::from_value(value),
            }),
            kind => warn!(index, ?kind, "skipping document"),
        }
    }

    Ok(documents)
}

/// Every parsed shovel, or the first document that failed to parse.
pub(crate) fn into_shovels(documents: Vec<ShovelDocument>) -> CliResult<Vec<ShovelCrd>> {
    documents
        .into_iter()
        .map(|ShovelDocument { index, shovel }| {
            shovel.map_err(|fail| CliError::ShovelParse {
                index,
                source: fail,
            })
        })
        .collect()
}
