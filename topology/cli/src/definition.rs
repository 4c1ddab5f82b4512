use serde::Serialize;
use topology_operator::{
    admission::ShovelAdmission,
    crd::ShovelCrd,
    definition::{ShovelDefinition, ShovelParameter, ShovelUris},
};

use crate::{
    config::DefinitionArgs,
    error::CliResult,
    manifest::{into_shovels, read_manifest},
};

/// A shovel ready to be `PUT` under `/api/parameters/shovel/{vhost}/{name}`.
#[derive(Debug, Serialize)]
struct RenderedShovel {
    vhost: String,
    name: String,
    #[serde(flatten)]
    parameter: ShovelParameter,
}

/// `topology definition --src-uri {uris} --dest-uri {uris} {manifest}`
///
/// Admits every `Shovel` of the manifest and prints the parameter documents, stopping at the first
/// shovel that can't be rendered.
pub(super) fn definition(
    DefinitionArgs {
        admission,
        src_uri,
        dest_uri,
        manifest,
    }: DefinitionArgs,
) -> CliResult<()> {
    let admission = ShovelAdmission::new(admission.admission_config()?);
    let uris = ShovelUris::parse(&src_uri, &dest_uri)?;

    let rendered = render(&admission, &uris, into_shovels(read_manifest(&manifest)?)?)?;
    println!("{}", serde_json::to_string_pretty(&rendered)?);

    Ok(())
}

fn render(
    admission: &ShovelAdmission,
    uris: &ShovelUris,
    shovels: Vec<ShovelCrd>,
) -> CliResult<Vec<RenderedShovel>> {
    shovels
        .into_iter()
        .map(|shovel| -> CliResult<RenderedShovel> {
            let shovel = admission.create(shovel)?;
            let parameter = ShovelDefinition::new(&shovel.spec, uris)?.into_parameter();

            Ok(RenderedShovel {
                vhost: shovel.spec.vhost,
                name: shovel.spec.name,
                parameter,
            })
        })
        .collect()
}
