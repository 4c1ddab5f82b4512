use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod choice;
pub mod deletion;
pub mod document;
pub mod shovel;

pub use self::{
    choice::{Choice, ClosedSet},
    deletion::{DeletionPolicy, Teardown, DELETION_FINALIZER},
    document::OpaqueDocument,
    shovel::{AckMode, Protocol, ShovelCrd, ShovelSpec},
};

/// Points at the `RabbitmqCluster` the shovel is created in.
///
/// Owned by whoever created the resource, nothing in this crate rewrites it.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct RabbitmqClusterReference {
    /// Name of the `RabbitmqCluster`.
    #[serde(default)]
    pub name: String,

    /// Namespace of the `RabbitmqCluster`.
    ///
    /// When left out, the cluster is looked up in the namespace of the referencing resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl RabbitmqClusterReference {
    pub fn new<N: Into<String>>(name: N) -> Self {
        RabbitmqClusterReference {
            name: name.into(),
            namespace: None,
        }
    }
}

/// Reference to a `Secret` living in the same namespace as the referencing resource.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    pub name: String,
}

impl SecretReference {
    pub fn new<N: Into<String>>(name: N) -> Self {
        SecretReference { name: name.into() }
    }
}
