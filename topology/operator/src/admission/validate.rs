use super::error::{FieldError, FieldErrors, FieldPath};
use crate::crd::{Choice, ClosedSet, ShovelSpec};

/// Message of every rejected identity change.
pub const IDENTITY_CHANGE_FORBIDDEN: &str =
    "updates on name, vhost and rabbitmqClusterReference are all forbidden";

/// Accepts `spec` as is, or returns every rule it breaks, in rule order:
///
/// 1. `ackMode` is one of [`AckMode`](crate::crd::AckMode), when set;
/// 2. `srcProtocol` is one of [`Protocol`](crate::crd::Protocol), when set;
/// 3. `destProtocol` is one of [`Protocol`](crate::crd::Protocol), when set;
/// 4. `deletionPolicy` is one of [`DeletionPolicy`](crate::crd::DeletionPolicy), when set;
/// 5. `name` and `rabbitmqClusterReference.name` are not empty.
///
/// Opaque documents are not looked at.
pub fn validate(spec: ShovelSpec) -> Result<ShovelSpec, FieldErrors> {
    match FieldErrors::from_vec(field_errors(&spec)) {
        Some(errors) => Err(errors),
        None => Ok(spec),
    }
}

fn field_errors(spec: &ShovelSpec) -> Vec<FieldError> {
    let path = FieldPath::spec();

    [
        unsupported(path.child("ackMode"), spec.ack_mode.as_ref()),
        unsupported(path.child("srcProtocol"), spec.src_protocol.as_ref()),
        unsupported(path.child("destProtocol"), spec.dest_protocol.as_ref()),
        unsupported(path.child("deletionPolicy"), spec.deletion_policy.as_ref()),
        required(path.child("name"), &spec.name),
        required(
            path.child("rabbitmqClusterReference").child("name"),
            &spec.rabbitmq_cluster_reference.name,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn unsupported<T: ClosedSet>(path: FieldPath, value: Option<&Choice<T>>) -> Option<FieldError> {
    match value? {
        Choice::Known(_) => None,
        Choice::Unsupported(value) => Some(FieldError::NotSupported {
            path,
            value: value.clone(),
            supported: T::supported_values(),
        }),
    }
}

fn required(path: FieldPath, value: &str) -> Option<FieldError> {
    value.is_empty().then_some(FieldError::Required { path })
}

/// Rejects an update that would point the resource at a different shovel.
///
/// Both specs are expected to be defaulted already, otherwise an unset `vhost` would look like a
/// change to `/`.
pub fn validate_identity(old: &ShovelSpec, new: &ShovelSpec) -> Result<(), FieldError> {
    if old.same_identity(new) {
        return Ok(());
    }

    let path = FieldPath::spec();

    let changed = if old.name != new.name {
        path.child("name")
    } else if old.vhost != new.vhost {
        path.child("vhost")
    } else {
        path.child("rabbitmqClusterReference")
    };

    Err(FieldError::Forbidden {
        path: changed,
        detail: IDENTITY_CHANGE_FORBIDDEN.into(),
    })
}
