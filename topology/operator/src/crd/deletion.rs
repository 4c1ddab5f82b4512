use serde::Serialize;

use super::{
    choice::{Choice, ClosedSet},
    shovel::ShovelCrd,
};

/// Finalizer put on a [`ShovelCrd`] while its shovel still has to be removed from the broker.
pub const DELETION_FINALIZER: &str = "deletion.finalizers.shovels.rabbitmq.com";

/// What happens to the shovel on the broker when the owning resource is deleted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum DeletionPolicy {
    /// Remove the shovel from the broker before the resource goes away.
    #[default]
    Delete,

    /// Leave the shovel running on the broker.
    Retain,
}

impl ClosedSet for DeletionPolicy {
    const NAME: &'static str = "DeletionPolicy";
    const MEMBERS: &'static [Self] = &[DeletionPolicy::Delete, DeletionPolicy::Retain];

    fn as_str(&self) -> &'static str {
        match self {
            DeletionPolicy::Delete => "delete",
            DeletionPolicy::Retain => "retain",
        }
    }
}

/// Instruction for the reconciler once the owning resource has been marked for deletion.
///
/// Decided once, at teardown, from [`ShovelSpec::deletion_policy`](super::ShovelSpec).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Teardown {
    /// Delete the shovel from the broker, then drop [`DELETION_FINALIZER`].
    RemoveFromBroker,

    /// Drop [`DELETION_FINALIZER`] right away and leave the broker alone.
    Retain,
}

impl Teardown {
    /// Only an explicit `retain` keeps the shovel on the broker.
    ///
    /// Unset, `delete` and values that never went through admission all remove it.
    pub fn from_policy(policy: Option<&Choice<DeletionPolicy>>) -> Self {
        match policy.and_then(Choice::known) {
            Some(DeletionPolicy::Retain) => Teardown::Retain,
            Some(DeletionPolicy::Delete) | None => Teardown::RemoveFromBroker,
        }
    }

    /// Whether [`DELETION_FINALIZER`] has to stay on the resource until the broker was cleaned up.
    pub fn holds_finalizer(self) -> bool {
        matches!(self, Teardown::RemoveFromBroker)
    }
}

impl ShovelCrd {
    #[tracing::instrument(level = "debug", skip(self), fields(shovel = ?self.metadata.name), ret)]
    pub fn teardown(&self) -> Teardown {
        Teardown::from_policy(self.spec.deletion_policy.as_ref())
    }
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::{DeletionPolicy, Teardown};
    use crate::crd::{Choice, ShovelCrd, ShovelSpec};

    #[rstest]
    #[case::unset(None, Teardown::RemoveFromBroker)]
    #[case::delete(Some(Choice::Known(DeletionPolicy::Delete)), Teardown::RemoveFromBroker)]
    #[case::retain(Some(Choice::Known(DeletionPolicy::Retain)), Teardown::Retain)]
    #[case::unsupported(Some(Choice::Unsupported("keep".to_string())), Teardown::RemoveFromBroker)]
    fn teardown_follows_policy(
        #[case] policy: Option<Choice<DeletionPolicy>>,
        #[case] expected: Teardown,
    ) {
        let shovel = ShovelCrd::new(
            "a-shovel",
            ShovelSpec {
                deletion_policy: policy,
                ..ShovelSpec::new("a-shovel", "some-cluster", "a-secret")
            },
        );

        assert_eq!(shovel.teardown(), expected);
        assert_eq!(
            shovel.teardown().holds_finalizer(),
            expected == Teardown::RemoveFromBroker
        );
    }

    #[test]
    fn default_policy_is_delete() {
        assert_eq!(DeletionPolicy::default(), DeletionPolicy::Delete);
    }

    #[test]
    fn teardown_wire_names() {
        assert_eq!(
            serde_json::to_string(&Teardown::RemoveFromBroker).unwrap(),
            r#""remove-from-broker""#
        );
        assert_eq!(
            serde_json::to_string(&Teardown::Retain).unwrap(),
            r#""retain""#
        );
    }
}
