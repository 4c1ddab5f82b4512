use tracing::debug;

use crate::crd::{DeletionPolicy, ShovelSpec};

/// Virtual host used when [`ShovelSpec::vhost`] is empty.
pub const DEFAULT_VHOST: &str = "/";

/// Fills in [`ShovelSpec::vhost`] and [`ShovelSpec::deletion_policy`] when they're not set.
///
/// Every other unset field is left for the broker to default.
pub fn default_spec(mut spec: ShovelSpec) -> ShovelSpec {
    if spec.vhost.is_empty() {
        debug!(shovel = %spec.name, vhost = DEFAULT_VHOST, "defaulting vhost");
        spec.vhost = DEFAULT_VHOST.to_owned();
    }

    if spec.deletion_policy.is_none() {
        let policy = DeletionPolicy::default();
        debug!(shovel = %spec.name, ?policy, "defaulting deletion policy");
        spec.deletion_policy = Some(policy.into());
    }

    spec
}

#[cfg(test)]
mod test {
    use super::default_spec;
    use crate::crd::{AckMode, Choice, DeletionPolicy, ShovelSpec};

    #[test]
    fn fills_vhost_and_deletion_policy() {
        let spec = default_spec(ShovelSpec::new("a-shovel", "some-cluster", "a-secret"));

        assert_eq!(spec.vhost, "/");
        assert_eq!(
            spec.deletion_policy,
            Some(Choice::Known(DeletionPolicy::Delete))
        );
    }

    #[test]
    fn keeps_explicit_values() {
        let spec = default_spec(ShovelSpec {
            vhost: "test-vhost".to_string(),
            deletion_policy: Some(DeletionPolicy::Retain.into()),
            ..ShovelSpec::new("a-shovel", "some-cluster", "a-secret")
        });

        assert_eq!(spec.vhost, "test-vhost");
        assert_eq!(
            spec.deletion_policy,
            Some(Choice::Known(DeletionPolicy::Retain))
        );
    }

    #[test]
    fn leaves_broker_defaults_alone() {
        let spec = default_spec(ShovelSpec::new("a-shovel", "some-cluster", "a-secret"));

        assert_eq!(spec.ack_mode, None::<Choice<AckMode>>);
        assert_eq!(spec.src_protocol, None);
        assert_eq!(spec.dest_protocol, None);
        assert_eq!(spec.prefetch_count, None);
    }

    #[test]
    fn unsupported_policy_is_not_overwritten() {
        let spec = default_spec(ShovelSpec {
            deletion_policy: Some(Choice::from("keep")),
            ..ShovelSpec::new("a-shovel", "some-cluster", "a-secret")
        });

        assert_eq!(spec.deletion_policy, Some(Choice::Unsupported("keep".to_string())));
    }

    #[test]
    fn idempotent() {
        let once = default_spec(ShovelSpec::new("a-shovel", "some-cluster", "a-secret"));
        assert_eq!(default_spec(once.clone()), once);
    }
}
