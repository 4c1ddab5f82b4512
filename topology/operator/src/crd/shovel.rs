use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{
    choice::{self, Choice, ClosedSet},
    deletion::DeletionPolicy,
    document::OpaqueDocument,
    RabbitmqClusterReference, SecretReference,
};

/// Acknowledgement mode used by the shovel while moving messages.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AckMode {
    /// Messages are acknowledged at the source once the destination confirms them.
    OnConfirm,
    /// Messages are acknowledged at the source once they are published to the destination.
    OnPublish,
    /// Messages are acknowledged at the source as soon as they are consumed.
    NoAck,
}

impl ClosedSet for AckMode {
    const NAME: &'static str = "AckMode";
    const MEMBERS: &'static [Self] = &[AckMode::OnConfirm, AckMode::OnPublish, AckMode::NoAck];

    fn as_str(&self) -> &'static str {
        match self {
            AckMode::OnConfirm => "on-confirm",
            AckMode::OnPublish => "on-publish",
            AckMode::NoAck => "no-ack",
        }
    }
}

/// Protocol spoken to a shovel endpoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Protocol {
    Amqp091,
    Amqp10,
}

impl ClosedSet for Protocol {
    const NAME: &'static str = "Protocol";
    const MEMBERS: &'static [Self] = &[Protocol::Amqp091, Protocol::Amqp10];

    fn as_str(&self) -> &'static str {
        match self {
            Protocol::Amqp091 => "amqp091",
            Protocol::Amqp10 => "amqp10",
        }
    }
}

/// A link that moves messages from a source endpoint to a destination endpoint.
///
/// Everything besides [`ShovelSpec::name`], [`ShovelSpec::vhost`] and
/// [`ShovelSpec::rabbitmq_cluster_reference`] is passed to the broker as is. Those three identify
/// the shovel on the broker, and can't be changed once the resource exists (see
/// [`ShovelAdmission::update`](crate::admission::ShovelAdmission::update)).
///
/// Unset fields are left out of the broker definition, so the broker's own defaults apply.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, Eq, PartialEq)]
#[kube(
    group = "rabbitmq.com",
    version = "v1beta1",
    kind = "Shovel",
    root = "ShovelCrd",
    namespaced,
    derive = "PartialEq",
    printcolumn = r#"{"name":"SHOVEL", "type":"string", "description":"Name of the shovel on the broker.", "jsonPath":".spec.name"}"#,
    printcolumn = r#"{"name":"VHOST", "type":"string", "description":"Virtual host of the shovel.", "jsonPath":".spec.vhost"}"#,
    printcolumn = r#"{"name":"CLUSTER", "type":"string", "description":"Referenced RabbitmqCluster.", "jsonPath":".spec.rabbitmqClusterReference.name"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ShovelSpec {
    /// Name of the shovel on the broker.
    ///
    /// Required, a missing name is rejected by admission rather than by parsing.
    #[serde(default)]
    pub name: String,

    /// Virtual host the shovel is created in, `/` when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vhost: String,

    /// Cluster the shovel is created in, required like [`ShovelSpec::name`].
    #[serde(default)]
    pub rabbitmq_cluster_reference: RabbitmqClusterReference,

    /// Secret holding the source and destination URIs, under the `srcUri` and `destUri` keys.
    ///
    /// Each key may hold a comma separated list of URIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_secret: Option<SecretReference>,

    /// What happens to the shovel on the broker when this resource is deleted.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "choice::deserialize_optional"
    )]
    pub deletion_policy: Option<Choice<DeletionPolicy>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "choice::deserialize_optional"
    )]
    pub ack_mode: Option<Choice<AckMode>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_forward_headers: Option<bool>,

    /// When the shovel deletes itself: `never`, `queue-length` or a number of messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_after: Option<String>,

    /// Seconds to wait before reconnecting after the shovel loses a connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect_delay: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefetch_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_prefetch_count: Option<u32>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "choice::deserialize_optional"
    )]
    pub src_protocol: Option<Choice<Protocol>>,

    /// AMQP 1.0 source address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_exchange: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_exchange_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_queue: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_delete_after: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_queue_args: Option<OpaqueDocument>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_consumer_args: Option<OpaqueDocument>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "choice::deserialize_optional"
    )]
    pub dest_protocol: Option<Choice<Protocol>>,

    /// AMQP 1.0 destination address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_exchange: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_exchange_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_queue: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_queue_args: Option<OpaqueDocument>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_add_forward_headers: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_add_timestamp_header: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_application_properties: Option<OpaqueDocument>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_message_annotations: Option<OpaqueDocument>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_properties: Option<OpaqueDocument>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_publish_properties: Option<OpaqueDocument>,
}

impl ShovelSpec {
    /// Minimal spec: the broker-side name, the cluster and the secret with the URIs.
    pub fn new<N, C, S>(name: N, cluster: C, uri_secret: S) -> Self
    where
        N: Into<String>,
        C: Into<String>,
        S: Into<String>,
    {
        ShovelSpec {
            name: name.into(),
            rabbitmq_cluster_reference: RabbitmqClusterReference::new(cluster),
            uri_secret: Some(SecretReference::new(uri_secret)),
            ..Default::default()
        }
    }

    /// `true` when both specs point at the same shovel on the same broker.
    pub fn same_identity(&self, other: &ShovelSpec) -> bool {
        self.name == other.name
            && self.vhost == other.vhost
            && self.rabbitmq_cluster_reference == other.rabbitmq_cluster_reference
    }
}

impl ShovelCrd {
    /// Namespace in which the referenced `RabbitmqCluster` lives.
    pub fn cluster_namespace(&self) -> Option<&str> {
        self.spec
            .rabbitmq_cluster_reference
            .namespace
            .as_deref()
            .or(self.metadata.namespace.as_deref())
    }
}

#[cfg(test)]
mod test {
    use kube::{CustomResourceExt, Resource};

    use super::{AckMode, Protocol, ShovelCrd, ShovelSpec};
    use crate::crd::{Choice, DeletionPolicy, OpaqueDocument, RabbitmqClusterReference};

    const CONFIGURED: &str = r#"
apiVersion: rabbitmq.com/v1beta1
kind: Shovel
metadata:
  name: test-shovel-configurations
  namespace: default
spec:
  name: test-shovel-configurations
  vhost: test-vhost
  rabbitmqClusterReference:
    name: some-cluster
  uriSecret:
    name: a-secret
  ackMode: no-ack
  addForwardHeaders: true
  deleteAfter: never
  destAddForwardHeaders: true
  destAddTimestampHeader: true
  destAddress: myQueue
  destApplicationProperties: {"key": "a-property"}
  destExchange: an-exchange
  destExchangeKey: a-key
  destProtocol: amqp091
  destQueue: a-queue
  destQueueArgs:
    x-queue-type: quorum
  prefetchCount: 10
  reconnectDelay: 10
  srcAddress: myQueue
  srcDeleteAfter: never
  srcExchange: an-exchange
  srcExchangeKey: a-key
  srcPrefetchCount: 10
  srcProtocol: amqp10
  srcQueue: a-queue
  srcConsumerArgs: {"arg": "arg-value"}
"#;

    #[test]
    fn reads_wire_names() {
        let shovel: ShovelCrd = serde_yaml::from_str(CONFIGURED).unwrap();
        let spec = &shovel.spec;

        assert_eq!(spec.name, "test-shovel-configurations");
        assert_eq!(spec.vhost, "test-vhost");
        assert_eq!(spec.rabbitmq_cluster_reference.name, "some-cluster");
        assert_eq!(spec.uri_secret.as_ref().unwrap().name, "a-secret");
        assert_eq!(spec.ack_mode, Some(Choice::Known(AckMode::NoAck)));
        assert_eq!(spec.add_forward_headers, Some(true));
        assert_eq!(spec.delete_after.as_deref(), Some("never"));
        assert_eq!(spec.dest_add_forward_headers, Some(true));
        assert_eq!(spec.dest_add_timestamp_header, Some(true));
        assert_eq!(spec.dest_protocol, Some(Choice::Known(Protocol::Amqp091)));
        assert_eq!(spec.src_protocol, Some(Choice::Known(Protocol::Amqp10)));
        assert_eq!(spec.prefetch_count, Some(10));
        assert_eq!(spec.reconnect_delay, Some(10));
        assert_eq!(spec.src_prefetch_count, Some(10));
        assert_eq!(
            spec.dest_queue_args,
            Some(OpaqueDocument::from(r#"{"x-queue-type":"quorum"}"#))
        );
        assert_eq!(
            spec.src_consumer_args.as_ref().unwrap().as_bytes(),
            br#"{"arg":"arg-value"}"#
        );
        assert_eq!(spec.deletion_policy, None);
        assert_eq!(spec.src_queue_args, None);
    }

    #[test]
    fn writes_wire_names() {
        let spec = ShovelSpec {
            deletion_policy: Some(DeletionPolicy::Retain.into()),
            src_protocol: Some(Protocol::Amqp091.into()),
            src_queue_args: Some(OpaqueDocument::from(r#"{"x-queue-type": "quorum"}"#)),
            dest_add_timestamp_header: Some(false),
            ..ShovelSpec::new("a-shovel", "some-cluster", "a-secret")
        };

        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            serde_json::json!({
                "name": "a-shovel",
                "rabbitmqClusterReference": { "name": "some-cluster" },
                "uriSecret": { "name": "a-secret" },
                "deletionPolicy": "retain",
                "srcProtocol": "amqp091",
                "srcQueueArgs": { "x-queue-type": "quorum" },
                "destAddTimestampHeader": false,
            })
        );
    }

    #[test]
    fn missing_identity_fields_parse_as_empty() {
        let spec: ShovelSpec = serde_yaml::from_str("vhost: test-vhost\n").unwrap();

        assert_eq!(spec.name, "");
        assert_eq!(spec.rabbitmq_cluster_reference, RabbitmqClusterReference::default());
    }

    #[test]
    fn negative_counts_do_not_parse() {
        let parsed = serde_json::from_value::<ShovelSpec>(serde_json::json!({
            "name": "a-shovel",
            "rabbitmqClusterReference": { "name": "some-cluster" },
            "prefetchCount": -1,
        }));

        assert!(parsed.is_err());
    }

    #[test]
    fn resource_identity() {
        assert_eq!(ShovelCrd::kind(&()), "Shovel");
        assert_eq!(ShovelCrd::group(&()), "rabbitmq.com");
        assert_eq!(ShovelCrd::version(&()), "v1beta1");
        assert_eq!(ShovelCrd::plural(&()), "shovels");
    }

    #[test]
    fn crd_schema_carries_enumerations() {
        let crd = serde_json::to_value(ShovelCrd::crd()).unwrap();
        let spec = &crd["spec"]["versions"][0]["schema"]["openAPIV3Schema"]["properties"]["spec"];

        assert_eq!(
            spec["properties"]["ackMode"]["enum"],
            serde_json::json!(["on-confirm", "on-publish", "no-ack", ""])
        );
        assert_eq!(
            spec["properties"]["destProtocol"]["enum"],
            serde_json::json!(["amqp091", "amqp10", ""])
        );
        assert_eq!(
            spec["properties"]["deletionPolicy"]["enum"],
            serde_json::json!(["delete", "retain", ""])
        );
        assert_eq!(
            spec["properties"]["srcQueueArgs"]["x-kubernetes-preserve-unknown-fields"],
            serde_json::json!(true)
        );
    }

    #[test]
    fn cluster_namespace_falls_back_to_resource_namespace() {
        let mut shovel = ShovelCrd::new(
            "a-shovel",
            ShovelSpec::new("a-shovel", "some-cluster", "a-secret"),
        );
        shovel.metadata.namespace = Some("default".to_string());
        assert_eq!(shovel.cluster_namespace(), Some("default"));

        shovel.spec.rabbitmq_cluster_reference = RabbitmqClusterReference {
            name: "some-cluster".to_string(),
            namespace: Some("rabbitmq-system".to_string()),
        };
        assert_eq!(shovel.cluster_namespace(), Some("rabbitmq-system"));
    }

    #[test]
    fn identity_ignores_tuning_fields() {
        let spec = ShovelSpec::new("a-shovel", "some-cluster", "a-secret");
        let tuned = ShovelSpec {
            prefetch_count: Some(100),
            ..spec.clone()
        };
        let moved = ShovelSpec {
            vhost: "other".to_string(),
            ..spec.clone()
        };

        assert!(spec.same_identity(&tuned));
        assert!(!spec.same_identity(&moved));
    }
}
