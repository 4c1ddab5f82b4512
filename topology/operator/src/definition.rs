//! Parameter document of a shovel, as the broker's management API expects it under
//! `/api/parameters/shovel/{vhost}/{name}`.
//!
//! This is the last step before the broker: opaque documents are finally read as JSON objects
//! here, and a malformed one fails the rendering.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::crd::{Choice, ClosedSet, OpaqueDocument, ShovelSpec};

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("`{field}` is not a valid JSON object: {source}")]
    Document {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no `{0}` provided")]
    MissingUri(&'static str),
}

pub type DefinitionResult<T, E = DefinitionError> = Result<T, E>;

/// Source and destination URIs of a shovel, resolved from its
/// [`uri_secret`](ShovelSpec::uri_secret).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShovelUris {
    pub source: Vec<String>,
    pub destination: Vec<String>,
}

impl ShovelUris {
    /// Splits the comma separated lists stored under the secret's `srcUri` and `destUri` keys.
    pub fn parse(source: &str, destination: &str) -> DefinitionResult<Self> {
        let split = |uris: &str, key| {
            let uris = uris
                .split(',')
                .map(str::trim)
                .filter(|uri| !uri.is_empty())
                .map(ToOwned::to_owned)
                .collect::<Vec<_>>();

            if uris.is_empty() {
                Err(DefinitionError::MissingUri(key))
            } else {
                Ok(uris)
            }
        };

        Ok(ShovelUris {
            source: split(source, "srcUri")?,
            destination: split(destination, "destUri")?,
        })
    }
}

/// Broker-side definition of a shovel.
///
/// Unset and empty fields are left out, so the broker applies its own defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShovelDefinition {
    pub src_uri: Vec<String>,
    pub dest_uri: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_forward_headers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_after: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefetch_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconnect_delay: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_exchange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_exchange_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_queue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_delete_after: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_prefetch_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_queue_args: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_consumer_args: Option<Map<String, Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_exchange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_exchange_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_queue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_queue_args: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_add_forward_headers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_add_timestamp_header: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_application_properties: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_message_annotations: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_properties: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_publish_properties: Option<Map<String, Value>>,
}

/// Body of the management API request, the definition wrapped under `value`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShovelParameter {
    pub value: ShovelDefinition,
}

impl ShovelDefinition {
    /// `spec` is expected to have been admitted, values outside of their closed sets are passed
    /// along verbatim and left for the broker to reject.
    #[tracing::instrument(level = "debug", skip_all, fields(shovel = %spec.name), err)]
    pub fn new(spec: &ShovelSpec, uris: &ShovelUris) -> DefinitionResult<Self> {
        Ok(ShovelDefinition {
            src_uri: uris.source.clone(),
            dest_uri: uris.destination.clone(),

            ack_mode: choice(spec.ack_mode.as_ref()),
            add_forward_headers: spec.add_forward_headers,
            delete_after: delete_after(spec.delete_after.as_deref()),
            prefetch_count: spec.prefetch_count,
            reconnect_delay: spec.reconnect_delay,

            src_protocol: choice(spec.src_protocol.as_ref()),
            src_address: non_empty(spec.src_address.as_deref()),
            src_exchange: non_empty(spec.src_exchange.as_deref()),
            src_exchange_key: non_empty(spec.src_exchange_key.as_deref()),
            src_queue: non_empty(spec.src_queue.as_deref()),
            src_delete_after: delete_after(spec.src_delete_after.as_deref()),
            src_prefetch_count: spec.src_prefetch_count,
            src_queue_args: object("srcQueueArgs", spec.src_queue_args.as_ref())?,
            src_consumer_args: object("srcConsumerArgs", spec.src_consumer_args.as_ref())?,

            dest_protocol: choice(spec.dest_protocol.as_ref()),
            dest_address: non_empty(spec.dest_address.as_deref()),
            dest_exchange: non_empty(spec.dest_exchange.as_deref()),
            dest_exchange_key: non_empty(spec.dest_exchange_key.as_deref()),
            dest_queue: non_empty(spec.dest_queue.as_deref()),
            dest_queue_args: object("destQueueArgs", spec.dest_queue_args.as_ref())?,
            dest_add_forward_headers: spec.dest_add_forward_headers,
            dest_add_timestamp_header: spec.dest_add_timestamp_header,
            dest_application_properties: object(
                "destApplicationProperties",
                spec.dest_application_properties.as_ref(),
            )?,
            dest_message_annotations: object(
                "destMessageAnnotations",
                spec.dest_message_annotations.as_ref(),
            )?,
            dest_properties: object("destProperties", spec.dest_properties.as_ref())?,
            dest_publish_properties: object(
                "destPublishProperties",
                spec.dest_publish_properties.as_ref(),
            )?,
        })
    }

    pub fn into_parameter(self) -> ShovelParameter {
        ShovelParameter { value: self }
    }
}

fn choice<T: ClosedSet>(value: Option<&Choice<T>>) -> Option<String> {
    value.map(|value| value.as_str().to_owned())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|value| !value.is_empty()).map(ToOwned::to_owned)
}

/// Numbers of messages go out as JSON numbers, `never` and `queue-length` as strings.
fn delete_after(value: Option<&str>) -> Option<Value> {
    let value = value.filter(|value| !value.is_empty())?;

    Some(
        value
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(value)),
    )
}

fn object(
    field: &'static str,
    document: Option<&OpaqueDocument>,
) -> DefinitionResult<Option<Map<String, Value>>> {
    document
        .map(|document| {
            document
                .to_object()
                .map_err(|source| DefinitionError::Document { field, source })
        })
        .transpose()
}
