use std::{borrow::Cow, fmt};

use schemars::{
    r#gen::SchemaGenerator,
    schema::{InstanceType, Schema, SchemaObject},
    JsonSchema,
};
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Free-form key/value document passed through to the broker untouched (queue arguments,
/// consumer arguments, message properties...).
///
/// Nothing in admission looks inside it. The only processing happens when it is built:
///
/// - bytes that parse as JSON are stored in their compact encoding, so `{"key": "a-property"}`
///   and `{"key":"a-property"}` are the same document. Keys keep their order and numbers keep
///   their text;
/// - anything else is kept byte for byte, and fails later, when the document is serialized or
///   rendered into a [`ShovelDefinition`](crate::definition::ShovelDefinition).
///
/// Equality compares the stored bytes.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct OpaqueDocument(Vec<u8>);

impl OpaqueDocument {
    pub fn from_bytes<B: Into<Vec<u8>>>(raw: B) -> Self {
        let raw = raw.into();

        match serde_json::from_slice::<Value>(&raw) {
            Ok(value) => Self::from(value),
            Err(_) => Self(raw),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::from_slice(&self.0)
    }

    /// Reads the document as a JSON object, which is what the broker expects for every document
    /// field of a shovel.
    pub fn to_object(&self) -> serde_json::Result<Map<String, Value>> {
        serde_json::from_slice(&self.0)
    }
}

impl From<Value> for OpaqueDocument {
    fn from(value: Value) -> Self {
        OpaqueDocument(value.to_string().into_bytes())
    }
}

impl From<&str> for OpaqueDocument {
    fn from(raw: &str) -> Self {
        OpaqueDocument::from_bytes(raw)
    }
}

impl fmt::Debug for OpaqueDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OpaqueDocument")
            .field(&String::from_utf8_lossy(&self.0))
            .finish()
    }
}

impl Serialize for OpaqueDocument {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value()
            .map_err(|error| ser::Error::custom(format!("malformed document: {error}")))?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OpaqueDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        if value.is_null() {
            return Err(de::Error::invalid_type(de::Unexpected::Unit, &"a document"));
        }

        Ok(OpaqueDocument::from(value))
    }
}

impl JsonSchema for OpaqueDocument {
    fn is_referenceable() -> bool {
        false
    }

    fn schema_name() -> String {
        "OpaqueDocument".to_string()
    }

    fn schema_id() -> Cow<'static, str> {
        Cow::Borrowed(concat!(module_path!(), "::OpaqueDocument"))
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        Schema::Object(SchemaObject {
            instance_type: Some(InstanceType::Object.into()),
            // Contents are up to the broker, k8s must not prune unknown keys.
            extensions: [(
                "x-kubernetes-preserve-unknown-fields".to_string(),
                Value::Bool(true),
            )]
            .into_iter()
            .collect(),
            ..Default::default()
        })
    }
}
