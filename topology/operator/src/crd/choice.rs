use std::{borrow::Cow, fmt};

use schemars::{
    r#gen::SchemaGenerator,
    schema::{InstanceType, Schema, SchemaObject},
    JsonSchema,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An enumeration that only accepts a fixed list of values on the wire.
///
/// Implementors map every variant to its wire name with an exhaustive `match`, and list all of
/// them in [`ClosedSet::MEMBERS`], in the order in which they are reported back to the user when
/// some other value is rejected.
pub trait ClosedSet: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Name of the generated OpenAPI schema.
    const NAME: &'static str;

    /// Every variant, in the order they're listed in rejection messages.
    const MEMBERS: &'static [Self];

    /// Wire name of this variant.
    fn as_str(&self) -> &'static str;

    fn from_wire(value: &str) -> Option<Self> {
        Self::MEMBERS
            .iter()
            .copied()
            .find(|member| member.as_str() == value)
    }

    /// Wire names of [`ClosedSet::MEMBERS`].
    fn supported_values() -> Vec<&'static str> {
        Self::MEMBERS.iter().map(|member| member.as_str()).collect()
    }
}

/// Value of a spec field backed by a [`ClosedSet`].
///
/// Deserialization never fails on a value outside of the set, it produces
/// [`Choice::Unsupported`] instead. This lets the value reach admission, which rejects it with a
/// message naming the field and the accepted values (a plain `serde` error would only say that
/// the document could not be parsed).
///
/// You should not need to `match` on this outside of admission, [`Choice::known`] is what the
/// rest of the code wants.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Choice<T> {
    /// One of [`ClosedSet::MEMBERS`].
    Known(T),

    /// Anything else, kept verbatim.
    Unsupported(String),
}

impl<T: ClosedSet> Choice<T> {
    pub fn known(&self) -> Option<T> {
        match self {
            Choice::Known(member) => Some(*member),
            Choice::Unsupported(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Choice::Known(member) => member.as_str(),
            Choice::Unsupported(value) => value,
        }
    }
}

impl<T: ClosedSet> From<T> for Choice<T> {
    fn from(member: T) -> Self {
        Choice::Known(member)
    }
}

impl<T: ClosedSet> From<String> for Choice<T> {
    fn from(value: String) -> Self {
        match T::from_wire(&value) {
            Some(member) => Choice::Known(member),
            None => Choice::Unsupported(value),
        }
    }
}

impl<T: ClosedSet> From<&str> for Choice<T> {
    fn from(value: &str) -> Self {
        T::from_wire(value)
            .map(Choice::Known)
            .unwrap_or_else(|| Choice::Unsupported(value.to_owned()))
    }
}

impl<T: ClosedSet> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T: ClosedSet> Serialize for Choice<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, T: ClosedSet> Deserialize<'de> for Choice<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Choice::from)
    }
}

impl<T: ClosedSet> JsonSchema for Choice<T> {
    fn is_referenceable() -> bool {
        false
    }

    fn schema_name() -> String {
        T::NAME.to_string()
    }

    fn schema_id() -> Cow<'static, str> {
        Cow::Borrowed(T::NAME)
    }

    /// Lists [`ClosedSet::MEMBERS`] plus `""`, which [`deserialize_optional`] reads as unset.
    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        Schema::Object(SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            enum_values: Some(
                T::MEMBERS
                    .iter()
                    .map(|member| member.as_str())
                    .chain([""])
                    .map(serde_json::Value::from)
                    .collect(),
            ),
            ..Default::default()
        })
    }
}

/// `deserialize_with` for optional [`Choice`] fields.
///
/// Clients that don't omit empty strings send `""` for an unset enumeration, which is read back
/// as `None` rather than as an unsupported value.
pub fn deserialize_optional<'de, D, T>(deserializer: D) -> Result<Option<Choice<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: ClosedSet,
{
    let value = Option::<String>::deserialize(deserializer)?;

    Ok(value.filter(|value| !value.is_empty()).map(Choice::from))
}

#[cfg(test)]
mod test {
    use rstest::rstest;
    use serde::Deserialize;

    use super::{Choice, ClosedSet};
    use crate::crd::{AckMode, DeletionPolicy, Protocol};

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "super::deserialize_optional")]
        protocol: Option<Choice<Protocol>>,
    }

    #[rstest]
    #[case::known("amqp10", Choice::Known(Protocol::Amqp10))]
    #[case::unsupported("stomp", Choice::Unsupported("stomp".to_string()))]
    #[case::case_sensitive("AMQP091", Choice::Unsupported("AMQP091".to_string()))]
    fn parses_wire_value(#[case] wire: &str, #[case] expected: Choice<Protocol>) {
        assert_eq!(Choice::<Protocol>::from(wire), expected);
    }

    #[rstest]
    #[case::missing("{}", None)]
    #[case::null(r#"{"protocol": null}"#, None)]
    #[case::empty(r#"{"protocol": ""}"#, None)]
    #[case::set(r#"{"protocol": "amqp091"}"#, Some(Choice::Known(Protocol::Amqp091)))]
    #[case::unsupported(r#"{"protocol": "mqtt"}"#, Some(Choice::Unsupported("mqtt".to_string())))]
    fn empty_string_is_unset(#[case] json: &str, #[case] expected: Option<Choice<Protocol>>) {
        let holder: Holder = serde_json::from_str(json).unwrap();
        assert_eq!(holder.protocol, expected);
    }

    #[test]
    fn unsupported_value_serializes_verbatim() {
        let choice = Choice::<AckMode>::from("an-invalid-ackmode");
        assert_eq!(
            serde_json::to_string(&choice).unwrap(),
            r#""an-invalid-ackmode""#
        );
        assert_eq!(choice.known(), None);
    }

    #[test]
    fn supported_values_keep_declaration_order() {
        assert_eq!(
            AckMode::supported_values(),
            ["on-confirm", "on-publish", "no-ack"]
        );
        assert_eq!(Protocol::supported_values(), ["amqp091", "amqp10"]);
        assert_eq!(DeletionPolicy::supported_values(), ["delete", "retain"]);
    }

    #[test]
    fn schema_lists_members_and_empty_string() {
        let schema = schemars::schema_for!(Choice<AckMode>);
        let json = serde_json::to_value(&schema).unwrap();

        assert_eq!(json["type"], "string");
        assert_eq!(
            json["enum"],
            serde_json::json!(["on-confirm", "on-publish", "no-ack", ""])
        );
    }
}
