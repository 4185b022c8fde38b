use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Keys the driver reads or writes itself. Anything else passes through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownKey {
    Region,
    Bucket,
    Account,
    AwsAccessKeyId,
    AwsSecretAccessKey,
}

impl WellKnownKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Bucket => "bucket",
            Self::Account => "account",
            Self::AwsAccessKeyId => "aws_access_key_id",
            Self::AwsSecretAccessKey => "aws_secret_access_key",
        }
    }
}

/// String-keyed data with typed access for [`WellKnownKey`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataMap(BTreeMap<String, Value>);

impl DataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains(&self, key: WellKnownKey) -> bool {
        self.0.contains_key(key.as_str())
    }

    /// Returns the value only when it is a JSON string.
    pub fn get_str(&self, key: WellKnownKey) -> Option<&str> {
        self.0.get(key.as_str()).and_then(Value::as_str)
    }

    pub fn set_str(&mut self, key: WellKnownKey, value: impl Into<String>) {
        self.0
            .insert(key.as_str().to_string(), Value::String(value.into()));
    }

    pub fn get_object(&self, key: WellKnownKey) -> Option<&Map<String, Value>> {
        self.0.get(key.as_str()).and_then(Value::as_object)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone().into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DataMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Data split by sensitivity. Used for driver parameters on the way in and
/// for resource data on the way out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesSecrets {
    #[serde(
        default,
        skip_serializing_if = "DataMap::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub values: DataMap,
    #[serde(
        default,
        skip_serializing_if = "DataMap::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub secrets: DataMap,
}

/// Manifest to inject into the deployment at `location`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub location: String,
    pub data: Value,
}

/// Upsert request payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverInputs {
    #[serde(rename = "type", default)]
    pub resource_type: String,
    #[serde(rename = "resource", default, deserialize_with = "null_as_default")]
    pub resource_params: Map<String, Value>,
    #[serde(rename = "driver", default)]
    pub driver_params: Option<ValuesSecrets>,
}

/// Upsert response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverOutputs {
    #[serde(rename = "id")]
    pub resource_id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub resource: ValuesSecrets,
    #[serde(default)]
    pub manifests: Vec<Manifest>,
}

/// Treats an explicit JSON `null` the same as an absent field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DataMap, DriverInputs, ValuesSecrets, WellKnownKey};

    #[test]
    fn typed_access_ignores_non_string_values() {
        let mut map = DataMap::new();
        map.insert("region", json!(42));
        map.set_str(WellKnownKey::Bucket, "my-bucket");

        assert_eq!(map.get_str(WellKnownKey::Region), None);
        assert!(map.contains(WellKnownKey::Region));
        assert_eq!(map.get_str(WellKnownKey::Bucket), Some("my-bucket"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let data = ValuesSecrets {
            values: [("bucket", "b")].into_iter().collect(),
            secrets: DataMap::new(),
        };

        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"values": {"bucket": "b"}})
        );
    }

    #[test]
    fn inputs_accept_null_sections() {
        let inputs: DriverInputs = serde_json::from_value(json!({
            "type": "s3",
            "resource": null,
            "driver": {"values": {"region": "eu-west-1"}, "secrets": null}
        }))
        .unwrap();

        assert_eq!(inputs.resource_type, "s3");
        assert!(inputs.resource_params.is_empty());
        let driver = inputs.driver_params.unwrap();
        assert_eq!(driver.values.get_str(WellKnownKey::Region), Some("eu-west-1"));
        assert!(driver.secrets.is_empty());
    }

    #[test]
    fn inputs_without_type_parse_with_empty_type() {
        let inputs: DriverInputs = serde_json::from_value(json!({"driver": {}})).unwrap();
        assert!(inputs.resource_type.is_empty());
    }

    #[test]
    fn pass_through_keys_survive() {
        let map: DataMap = serde_json::from_value(json!({
            "account": {"aws_access_key_id": "id"},
            "custom": [1, 2.5, "x"]
        }))
        .unwrap();

        assert_eq!(map.get("custom"), Some(&json!([1, 2.5, "x"])));
        assert!(map.get_object(WellKnownKey::Account).is_some());
        assert_eq!(serde_json::from_value::<DataMap>(map.to_value()).unwrap(), map);
    }
}
