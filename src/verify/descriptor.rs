//! Exercise descriptors.
//!
//! Descriptor JSON overloads the literal `true` to mean "must be present,
//! any value accepted". That sentinel is turned into
//! [`Expectation::Required`] while deserializing, so comparison code never
//! looks at raw sentinel values.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// What a descriptor demands of one header or field.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// Must be present; the value is unconstrained.
    Required,
    /// Must equal this value.
    Literal(Value),
}

impl Expectation {
    /// The wire form: `true` for `Required`, otherwise the literal.
    pub fn to_value(&self) -> Value {
        match self {
            Expectation::Required => Value::Bool(true),
            Expectation::Literal(v) => v.clone(),
        }
    }
}

impl From<Value> for Expectation {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(true) => Expectation::Required,
            other => Expectation::Literal(other),
        }
    }
}

impl<'de> Deserialize<'de> for Expectation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Expectation::from)
    }
}

impl Serialize for Expectation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// One step of a multi-step exercise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialRequest {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
}

/// What a correct request looks like.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolutionDescriptor {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, Expectation>,
    #[serde(default)]
    pub body: BTreeMap<String, Expectation>,
    /// Marks a multi-step exercise. Steps are carried but not compared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<PartialRequest>>,
}

impl SolutionDescriptor {
    pub fn is_multi_step(&self) -> bool {
        self.steps.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// What a correct server response looks like.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedResponseDescriptor {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Keys may be dotted paths such as `user.name` or `[0].id`.
    #[serde(default)]
    pub body: Option<BTreeMap<String, Expectation>>,
    #[serde(default)]
    pub exact_match: bool,
}

impl ExpectedResponseDescriptor {
    /// The body expectations re-assembled into their wire form.
    pub fn body_value(&self) -> Option<Value> {
        self.body.as_ref().map(|fields| {
            let map: Map<String, Value> = fields
                .iter()
                .map(|(k, e)| (k.clone(), e.to_value()))
                .collect();
            Value::Object(map)
        })
    }
}
