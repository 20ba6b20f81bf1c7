//! Typed view of a JUnitXML results document, as emitted by pytest and
//! friends: a single `testsuite` root holding optional `properties` and a
//! flat, ordered list of `testcase` elements.

use std::collections::HashMap;

#[derive(Clone, Debug, Default, PartialEq, YaDeserialize, YaSerialize)]
#[yaserde(rename = "property")]
pub struct Property {
    #[yaserde(attribute)]
    pub name: String,
    #[yaserde(attribute)]
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, YaDeserialize, YaSerialize)]
#[yaserde(rename = "properties")]
pub struct Properties {
    #[yaserde(child, rename = "property")]
    pub properties: Vec<Property>,
}

/// A `failure` or `error` child of a testcase. Only its presence matters for
/// classification; the message and body are carried along for completeness.
#[derive(Clone, Debug, Default, PartialEq, YaDeserialize, YaSerialize)]
pub struct TestFailure {
    #[yaserde(attribute)]
    pub message: String,
    #[yaserde(attribute, rename = "type")]
    pub failure_type: String,
    #[yaserde(text)]
    pub body: String,
}

#[derive(Clone, Debug, Default, PartialEq, YaDeserialize, YaSerialize)]
pub struct Skipped {
    #[yaserde(attribute)]
    pub message: String,
    #[yaserde(text)]
    pub body: String,
}

#[derive(Clone, Debug, Default, PartialEq, YaDeserialize, YaSerialize)]
#[yaserde(rename = "testcase")]
pub struct TestCase {
    #[yaserde(attribute)]
    pub classname: String,
    #[yaserde(attribute)]
    pub name: String,
    #[yaserde(attribute)]
    pub time: f32,
    #[yaserde(child)]
    pub failure: Option<TestFailure>,
    #[yaserde(child)]
    pub error: Option<TestFailure>,
    #[yaserde(child)]
    pub skipped: Option<Skipped>,
}

#[derive(Clone, Debug, Default, PartialEq, YaDeserialize, YaSerialize)]
#[yaserde(rename = "testsuite")]
pub struct TestSuite {
    #[yaserde(attribute)]
    pub errors: u32,
    #[yaserde(attribute)]
    pub failures: u32,
    #[yaserde(attribute)]
    pub name: String,
    #[yaserde(attribute)]
    pub tests: u32,
    #[yaserde(attribute)]
    pub time: f32,
    #[yaserde(child)]
    pub properties: Properties,
    #[yaserde(rename = "testcase")]
    pub testcases: Vec<TestCase>,
}

impl TestSuite {
    /// Flatten the `properties/property` pairs into a lookup map. Duplicate
    /// names overwrite; a missing `properties` block yields an empty map.
    pub fn property_map(&self) -> HashMap<String, String> {
        self.properties
            .properties
            .iter()
            .map(|p| (p.name.clone(), p.value.clone()))
            .collect()
    }
}
