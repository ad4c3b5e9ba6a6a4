//! Shallow structural validation of GeoJSON documents.
//!
//! Only the top-level shape is checked: a `FeatureCollection` whose
//! `features` array holds objects tagged `Feature`. Geometry, coordinates
//! and properties are never inspected.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
enum CollectionTag {
    FeatureCollection,
}

#[derive(Debug, Deserialize)]
enum FeatureTag {
    Feature,
}

#[derive(Debug, Deserialize)]
struct FeatureStub {
    #[serde(rename = "type")]
    _kind: FeatureTag,
}

#[derive(Debug, Deserialize)]
struct CollectionStub {
    #[serde(rename = "type")]
    _kind: CollectionTag,
    #[serde(rename = "features")]
    _features: Vec<FeatureStub>,
}

/// True iff `value` has the minimal feature-collection shape.
pub fn validate(value: &Value) -> bool {
    CollectionStub::deserialize(value).is_ok()
}
