//! Turn a raw feature collection into the uniform [`SoilInfo`] record.

use crate::config::FieldConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Title used when the feature has no usable title property.
pub const DEFAULT_TITLE: &str = "Sol";

/// Key fragments marking composition percentage attributes.
const PROPORTION_MARKERS: [&str; 5] = ["pct", "pourc", "prc", "percent", "taux"];

/// A decoded service response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Decode by content type: JSON when it mentions `json`, text otherwise.
    pub fn decode(content_type: Option<&str>, body: &str) -> serde_json::Result<Self> {
        let is_json = content_type
            .map(|ct| ct.to_lowercase().contains("json"))
            .unwrap_or(false);
        if is_json {
            Ok(ResponseBody::Json(serde_json::from_str(body)?))
        } else {
            Ok(ResponseBody::Text(body.to_string()))
        }
    }

    /// The feature sequence carried by the body. Text bodies and JSON without
    /// a `features` array carry none.
    pub fn feature_collection(&self) -> FeatureCollection {
        match self {
            ResponseBody::Json(value) => FeatureCollection::from_value(value),
            ResponseBody::Text(_) => FeatureCollection::default(),
        }
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{}", value),
            ResponseBody::Text(text) => write!(f, "{}", text),
        }
    }
}

/// One GeoJSON-like feature. Geometry is carried opaquely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub geometry: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Feature {
    /// Lenient read: properties that are not an object count as absent.
    pub fn from_value(item: &Value) -> Self {
        Self {
            properties: item.get("properties").and_then(Value::as_object).cloned(),
            geometry: item.get("geometry").filter(|g| !g.is_null()).cloned(),
        }
    }
}

impl FeatureCollection {
    /// Every element of the `features` array becomes a feature, in order.
    pub fn from_value(value: &Value) -> Self {
        let features = value
            .get("features")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Feature::from_value).collect())
            .unwrap_or_default();
        Self { features }
    }
}

/// Normalized soil information for one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoilInfo {
    pub title: String,
    pub attributes: Map<String, Value>,
    pub proportions: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
}

impl SoilInfo {
    /// The configured attributes present on this record, in configured order.
    pub fn highlighted<'a>(&'a self, fields: &'a FieldConfig) -> Vec<(&'a str, &'a Value)> {
        fields
            .attribute_field_names
            .iter()
            .filter_map(|name| self.attributes.get(name).map(|v| (name.as_str(), v)))
            .collect()
    }
}

pub fn is_proportion_key(key: &str) -> bool {
    let lowered = key.to_lowercase();
    PROPORTION_MARKERS.iter().any(|m| lowered.contains(m))
}

fn title_of(properties: &Map<String, Value>, title_field: &str) -> String {
    match properties.get(title_field) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Null) | Some(Value::String(_)) | None => DEFAULT_TITLE.to_string(),
        Some(other) => other.to_string(),
    }
}

pub fn normalize_feature(feature: &Feature, fields: &FieldConfig) -> SoilInfo {
    let attributes = feature.properties.clone().unwrap_or_default();
    let proportions = attributes
        .iter()
        .filter(|(k, _)| is_proportion_key(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    SoilInfo {
        title: title_of(&attributes, &fields.title_field),
        attributes,
        proportions,
        geometry: feature.geometry.clone(),
    }
}

/// Normalize the first feature only; an empty collection means no data.
pub fn normalize(collection: &FeatureCollection, fields: &FieldConfig) -> Option<SoilInfo> {
    collection
        .features
        .first()
        .map(|feature| normalize_feature(feature, fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> FieldConfig {
        FieldConfig {
            title_field: "NOM_UCS".to_string(),
            attribute_field_names: vec!["NO_UCS".to_string(), "NOM_UCS".to_string()],
        }
    }

    fn collection(value: Value) -> FeatureCollection {
        FeatureCollection::from_value(&value)
    }

    #[test]
    fn test_empty_collection_is_none() {
        assert_eq!(normalize(&collection(json!({"features": []})), &fields()), None);
        assert_eq!(normalize(&collection(json!({})), &fields()), None);
    }

    #[test]
    fn test_missing_title_defaults() {
        let c = collection(json!({"features": [{"properties": {"NO_UCS": 7}}]}));
        assert_eq!(normalize(&c, &fields()).unwrap().title, "Sol");
        let c = collection(json!({"features": [{"properties": {"NOM_UCS": ""}}]}));
        assert_eq!(normalize(&c, &fields()).unwrap().title, "Sol");
        let c = collection(json!({"features": [{"properties": null}]}));
        let info = normalize(&c, &fields()).unwrap();
        assert_eq!(info.title, "Sol");
        assert!(info.attributes.is_empty());
    }

    #[test]
    fn test_proportions_subset() {
        let c = collection(json!({"features": [
            {"properties": {"RRP_CODE": "A1", "PCT_ARGILE": 50, "NOM_UCS": "Limons"},
             "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}}
        ]}));
        let info = normalize(&c, &fields()).unwrap();
        assert_eq!(info.title, "Limons");
        assert_eq!(info.proportions.get("PCT_ARGILE"), Some(&json!(50)));
        assert!(!info.proportions.contains_key("RRP_CODE"));
        assert_eq!(info.attributes.len(), 3);
        assert_eq!(
            info.geometry,
            Some(json!({"type": "Point", "coordinates": [1.0, 2.0]}))
        );
    }

    #[test]
    fn test_proportion_markers_are_case_insensitive() {
        assert!(is_proportion_key("Pourcent_Sable"));
        assert!(is_proportion_key("taux_mo"));
        assert!(is_proportion_key("LIMON_PRC"));
        assert!(is_proportion_key("percentage"));
        assert!(!is_proportion_key("NOM_UCS"));
    }

    #[test]
    fn test_only_first_feature_is_used() {
        let c = collection(json!({"features": [
            {"properties": {"NOM_UCS": "first"}},
            {"properties": {"NOM_UCS": "second"}}
        ]}));
        assert_eq!(normalize(&c, &fields()).unwrap().title, "first");
    }

    #[test]
    fn test_malformed_first_feature_is_still_first() {
        let c = collection(json!({"features": [
            {"properties": "oops", "geometry": null},
            {"properties": {"NOM_UCS": "second"}}
        ]}));
        assert_eq!(c.features.len(), 2);
        let info = normalize(&c, &fields()).unwrap();
        assert_eq!(info.title, DEFAULT_TITLE);
        assert!(info.attributes.is_empty());
        assert_eq!(info.geometry, None);
    }

    #[test]
    fn test_decode_by_content_type() {
        let json_type = Some("application/json; charset=utf-8");
        let body = ResponseBody::decode(json_type, "{\"a\":1}").unwrap();
        assert_eq!(body, ResponseBody::Json(json!({"a": 1})));
        let body = ResponseBody::decode(Some("text/plain"), "no features").unwrap();
        assert_eq!(body, ResponseBody::Text("no features".to_string()));
        assert!(body.feature_collection().features.is_empty());
        assert!(ResponseBody::decode(Some("application/geo+json"), "<html>").is_err());
    }

    #[test]
    fn test_highlighted_keeps_configured_order() {
        let c = collection(json!({"features": [
            {"properties": {"NOM_UCS": "Limons", "NO_UCS": 7, "X": 1}}
        ]}));
        let info = normalize(&c, &fields()).unwrap();
        let f = fields();
        let shown = info.highlighted(&f);
        assert_eq!(shown, vec![("NO_UCS", &json!(7)), ("NOM_UCS", &json!("Limons"))]);
    }
}
