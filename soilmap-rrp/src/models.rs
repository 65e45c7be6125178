//! Lookup table record structs.
//!
//! Field names on the wire are the snake-case forms of the source columns,
//! which is what the map application reads. Optional numbers are omitted
//! from the JSON when the source cell was missing or unparsable.

use serde::{Deserialize, Serialize};
use soilmap_utils::numbers::Numeric;

/// One soil component (UTS) of a mapping unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RrpComponent {
    /// Share of the unit covered by this component.
    #[serde(rename = "pourcent")]
    pub percentage: Numeric,
    /// Component name in the 2008 pedological reference.
    #[serde(rename = "rp_2008_nom", default, skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
}

/// One soil mapping unit (UCS) with its study and sorted composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RrpEntry {
    /// Study identifier; absent when the unit references no known study.
    #[serde(rename = "id_etude", default, skip_serializing_if = "Option::is_none")]
    pub study_id: Option<Numeric>,
    #[serde(rename = "no_etude", default, skip_serializing_if = "Option::is_none")]
    pub study_number: Option<Numeric>,
    #[serde(rename = "no_ucs", default, skip_serializing_if = "Option::is_none")]
    pub unit_number: Option<Numeric>,
    #[serde(rename = "id_ucs", default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<Numeric>,
    #[serde(rename = "nom_ucs")]
    pub unit_name: String,
    #[serde(rename = "reg_nat")]
    pub natural_region: String,
    #[serde(rename = "alt_min", default, skip_serializing_if = "Option::is_none")]
    pub altitude_min: Option<Numeric>,
    #[serde(rename = "alt_mod", default, skip_serializing_if = "Option::is_none")]
    pub altitude_mode: Option<Numeric>,
    #[serde(rename = "alt_max", default, skip_serializing_if = "Option::is_none")]
    pub altitude_max: Option<Numeric>,
    #[serde(rename = "nb_uts")]
    pub component_count: Numeric,
    /// Components by descending percentage.
    #[serde(rename = "uts")]
    pub components: Vec<RrpComponent>,
    #[serde(rename = "color_hex", default, skip_serializing_if = "Option::is_none")]
    pub color_hex: Option<String>,
}

/// Join key of a mapping unit: `"<study number>:<unit number>"`.
pub fn lookup_key(study_number: &str, unit_number: &str) -> String {
    format!("{}:{}", study_number, unit_number)
}
