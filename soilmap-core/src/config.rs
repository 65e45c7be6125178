//! Soils service configuration.
//!
//! A [`ServiceConfig`] names one soils layer and carries exactly one protocol
//! sub-configuration, so a raster layer cannot be built without its WMS
//! settings nor a vector layer without its WFS settings.

use crate::error::{Result, SoilsError};
use log::warn;
use serde::{Deserialize, Serialize};

pub const DEFAULT_WMS_URL: &str = "https://data.geopf.fr/wms-r/wms";
pub const DEFAULT_WMS_LAYER: &str = "INRA.CARTE.SOLS";
pub const DEFAULT_WMS_INFO_FORMAT: &str = "application/json";
pub const DEFAULT_WMS_VERSION: &str = "1.3.0";
pub const DEFAULT_WFS_URL: &str = "https://data.geopf.fr/wfs/ows";
pub const DEFAULT_WFS_TYPENAME: &str = "INRA.CARTE.SOLS:rrp_ucs";

/// WMS GetFeatureInfo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterConfig {
    pub url: String,
    pub layer_name: String,
    pub info_format: String,
    /// Protocol version, `"1.3.0"` or legacy `"1.1.1"`.
    pub version: String,
}

impl RasterConfig {
    /// WMS 1.3.0 renamed `SRS` to `CRS` and `X`/`Y` to `I`/`J`.
    pub fn uses_wms_130_names(&self) -> bool {
        let parts: Vec<u32> = self
            .version
            .trim()
            .split('.')
            .map_while(|p| p.parse::<u32>().ok())
            .collect();
        match parts.as_slice() {
            [major, minor, ..] => (*major, *minor) >= (1, 3),
            [major] => *major > 1,
            [] => false,
        }
    }

    pub fn crs_param_name(&self) -> &'static str {
        if self.uses_wms_130_names() {
            "CRS"
        } else {
            "SRS"
        }
    }

    pub fn pixel_param_names(&self) -> (&'static str, &'static str) {
        if self.uses_wms_130_names() {
            ("I", "J")
        } else {
            ("X", "Y")
        }
    }
}

/// WFS GetFeature settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorConfig {
    pub url: String,
    pub type_name: String,
}

/// Which protocol serves the layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ServiceSource {
    Raster(RasterConfig),
    Vector(VectorConfig),
}

/// The feature properties the UI cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub title_field: String,
    pub attribute_field_names: Vec<String>,
}

/// One selectable soils layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub id: String,
    pub label: String,
    pub source: ServiceSource,
    pub fields: FieldConfig,
    /// Display only.
    pub raster_opacity: f32,
    /// Display only.
    pub attribution: String,
}

impl ServiceConfig {
    /// Reject configurations whose required service strings are blank.
    pub fn validate(&self) -> Result<()> {
        fn require(value: &str, what: &str) -> Result<()> {
            if value.trim().is_empty() {
                Err(SoilsError::Configuration(format!("{} is required", what)))
            } else {
                Ok(())
            }
        }
        match &self.source {
            ServiceSource::Raster(raster) => {
                require(&raster.url, "raster service URL")?;
                require(&raster.layer_name, "raster layer name")?;
            }
            ServiceSource::Vector(vector) => {
                require(&vector.url, "vector service URL")?;
                require(&vector.type_name, "vector type name")?;
            }
        }
        Ok(())
    }

    pub fn is_raster(&self) -> bool {
        matches!(self.source, ServiceSource::Raster(_))
    }
}

/// Which protocol the runtime settings select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilsMode {
    Raster,
    Vector,
}

impl SoilsMode {
    /// Unknown values fall back to raster.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "raster" | "wms" => SoilsMode::Raster,
            "vector" | "wfs" => SoilsMode::Vector,
            other => {
                warn!("Unknown soils mode {:?}, using raster", other);
                SoilsMode::Raster
            }
        }
    }
}

/// Runtime key/value settings, each with a built-in fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct SoilsSettings {
    pub mode: SoilsMode,
    pub wms_url: String,
    pub wms_layer: String,
    pub wms_info_format: String,
    pub wms_version: String,
    pub wfs_url: String,
    pub wfs_type_name: String,
}

impl Default for SoilsSettings {
    fn default() -> Self {
        Self {
            mode: SoilsMode::Raster,
            wms_url: DEFAULT_WMS_URL.to_string(),
            wms_layer: DEFAULT_WMS_LAYER.to_string(),
            wms_info_format: DEFAULT_WMS_INFO_FORMAT.to_string(),
            wms_version: DEFAULT_WMS_VERSION.to_string(),
            wfs_url: DEFAULT_WFS_URL.to_string(),
            wfs_type_name: DEFAULT_WFS_TYPENAME.to_string(),
        }
    }
}

impl SoilsSettings {
    pub const MODE_KEY: &'static str = "SOILS_MODE";
    pub const WMS_URL_KEY: &'static str = "SOILS_WMS_URL";
    pub const WMS_LAYER_KEY: &'static str = "SOILS_WMS_LAYER";
    pub const WMS_INFO_FORMAT_KEY: &'static str = "SOILS_WMS_INFO_FORMAT";
    pub const WMS_VERSION_KEY: &'static str = "SOILS_WMS_VERSION";
    pub const WFS_URL_KEY: &'static str = "SOILS_WFS_URL";
    pub const WFS_TYPENAME_KEY: &'static str = "SOILS_WFS_TYPENAME";

    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup. Unset or blank keys
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, fallback: String| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(fallback)
        };
        let defaults = Self::default();
        let mode = lookup(Self::MODE_KEY)
            .filter(|v| !v.trim().is_empty())
            .map(|v| SoilsMode::parse(&v))
            .unwrap_or(defaults.mode);
        Self {
            mode,
            wms_url: get(Self::WMS_URL_KEY, defaults.wms_url),
            wms_layer: get(Self::WMS_LAYER_KEY, defaults.wms_layer),
            wms_info_format: get(Self::WMS_INFO_FORMAT_KEY, defaults.wms_info_format),
            wms_version: get(Self::WMS_VERSION_KEY, defaults.wms_version),
            wfs_url: get(Self::WFS_URL_KEY, defaults.wfs_url),
            wfs_type_name: get(Self::WFS_TYPENAME_KEY, defaults.wfs_type_name),
        }
    }

    /// Build the regional soil map layer selected by these settings.
    pub fn into_service_config(self) -> Result<ServiceConfig> {
        let source = match self.mode {
            SoilsMode::Raster => ServiceSource::Raster(RasterConfig {
                url: self.wms_url,
                layer_name: self.wms_layer,
                info_format: self.wms_info_format,
                version: self.wms_version,
            }),
            SoilsMode::Vector => ServiceSource::Vector(VectorConfig {
                url: self.wfs_url,
                type_name: self.wfs_type_name,
            }),
        };
        let config = ServiceConfig {
            id: "rrp".to_string(),
            label: "Référentiel Régional Pédologique".to_string(),
            source,
            fields: FieldConfig {
                title_field: "NOM_UCS".to_string(),
                attribute_field_names: vec![
                    "NO_ETUDE".to_string(),
                    "NO_UCS".to_string(),
                    "NOM_UCS".to_string(),
                    "REG_NAT".to_string(),
                ],
            },
            raster_opacity: 0.6,
            attribution: "© INRAE, RRP".to_string(),
        };
        config.validate()?;
        Ok(config)
    }
}
