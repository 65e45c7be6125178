//! Point, region and tile-template commands against the soils services.

use crate::{BoundsArgs, ServiceArgs};
use log::{error, info, warn};
use soilmap_core::config::ServiceSource;
use soilmap_core::projection::{GeoBBox, LngLat, Viewport};
use soilmap_core::query::tile_template_url;
use soilmap_core::{SoilInfo, SoilsAdapter, SoilsError};
use soilmap_rrp::{LookupCache, LookupSource, RrpEntry};

/// Message shown when a point query yields nothing usable.
pub const NO_DATA_MESSAGE: &str = "No soil data available at this location.";

impl BoundsArgs {
    pub fn bbox(&self) -> GeoBBox {
        GeoBBox::new(self.west, self.south, self.east, self.north)
    }
}

/// Unit composition for a feature carrying `NO_ETUDE` / `NO_UCS` properties.
pub async fn attach_unit(info: &SoilInfo, cache: &LookupCache) -> Option<RrpEntry> {
    let property = |name: &str| -> Option<String> {
        info.attributes.get(name).map(|v| match v.as_str() {
            Some(s) => s.to_string(),
            None => v.to_string(),
        })
    };
    let study = property("NO_ETUDE")?;
    let unit = property("NO_UCS")?;
    let lookup = cache.get().await;
    lookup.get(&study, &unit).cloned()
}

/// Query soil information under a clicked point and print it as JSON.
pub async fn run_point(
    service: &ServiceArgs,
    bounds: &BoundsArgs,
    width: u32,
    height: u32,
    lng: f64,
    lat: f64,
    lookup: Option<&str>,
) -> anyhow::Result<()> {
    let config = service.service_config()?;
    info!("Querying {} ({}) at {}, {}", config.label, config.id, lng, lat);
    let adapter = SoilsAdapter::new(config)?;
    let viewport = Viewport::new(bounds.bbox(), width, height);

    let info = match adapter.info_at_point(&viewport, LngLat::new(lng, lat)).await {
        Ok(Some(info)) => info,
        Ok(None) => {
            println!("{}", NO_DATA_MESSAGE);
            return Ok(());
        }
        Err(e) => {
            error!("Soil query failed: {}", e);
            println!("{}", NO_DATA_MESSAGE);
            return Err(e.into());
        }
    };

    for (name, value) in info.highlighted(&adapter.config().fields) {
        info!("  {}: {}", name, value);
    }

    let unit = match lookup {
        Some(location) => {
            let cache = LookupCache::new(LookupSource::parse(location));
            let unit = attach_unit(&info, &cache).await;
            if unit.is_none() {
                warn!("No lookup entry for the selected unit");
            }
            unit
        }
        None => None,
    };

    let output = serde_json::json!({
        "soil": info,
        "unit": unit,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Query every soil unit intersecting a region and print them as JSON.
pub async fn run_region(service: &ServiceArgs, bounds: &BoundsArgs) -> anyhow::Result<()> {
    let config = service.service_config()?;
    let adapter = SoilsAdapter::new(config)?;
    let infos = adapter.features_in_region(&bounds.bbox()).await?;
    info!("{} soil units in region", infos.len());
    println!("{}", serde_json::to_string_pretty(&infos)?);
    Ok(())
}

/// Print the GetMap tile URL template of the raster layer.
pub fn run_tile_template(service: &ServiceArgs) -> anyhow::Result<()> {
    let mut settings = service.settings();
    settings.mode = soilmap_core::config::SoilsMode::Raster;
    let config = settings.into_service_config()?;
    let ServiceSource::Raster(raster) = &config.source else {
        return Err(SoilsError::Configuration("raster settings missing".to_string()).into());
    };
    println!("{}", tile_template_url(raster)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LOOKUP_JSON: &str = r#"{
        "1:7": {"id_etude": 100, "nom_ucs": "Limon", "reg_nat": "", "nb_uts": 0, "uts": []}
    }"#;

    fn soil(properties: serde_json::Value) -> SoilInfo {
        SoilInfo {
            title: "Sol".to_string(),
            attributes: properties.as_object().cloned().unwrap_or_default(),
            proportions: Default::default(),
            geometry: None,
        }
    }

    #[tokio::test]
    async fn test_attach_unit_matches_numeric_and_text_properties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rrp_lookup.json");
        std::fs::write(&path, LOOKUP_JSON).unwrap();
        let cache = LookupCache::new(LookupSource::File(path));

        let numeric = soil(json!({"NO_ETUDE": 1, "NO_UCS": 7}));
        assert_eq!(attach_unit(&numeric, &cache).await.unwrap().unit_name, "Limon");

        let text = soil(json!({"NO_ETUDE": "01", "NO_UCS": "7"}));
        assert!(attach_unit(&text, &cache).await.is_some());

        let missing = soil(json!({"NO_ETUDE": 1}));
        assert!(attach_unit(&missing, &cache).await.is_none());
    }

    #[test]
    fn test_run_tile_template_forces_raster() {
        let args = ServiceArgs {
            mode: Some("vector".to_string()),
            ..Default::default()
        };
        assert!(run_tile_template(&args).is_ok());
    }
}
