//! Query string construction for WMS GetFeatureInfo, WFS GetFeature and WMS
//! GetMap tile templates.
//!
//! Builders are pure: they never touch the network. Values are
//! form-urlencoded by [`reqwest::Url`], and any query already present on the
//! configured service URL is kept.

use crate::config::{RasterConfig, ServiceConfig, ServiceSource, VectorConfig};
use crate::error::{Result, SoilsError};
use crate::projection::{GeoBBox, LngLat, PixelPosition, ProjectedBBox, Viewport};
use reqwest::Url;

/// Projected CRS used by every raster request.
pub const PROJECTED_CRS: &str = "EPSG:3857";

/// Geographic CRS used by vector requests.
pub const GEOGRAPHIC_CRS: &str = "EPSG:4326";

/// Placeholder the map client substitutes with each tile's bounding box.
pub const BBOX_PLACEHOLDER: &str = "{bbox-epsg-3857}";

/// Edge length of the tiles requested through the GetMap template.
pub const TILE_SIZE: u32 = 256;

/// Spatial input of one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpatialContext {
    /// A click, together with the view it happened in.
    Point { point: LngLat, viewport: Viewport },
    /// A geographic region.
    Region(GeoBBox),
}

fn with_params(base: &str, params: &[(&str, String)]) -> Result<Url> {
    Url::parse_with_params(base, params)
        .map_err(|e| SoilsError::Configuration(format!("invalid service URL {:?}: {}", base, e)))
}

/// WMS GetFeatureInfo URL for one pixel of a rendered view.
pub fn feature_info_url(
    raster: &RasterConfig,
    bbox: &ProjectedBBox,
    width: u32,
    height: u32,
    pixel: PixelPosition,
) -> Result<Url> {
    let (i_name, j_name) = raster.pixel_param_names();
    let params = [
        ("SERVICE", "WMS".to_string()),
        ("REQUEST", "GetFeatureInfo".to_string()),
        ("VERSION", raster.version.clone()),
        ("LAYERS", raster.layer_name.clone()),
        ("QUERY_LAYERS", raster.layer_name.clone()),
        ("STYLES", String::new()),
        ("FORMAT", "image/png".to_string()),
        ("INFO_FORMAT", raster.info_format.clone()),
        ("TRANSPARENT", "TRUE".to_string()),
        (raster.crs_param_name(), PROJECTED_CRS.to_string()),
        ("WIDTH", width.to_string()),
        ("HEIGHT", height.to_string()),
        ("BBOX", bbox.to_param()),
        (i_name, pixel.i.to_string()),
        (j_name, pixel.j.to_string()),
    ];
    with_params(&raster.url, &params)
}

/// WFS GetFeature URL for a geographic bounding box.
///
/// The box stays in longitude/latitude; the vector service is queried in
/// EPSG:4326 directly.
pub fn feature_fetch_url(vector: &VectorConfig, bbox: &GeoBBox) -> Result<Url> {
    let params = [
        ("service", "WFS".to_string()),
        ("version", "2.0.0".to_string()),
        ("request", "GetFeature".to_string()),
        ("typeName", vector.type_name.clone()),
        ("outputFormat", "application/json".to_string()),
        ("srsName", GEOGRAPHIC_CRS.to_string()),
        ("bbox", bbox.to_param()),
    ];
    with_params(&vector.url, &params)
}

/// WMS GetMap URL template with a literal [`BBOX_PLACEHOLDER`].
pub fn tile_template_url(raster: &RasterConfig) -> Result<String> {
    let params = [
        ("SERVICE", "WMS".to_string()),
        ("REQUEST", "GetMap".to_string()),
        ("VERSION", raster.version.clone()),
        ("LAYERS", raster.layer_name.clone()),
        ("STYLES", String::new()),
        ("FORMAT", "image/png".to_string()),
        ("TRANSPARENT", "TRUE".to_string()),
        (raster.crs_param_name(), PROJECTED_CRS.to_string()),
        ("WIDTH", TILE_SIZE.to_string()),
        ("HEIGHT", TILE_SIZE.to_string()),
    ];
    let url = with_params(&raster.url, &params)?;
    Ok(format!("{}&BBOX={}", url, BBOX_PLACEHOLDER))
}

/// Pick the protocol from the configuration and build the query URL.
pub fn build_query(config: &ServiceConfig, context: &SpatialContext) -> Result<Url> {
    match (&config.source, context) {
        (ServiceSource::Raster(raster), SpatialContext::Point { point, viewport }) => {
            feature_info_url(
                raster,
                &viewport.projected_bbox(),
                viewport.width,
                viewport.height,
                viewport.pixel_of(*point),
            )
        }
        (ServiceSource::Raster(_), SpatialContext::Region(_)) => Err(SoilsError::Configuration(
            format!("layer {:?} is raster; region queries need a vector service", config.id),
        )),
        (ServiceSource::Vector(vector), SpatialContext::Point { point, .. }) => {
            feature_fetch_url(vector, &GeoBBox::around_point(*point))
        }
        (ServiceSource::Vector(vector), SpatialContext::Region(bbox)) => {
            feature_fetch_url(vector, bbox)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldConfig;
    use std::collections::HashMap;

    fn raster(version: &str) -> RasterConfig {
        RasterConfig {
            url: "https://example.org/wms".to_string(),
            layer_name: "sols:ucs".to_string(),
            info_format: "application/json".to_string(),
            version: version.to_string(),
        }
    }

    fn vector() -> VectorConfig {
        VectorConfig {
            url: "https://example.org/wfs?map=sols".to_string(),
            type_name: "sols:ucs".to_string(),
        }
    }

    fn params(url: &Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn bbox() -> ProjectedBBox {
        ProjectedBBox {
            min_x: -100.5,
            min_y: 200.0,
            max_x: 300.0,
            max_y: 400.25,
        }
    }

    #[test]
    fn test_feature_info_130_names() {
        let pixel = PixelPosition { i: 12, j: 34 };
        let url = feature_info_url(&raster("1.3.0"), &bbox(), 800, 600, pixel).unwrap();
        let p = params(&url);
        assert_eq!(p["CRS"], "EPSG:3857");
        assert_eq!(p["I"], "12");
        assert_eq!(p["J"], "34");
        assert!(!p.contains_key("SRS"));
        assert!(!p.contains_key("X"));
        assert!(!p.contains_key("Y"));
        assert_eq!(p["SERVICE"], "WMS");
        assert_eq!(p["REQUEST"], "GetFeatureInfo");
        assert_eq!(p["VERSION"], "1.3.0");
        assert_eq!(p["LAYERS"], "sols:ucs");
        assert_eq!(p["QUERY_LAYERS"], "sols:ucs");
        assert_eq!(p["STYLES"], "");
        assert_eq!(p["FORMAT"], "image/png");
        assert_eq!(p["INFO_FORMAT"], "application/json");
        assert_eq!(p["TRANSPARENT"], "TRUE");
        assert_eq!(p["WIDTH"], "800");
        assert_eq!(p["HEIGHT"], "600");
        assert_eq!(p["BBOX"], "-100.5,200,300,400.25");
    }

    #[test]
    fn test_feature_info_legacy_names() {
        let pixel = PixelPosition { i: 12, j: 34 };
        let url = feature_info_url(&raster("1.1.1"), &bbox(), 800, 600, pixel).unwrap();
        let p = params(&url);
        assert_eq!(p["SRS"], "EPSG:3857");
        assert_eq!(p["X"], "12");
        assert_eq!(p["Y"], "34");
        assert!(!p.contains_key("CRS"));
        assert!(!p.contains_key("I"));
        assert!(!p.contains_key("J"));
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let pixel = PixelPosition { i: 0, j: 0 };
        let url = feature_info_url(&raster("1.3.0"), &bbox(), 1, 1, pixel).unwrap();
        let query = url.query().unwrap_or_default();
        assert!(query.contains("CRS=EPSG%3A3857"));
        assert!(query.contains("LAYERS=sols%3Aucs"));
        assert!(query.contains("STYLES=&"));
    }

    #[test]
    fn test_feature_fetch_keeps_geographic_bbox() {
        let url = feature_fetch_url(&vector(), &GeoBBox::new(-1.5, 47.25, -1.0, 47.75)).unwrap();
        let p = params(&url);
        assert_eq!(p["map"], "sols");
        assert_eq!(p["service"], "WFS");
        assert_eq!(p["version"], "2.0.0");
        assert_eq!(p["request"], "GetFeature");
        assert_eq!(p["typeName"], "sols:ucs");
        assert_eq!(p["outputFormat"], "application/json");
        assert_eq!(p["srsName"], "EPSG:4326");
        assert_eq!(p["bbox"], "-1.5,47.25,-1,47.75");
    }

    #[test]
    fn test_tile_template_keeps_placeholder() {
        let legacy = tile_template_url(&raster("1.1.1")).unwrap();
        assert!(legacy.ends_with("&BBOX={bbox-epsg-3857}"));
        assert!(legacy.contains("SRS=EPSG%3A3857"));
        assert!(legacy.contains("REQUEST=GetMap"));
        let current = tile_template_url(&raster("1.3.0")).unwrap();
        assert!(current.contains("CRS=EPSG%3A3857"));
        assert!(!current.contains("SRS="));
    }

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        let mut r = raster("1.3.0");
        r.url = "not a url".to_string();
        let err = tile_template_url(&r).unwrap_err();
        assert!(matches!(err, SoilsError::Configuration(_)));
    }

    fn service(source: ServiceSource) -> ServiceConfig {
        ServiceConfig {
            id: "test".to_string(),
            label: "Test".to_string(),
            source,
            fields: FieldConfig {
                title_field: "NOM_UCS".to_string(),
                attribute_field_names: Vec::new(),
            },
            raster_opacity: 1.0,
            attribution: String::new(),
        }
    }

    #[test]
    fn test_build_query_vector_point_is_degenerate_bbox() {
        let viewport = Viewport::new(GeoBBox::new(-2.0, 47.0, 0.0, 49.0), 800, 600);
        let context = SpatialContext::Point {
            point: LngLat::new(-1.25, 48.5),
            viewport,
        };
        let url = build_query(&service(ServiceSource::Vector(vector())), &context).unwrap();
        assert_eq!(params(&url)["bbox"], "-1.25,48.5,-1.25,48.5");
    }

    #[test]
    fn test_build_query_raster_point_uses_viewport() {
        let viewport = Viewport::new(GeoBBox::new(-2.0, 47.0, 0.0, 49.0), 800, 600);
        let context = SpatialContext::Point {
            point: LngLat::new(-0.999, 48.0),
            viewport,
        };
        let config = service(ServiceSource::Raster(raster("1.3.0")));
        let url = build_query(&config, &context).unwrap();
        let p = params(&url);
        assert_eq!(p["BBOX"], viewport.projected_bbox().to_param());
        assert_eq!(p["I"], "400");
        assert_eq!(p["J"], "302");
    }

    #[test]
    fn test_build_query_raster_edge_click_stays_inside_image() {
        let viewport = Viewport::new(GeoBBox::new(-2.0, 47.0, 0.0, 49.0), 800, 600);
        let context = SpatialContext::Point {
            point: LngLat::new(0.0, 47.0),
            viewport,
        };
        let config = service(ServiceSource::Raster(raster("1.3.0")));
        let p = params(&build_query(&config, &context).unwrap());
        assert_eq!(p["I"], "799");
        assert_eq!(p["J"], "599");
    }

    #[test]
    fn test_build_query_raster_region_is_rejected() {
        let context = SpatialContext::Region(GeoBBox::new(0.0, 0.0, 1.0, 1.0));
        let config = service(ServiceSource::Raster(raster("1.3.0")));
        let err = build_query(&config, &context).unwrap_err();
        assert!(matches!(err, SoilsError::Configuration(_)));
    }
}
