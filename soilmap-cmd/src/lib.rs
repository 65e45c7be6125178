//! Command implementations for the soilmap CLI.
//!
//! Provides subcommands for querying the soils map services at a point or
//! over a region, printing the raster tile template, and building or reading
//! the RRP lookup table.

use clap::{Args, Subcommand};
use soilmap_core::config::SoilsSettings;
use soilmap_core::ServiceConfig;

pub mod build;
pub mod lookup;
pub mod query;

/// Soils service settings. Each falls back to its environment variable,
/// then to the built-in default.
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Query protocol: raster (WMS) or vector (WFS)
    #[arg(long, env = "SOILS_MODE")]
    pub mode: Option<String>,

    /// WMS service URL
    #[arg(long, env = "SOILS_WMS_URL")]
    pub wms_url: Option<String>,

    /// WMS layer name
    #[arg(long, env = "SOILS_WMS_LAYER")]
    pub wms_layer: Option<String>,

    /// WMS GetFeatureInfo output format
    #[arg(long, env = "SOILS_WMS_INFO_FORMAT")]
    pub wms_info_format: Option<String>,

    /// WMS protocol version (1.3.0 or 1.1.1)
    #[arg(long, env = "SOILS_WMS_VERSION")]
    pub wms_version: Option<String>,

    /// WFS service URL
    #[arg(long, env = "SOILS_WFS_URL")]
    pub wfs_url: Option<String>,

    /// WFS feature type name
    #[arg(long, env = "SOILS_WFS_TYPENAME")]
    pub wfs_type_name: Option<String>,
}

impl ServiceArgs {
    pub fn settings(&self) -> SoilsSettings {
        SoilsSettings::from_lookup(|key| {
            let value = match key {
                SoilsSettings::MODE_KEY => &self.mode,
                SoilsSettings::WMS_URL_KEY => &self.wms_url,
                SoilsSettings::WMS_LAYER_KEY => &self.wms_layer,
                SoilsSettings::WMS_INFO_FORMAT_KEY => &self.wms_info_format,
                SoilsSettings::WMS_VERSION_KEY => &self.wms_version,
                SoilsSettings::WFS_URL_KEY => &self.wfs_url,
                SoilsSettings::WFS_TYPENAME_KEY => &self.wfs_type_name,
                _ => return None,
            };
            value.clone()
        })
    }

    pub fn service_config(&self) -> anyhow::Result<ServiceConfig> {
        Ok(self.settings().into_service_config()?)
    }
}

/// Geographic bounds of the visible map.
#[derive(Args, Debug, Clone, Copy)]
pub struct BoundsArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub west: f64,
    #[arg(long, allow_hyphen_values = true)]
    pub south: f64,
    #[arg(long, allow_hyphen_values = true)]
    pub east: f64,
    #[arg(long, allow_hyphen_values = true)]
    pub north: f64,
}

#[derive(Subcommand)]
pub enum Command {
    /// Join the four RRP CSV tables into the static lookup JSON
    BuildLookup {
        /// Directory holding table_etude.csv, table_ucs.csv, table_l_ucs_uts.csv and table_uts.csv
        #[arg(short = 'i', long, default_value = "data/rrp")]
        input_dir: String,

        /// Output path for the lookup JSON
        #[arg(short = 'o', long, default_value = "public/rrp_lookup.json")]
        output: String,
    },

    /// Soil information under a clicked point
    Point {
        /// Clicked longitude
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Clicked latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[command(flatten)]
        bounds: BoundsArgs,

        /// Viewport width in pixels
        #[arg(long, default_value_t = 1024)]
        width: u32,

        /// Viewport height in pixels
        #[arg(long, default_value_t = 768)]
        height: u32,

        /// Lookup JSON (file or http URL) used to attach the unit composition
        #[arg(long)]
        lookup: Option<String>,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Every soil unit intersecting a region (vector mode only)
    Region {
        #[command(flatten)]
        bounds: BoundsArgs,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Print the WMS GetMap tile URL template
    TileTemplate {
        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Print one entry of the lookup JSON
    Lookup {
        /// Lookup JSON (file or http URL)
        #[arg(short = 'f', long, default_value = "public/rrp_lookup.json")]
        file: String,

        /// Study number (NO_ETUDE)
        #[arg(long)]
        study: String,

        /// Unit number (NO_UCS)
        #[arg(long)]
        unit: String,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::BuildLookup { input_dir, output } => {
            build::run_build_lookup(&input_dir, &output).await
        }
        Command::Point {
            lng,
            lat,
            bounds,
            width,
            height,
            lookup,
            service,
        } => {
            query::run_point(
                &service,
                &bounds,
                width,
                height,
                lng,
                lat,
                lookup.as_deref(),
            )
            .await
        }
        Command::Region { bounds, service } => query::run_region(&service, &bounds).await,
        Command::TileTemplate { service } => query::run_tile_template(&service),
        Command::Lookup { file, study, unit } => lookup::run_lookup(&file, &study, &unit).await,
    }
}
