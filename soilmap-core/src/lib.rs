//! Soil classification lookups against WMS/WFS soil map services.
//!
//! Builds protocol-version-aware GetFeatureInfo / GetFeature queries,
//! projects coordinates to spherical Mercator where the raster protocol
//! needs it, and normalizes whatever comes back into a [`SoilInfo`].

pub mod adapter;
pub mod config;
pub mod error;
pub mod normalize;
pub mod projection;
pub mod query;

pub use adapter::{SoilsAdapter, Transport};
pub use config::{ServiceConfig, SoilsSettings};
pub use error::{Result, SoilsError};
pub use normalize::SoilInfo;
