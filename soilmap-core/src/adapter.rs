//! Soils adapter: picks the protocol, fetches, and normalizes.
//!
//! Every call issues exactly one request. There is no retry, timeout or
//! caching here; callers wanting a timeout race the returned future.

use crate::config::ServiceConfig;
use crate::error::{Result, SoilsError};
use crate::normalize::{self, ResponseBody, SoilInfo};
use crate::projection::{GeoBBox, LngLat, Viewport};
use crate::query::{build_query, SpatialContext};
use log::{debug, warn};
use reqwest::{header::CONTENT_TYPE, Client, Url};

/// An HTTP response reduced to what the adapter looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single GET.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn fetch(&self, url: &Url) -> Result<RawResponse>;
}

impl Transport for Client {
    async fn fetch(&self, url: &Url) -> Result<RawResponse> {
        let response = self.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;
        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Decode a response, turning a non-success status into a service error.
///
/// Raster bodies are decoded by content type; vector bodies must be JSON.
fn decode_response(response: RawResponse, json_required: bool) -> Result<ResponseBody> {
    if !response.is_success() {
        let body = ResponseBody::decode(response.content_type.as_deref(), &response.body)
            .unwrap_or(ResponseBody::Text(response.body));
        warn!("Soils service answered HTTP {}", response.status);
        return Err(SoilsError::Service {
            status: response.status,
            body,
        });
    }
    if json_required {
        Ok(ResponseBody::Json(serde_json::from_str(&response.body)?))
    } else {
        Ok(ResponseBody::decode(
            response.content_type.as_deref(),
            &response.body,
        )?)
    }
}

async fn fetch_body<T: Transport>(
    transport: &T,
    config: &ServiceConfig,
    context: &SpatialContext,
) -> Result<ResponseBody> {
    let url = build_query(config, context)?;
    debug!("Soils query for {}: {}", config.id, url);
    let response = transport.fetch(&url).await?;
    decode_response(response, !config.is_raster())
}

/// Soil information under a clicked point, or `None` when no feature is hit.
pub async fn get_info_at_point<T: Transport>(
    transport: &T,
    viewport: &Viewport,
    point: LngLat,
    config: &ServiceConfig,
) -> Result<Option<SoilInfo>> {
    let context = SpatialContext::Point {
        point,
        viewport: *viewport,
    };
    let body = fetch_body(transport, config, &context).await?;
    Ok(normalize::normalize(
        &body.feature_collection(),
        &config.fields,
    ))
}

/// Every feature of a vector layer intersecting a region.
pub async fn get_features_in_region<T: Transport>(
    transport: &T,
    bbox: &GeoBBox,
    config: &ServiceConfig,
) -> Result<Vec<SoilInfo>> {
    let body = fetch_body(transport, config, &SpatialContext::Region(*bbox)).await?;
    Ok(body
        .feature_collection()
        .features
        .iter()
        .map(|feature| normalize::normalize_feature(feature, &config.fields))
        .collect())
}

/// A validated service configuration bound to a transport.
pub struct SoilsAdapter<T = Client> {
    transport: T,
    config: ServiceConfig,
}

impl SoilsAdapter<Client> {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        Self::with_transport(config, Client::new())
    }
}

impl<T: Transport> SoilsAdapter<T> {
    pub fn with_transport(config: ServiceConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub async fn info_at_point(
        &self,
        viewport: &Viewport,
        point: LngLat,
    ) -> Result<Option<SoilInfo>> {
        get_info_at_point(&self.transport, viewport, point, &self.config).await
    }

    pub async fn features_in_region(&self, bbox: &GeoBBox) -> Result<Vec<SoilInfo>> {
        get_features_in_region(&self.transport, bbox, &self.config).await
    }
}
