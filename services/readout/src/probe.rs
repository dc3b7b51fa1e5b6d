//! Reads the value under a map location across a stack of layers.
//!
//! Layers are tried top-most first (the last configured layer is drawn on
//! top). Each failure falls through to the layer below; the first layer
//! with a reading wins.

use anyhow::Result;
use map_common::{TileRequest, BASE_TILE_SIZE};
use serde::Serialize;
use serde_json::json;
use tile_decoder::{Query, QueryEngine, RampValue};
use tracing::{debug, info};

use crate::config::LayerConfig;

/// A value read from one layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub layer: String,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl Reading {
    fn new(layer: &str, value: RampValue) -> Self {
        Self {
            layer: layer.to_string(),
            median: value.median,
            min: value.min,
            max: value.max,
        }
    }
}

/// Result of one probe, as printed with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u32,
    pub reading: Option<Reading>,
}

/// Probe `layers` at a location. `Ok(None)` means no layer had a reading.
pub async fn probe(
    engine: &mut QueryEngine,
    layers: &[LayerConfig],
    lat: f64,
    lon: f64,
    zoom: u32,
    batch_id: u64,
) -> Result<Option<Reading>> {
    let base = TileRequest::from_lat_lon(lat, lon, BASE_TILE_SIZE, zoom)?;
    debug!(tile = %base.tile, px = base.pixel.x, py = base.pixel.y, "Probe location");

    for entry in layers.iter().rev() {
        let layer = &entry.layer;
        let Some(request) = layer.locate(&base) else {
            debug!(layer = %layer.id, max_zoom = layer.max_zoom, "Layer has no tiles at this zoom");
            continue;
        };

        let query = Query::new(
            layer.url_for(request.tile),
            request.tile,
            request.pixel.x,
            request.pixel.y,
            batch_id,
        )
        .with_policy(entry.policy())
        .with_user_data(json!({ "layer": layer.id }));

        let reply = engine.query(query).await;
        match reply.result {
            Ok(value) => {
                info!(layer = %layer.id, median = value.median, "Reading found");
                return Ok(Some(Reading::new(&layer.id, value)));
            }
            Err(e) => {
                debug!(layer = %layer.id, error = %e, "No reading from layer");
            }
        }
    }

    Ok(None)
}

/// Human-readable reading: median and the spread to the next stop up.
pub fn format_reading(reading: &Reading) -> String {
    let spread = reading.max - reading.median;
    let spread = if spread == 0.0 {
        "MAX".to_string()
    } else {
        format!("{:.2}", spread)
    };
    format!("{:.2} ± {} µSv/h", reading.median, spread)
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::{TileLayer, UrlTemplate};
    use std::sync::Arc;
    use test_utils::{dense, RgbaImage};
    use tile_decoder::{EngineConfig, MemoryFetcher, RampKind};

    // Tokyo Station at zoom 10 lands in 256px tile 10/909/403.
    const LAT: f64 = 35.681;
    const LON: f64 = 139.767;

    fn layer(id: &str, template: &str, tile_size: u32) -> LayerConfig {
        LayerConfig {
            layer: TileLayer::new(id, UrlTemplate::parse(template).unwrap(), tile_size).unwrap(),
            alpha_threshold: None,
            ramp: None,
        }
    }

    fn stack() -> Vec<LayerConfig> {
        vec![
            layer("grid", "https://t/Griddata/{z}/{x}/{y}.png", 256),
            layer("points", "https://t/points/{z}/{x}/{y}.png", 256),
        ]
    }

    #[tokio::test]
    async fn test_falls_through_to_lower_layer() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.insert("https://t/points/10/909/403.png", RgbaImage::transparent(256, 256).to_png());
        fetcher.insert(
            "https://t/Griddata/10/909/403.png",
            RgbaImage::filled(256, 256, dense::STOP_0.rgb, 255).to_png(),
        );
        let mut engine = QueryEngine::new(EngineConfig::default(), fetcher.clone());

        let reading = probe(&mut engine, &stack(), LAT, LON, 10, 1).await.unwrap().unwrap();
        assert_eq!(reading.layer, "grid");
        assert_eq!(reading.min, dense::STOP_0.value as f32 as f64);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_top_layer_wins() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.insert(
            "https://t/points/10/909/403.png",
            RgbaImage::filled(256, 256, dense::STOP_1.rgb, 255).to_png(),
        );
        let mut layers = stack();
        layers[1].ramp = Some(RampKind::Dense);
        let mut engine = QueryEngine::new(EngineConfig::default(), fetcher.clone());

        let reading = probe(&mut engine, &layers, LAT, LON, 10, 1).await.unwrap().unwrap();
        assert_eq!(reading.layer, "points");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_target() {
        let fetcher = Arc::new(MemoryFetcher::new());
        let mut engine = QueryEngine::new(EngineConfig::default(), fetcher.clone());

        let reading = probe(&mut engine, &stack(), LAT, LON, 10, 1).await.unwrap();
        assert!(reading.is_none());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_skips_layers_beyond_max_zoom() {
        let fetcher = Arc::new(MemoryFetcher::new());
        let mut layers = stack();
        for entry in &mut layers {
            entry.layer.max_zoom = 5;
        }
        let mut engine = QueryEngine::new(EngineConfig::default(), fetcher.clone());

        assert!(probe(&mut engine, &layers, LAT, LON, 10, 1).await.unwrap().is_none());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_large_tiles_use_parent_tile() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.insert(
            "https://t/Griddata/9/454/201.png",
            RgbaImage::filled(512, 512, dense::STOP_0.rgb, 255).to_png(),
        );
        let layers = vec![layer("grid512", "https://t/Griddata/{z}/{x}/{y}.png", 512)];
        let mut engine = QueryEngine::new(EngineConfig::default(), fetcher.clone());

        let reading = probe(&mut engine, &layers, LAT, LON, 10, 1).await.unwrap();
        assert_eq!(reading.map(|r| r.layer), Some("grid512".to_string()));
    }

    #[test]
    fn test_format_reading() {
        let reading = Reading {
            layer: "l".into(),
            median: 1.5,
            min: 1.0,
            max: 2.0,
        };
        assert_eq!(format_reading(&reading), "1.50 ± 0.50 µSv/h");

        let top = Reading {
            layer: "l".into(),
            median: 55.837,
            min: 55.837,
            max: 55.837,
        };
        assert_eq!(format_reading(&top), "55.84 ± MAX µSv/h");
    }
}
