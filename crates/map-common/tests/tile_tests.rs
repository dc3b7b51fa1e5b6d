//! Tests for Web Mercator pixel addressing and layer translation.

use map_common::{PixelCoord, TileCoord, TileLayer, TileRequest, UrlTemplate};

// ============================================================================
// Projection tests
// ============================================================================

#[test]
fn test_latitude_is_clamped_to_mercator_plane() {
    let north = PixelCoord::from_lat_lon(89.9, 0.0, 256, 2).unwrap();
    let edge = PixelCoord::from_lat_lon(85.05112878, 0.0, 256, 2).unwrap();
    assert_eq!(north, edge);
    assert_eq!(north.y, 0);
}

#[test]
fn test_far_south_stays_inside_world() {
    let p = PixelCoord::from_lat_lon(-89.0, 179.999, 256, 3).unwrap();
    let world = 256u64 << 3;
    assert!(p.x < world);
    assert!(p.y < world);
}

#[test]
fn test_rejects_non_finite() {
    assert!(PixelCoord::from_lat_lon(f64::NAN, 0.0, 256, 1).is_err());
    assert!(PixelCoord::from_lat_lon(0.0, f64::INFINITY, 256, 1).is_err());
}

#[test]
fn test_rejects_excessive_zoom() {
    assert!(PixelCoord::from_lat_lon(0.0, 0.0, 256, 31).is_err());
}

#[test]
fn test_tokyo_tile_at_zoom_10() {
    // Tokyo station sits in tile 10/909/403 of the standard slippy-map grid.
    let req = TileRequest::from_lat_lon(35.681, 139.767, 256, 10).unwrap();
    assert_eq!(req.tile, TileCoord::new(10, 909, 403));
}

// ============================================================================
// Layer translation tests
// ============================================================================

fn layer(tile_size: u32) -> TileLayer {
    let t = UrlTemplate::parse("https://tiles.example/{z}/{x}/{y}.png").unwrap();
    TileLayer::new("test", t, tile_size).unwrap()
}

#[test]
fn test_same_size_layer_is_unchanged() {
    let req = TileRequest::from_lat_lon(37.42, 141.03, 256, 12).unwrap();
    assert_eq!(layer(256).locate(&req), Some(req));
}

#[test]
fn test_512_layer_uses_parent_tile_and_same_pixel() {
    let req = TileRequest::from_lat_lon(37.42, 141.03, 256, 12).unwrap();
    let translated = layer(512).locate(&req).unwrap();

    assert_eq!(Some(translated.tile), req.tile.parent());
    assert_eq!(translated.pixel, req.pixel);
    assert_eq!(translated.tile_size, 512);

    // The global pixel still falls inside the translated tile.
    assert_eq!(translated.pixel.tile(512, translated.tile.z), translated.tile);
}

#[test]
fn test_512_layer_at_zoom_zero_scales_pixel() {
    let req = TileRequest::from_lat_lon(0.0, 0.0, 256, 0).unwrap();
    let translated = layer(512).locate(&req).unwrap();
    assert_eq!(translated.tile, TileCoord::new(0, 0, 0));
    assert_eq!(translated.pixel, PixelCoord::new(req.pixel.x * 2, req.pixel.y * 2));
}

#[test]
fn test_layer_beyond_max_zoom_is_skipped() {
    let req = TileRequest::from_lat_lon(37.42, 141.03, 256, 18).unwrap();
    assert!(layer(256).with_max_zoom(17).locate(&req).is_none());
    // 512px tiles are addressed one level up.
    assert!(layer(512).with_max_zoom(17).locate(&req).is_some());
}

#[test]
fn test_layer_deserializes_with_defaults() {
    let json = r#"{"id": "points", "url_template": "https://t/{z}/{x}/{y}.png"}"#;
    let layer: TileLayer = serde_json::from_str(json).unwrap();
    assert_eq!(layer.tile_size, 256);
    assert_eq!(layer.max_zoom, 23);
    assert_eq!(layer.url_for(TileCoord::new(1, 2, 3)), "https://t/1/2/3.png");
}

#[test]
fn test_layer_with_bad_template_fails_to_deserialize() {
    let json = r#"{"id": "points", "url_template": "https://t/{z}/{x}.png"}"#;
    assert!(serde_json::from_str::<TileLayer>(json).is_err());
}
