//! Per-query decode policy: which pixels count as data and which ramp decodes them.
//!
//! Callers should state both explicitly. When they do not, the values are
//! guessed from the tile URL the way older tile sets require. That guess is a
//! compatibility shim tied to historical dataset names; new tile sets should
//! pass an explicit policy instead of adding markers here.

use crate::ramp::RampKind;
use serde::{Deserialize, Serialize};

/// Alpha a pixel needs by default: fully opaque.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 255;

/// Inverse-distance-weighted test renders leave partially transparent edges.
const IDW_TEST_MARKER: &str = "TestIDW";
const IDW_TEST_ALPHA_THRESHOLD: u8 = 1;

/// 2013/2014 tile sets were rendered with alpha 254.
const ALPHA_254_MARKERS: [&str; 4] = [
    "tiles20130415sc",
    "tiles20140311sc",
    "te20130415",
    "te20140311",
];
const ALPHA_254_THRESHOLD: u8 = 254;

/// Tile sets drawn with the dense (interpolated grid) ramp.
const DENSE_RAMP_MARKERS: [&str; 2] = ["Griddata", "tg512"];

/// Explicit overrides a caller may attach to a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_threshold: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ramp: Option<RampKind>,
}

/// Effective decode settings for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodePolicy {
    pub alpha_threshold: u8,
    pub ramp: RampKind,
}

impl DecodePolicy {
    /// Resolve the policy for `source_id`, preferring explicit overrides.
    pub fn resolve(source_id: &str, overrides: PolicyOverride) -> Self {
        Self {
            alpha_threshold: overrides
                .alpha_threshold
                .unwrap_or_else(|| legacy_alpha_threshold(source_id)),
            ramp: overrides.ramp.unwrap_or_else(|| legacy_ramp(source_id)),
        }
    }
}

/// Alpha threshold guessed from the source URL.
pub fn legacy_alpha_threshold(source_id: &str) -> u8 {
    if source_id.contains(IDW_TEST_MARKER) {
        IDW_TEST_ALPHA_THRESHOLD
    } else if ALPHA_254_MARKERS.iter().any(|m| source_id.contains(m)) {
        ALPHA_254_THRESHOLD
    } else {
        DEFAULT_ALPHA_THRESHOLD
    }
}

/// Ramp guessed from the source URL.
pub fn legacy_ramp(source_id: &str) -> RampKind {
    if DENSE_RAMP_MARKERS.iter().any(|m| source_id.contains(m)) {
        RampKind::Dense
    } else {
        RampKind::Coarse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_alpha_threshold() {
        assert_eq!(legacy_alpha_threshold("https://t/TestIDW/1/2/3.png"), 1);
        assert_eq!(legacy_alpha_threshold("https://t/tiles20130415sc/1/2/3.png"), 254);
        assert_eq!(legacy_alpha_threshold("https://t/te20140311/1/2/3.png"), 254);
        assert_eq!(legacy_alpha_threshold("https://t/points/1/2/3.png"), 255);
    }

    #[test]
    fn test_idw_marker_takes_precedence() {
        assert_eq!(legacy_alpha_threshold("https://t/TestIDW/te20130415/1.png"), 1);
    }

    #[test]
    fn test_legacy_ramp() {
        assert_eq!(legacy_ramp("https://t/Griddata/1/2/3.png"), RampKind::Dense);
        assert_eq!(legacy_ramp("https://t/tg512/1/2/3.png"), RampKind::Dense);
        assert_eq!(legacy_ramp("https://t/griddata/1/2/3.png"), RampKind::Coarse);
        assert_eq!(legacy_ramp("https://t/points/1/2/3.png"), RampKind::Coarse);
    }

    #[test]
    fn test_overrides_apply_per_field() {
        let url = "https://t/Griddata/TestIDW/1/2/3.png";
        let p = DecodePolicy::resolve(
            url,
            PolicyOverride {
                alpha_threshold: Some(200),
                ramp: None,
            },
        );
        assert_eq!(p.alpha_threshold, 200);
        assert_eq!(p.ramp, RampKind::Dense);

        let p = DecodePolicy::resolve(
            url,
            PolicyOverride {
                alpha_threshold: None,
                ramp: Some(RampKind::Coarse),
            },
        );
        assert_eq!(p.alpha_threshold, 1);
        assert_eq!(p.ramp, RampKind::Coarse);
    }
}
