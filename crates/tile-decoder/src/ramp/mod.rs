//! Color ramp lookup: recovers the value a heatmap color was rendered from.
//!
//! A ramp is a sorted list of stops, each pairing a palette color with the
//! value at which that color starts. Lookup runs in three tiers:
//!
//! 1. Exact match against the stop colors.
//! 2. Memoized result of an earlier fallback search for the same color.
//! 3. Brute-force nearest color by squared RGB distance, memoized afterwards.
//!
//! Colors far from every stop still resolve, but the result is rewritten to
//! `min = 0, max = -2 * median` so callers can tell them apart from real
//! readings (see [`RampValue::is_failure`]).

mod tables;

use serde::{Deserialize, Serialize};
use tables::EncodedRamp;

/// Squared RGB distance below which a fallback match counts as "close".
pub const MATCH_DISTANCE_SQ: u32 = 1000;

/// Fallback search stops early once a stop is at most this far away.
const EARLY_EXIT_DISTANCE_SQ: u32 = 1;

/// Entries held by each fallback memo before new colors are dropped.
pub const MEMO_CAPACITY: usize = 2048;

/// Which of the two fixed color ramps a tile was rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RampKind {
    /// 329 stops; interpolated grid layers.
    Dense,
    /// 64 stops; point and density layers.
    Coarse,
}

/// Value range recovered for one color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampValue {
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl RampValue {
    /// True when the lookup fell outside the ramp.
    ///
    /// Only the exact pattern `min == 0 && max < 0` counts; a genuine reading
    /// at the bottom of a ramp that starts at zero has `max >= 0`.
    pub fn is_failure(&self) -> bool {
        self.min == 0.0 && self.max < 0.0
    }
}

/// Lookup counters for one ramp instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RampStats {
    /// Colors found among the stops directly
    pub exact_hits: u64,
    /// Colors that needed a memo or a fallback search
    pub misses: u64,
    /// Brute-force searches actually run
    pub fallback_searches: u64,
}

#[derive(Debug, Clone, Copy)]
struct MemoEntry {
    key: u32,
    stop: u16,
    distance_sq: u32,
}

/// Fixed-capacity, append-only color memo. Once full, new colors are not recorded.
#[derive(Debug)]
struct ColorMemo {
    entries: Vec<MemoEntry>,
    capacity: usize,
}

impl ColorMemo {
    fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    fn get(&self, key: u32) -> Option<MemoEntry> {
        self.entries.iter().find(|e| e.key == key).copied()
    }

    fn push(&mut self, entry: MemoEntry) {
        if self.entries.len() < self.capacity {
            self.entries.push(entry);
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Pack an RGB triple into a single comparable key.
#[inline(always)]
fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8)
}

/// An immutable color ramp plus its lookup memos.
#[derive(Debug)]
pub struct ColorRamp {
    kind: RampKind,
    r: Vec<u8>,
    g: Vec<u8>,
    b: Vec<u8>,
    z: Vec<f32>,
    keys: Vec<u32>,
    matched: ColorMemo,
    unmatched: ColorMemo,
    stats: RampStats,
}

impl ColorRamp {
    pub fn new(kind: RampKind) -> Self {
        let encoded = match kind {
            RampKind::Dense => &tables::DENSE,
            RampKind::Coarse => &tables::COARSE,
        };
        Self::from_encoded(kind, encoded)
    }

    fn from_encoded(kind: RampKind, encoded: &EncodedRamp) -> Self {
        let r = decode_hex_u8(encoded.red);
        let g = decode_hex_u8(encoded.green);
        let b = decode_hex_u8(encoded.blue);
        let z: Vec<f32> = decode_hex_u16(encoded.value)
            .into_iter()
            .map(|v| (v as f64 * 0.001) as f32)
            .collect();

        debug_assert!(r.len() == g.len() && g.len() == b.len() && b.len() == z.len());

        let keys = r
            .iter()
            .zip(&g)
            .zip(&b)
            .map(|((&r, &g), &b)| pack_rgb(r, g, b))
            .collect();

        Self {
            kind,
            r,
            g,
            b,
            z,
            keys,
            matched: ColorMemo::new(MEMO_CAPACITY),
            unmatched: ColorMemo::new(MEMO_CAPACITY),
            stats: RampStats::default(),
        }
    }

    pub fn kind(&self) -> RampKind {
        self.kind
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    /// Color of stop `i`.
    pub fn stop_color(&self, i: usize) -> Option<(u8, u8, u8)> {
        Some((*self.r.get(i)?, *self.g.get(i)?, *self.b.get(i)?))
    }

    /// Value at stop `i`.
    pub fn stop_value(&self, i: usize) -> Option<f32> {
        self.z.get(i).copied()
    }

    pub fn stats(&self) -> RampStats {
        self.stats
    }

    /// Entries recorded in the close-match and far-match memos.
    pub fn memo_sizes(&self) -> (usize, usize) {
        (self.matched.len(), self.unmatched.len())
    }

    /// Resolve a pixel color to the value range it encodes. Never fails;
    /// see the module docs for how far-off colors are flagged.
    pub fn resolve(&mut self, r: u8, g: u8, b: u8) -> RampValue {
        let key = pack_rgb(r, g, b);

        let (stop, distance_sq) = match self.keys.iter().position(|&k| k == key) {
            Some(i) => {
                self.stats.exact_hits += 1;
                (i, 0)
            }
            None => {
                self.stats.misses += 1;
                let found = self
                    .matched
                    .get(key)
                    .or_else(|| self.unmatched.get(key))
                    .unwrap_or_else(|| self.nearest_stop(key, r, g, b));
                (found.stop as usize, found.distance_sq)
            }
        };

        self.value_at(stop, distance_sq)
    }

    fn value_at(&self, stop: usize, distance_sq: u32) -> RampValue {
        let min = self.z[stop] as f64;
        let max = match self.z.get(stop + 1) {
            Some(&next) => next as f64,
            None => min,
        };
        let median = (min + max) * 0.5;

        if distance_sq > MATCH_DISTANCE_SQ {
            return RampValue {
                median,
                min: 0.0,
                max: median * -2.0,
            };
        }

        RampValue { median, min, max }
    }

    /// Brute-force nearest stop by squared RGB distance; records the result.
    fn nearest_stop(&mut self, key: u32, r: u8, g: u8, b: u8) -> MemoEntry {
        self.stats.fallback_searches += 1;

        let mut best = 0usize;
        let mut best_d = u32::MAX;
        for i in 0..self.z.len() {
            let dr = self.r[i] as i32 - r as i32;
            let dg = self.g[i] as i32 - g as i32;
            let db = self.b[i] as i32 - b as i32;
            let d = (dr * dr + dg * dg + db * db) as u32;

            if d < best_d {
                best = i;
                best_d = d;
                if d <= EARLY_EXIT_DISTANCE_SQ {
                    break;
                }
            }
        }

        let entry = MemoEntry {
            key,
            stop: best as u16,
            distance_sq: best_d,
        };

        if best_d < MATCH_DISTANCE_SQ {
            self.matched.push(entry);
        } else {
            self.unmatched.push(entry);
        }

        entry
    }
}

fn decode_hex_u8(s: &str) -> Vec<u8> {
    s.as_bytes()
        .chunks_exact(2)
        .map(|pair| (hex_nibble(pair[0]) << 4) | hex_nibble(pair[1]))
        .collect()
}

fn decode_hex_u16(s: &str) -> Vec<u16> {
    s.as_bytes()
        .chunks_exact(4)
        .map(|quad| {
            quad.iter()
                .fold(0u16, |acc, &c| (acc << 4) | hex_nibble(c) as u16)
        })
        .collect()
}

// Tables are compile-time constants; anything else is a typo in them.
fn hex_nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}
