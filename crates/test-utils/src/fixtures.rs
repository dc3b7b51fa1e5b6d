//! Known ramp colors and tile URLs.
//!
//! Stop colors and values are copied from the ramp tables so tests can build
//! rasters whose decoded values are known in advance.

/// A ramp stop: color and the value it encodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopFixture {
    pub rgb: [u8; 3],
    pub value: f64,
}

/// Stops of the dense (329 stop) ramp.
pub mod dense {
    use super::StopFixture;

    pub const STOP_0: StopFixture = StopFixture {
        rgb: [1, 1, 1],
        value: 0.030,
    };
    pub const STOP_1: StopFixture = StopFixture {
        rgb: [25, 15, 124],
        value: 0.062,
    };
    pub const STOP_2: StopFixture = StopFixture {
        rgb: [13, 16, 255],
        value: 0.094,
    };
    pub const LAST: StopFixture = StopFixture {
        rgb: [255, 255, 253],
        value: 55.837,
    };
}

/// Stops of the coarse (64 stop) ramp.
pub mod coarse {
    use super::StopFixture;

    pub const STOP_0: StopFixture = StopFixture {
        rgb: [7, 6, 10],
        value: 0.030,
    };
    pub const STOP_1: StopFixture = StopFixture {
        rgb: [15, 11, 26],
        value: 0.034,
    };
    pub const STOP_2: StopFixture = StopFixture {
        rgb: [19, 13, 42],
        value: 0.039,
    };
    pub const LAST: StopFixture = StopFixture {
        rgb: [255, 255, 241],
        value: 36.561,
    };
}

/// Pure green sits far from every stop of both ramps.
pub const FAR_COLOR: [u8; 3] = [0, 255, 0];

/// Tile URLs whose names trigger the legacy policy guesses.
pub mod sources {
    /// Dense ramp, alpha 255
    pub const GRIDDATA: &str = "https://tiles.example.org/Griddata/10/909/403.png";
    /// Coarse ramp, alpha 255
    pub const POINTS: &str = "https://tiles.example.org/points/10/909/403.png";
    /// Coarse ramp, alpha 254
    pub const ALPHA_254: &str = "https://tiles.example.org/te20130415/10/909/403.png";
    /// Coarse ramp, alpha 1
    pub const IDW_TEST: &str = "https://tiles.example.org/TestIDW/10/909/403.png";
}
