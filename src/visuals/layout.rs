use serde::{Deserialize, Serialize};

pub const CANVAS_WIDTH: f64 = 1360.0;
pub const CANVAS_HEIGHT: f64 = 765.0;
pub const MARGIN_X: f64 = 40.0;
pub const MARGIN_Y: f64 = 22.5;

const DATA_RANGE: f64 = 128.0;
const SIZE_SCALE: f64 = 2048.0 / (CANVAS_WIDTH * 4.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
}

/// Pixel rectangle inside the drawing area, origin at the bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

const fn rect(x: f64, y: f64, width: f64, height: f64) -> RegionRect {
    RegionRect {
        x,
        y,
        width,
        height,
    }
}

impl Region {
    pub const ALL: [Region; 11] = [
        Region::A,
        Region::B,
        Region::C,
        Region::D,
        Region::E,
        Region::F,
        Region::G,
        Region::H,
        Region::I,
        Region::J,
        Region::K,
    ];

    pub fn rect(self) -> RegionRect {
        match self {
            Region::A => rect(0.0, 600.0, 160.0, 120.0),
            Region::B => rect(0.0, 480.0, 160.0, 120.0),
            Region::C => rect(0.0, 240.0, 320.0, 240.0),
            Region::D => rect(0.0, 0.0, 320.0, 240.0),
            Region::E => rect(160.0, 480.0, 160.0, 240.0),
            Region::F => rect(320.0, 240.0, 440.0, 480.0),
            Region::G => rect(320.0, 0.0, 960.0, 240.0),
            Region::H => rect(800.0, 240.0, 240.0, 480.0),
            Region::I => rect(1040.0, 360.0, 240.0, 240.0),
            Region::J => rect(1040.0, 240.0, 120.0, 240.0),
            Region::K => rect(1160.0, 240.0, 120.0, 240.0),
        }
    }

    pub fn transform(self) -> AffineMap {
        let r = self.rect();
        AffineMap {
            scale_x: r.width / CANVAS_WIDTH,
            offset_x: (r.x + MARGIN_X) / CANVAS_WIDTH,
            scale_y: r.height / CANVAS_HEIGHT,
            offset_y: (r.y + MARGIN_Y) / CANVAS_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMap {
    pub scale_x: f64,
    pub offset_x: f64,
    pub scale_y: f64,
    pub offset_y: f64,
}

impl AffineMap {
    pub const IDENTITY: AffineMap = AffineMap {
        scale_x: 1.0,
        offset_x: 0.0,
        scale_y: 1.0,
        offset_y: 0.0,
    };

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.scale_x * x + self.offset_x,
            self.scale_y * y + self.offset_y,
        )
    }
}

pub fn compute_size(velocity: u8) -> f64 {
    velocity as f64 / DATA_RANGE * SIZE_SCALE
}

pub fn normalized_position(pitch: u8) -> (f64, f64) {
    let t = pitch as f64 / DATA_RANGE;
    (t, t)
}

pub fn rescale_by_region(x: f64, y: f64, region: Option<Region>) -> (f64, f64) {
    region
        .map(Region::transform)
        .unwrap_or(AffineMap::IDENTITY)
        .apply(x, y)
}

pub fn place(pitch: u8, region: Option<Region>) -> (f64, f64) {
    let (x, y) = normalized_position(pitch);
    rescale_by_region(x, y, region)
}
