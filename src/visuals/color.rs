use serde::{Deserialize, Serialize};

pub const MIDPOINT: u8 = 64;

const PITCHES: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorName {
    Red,
    Orange,
    Yellow,
    Green,
    Teal,
    Blue,
    Purple,
    Pink,
    White,
}

impl ColorName {
    pub const ALL: [ColorName; 9] = [
        ColorName::Red,
        ColorName::Orange,
        ColorName::Yellow,
        ColorName::Green,
        ColorName::Teal,
        ColorName::Blue,
        ColorName::Purple,
        ColorName::Pink,
        ColorName::White,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn ramp(self) -> &'static ColorRamp {
        &RAMPS[self.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

#[derive(Debug, Clone, Copy)]
struct Line {
    slope: i32,
    offset: i32,
}

const fn line(slope: i32, offset: i32) -> Line {
    Line { slope, offset }
}

const FLAT_0: Line = line(0, 0);
const FLAT_255: Line = line(0, 255);

impl Line {
    fn at(&self, t: i32) -> u8 {
        (self.slope * t + self.offset).clamp(0, 255) as u8
    }
}

/// Per-channel lines for the dark half (`t = pitch`) and the bright half
/// (`t = pitch - 63`).
struct ColorRamp {
    low: [Line; 3],
    high: [Line; 3],
}

const RAMPS: [ColorRamp; 9] = [
    // red
    ColorRamp {
        low: [line(4, 3), FLAT_0, FLAT_0],
        high: [FLAT_255, line(4, -1), line(4, -1)],
    },
    // orange
    ColorRamp {
        low: [line(4, 3), line(2, 0), FLAT_0],
        high: [FLAT_255, line(2, 126), line(4, -1)],
    },
    // yellow
    ColorRamp {
        low: [line(4, 0), line(4, 0), FLAT_0],
        high: [FLAT_255, FLAT_255, line(4, -1)],
    },
    // green
    ColorRamp {
        low: [FLAT_0, line(4, 3), FLAT_0],
        high: [line(4, -1), FLAT_255, line(4, -1)],
    },
    // teal
    ColorRamp {
        low: [FLAT_0, line(4, 3), line(4, 3)],
        high: [line(4, -1), FLAT_255, FLAT_255],
    },
    // blue
    ColorRamp {
        low: [FLAT_0, FLAT_0, line(4, 3)],
        high: [line(2, -1), line(4, -1), FLAT_255],
    },
    // purple
    ColorRamp {
        low: [line(2, 0), FLAT_0, line(4, 3)],
        high: [line(2, 126), line(4, -1), FLAT_255],
    },
    // pink
    ColorRamp {
        low: [line(4, 3), FLAT_0, line(2, 3)],
        high: [FLAT_255, line(4, -1), line(2, 126)],
    },
    // white
    ColorRamp {
        low: [line(2, 0), line(2, 0), line(2, 0)],
        high: [line(2, 126), line(2, 126), line(2, 126)],
    },
];

pub fn resolve_color(color: ColorName, pitch: u8) -> Option<Rgb> {
    if pitch as usize >= PITCHES {
        return None;
    }
    let ramp = color.ramp();
    let (lines, t) = if pitch < MIDPOINT {
        (&ramp.low, pitch as i32)
    } else {
        (&ramp.high, pitch as i32 - (MIDPOINT as i32 - 1))
    };
    Some(Rgb::new(lines[0].at(t), lines[1].at(t), lines[2].at(t)))
}

pub struct ColorTable {
    entries: Vec<[Rgb; PITCHES]>,
}

impl ColorTable {
    pub fn generate() -> Self {
        let entries = ColorName::ALL
            .iter()
            .map(|&color| {
                let mut row = [Rgb::BLACK; PITCHES];
                for (pitch, slot) in row.iter_mut().enumerate() {
                    if let Some(rgb) = resolve_color(color, pitch as u8) {
                        *slot = rgb;
                    }
                }
                row
            })
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, color: ColorName, pitch: u8) -> Option<Rgb> {
        self.entries.get(color.index())?.get(pitch as usize).copied()
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(color: ColorName, pitch: u8) -> Rgb {
        resolve_color(color, pitch).unwrap()
    }

    #[test]
    fn test_channels_never_decrease_within_a_half() {
        for color in ColorName::ALL {
            for range in [0..63u8, MIDPOINT..127u8] {
                for pitch in range {
                    let here = rgb(color, pitch).channels();
                    let next = rgb(color, pitch + 1).channels();
                    for ch in 0..3 {
                        assert!(
                            next[ch] >= here[ch],
                            "{:?} channel {} drops between {} and {}",
                            color,
                            ch,
                            pitch,
                            pitch + 1
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_lowest_pitch_is_near_black() {
        for color in ColorName::ALL {
            let c = rgb(color, 0);
            assert!(c.channels().iter().all(|&v| v <= 3), "{:?}: {:?}", color, c);
        }
    }

    #[test]
    fn test_midpoint_is_saturated_hue() {
        for color in ColorName::ALL {
            if color == ColorName::White {
                continue;
            }
            let c = rgb(color, 63);
            let max = c.channels().into_iter().max().unwrap();
            let min = c.channels().into_iter().min().unwrap();
            assert!(max >= 250, "{:?}: {:?}", color, c);
            assert_eq!(min, 0, "{:?} should still be a pure tint: {:?}", color, c);
        }
    }

    #[test]
    fn test_highest_pitch_is_near_white() {
        for color in ColorName::ALL {
            let c = rgb(color, 127);
            let saturated = c.channels().iter().filter(|&&v| v == 255).count();
            if color == ColorName::White {
                assert!(c.channels().iter().all(|&v| v >= 250), "{:?}", c);
            } else {
                assert!(saturated >= 2, "{:?}: {:?}", color, c);
                assert!(c.channels().iter().all(|&v| v >= 127), "{:?}: {:?}", color, c);
            }
        }
    }

    #[test]
    fn test_known_values() {
        assert_eq!(rgb(ColorName::Red, 0), Rgb::new(3, 0, 0));
        assert_eq!(rgb(ColorName::Red, 64), Rgb::new(255, 3, 3));
        assert_eq!(rgb(ColorName::Yellow, 32), Rgb::new(128, 128, 0));
        assert_eq!(rgb(ColorName::White, 100), Rgb::new(200, 200, 200));
    }

    #[test]
    fn test_out_of_range_pitch_misses() {
        assert_eq!(resolve_color(ColorName::Blue, 128), None);
        assert_eq!(ColorTable::generate().lookup(ColorName::Blue, 200), None);
    }

    #[test]
    fn test_table_matches_direct_computation() {
        let table = ColorTable::generate();
        for color in ColorName::ALL {
            for pitch in [0u8, 1, 63, 64, 100, 127] {
                assert_eq!(table.lookup(color, pitch), resolve_color(color, pitch));
            }
        }
    }
}
