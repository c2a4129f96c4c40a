use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{ColorName, Region, ShapeKind};
use crate::error::{Error, Result};

const PROGRAMS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualDescriptor {
    pub color: ColorName,
    pub shape: ShapeKind,
    pub region: Option<Region>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorRule {
    pub programs: (u8, u8),
    pub percussion: bool,
    pub color: ColorName,
    pub shape: ShapeKind,
    pub region: Option<Region>,
}

/// On-disk form of a mapping asset. Later rules override earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingFile {
    pub rules: Vec<DescriptorRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorTable {
    melodic: Vec<Option<VisualDescriptor>>,
    percussion: Vec<Option<VisualDescriptor>>,
}

impl DescriptorTable {
    pub fn empty() -> Self {
        Self {
            melodic: vec![None; PROGRAMS],
            percussion: vec![None; PROGRAMS],
        }
    }

    pub fn from_rules(rules: &[DescriptorRule]) -> Result<Self> {
        let mut table = Self::empty();
        for rule in rules {
            let (first, last) = rule.programs;
            if first > last || last as usize >= PROGRAMS {
                return Err(Error::Mapping(format!(
                    "bad program range {}..={}",
                    first, last
                )));
            }
            table.apply(rule);
        }
        Ok(table)
    }

    pub fn general_midi() -> Self {
        let mut table = Self::empty();
        for rule in &general_midi_rules() {
            table.apply(rule);
        }
        table
    }

    fn apply(&mut self, rule: &DescriptorRule) {
        let slots = if rule.percussion {
            &mut self.percussion
        } else {
            &mut self.melodic
        };
        let descriptor = VisualDescriptor {
            color: rule.color,
            shape: rule.shape,
            region: rule.region,
        };
        let (first, last) = rule.programs;
        for slot in &mut slots[first as usize..=last as usize] {
            *slot = Some(descriptor);
        }
    }

    pub fn from_ron_str(s: &str) -> Result<Self> {
        let file: MappingFile = ron::from_str(s)?;
        Self::from_rules(&file.rules)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let table = Self::from_ron_str(&s)?;
        let gaps = table.gaps();
        if !gaps.is_empty() {
            tracing::warn!(
                "Mapping {} leaves {} program slots unmapped",
                path.display(),
                gaps.len()
            );
        }
        Ok(table)
    }

    pub fn lookup(&self, program: u8, percussion: bool) -> Option<&VisualDescriptor> {
        let slots = if percussion {
            &self.percussion
        } else {
            &self.melodic
        };
        slots.get(program as usize)?.as_ref()
    }

    pub fn gaps(&self) -> Vec<(u8, bool)> {
        let mut gaps = Vec::new();
        for (percussion, slots) in [(false, &self.melodic), (true, &self.percussion)] {
            for (program, slot) in slots.iter().enumerate() {
                if slot.is_none() {
                    gaps.push((program as u8, percussion));
                }
            }
        }
        gaps
    }
}

impl Default for DescriptorTable {
    fn default() -> Self {
        Self::general_midi()
    }
}

fn rule(
    first: u8,
    last: u8,
    percussion: bool,
    color: ColorName,
    shape: ShapeKind,
    region: Option<Region>,
) -> DescriptorRule {
    DescriptorRule {
        programs: (first, last),
        percussion,
        color,
        shape,
        region,
    }
}

pub fn general_midi_rules() -> Vec<DescriptorRule> {
    use ColorName::*;
    use Region::*;

    const SQUARE: ShapeKind = ShapeKind::Square;
    const HRECT: ShapeKind = ShapeKind::HorizontalRect;
    const RDIAG: ShapeKind = ShapeKind::RIGHT_DIAGONAL;
    const LDIAG: ShapeKind = ShapeKind::LEFT_DIAGONAL;
    const CIRCLE: ShapeKind = ShapeKind::Circle;
    const ZIGZAG: ShapeKind = ShapeKind::Zigzag;
    const WAVE: ShapeKind = ShapeKind::Wave;

    let m = |first, last, color, shape, region| rule(first, last, false, color, shape, region);
    let p = |first, last, color, shape, region| rule(first, last, true, color, shape, region);

    vec![
        // pianos, chromatic percussion
        m(0, 5, Red, SQUARE, Some(C)),
        m(6, 6, Orange, SQUARE, Some(C)),
        m(7, 7, Yellow, SQUARE, Some(C)),
        m(8, 15, Yellow, CIRCLE, Some(E)),
        // organs, guitars
        m(16, 23, Yellow, HRECT, Some(C)),
        m(24, 25, Green, HRECT, Some(H)),
        m(26, 30, Yellow, HRECT, Some(F)),
        m(31, 31, Green, HRECT, Some(H)),
        // basses
        m(32, 32, Green, WAVE, Some(G)),
        m(33, 34, Red, WAVE, Some(G)),
        m(35, 35, Green, WAVE, Some(G)),
        m(36, 37, Orange, WAVE, Some(G)),
        m(38, 39, Blue, WAVE, Some(G)),
        // strings, ensembles
        m(40, 41, Pink, LDIAG, Some(A)),
        m(42, 42, Blue, LDIAG, Some(H)),
        m(43, 43, Green, LDIAG, Some(G)),
        m(44, 46, Yellow, LDIAG, Some(H)),
        m(47, 47, Green, LDIAG, Some(H)),
        m(48, 49, Yellow, LDIAG, Some(H)),
        m(50, 51, Pink, HRECT, Some(H)),
        m(52, 54, Purple, HRECT, Some(B)),
        m(55, 55, White, CIRCLE, None),
        // brass
        m(56, 56, Yellow, RDIAG, Some(J)),
        m(57, 57, Blue, RDIAG, Some(J)),
        m(58, 58, Green, RDIAG, Some(J)),
        m(59, 59, Yellow, RDIAG, Some(J)),
        m(60, 60, Blue, RDIAG, Some(J)),
        m(61, 61, Orange, RDIAG, Some(J)),
        m(62, 63, Teal, HRECT, Some(J)),
        // reeds, pipes
        m(64, 67, Blue, RDIAG, Some(J)),
        m(68, 68, Green, RDIAG, Some(J)),
        m(69, 70, Blue, RDIAG, Some(J)),
        m(71, 71, Purple, RDIAG, Some(J)),
        m(72, 79, Pink, RDIAG, Some(J)),
        // synth leads, pads
        m(80, 84, Pink, HRECT, Some(D)),
        m(85, 85, Purple, HRECT, Some(B)),
        m(86, 86, Pink, HRECT, Some(D)),
        m(87, 88, Teal, HRECT, Some(I)),
        m(89, 89, Pink, HRECT, Some(I)),
        m(90, 90, Purple, HRECT, Some(I)),
        m(91, 91, Purple, HRECT, Some(B)),
        m(92, 92, Pink, HRECT, Some(I)),
        m(93, 93, Teal, HRECT, Some(I)),
        m(94, 94, Pink, HRECT, Some(I)),
        // synth effects
        m(95, 100, White, HRECT, Some(K)),
        m(101, 102, Purple, HRECT, Some(B)),
        m(103, 103, Teal, HRECT, Some(I)),
        // ethnic
        m(104, 108, Green, LDIAG, Some(H)),
        m(109, 109, Pink, RDIAG, Some(J)),
        m(110, 111, Green, LDIAG, Some(H)),
        // percussive, sound effects
        m(112, 113, Yellow, CIRCLE, Some(E)),
        m(114, 117, Red, CIRCLE, Some(E)),
        m(118, 118, Purple, HRECT, Some(E)),
        m(119, 119, Orange, CIRCLE, Some(E)),
        m(120, 120, Green, HRECT, Some(F)),
        m(121, 122, White, SQUARE, Some(I)),
        m(123, 123, Pink, RDIAG, Some(J)),
        m(124, 124, Yellow, CIRCLE, Some(J)),
        m(125, 127, White, CIRCLE, Some(D)),
        // percussion channel: drums by default, then specific kit pieces
        p(0, 127, Red, CIRCLE, Some(E)),
        p(34, 34, Yellow, CIRCLE, Some(J)),
        p(38, 38, White, SQUARE, Some(K)),
        p(39, 39, White, CIRCLE, Some(E)),
        p(40, 40, White, SQUARE, Some(K)),
        p(42, 42, White, SQUARE, Some(K)),
        p(44, 44, White, SQUARE, Some(K)),
        p(46, 46, White, SQUARE, Some(K)),
        p(49, 49, Orange, CIRCLE, Some(K)),
        p(51, 52, Orange, CIRCLE, Some(K)),
        p(53, 53, White, SQUARE, Some(J)),
        p(54, 54, White, SQUARE, Some(K)),
        p(55, 55, Orange, CIRCLE, Some(K)),
        p(56, 56, Yellow, CIRCLE, Some(J)),
        p(57, 57, Orange, CIRCLE, Some(K)),
        p(58, 58, Red, ZIGZAG, Some(E)),
        p(59, 59, White, SQUARE, Some(K)),
        p(60, 64, Orange, CIRCLE, Some(E)),
        p(67, 68, Yellow, CIRCLE, Some(E)),
        p(69, 70, White, SQUARE, Some(K)),
        p(71, 72, Pink, RDIAG, Some(J)),
        p(73, 74, Red, ZIGZAG, Some(E)),
        p(78, 79, Blue, RDIAG, Some(E)),
        p(80, 81, Green, CIRCLE, Some(J)),
    ]
}
