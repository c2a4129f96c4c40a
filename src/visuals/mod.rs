mod color;
mod descriptor;
mod layout;
mod shape;

pub use color::{ColorName, ColorTable, MIDPOINT, Rgb, resolve_color};
pub use descriptor::{
    DescriptorRule, DescriptorTable, MappingFile, VisualDescriptor, general_midi_rules,
};
pub use layout::{
    AffineMap, CANVAS_HEIGHT, CANVAS_WIDTH, Region, RegionRect, compute_size, normalized_position,
    place, rescale_by_region,
};
pub use shape::{Outline, Point, ShapeKind, vertices_for};

use crate::error::LookupError;
use std::path::Path;

pub trait VisualStore {
    fn lookup_descriptor(
        &self,
        program: u8,
        percussion: bool,
    ) -> Result<VisualDescriptor, LookupError>;

    fn lookup_color(&self, color: ColorName, pitch: u8) -> Result<Rgb, LookupError>;
}

pub struct Resolver {
    descriptors: DescriptorTable,
    colors: ColorTable,
}

impl Resolver {
    pub fn new(descriptors: DescriptorTable) -> Self {
        Self {
            descriptors,
            colors: ColorTable::generate(),
        }
    }

    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let descriptors = match path {
            Some(path) => {
                tracing::info!("Loading mappings from {}", path.display());
                DescriptorTable::load(path)?
            }
            None => DescriptorTable::general_midi(),
        };
        Ok(Self::new(descriptors))
    }

    pub fn resolve_descriptor(&self, program: u8, percussion: bool) -> Option<VisualDescriptor> {
        self.descriptors.lookup(program, percussion).copied()
    }

    pub fn resolve_color(&self, color: ColorName, pitch: u8) -> Option<Rgb> {
        self.colors.lookup(color, pitch)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DescriptorTable::general_midi())
    }
}

impl VisualStore for Resolver {
    fn lookup_descriptor(
        &self,
        program: u8,
        percussion: bool,
    ) -> Result<VisualDescriptor, LookupError> {
        self.resolve_descriptor(program, percussion)
            .ok_or(LookupError::MissingDescriptor {
                program,
                percussion,
            })
    }

    fn lookup_color(&self, color: ColorName, pitch: u8) -> Result<Rgb, LookupError> {
        self.resolve_color(color, pitch)
            .ok_or(LookupError::MissingColor { color, pitch })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_store_lookups() {
        let resolver = Resolver::default();

        let desc = resolver.lookup_descriptor(0, false).unwrap();
        assert_eq!(desc.color, ColorName::Red);
        assert_eq!(
            resolver.lookup_color(desc.color, 60).unwrap(),
            resolve_color(ColorName::Red, 60).unwrap()
        );
        assert_eq!(
            resolver.lookup_color(ColorName::Red, 128),
            Err(LookupError::MissingColor {
                color: ColorName::Red,
                pitch: 128
            })
        );
    }

    #[test]
    fn test_resolver_reports_unmapped_program() {
        let resolver = Resolver::new(DescriptorTable::empty());
        assert_eq!(
            resolver.lookup_descriptor(12, true),
            Err(LookupError::MissingDescriptor {
                program: 12,
                percussion: true
            })
        );
    }
}
