use crate::cluster::ClusterNode;
use crate::color::Color;
use crate::ord_float::OrdFloat64;

/// Order of colors in a [`Palette`]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaletteOrder {
    /// Breadth-first order of the cluster tree leaves
    Traversal,
    /// Darkest first. Colors of equal luminance keep traversal order.
    #[default]
    Luminance,
}

/// Dominant colors of an image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

/// Palette rendered as square tiles side by side, packed RGB
pub struct SwatchStrip {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Palette {
    /// Builds a palette from cluster leaves given in traversal order
    pub fn from_leaves(leaves: &[&ClusterNode], order: PaletteOrder) -> Self {
        let colors = leaves
            .iter()
            .map(|leaf| {
                let m = leaf.stats.mean;
                Color::from_unit([m[0], m[1], m[2]])
            })
            .collect();

        let mut palette = Self { colors };
        if order == PaletteOrder::Luminance {
            palette.colors.sort_by_key(|c| OrdFloat64::from(c.luminance()));
        }

        palette
    }

    /// The number of colors in the palette
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Color> {
        self.colors.iter()
    }

    /// The color with the lowest luminance
    pub fn darkest(&self) -> Option<Color> {
        self.by_luminance().first().copied()
    }

    /// The color with the median luminance. For an even count the darker of
    /// the two middle colors is returned.
    pub fn average(&self) -> Option<Color> {
        let sorted = self.by_luminance();
        if sorted.is_empty() {
            return None
        }

        Some(sorted[(sorted.len() - 1) / 2])
    }

    /// Renders every color as a `tile_size` square, left to right
    pub fn swatch_strip(&self, tile_size: usize) -> SwatchStrip {
        let width = tile_size * self.colors.len();
        let height = tile_size;
        let mut data = Vec::with_capacity(width * height * 3);

        for _ in 0..height {
            for color in self.colors.iter() {
                for _ in 0..tile_size {
                    data.extend_from_slice(&color.as_array());
                }
            }
        }

        SwatchStrip {
            width,
            height,
            data,
        }
    }

    fn by_luminance(&self) -> Vec<Color> {
        let mut sorted = self.colors.clone();
        sorted.sort_by_key(|c| OrdFloat64::from(c.luminance()));
        sorted
    }
}

impl From<Vec<Color>> for Palette {
    fn from(colors: Vec<Color>) -> Self {
        Self { colors }
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Color;
    type IntoIter = std::slice::Iter<'a, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}
