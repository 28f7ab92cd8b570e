use crate::error::Error;
use crate::palette::PaletteOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    pub max_colors: u32,
    pub order: PaletteOrder,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_colors: 5,
            order: PaletteOrder::Luminance,
        }
    }
}

impl Options {
    /// Sets the number of colors to extract.
    ///
    /// Returns [`Error::InvalidTargetCount`] if `colors` is 0
    pub fn set_max_colors(&mut self, colors: u32) -> Result<(), Error> {
        if colors < 1 {
            return Err(Error::InvalidTargetCount)
        }

        self.max_colors = colors;

        Ok(())
    }

    pub fn set_order(&mut self, order: PaletteOrder) {
        self.order = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_max_colors() {
        let mut opts = Options::default();

        assert_eq!(opts.set_max_colors(0), Err(Error::InvalidTargetCount));
        assert_eq!(opts.max_colors, 5);

        assert_eq!(opts.set_max_colors(1), Ok(()));
        assert_eq!(opts.max_colors, 1);
    }
}
