use log::debug;

use crate::cluster::ClusterTree;
use crate::color::Color;
use crate::error::Error;
use crate::image::Image;
use crate::options::Options;
use crate::palette::Palette;

/// Result of dominant color extraction
pub struct QuantizeResult {
    palette: Palette,
    error: f64,
}

impl QuantizeResult {
    /// Extracts the dominant colors of the provided [`Image`].
    ///
    /// The palette holds `options.max_colors` colors unless the image has
    /// fewer distinct colors to separate, in which case it is shorter.
    ///
    /// Returns [`Error::EmptyInput`] if the image has no pixels and
    /// [`Error::InvalidTargetCount`] if `options.max_colors` is 0
    pub fn quantize(image: &Image, options: &Options) -> Result<Self, Error> {
        if options.max_colors < 1 {
            return Err(Error::InvalidTargetCount)
        }

        let mut tree = ClusterTree::new(image)?;
        let leaf_count = tree.grow(options.max_colors as usize);

        let leaves = tree.leaves();
        let palette = Palette::from_leaves(&leaves, options.order);

        let total = image.len() as f64;
        let error = leaves
            .iter()
            .map(|leaf| leaf.stats.variance() * leaf.stats.count as f64)
            .sum::<f64>()
            / total;

        debug!(
            "Extracted {} of {} requested colors, error {:.6}: {:?}",
            leaf_count, options.max_colors, error, palette.colors(),
        );

        Ok(Self { palette, error })
    }

    /// Returns quantization error: the mean squared distance of every pixel
    /// to its cluster mean, channels scaled to `[0, 1]`. The lesser the error
    /// the better the palette represents the image
    pub fn get_error(&self) -> f64 {
        self.error
    }

    /// Returns the [`Palette`] generated after quantization
    pub fn get_palette(&self) -> &Palette {
        &self.palette
    }

    pub fn into_palette(self) -> Palette {
        self.palette
    }
}

/// Returns up to `target_count` dominant colors of the image, darkest first.
pub fn extract_palette(image: &Image, target_count: usize) -> Result<Vec<Color>, Error> {
    let mut options = Options::default();
    options.set_max_colors(u32::try_from(target_count).unwrap_or(u32::MAX))?;

    let result = QuantizeResult::quantize(image, &options)?;

    Ok(result.into_palette().colors().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteOrder;

    #[test]
    fn test_invalid_target_count() {
        let data = [0u8; 12];
        let image = Image::new(&data, 2, 2).unwrap();

        assert_eq!(extract_palette(&image, 0), Err(Error::InvalidTargetCount));

        let opts = Options {
            max_colors: 0,
            ..Options::default()
        };
        assert_eq!(QuantizeResult::quantize(&image, &opts).err(), Some(Error::InvalidTargetCount));
    }

    #[test]
    fn test_empty_input() {
        let image = Image::new(&[], 0, 3).unwrap();

        assert_eq!(extract_palette(&image, 3), Err(Error::EmptyInput));
    }

    #[test]
    fn test_error_decreases_with_colors() {
        let data: Vec<u8> = (0..64u32)
            .flat_map(|i| [(i * 4) as u8, (255 - i * 3) as u8, (i * i % 256) as u8])
            .collect();
        let image = Image::new(&data, 8, 8).unwrap();

        let mut opts = Options::default();
        let mut last = f64::INFINITY;

        for colors in [1, 2, 4, 8] {
            opts.set_max_colors(colors).unwrap();
            let result = QuantizeResult::quantize(&image, &opts).unwrap();

            assert_eq!(result.get_palette().len(), colors as usize);
            assert!(result.get_error() < last);
            last = result.get_error();
        }
    }

    #[test]
    fn test_single_color_error_is_zero() {
        let data = [42u8; 27];
        let image = Image::new(&data, 3, 3).unwrap();
        let result = QuantizeResult::quantize(&image, &Options::default()).unwrap();

        assert_eq!(result.get_error(), 0.0);
        assert_eq!(result.get_palette().colors(), &[Color::new(42, 42, 42)]);
    }

    #[test]
    fn test_traversal_order() {
        let data = [255, 255, 255, 0, 0, 0, 255, 255, 255, 0, 0, 0];
        let image = Image::new(&data, 2, 2).unwrap();

        let mut opts = Options::default();
        opts.set_max_colors(2).unwrap();
        opts.set_order(PaletteOrder::Traversal);

        let result = QuantizeResult::quantize(&image, &opts).unwrap();
        // The lower side of the principal axis is the left child
        assert_eq!(
            result.get_palette().colors(),
            &[Color::new(0, 0, 0), Color::new(255, 255, 255)]
        );
    }
}
