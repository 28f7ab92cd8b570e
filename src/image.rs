use crate::error::Error;

/// Memory layout of a single pixel
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb,
    Rgba,
    Bgr,
    Bgra,
}

impl PixelFormat {
    /// Number of bytes per pixel
    pub fn channels(&self) -> usize {
        match self {
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Bgra => 4,
        }
    }

    #[inline(always)]
    fn to_rgb(self, pix: &[u8]) -> [u8; 3] {
        match self {
            Self::Rgb | Self::Rgba => [pix[0], pix[1], pix[2]],
            Self::Bgr | Self::Bgra => [pix[2], pix[1], pix[0]],
        }
    }
}

/// Image reference containing pixel data and dimensions info
pub struct Image<'data> {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    pub data: &'data [u8],
}

impl<'data> Image<'data> {
    /// Creates an [`Image`] from a slice of RGB pixels.
    ///
    /// Returns [`Error::BufferTooSmall`] if the provided slice length is less
    /// than `width * height * 3`
    pub fn new(data: &'data [u8], width: usize, height: usize) -> Result<Self, Error> {
        Self::with_format(data, width, height, PixelFormat::Rgb)
    }

    /// Creates an [`Image`] from a slice of RGBA pixels. Alpha is ignored.
    ///
    /// Returns [`Error::BufferTooSmall`] if the provided slice length is less
    /// than `width * height * 4`
    pub fn new_rgba(data: &'data [u8], width: usize, height: usize) -> Result<Self, Error> {
        Self::with_format(data, width, height, PixelFormat::Rgba)
    }

    /// Creates an [`Image`] from a slice of pixels in the given layout.
    pub fn with_format(
        data: &'data [u8],
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<Self, Error> {
        let size = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(format.channels()))
            .ok_or(Error::BufferTooSmall)?;

        if data.len() < size {
            return Err(Error::BufferTooSmall);
        }

        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// Number of pixels in the image
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the color of the pixel at `index` in RGB order
    #[inline(always)]
    pub fn pixel(&self, index: usize) -> [u8; 3] {
        let ch = self.format.channels();
        let point = index * ch;

        self.format.to_rgb(&self.data[point..point + ch])
    }

    /// Iterates over pixels in row-major order, RGB channel order
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        let ch = self.format.channels();

        self.data[..self.len() * ch]
            .chunks_exact(ch)
            .map(move |pix| self.format.to_rgb(pix))
    }

    #[cfg(feature = "threads")]
    pub(crate) fn par_pixels(&self) -> impl rayon::iter::IndexedParallelIterator<Item = [u8; 3]> + '_ {
        use rayon::prelude::*;

        let ch = self.format.channels();
        let format = self.format;

        self.data[..self.len() * ch]
            .par_chunks_exact(ch)
            .map(move |pix| format.to_rgb(pix))
    }
}
