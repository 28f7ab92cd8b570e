use std::slice;

use crate::color::Color;
use crate::error::Error;
use crate::image::{Image, PixelFormat};
use crate::options::Options;
use crate::palette::PaletteOrder;
use crate::quantize::QuantizeResult;

#[repr(C)]
#[allow(dead_code)]
pub enum DomcolorError {
    DomcolorOk = 0,
    DomcolorBufferTooSmall = 1,
    DomcolorEmptyInput = 2,
    DomcolorInvalidTargetCount = 3,
    DomcolorUnsupportedFormat = 4,
    DomcolorUnknown = 100,
}

impl From<Error> for DomcolorError {
    fn from(error: Error) -> Self {
        match error {
            Error::BufferTooSmall => Self::DomcolorBufferTooSmall,
            Error::EmptyInput => Self::DomcolorEmptyInput,
            Error::InvalidTargetCount => Self::DomcolorInvalidTargetCount,
            Error::UnsupportedFormat => Self::DomcolorUnsupportedFormat,
        }
    }
}

fn status(res: Result<(), Error>) -> DomcolorError {
    res.err().map_or(DomcolorError::DomcolorOk, |e| e.into())
}

fn pixel_format(format: i32) -> Result<PixelFormat, Error> {
    match format {
        0 => Ok(PixelFormat::Rgb),
        1 => Ok(PixelFormat::Rgba),
        2 => Ok(PixelFormat::Bgr),
        3 => Ok(PixelFormat::Bgra),
        _ => Err(Error::UnsupportedFormat),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn domcolor_new_options() -> Option<Box<Options>> {
    Some(Options::default().into())
}

#[unsafe(no_mangle)]
pub extern "C" fn domcolor_set_max_colors(options: &mut Options, colors: u32) -> DomcolorError {
    status(options.set_max_colors(colors))
}

#[unsafe(no_mangle)]
pub extern "C" fn domcolor_set_palette_order(options: &mut Options, order: PaletteOrder) -> DomcolorError {
    options.set_order(order);
    DomcolorError::DomcolorOk
}

/// Wraps a pixel buffer of `width * height` pixels. `format` is 0 for RGB,
/// 1 for RGBA, 2 for BGR and 3 for BGRA. Returns NULL on an unknown format.
///
/// # Safety
///
/// `data` must point to at least `width * height * channels` readable bytes
/// that outlive the returned image.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn domcolor_create_image<'data>(
    data: *const u8,
    width: u32,
    height: u32,
    format: i32,
) -> Option<Box<Image<'data>>> {
    let format = pixel_format(format).ok()?;

    let uwidth = width as usize;
    let uheight = height as usize;
    let size = uwidth.checked_mul(uheight)?.checked_mul(format.channels())?;

    if size == 0 {
        return Some(Image::with_format(&[], uwidth, uheight, format).ok()?.into())
    }
    if data.is_null() {
        return None
    }

    let data_slice = unsafe { slice::from_raw_parts(data, size) };

    // The slice length is derived from the dimensions, so this can't fail
    Image::with_format(data_slice, uwidth, uheight, format).ok().map(Box::new)
}

/// Returns NULL if the image is empty or the options are invalid
#[unsafe(no_mangle)]
pub extern "C" fn domcolor_quantize(image: &Image, options: &Options) -> Option<Box<QuantizeResult>> {
    QuantizeResult::quantize(image, options).ok().map(Box::new)
}

#[unsafe(no_mangle)]
pub extern "C" fn domcolor_get_error(result: &QuantizeResult) -> f64 {
    result.get_error()
}

#[unsafe(no_mangle)]
pub extern "C" fn domcolor_palette_len(result: &QuantizeResult) -> usize {
    result.get_palette().len()
}

/// Copies the palette colors into `buffer`.
///
/// # Safety
///
/// `buffer` must point to at least `buffer_size` writable [`Color`] values.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn domcolor_palette_copy(
    result: &QuantizeResult,
    buffer: *mut Color,
    buffer_size: usize,
) -> DomcolorError {
    let colors = result.get_palette().colors();
    if buffer.is_null() || buffer_size < colors.len() {
        return DomcolorError::DomcolorBufferTooSmall
    }

    let buf = unsafe { slice::from_raw_parts_mut(buffer, buffer_size) };
    buf[..colors.len()].copy_from_slice(colors);

    DomcolorError::DomcolorOk
}

#[unsafe(no_mangle)]
pub extern "C" fn domcolor_free_result(result: Box<QuantizeResult>) {
    std::mem::drop(result)
}

#[unsafe(no_mangle)]
pub extern "C" fn domcolor_free_image(image: Box<Image>) {
    std::mem::drop(image)
}

#[unsafe(no_mangle)]
pub extern "C" fn domcolor_free_options(options: Box<Options>) {
    std::mem::drop(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let data = [0u8, 0, 0, 255, 255, 255, 255, 255, 255, 0, 0, 0];

        let mut opts = domcolor_new_options().unwrap();
        assert!(matches!(domcolor_set_max_colors(&mut opts, 0), DomcolorError::DomcolorInvalidTargetCount));
        assert!(matches!(domcolor_set_max_colors(&mut opts, 2), DomcolorError::DomcolorOk));

        let image = unsafe { domcolor_create_image(data.as_ptr(), 2, 2, 0) }.unwrap();
        let result = domcolor_quantize(&image, &opts).unwrap();
        assert_eq!(domcolor_palette_len(&result), 2);

        let mut out = [Color::default(); 2];
        let status = unsafe { domcolor_palette_copy(&result, out.as_mut_ptr(), 1) };
        assert!(matches!(status, DomcolorError::DomcolorBufferTooSmall));

        let status = unsafe { domcolor_palette_copy(&result, out.as_mut_ptr(), out.len()) };
        assert!(matches!(status, DomcolorError::DomcolorOk));
        assert_eq!(out, [Color::new(0, 0, 0), Color::new(255, 255, 255)]);

        domcolor_free_result(result);
        domcolor_free_image(image);
        domcolor_free_options(opts);
    }

    #[test]
    fn test_unknown_format() {
        let data = [0u8; 4];
        assert!(unsafe { domcolor_create_image(data.as_ptr(), 1, 1, 7) }.is_none());
    }
}
