/// RGB color
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from channel intensities scaled to `[0, 1]`
    pub fn from_unit(c: [f64; 3]) -> Self {
        Self {
            r: to_u8(c[0]),
            g: to_u8(c[1]),
            b: to_u8(c[2]),
        }
    }

    pub fn as_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Rec. 709 relative luminance in `[0, 255]`
    pub fn luminance(&self) -> f64 {
        0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64
    }
}

impl From<[u8; 3]> for Color {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

fn to_u8(v: f64) -> u8 {
    if v.is_nan() {
        return 0
    }

    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unit() {
        assert_eq!(Color::from_unit([0.0, 1.0, 0.5]), Color::new(0, 255, 128));
        // Out of range and NaN components are clamped
        assert_eq!(Color::from_unit([-0.5, 1.5, f64::NAN]), Color::new(0, 255, 0));
    }

    #[test]
    fn test_luminance() {
        assert_eq!(Color::new(0, 0, 0).luminance(), 0.0);
        assert!((Color::new(255, 255, 255).luminance() - 255.0).abs() < 1e-9);
        assert!(Color::new(0, 255, 0).luminance() > Color::new(255, 0, 0).luminance());
        assert!(Color::new(255, 0, 0).luminance() > Color::new(0, 0, 255).luminance());
    }
}
