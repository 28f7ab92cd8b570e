use std::cmp::Ordering;

/// Totally ordered `f64`. NaN is less than any other value (including
/// negative infinity) and equal to itself.
#[derive(Debug, Copy, Clone)]
#[repr(transparent)]
pub(crate) struct OrdFloat64(pub f64);

impl From<f64> for OrdFloat64 {
    #[inline(always)]
    fn from(value: f64) -> Self {
        OrdFloat64(value)
    }
}

impl PartialOrd for OrdFloat64 {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdFloat64 {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            // Neither is NaN, so partial_cmp always succeeds
            (false, false) => self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal),
        }
    }
}

impl PartialEq for OrdFloat64 {
    #[inline]
    fn eq(&self, other: &OrdFloat64) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrdFloat64 {}
