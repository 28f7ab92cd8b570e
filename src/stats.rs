use nalgebra::{Matrix3, SymmetricEigen, Vector3};

use crate::image::Image;
use crate::ord_float::OrdFloat64;

#[cfg(feature = "threads")]
use rayon::prelude::*;

// Upper triangle of a 3x3 symmetric matrix, row-major
const UPPER: [(usize, usize); 6] = [(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)];

/// Per-channel sums and sums of channel products of a pixel population.
///
/// Accumulated in integers, so the result doesn't depend on the order in
/// which pixels are added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Moments {
    pub count: u64,
    sum: [u64; 3],
    sum_sq: [u64; 6],
}

impl Moments {
    #[inline(always)]
    pub fn add(&mut self, pix: [u8; 3]) {
        self.count += 1;

        for ch in 0..3 {
            self.sum[ch] += pix[ch] as u64;
        }

        for (k, (i, j)) in UPPER.iter().enumerate() {
            self.sum_sq[k] += pix[*i] as u64 * pix[*j] as u64;
        }
    }

    pub fn merge(mut self, other: &Moments) -> Self {
        self.count += other.count;

        for ch in 0..3 {
            self.sum[ch] += other.sum[ch];
        }

        for k in 0..6 {
            self.sum_sq[k] += other.sum_sq[k];
        }

        self
    }
}

/// Direction of greatest color variation within a cluster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrincipalAxis {
    /// Largest eigenvalue of the covariance matrix
    pub eigenvalue: f64,
    /// Unit eigenvector for `eigenvalue`. Its largest-magnitude component is
    /// always non-negative.
    pub direction: Vector3<f64>,
}

impl PrincipalAxis {
    /// Projection of a pixel, scaled to `[0, 1]`, onto the axis
    #[inline(always)]
    pub fn project(&self, pix: [u8; 3]) -> f64 {
        self.direction.dot(&unit_vector(pix))
    }
}

/// Mean and population covariance of the pixels carrying one cluster label.
/// Channels are scaled to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterStats {
    pub count: usize,
    pub mean: Vector3<f64>,
    pub covariance: Matrix3<f64>,
}

impl Default for ClusterStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: Vector3::zeros(),
            covariance: Matrix3::zeros(),
        }
    }
}

impl ClusterStats {
    /// An empty population has zero mean and covariance.
    pub fn from_moments(m: &Moments) -> Self {
        if m.count == 0 {
            return Self::default()
        }

        let n = m.count as f64;
        let mean = Vector3::new(
            m.sum[0] as f64 / (n * 255.0),
            m.sum[1] as f64 / (n * 255.0),
            m.sum[2] as f64 / (n * 255.0),
        );

        // n * sum(xy) - sum(x) * sum(y) is computed exactly, a population with
        // no spread gets a covariance of exactly zero.
        let denom = n * n * 255.0 * 255.0;
        let mut covariance = Matrix3::zeros();

        for (k, (i, j)) in UPPER.iter().enumerate() {
            let num = m.count as i128 * m.sum_sq[k] as i128
                - m.sum[*i] as i128 * m.sum[*j] as i128;
            let v = num as f64 / denom;

            covariance[(*i, *j)] = v;
            covariance[(*j, *i)] = v;
        }

        Self {
            count: m.count as usize,
            mean,
            covariance,
        }
    }

    /// Computes statistics over every pixel whose label equals `id`
    pub fn compute(image: &Image, labels: &[u32], id: u32) -> Self {
        Self::from_moments(&moments(image, labels, id))
    }

    /// Eigen decomposition of the covariance matrix, keeping the largest
    /// eigenvalue and its eigenvector.
    ///
    /// Returns `None` for an empty cluster or a covariance matrix with
    /// non-finite entries.
    pub fn principal_axis(&self) -> Option<PrincipalAxis> {
        if self.count == 0 || !self.covariance.iter().all(|v| v.is_finite()) {
            return None
        }

        let eigen = SymmetricEigen::new(self.covariance);

        let mut index = 0;
        for i in 1..3 {
            if OrdFloat64::from(eigen.eigenvalues[i]) > OrdFloat64::from(eigen.eigenvalues[index]) {
                index = i;
            }
        }

        let mut direction: Vector3<f64> = eigen.eigenvectors.column(index).into_owned();
        if direction[direction.iamax()] < 0.0 {
            direction = -direction;
        }

        Some(PrincipalAxis {
            eigenvalue: eigen.eigenvalues[index],
            direction,
        })
    }

    /// Total variance, the trace of the covariance matrix
    pub fn variance(&self) -> f64 {
        self.covariance.trace()
    }
}

#[inline(always)]
pub(crate) fn unit_vector(pix: [u8; 3]) -> Vector3<f64> {
    Vector3::new(
        pix[0] as f64 / 255.0,
        pix[1] as f64 / 255.0,
        pix[2] as f64 / 255.0,
    )
}

#[cfg(not(feature = "threads"))]
fn moments(image: &Image, labels: &[u32], id: u32) -> Moments {
    let mut m = Moments::default();

    for (pix, _) in image.pixels().zip(labels).filter(|(_, l)| **l == id) {
        m.add(pix);
    }

    m
}

#[cfg(feature = "threads")]
fn moments(image: &Image, labels: &[u32], id: u32) -> Moments {
    image
        .par_pixels()
        .zip(labels.par_iter())
        .filter(|(_, l)| **l == id)
        .fold(Moments::default, |mut m, (pix, _)| {
            m.add(pix);
            m
        })
        .reduce(Moments::default, |a, b| a.merge(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moments_of(pixels: &[[u8; 3]]) -> Moments {
        pixels.iter().fold(Moments::default(), |mut m, p| {
            m.add(*p);
            m
        })
    }

    #[test]
    fn test_black_and_white() {
        let stats = ClusterStats::from_moments(&moments_of(&[
            [0, 0, 0],
            [255, 255, 255],
            [0, 0, 0],
            [255, 255, 255],
        ]));

        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, Vector3::new(0.5, 0.5, 0.5));
        assert_eq!(stats.covariance, Matrix3::repeat(0.25));

        let axis = stats.principal_axis().unwrap();
        assert!((axis.eigenvalue - 0.75).abs() < 1e-12);

        let expected = Vector3::repeat(1.0 / 3f64.sqrt());
        assert!((axis.direction - expected).norm() < 1e-9);
    }

    #[test]
    fn test_population_covariance() {
        // Red channel only: values 0 and 102 -> scaled 0.0 and 0.4
        let stats = ClusterStats::from_moments(&moments_of(&[[0, 7, 7], [102, 7, 7]]));

        assert!((stats.mean[0] - 0.2).abs() < 1e-12);
        // Divisor is the count, not count - 1
        assert!((stats.covariance[(0, 0)] - 0.04).abs() < 1e-12);
        assert_eq!(stats.covariance[(1, 1)], 0.0);
        assert_eq!(stats.covariance[(0, 1)], 0.0);

        let axis = stats.principal_axis().unwrap();
        assert!((axis.direction - Vector3::x()).norm() < 1e-9);
        assert!((axis.eigenvalue - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_single_color_has_no_variance() {
        let stats = ClusterStats::from_moments(&moments_of(&[[13, 77, 201]; 9]));

        assert_eq!(stats.covariance, Matrix3::zeros());
        assert_eq!(stats.principal_axis().unwrap().eigenvalue, 0.0);
    }

    #[test]
    fn test_empty_population() {
        let stats = ClusterStats::from_moments(&Moments::default());

        assert_eq!(stats, ClusterStats::default());
        assert!(stats.principal_axis().is_none());
    }

    #[test]
    fn test_non_finite_covariance() {
        let mut stats = ClusterStats::from_moments(&moments_of(&[[0, 0, 0], [9, 9, 9]]));
        stats.covariance[(1, 2)] = f64::NAN;

        assert!(stats.principal_axis().is_none());
    }

    #[test]
    fn test_merge_is_order_independent() {
        let a = moments_of(&[[1, 2, 3], [200, 100, 50]]);
        let b = moments_of(&[[9, 9, 9]]);
        let all = moments_of(&[[9, 9, 9], [200, 100, 50], [1, 2, 3]]);

        assert_eq!(a.merge(&b), all);
        assert_eq!(b.merge(&a), all);
    }

    #[test]
    fn test_compute_filters_by_label() {
        let data = [0, 0, 0, 255, 0, 0, 0, 255, 0, 255, 0, 0];
        let image = Image::new(&data, 2, 2).unwrap();
        let labels = [1, 2, 1, 2];

        let stats = ClusterStats::compute(&image, &labels, 2);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, Vector3::new(1.0, 0.0, 0.0));

        assert_eq!(ClusterStats::compute(&image, &labels, 3).count, 0);
    }
}
