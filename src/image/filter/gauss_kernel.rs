extern crate nalgebra as na;

use na::DMatrix;
use crate::{Float, SiftError};
use super::kernel::Kernel;

/// Normalized separable gaussian, stored as a single row.
#[derive(Debug,Clone)]
pub struct GaussKernel1D {
    kernel: DMatrix<Float>
}

impl GaussKernel1D {
    fn sample(mean: Float, std: Float, x:Float) -> Float {
        (-0.5*((x-mean)/std).powi(2)).exp()
    }

    pub fn new(std: Float, radius: usize) -> Result<GaussKernel1D, SiftError> {
        if !(std > 0.0 && std.is_finite()) {
            return Err(SiftError::invalid(format!("gaussian sigma must be positive, got {}", std)));
        }

        let cols = 2*radius+1;
        let start = -(radius as isize);
        let samples = (0..cols).map(|i| GaussKernel1D::sample(0.0,std,(start + i as isize) as Float)).collect::<Vec<Float>>();
        let sum: Float = samples.iter().sum();
        Ok(GaussKernel1D {
            kernel: DMatrix::from_vec(1,cols,samples.into_iter().map(|v| v/sum).collect())
        })
    }

    /// Radius ceil(blur_half_factor * sigma), at least one sample on each side.
    pub fn with_blur_half_factor(std: Float, blur_half_factor: Float) -> Result<GaussKernel1D, SiftError> {
        let radius = (blur_half_factor*std).ceil().max(1.0) as usize;
        GaussKernel1D::new(std, radius)
    }
}

impl Kernel for GaussKernel1D {
    fn kernel(&self) -> &DMatrix<Float> {
        &self.kernel
    }

    fn normalizing_constant(&self) -> Float{
        1.0
    }
}

/// Square gaussian whose weights sum to one.
#[derive(Debug,Clone)]
pub struct GaussKernel2D {
    kernel: DMatrix<Float>
}

impl GaussKernel2D {
    pub fn new(size: usize, sigma: Float) -> Result<GaussKernel2D, SiftError> {
        if size == 0 || size % 2 == 0 {
            return Err(SiftError::invalid(format!("gaussian kernel size must be odd and positive, got {}", size)));
        }
        if !(sigma > 0.0 && sigma.is_finite()) {
            return Err(SiftError::invalid(format!("gaussian sigma must be positive, got {}", sigma)));
        }

        let center = ((size-1)/2) as Float;
        let denom = 2.0*sigma.powi(2);
        let unnormalized = DMatrix::<Float>::from_fn(size, size, |r,c| {
            let dy = r as Float - center;
            let dx = c as Float - center;
            (-(dx.powi(2)+dy.powi(2))/denom).exp()
        });
        let sum = unnormalized.sum();

        Ok(GaussKernel2D{kernel: unnormalized/sum})
    }
}

impl Kernel for GaussKernel2D {
    fn kernel(&self) -> &DMatrix<Float> {
        &self.kernel
    }

    fn normalizing_constant(&self) -> Float{
        1.0
    }
}

pub fn build_gaussian_kernel(size: usize, sigma: Float) -> Result<GaussKernel2D, SiftError> {
    GaussKernel2D::new(size, sigma)
}
