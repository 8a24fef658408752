extern crate nalgebra as na;

use na::{Matrix2, Matrix3, Vector3};
use crate::image::Image;
use crate::image::pyramid::sift::sift_runtime_params::SiftRuntimeParams;
use crate::{Float, GradientDirection};
use crate::error::Rejection;
use crate::image::filter::{gradient_convolution_at_sample,prewitt_kernel::PrewittKernel,laplace_kernel::LaplaceKernel};
use crate::image::features::{SamplePosition,sift_feature::SiftFeature};
use crate::image::features::hessian_response::{hessian_matrix, mixed_derivative, reject_edge};

/// Second order taylor expansion of the DoG stack around an integer sample.
struct TaylorExpansion {
    value: Float,
    gradient: Vector3<Float>,
    hessian: Matrix3<Float>
}

impl TaylorExpansion {
    fn spatial_hessian(&self) -> Matrix2<Float> {
        Matrix2::new(self.hessian[(0,0)], self.hessian[(0,1)],
                     self.hessian[(1,0)], self.hessian[(1,1)])
    }

    /// Offset that zeroes the gradient of the quadratic fit. A singular system yields no offset.
    fn extremum_offset(&self) -> Vector3<Float> {
        self.hessian.lu().solve(&(-self.gradient)).unwrap_or(Vector3::zeros())
    }

    fn interpolate(&self, offset: &Vector3<Float>) -> Float {
        self.value + 0.5*self.gradient.dot(offset)
    }
}

fn taylor_expansion(difference_of_gaussians: &[Image], position: &SamplePosition) -> TaylorExpansion {
    let first_order_kernel = PrewittKernel::new();
    let second_order_kernel = LaplaceKernel::new();

    let dx = gradient_convolution_at_sample(difference_of_gaussians,position,&first_order_kernel,GradientDirection::HORIZONTAL);
    let dy = gradient_convolution_at_sample(difference_of_gaussians,position,&first_order_kernel,GradientDirection::VERTICAL);
    let ds = gradient_convolution_at_sample(difference_of_gaussians,position,&first_order_kernel,GradientDirection::SIGMA);

    let spatial = hessian_matrix(difference_of_gaussians, position);
    let dss = gradient_convolution_at_sample(difference_of_gaussians,position,&second_order_kernel,GradientDirection::SIGMA);
    let dxs = mixed_derivative(difference_of_gaussians, position, GradientDirection::HORIZONTAL, GradientDirection::SIGMA);
    let dys = mixed_derivative(difference_of_gaussians, position, GradientDirection::VERTICAL, GradientDirection::SIGMA);

    let hessian = Matrix3::new(spatial[(0,0)], spatial[(0,1)], dxs,
                               spatial[(1,0)], spatial[(1,1)], dys,
                               dxs, dys, dss);

    TaylorExpansion {
        value: difference_of_gaussians[position.sigma_level].buffer[(position.y,position.x)],
        gradient: Vector3::new(dx,dy,ds),
        hessian
    }
}

fn is_inside_refinement_range(difference_of_gaussians: &[Image], position: &SamplePosition) -> bool {
    let buffer = &difference_of_gaussians[0].buffer;
    position.x >= 1 && position.x + 2 <= buffer.ncols()
        && position.y >= 1 && position.y + 2 <= buffer.nrows()
        && position.sigma_level >= 1 && position.sigma_level + 2 <= difference_of_gaussians.len()
}

/// Iterative sub-pixel localisation of a DoG extremum followed by the contrast and edge tests.
/// The candidate moves to the neighbouring sample while any offset component exceeds 0.5.
pub fn subpixel_refinement(difference_of_gaussians: &[Image], feature: &SiftFeature, runtime_params: &SiftRuntimeParams) -> Result<SiftFeature, Rejection> {

    let mut position = SamplePosition::from_feature(feature);

    for _ in 0..runtime_params.max_refinement_iterations {
        if !is_inside_refinement_range(difference_of_gaussians, &position) {
            return Err(Rejection::LocalizationFailed);
        }

        let expansion = taylor_expansion(difference_of_gaussians, &position);
        let offset = expansion.extremum_offset();

        if offset.iter().any(|v| !v.is_finite()) {
            return Err(Rejection::LocalizationFailed);
        }

        if offset.iter().all(|v| v.abs() <= 0.5) {
            let value = expansion.interpolate(&offset);
            if value.abs() < runtime_params.contrast_r {
                return Err(Rejection::LowContrast);
            }
            if reject_edge(&expansion.spatial_hessian(), runtime_params.edge_r) {
                return Err(Rejection::EdgeResponseRejected);
            }
            return Ok(SiftFeature {
                octave_level: feature.octave_level,
                x_image: position.x,
                y_image: position.y,
                dog_level: position.sigma_level,
                offset,
                value
            });
        }

        let step = |v: usize, o: Float| -> Option<usize> {
            let moved = v as isize + o.round() as isize;
            match moved {
                m if m < 0 => None,
                m => Some(m as usize)
            }
        };
        position = match (step(position.x, offset[0]), step(position.y, offset[1]), step(position.sigma_level, offset[2])) {
            (Some(x), Some(y), Some(sigma_level)) => SamplePosition::new(x, y, sigma_level),
            _ => return Err(Rejection::LocalizationFailed)
        };
    }

    Err(Rejection::LocalizationFailed)
}

#[cfg(test)]
mod test {
    use super::*;
    use na::DMatrix;
    use crate::image::image_encoding::ImageEncoding;

    /// DoG stack holding peak - (x-vx)^2 - (y-vy)^2 - (s-vs)^2, a paraboloid with vertex value `peak`.
    fn paraboloid(levels: usize, size: usize, vertex: (Float,Float,Float), peak: Float) -> Vec<Image> {
        (0..levels).map(|s| {
            let buffer = DMatrix::<Float>::from_fn(size, size, |r,c| {
                peak - (c as Float - vertex.0).powi(2) - (r as Float - vertex.1).powi(2) - (s as Float - vertex.2).powi(2)
            });
            Image::from_matrix(&buffer, ImageEncoding::F64)
        }).collect()
    }

    fn single_iteration() -> SiftRuntimeParams {
        SiftRuntimeParams{max_refinement_iterations: 1, ..SiftRuntimeParams::default()}
    }

    #[test]
    fn vertex_converges_in_one_iteration() {
        let dogs = paraboloid(3, 9, (4.0,4.0,1.0), 1.0);
        let refined = subpixel_refinement(&dogs, &SiftFeature::new(0,4,4,1,1.0), &single_iteration()).unwrap();
        assert_eq!(refined.offset.norm(), 0.0);
        assert_eq!((refined.x_image, refined.y_image, refined.dog_level), (4,4,1));
        assert_eq!(refined.value, 1.0);
    }

    #[test]
    fn sub_pixel_vertex_is_recovered() {
        let dogs = paraboloid(3, 9, (4.3,3.8,1.2), 1.0);
        let refined = subpixel_refinement(&dogs, &SiftFeature::new(0,4,4,1,0.0), &single_iteration()).unwrap();
        assert!((refined.x() - 4.3).abs() < 1e-9);
        assert!((refined.y() - 3.8).abs() < 1e-9);
        assert!((refined.sigma_level() - 1.2).abs() < 1e-9);
        assert!((refined.value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn far_vertex_recenters_candidate() {
        let dogs = paraboloid(3, 11, (5.7,4.0,1.0), 1.0);
        let candidate = SiftFeature::new(0,4,4,1,0.0);
        let refined = subpixel_refinement(&dogs, &candidate, &SiftRuntimeParams::default()).unwrap();
        assert_eq!(refined.x_image, 6);
        assert!((refined.x() - 5.7).abs() < 1e-9);

        assert_eq!(subpixel_refinement(&dogs, &candidate, &single_iteration()), Err(Rejection::LocalizationFailed));
    }

    #[test]
    fn vertex_outside_image_fails_localization() {
        let dogs = paraboloid(3, 9, (30.0,4.0,1.0), 1.0);
        let refined = subpixel_refinement(&dogs, &SiftFeature::new(0,4,4,1,0.0), &SiftRuntimeParams::default());
        assert_eq!(refined, Err(Rejection::LocalizationFailed));

        let border = subpixel_refinement(&dogs, &SiftFeature::new(0,0,4,1,0.0), &SiftRuntimeParams::default());
        assert_eq!(border, Err(Rejection::LocalizationFailed));
    }

    #[test]
    fn low_contrast_is_rejected() {
        let dogs = paraboloid(3, 9, (4.0,4.0,1.0), 0.01);
        let refined = subpixel_refinement(&dogs, &SiftFeature::new(0,4,4,1,0.01), &SiftRuntimeParams::default());
        assert_eq!(refined, Err(Rejection::LowContrast));
    }

    #[test]
    fn flat_region_is_rejected_as_edge() {
        let dogs = (0..3).map(|_| Image::from_matrix(&DMatrix::<Float>::from_element(9, 9, 0.5), ImageEncoding::F64)).collect::<Vec<Image>>();
        let refined = subpixel_refinement(&dogs, &SiftFeature::new(0,4,4,1,0.5), &SiftRuntimeParams::default());
        assert_eq!(refined, Err(Rejection::EdgeResponseRejected));
    }

    #[test]
    fn elongated_peak_is_rejected_as_edge() {
        let dogs = (0..3).map(|s| {
            let buffer = DMatrix::<Float>::from_fn(9, 9, |r,c| 1.0 - (c as Float - 4.0).powi(2) - 0.01*(r as Float - 4.0).powi(2) - (s as Float - 1.0).powi(2));
            Image::from_matrix(&buffer, ImageEncoding::F64)
        }).collect::<Vec<Image>>();
        let refined = subpixel_refinement(&dogs, &SiftFeature::new(0,4,4,1,1.0), &SiftRuntimeParams::default());
        assert_eq!(refined, Err(Rejection::EdgeResponseRejected));
    }
}
