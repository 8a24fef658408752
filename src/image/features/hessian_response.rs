extern crate nalgebra as na;

use na::Matrix2;
use crate::image::Image;
use crate::{Float, GradientDirection};
use crate::image::filter::{gradient_convolution_at_sample,prewitt_kernel::PrewittKernel,laplace_kernel::LaplaceKernel};
use crate::image::features::SamplePosition;

/// Spatial 2x2 hessian of a stack of images at a sample. The sample needs one pixel of margin.
pub fn hessian_matrix(images: &[Image], feature: &SamplePosition) -> Matrix2<Float> {

    let second_order_kernel = LaplaceKernel::new();

    let dxx = gradient_convolution_at_sample(images,feature,&second_order_kernel,GradientDirection::HORIZONTAL);
    let dyy = gradient_convolution_at_sample(images,feature,&second_order_kernel,GradientDirection::VERTICAL);
    let dxy = mixed_derivative(images, feature, GradientDirection::HORIZONTAL, GradientDirection::VERTICAL);

    Matrix2::new(dxx,dxy,
                 dxy,dyy)

}

/// Central difference along `second` of the central difference along `first`.
pub fn mixed_derivative(images: &[Image], feature: &SamplePosition, first: GradientDirection, second: GradientDirection) -> Float {
    let first_order_kernel = PrewittKernel::new();
    let forward = feature.shifted(second, 1);
    let backward = feature.shifted(second, -1);

    let d_forward = gradient_convolution_at_sample(images,&forward,&first_order_kernel,first);
    let d_backward = gradient_convolution_at_sample(images,&backward,&first_order_kernel,first);
    (d_forward - d_backward)/2.0
}

pub fn eigenvalue_ratio(harris_matrix: &Matrix2<Float>, r: Float) -> (Float,Float) {
    let trace = harris_matrix.trace();
    let determinant = harris_matrix.determinant();
    (trace.powi(2)/determinant,(r+1.0).powi(2)/r)
}

/// Principal curvature test. True when the response is edge like, i.e. the curvatures have
/// opposite signs, vanish, or their ratio exceeds `r`.
pub fn reject_edge(harris_matrix: &Matrix2<Float>, r: Float) -> bool {
    let determinant = harris_matrix.determinant();
    if determinant <= 0.0 {
        return true;
    }
    let (eigenvalue_ratio, r_ratio) = eigenvalue_ratio(harris_matrix, r);
    eigenvalue_ratio >= r_ratio
}
