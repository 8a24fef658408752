extern crate nalgebra as na;

use na::{Matrix2,Matrix1x2};
use crate::image::Image;
use crate::{Float,float};

pub fn rotation_matrix_2d_from_orientation(orientation: Float) -> Matrix2<Float> {

    Matrix2::new(orientation.cos(), -orientation.sin(),
                orientation.sin(), orientation.cos())

}

/// Wraps an angle into [0, 2pi).
pub fn wrap_angle(angle: Float) -> Float {
    let two_pi = 2.0*float::consts::PI;
    let wrapped = match angle % two_pi {
        a if a < 0.0 => a + two_pi,
        a => a
    };
    match wrapped {
        a if a >= two_pi => a - two_pi,
        a => a
    }
}

pub fn gradient_and_orientation(x_gradient: &Image, y_gradient: &Image, x: usize, y: usize) -> (Float,Float) {

    let x_diff = x_gradient.buffer[(y,x)];
    let y_diff = y_gradient.buffer[(y,x)];

    magnitude_and_orientation(x_diff, y_diff)
}

/// Bilinearly sampled gradient at a sub-pixel position; the caller guarantees the position lies inside the image.
pub fn gradient_and_orientation_interpolated(x_gradient: &Image, y_gradient: &Image, x: Float, y: Float) -> (Float,Float) {
    let x_diff = x_gradient.sample_bilinear(x, y);
    let y_diff = y_gradient.sample_bilinear(x, y);

    magnitude_and_orientation(x_diff, y_diff)
}

fn magnitude_and_orientation(x_diff: Float, y_diff: Float) -> (Float, Float) {
    let gradient = (x_diff.powi(2) + y_diff.powi(2)).sqrt();
    let orientation = match  y_diff.atan2(x_diff) {
        angle if angle < 0.0 => 2.0*float::consts::PI + angle,
        angle => angle
    };

    (gradient,wrap_angle(orientation))
}

// http://fourier.eng.hmc.edu/e176/lectures/NM/node25.html
// Vertex of the parabola through (a,f_a),(b,f_b),(c,f_c) on a circular domain [range_min,range_max).
pub fn lagrange_interpolation_quadratic(a: Float, b: Float, c: Float, f_a: Float, f_b: Float, f_c: Float, range_min: Float, range_max: Float) -> Float {

    let a_corrected = if a > b { a - range_max} else {a};
    let c_corrected = if b > c { c + range_max} else {c};

    let numerator = (f_a-f_b)*(c_corrected-b).powi(2)-(f_c-f_b)*(b-a_corrected).powi(2);
    let denominator = (f_a-f_b)*(c_corrected-b)+(f_c-f_b)*(b-a_corrected);

    let result = match denominator {
        d if d.abs() <= Float::EPSILON => b,
        d => b + 0.5*(numerator/d)
    };

    match result {
        res if res < range_min => res + range_max,
        res if res >= range_max => res - range_max,
        res => res
    }
}

/// Unnormalized isotropic gaussian weight.
pub fn gauss_2d(x_center: Float, y_center: Float, x: Float, y: Float, sigma: Float) -> Float {
    let offset = Matrix1x2::new(x-x_center,y-y_center);
    let sigma_sqr_recip = 1.0/sigma.powi(2);
    let exponent = -0.5*offset.norm_squared()*sigma_sqr_recip;
    exponent.exp()
}
