extern crate nalgebra as na;

use na::{Vector2, Matrix2x4};
use crate::{Float,float};
use crate::error::Rejection;
use crate::numerics::{rotation_matrix_2d_from_orientation,gradient_and_orientation_interpolated,gauss_2d,wrap_angle};
use crate::image::pyramid::sift::{sift_octave::SiftOctave, sift_runtime_params::SiftRuntimeParams};
use crate::image::matching::sift_descriptor::{keypoint::KeyPoint, feature_vector::Descriptor};

/// Samples per cell side.
const SUBMATRIX_LENGTH: usize = 4;

/// Distance between descriptor samples in octave pixels.
fn sample_spacing(keypoint: &KeyPoint, runtime_params: &SiftRuntimeParams) -> Float {
    keypoint.sigma/runtime_params.sigma_initial
}

/// Half the side of the descriptor window in octave pixels.
fn descriptor_half_width(spacing: Float, runtime_params: &SiftRuntimeParams) -> Float {
    (SUBMATRIX_LENGTH*runtime_params.descriptor_grid_size) as Float/2.0*spacing
}

/// True if all four corners of the rotated window of half side `half_width` lie inside the octave.
pub fn is_rotated_keypoint_within_image(octave: &SiftOctave, keypoint: &KeyPoint, half_width: Float) -> bool {
    let rot_mat = rotation_matrix_2d_from_orientation(keypoint.orientation);
    let corner_coordinates = Matrix2x4::new(
        -half_width,half_width,-half_width,half_width,
        -half_width,-half_width,half_width,half_width);

    let rotated_corners = rot_mat*corner_coordinates;
    let max_x = (octave.width() - 1) as Float;
    let max_y = (octave.height() - 1) as Float;

    rotated_corners.column_iter().all(|corner| {
        let x = keypoint.x + corner[0];
        let y = keypoint.y + corner[1];
        x >= 0.0 && x <= max_x && y >= 0.0 && y <= max_y
    })
}

/// Splits a continuous bin coordinate into its lower bin and the weight of the upper bin.
fn split_bin(coordinate: Float) -> (isize, Float) {
    let lower = coordinate.floor();
    (lower as isize, coordinate - lower)
}

/// Gradient histograms over a grid of cells aligned with the keypoint orientation.
/// Every sample is spread trilinearly over neighbouring cells and orientation bins.
pub fn describe_keypoint(octave: &SiftOctave, keypoint: &KeyPoint, runtime_params: &SiftRuntimeParams) -> Result<Descriptor, Rejection> {

    let spacing = sample_spacing(keypoint, runtime_params);
    if !is_rotated_keypoint_within_image(octave, keypoint, descriptor_half_width(spacing, runtime_params)) {
        return Err(Rejection::InsufficientNeighborhood);
    }

    let grid_size = runtime_params.descriptor_grid_size;
    let bins = runtime_params.descriptor_bins_per_cell;
    let sample_length = SUBMATRIX_LENGTH*grid_size;
    let half_length = sample_length as Float/2.0;
    let bin_range = 2.0*float::consts::PI/(bins as Float);

    let level = octave.closest_image_level(keypoint.sigma_level);
    let x_grad = &octave.x_gradient[level];
    let y_grad = &octave.y_gradient[level];
    let rot_mat = rotation_matrix_2d_from_orientation(keypoint.orientation);

    let mut descriptor = Descriptor::zeros(runtime_params.descriptor_length());

    for r in 0..sample_length {
        for c in 0..sample_length {
            let u = c as Float - half_length + 0.5;
            let v = r as Float - half_length + 0.5;
            let offset = rot_mat*Vector2::new(u*spacing, v*spacing);

            let (magnitude, orientation) = gradient_and_orientation_interpolated(x_grad, y_grad, keypoint.x + offset[0], keypoint.y + offset[1]);
            let weighted_magnitude = magnitude*gauss_2d(0.0, 0.0, u, v, half_length);
            let relative_orientation = wrap_angle(orientation - keypoint.orientation);

            let (cell_x, frac_x) = split_bin((u + half_length)/(SUBMATRIX_LENGTH as Float) - 0.5);
            let (cell_y, frac_y) = split_bin((v + half_length)/(SUBMATRIX_LENGTH as Float) - 0.5);
            let (bin, frac_bin) = split_bin(relative_orientation/bin_range);

            for &(yi, wy) in [(cell_y, 1.0-frac_y), (cell_y+1, frac_y)].iter() {
                if yi < 0 || yi >= grid_size as isize {
                    continue;
                }
                for &(xi, wx) in [(cell_x, 1.0-frac_x), (cell_x+1, frac_x)].iter() {
                    if xi < 0 || xi >= grid_size as isize {
                        continue;
                    }
                    for &(oi, wo) in [(bin, 1.0-frac_bin), (bin+1, frac_bin)].iter() {
                        let o = oi.rem_euclid(bins as isize) as usize;
                        let index = (yi as usize*grid_size + xi as usize)*bins + o;
                        descriptor[index] += weighted_magnitude*wx*wy*wo;
                    }
                }
            }
        }
    }

    normalize_and_clip(descriptor, runtime_params.descriptor_clip)
}

/// Unit length, components capped at `clip`, unit length again.
pub fn normalize_and_clip(descriptor: Descriptor, clip: Float) -> Result<Descriptor, Rejection> {
    let norm = descriptor.norm();
    if !(norm > 0.0) {
        return Err(Rejection::FlatNeighborhood);
    }
    let clipped = (descriptor/norm).map(|v| v.min(clip));
    let clipped_norm = clipped.norm();
    if !(clipped_norm > 0.0) {
        return Err(Rejection::FlatNeighborhood);
    }
    Ok(clipped/clipped_norm)
}

#[cfg(test)]
mod test {
    use super::*;
    use na::DMatrix;
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use crate::image::{Image, image_encoding::ImageEncoding};

    const SIZE: usize = 48;

    fn random_buffer(seed: u64) -> DMatrix<Float> {
        let mut rng = StdRng::seed_from_u64(seed);
        DMatrix::<Float>::from_fn(SIZE, SIZE, |_,_| rng.gen::<Float>())
    }

    fn octave(buffer: &DMatrix<Float>) -> SiftOctave {
        let params = SiftRuntimeParams::default();
        SiftOctave::build_octave(&Image::from_matrix(buffer, ImageEncoding::F64), params.sigma_in, 1.0, &params).unwrap()
    }

    fn keypoint(x: Float, y: Float, orientation: Float) -> KeyPoint {
        let params = SiftRuntimeParams::default();
        KeyPoint {
            octave_level: 0,
            x,
            y,
            sigma_level: 1.0,
            sigma: params.sigma_initial*(1.0 as Float/3.0).exp2(),
            value: 0.1,
            orientation,
            magnitude: 1.0
        }
    }

    #[test]
    fn descriptor_is_unit_length() {
        let params = SiftRuntimeParams::default();
        let descriptor = describe_keypoint(&octave(&random_buffer(3)), &keypoint(23.0, 24.5, 0.7), &params).unwrap();
        assert_eq!(descriptor.len(), 128);
        assert!((descriptor.norm() - 1.0).abs() < 1e-6);
        assert!(descriptor.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn descriptor_is_invariant_to_quarter_turns() {
        let params = SiftRuntimeParams::default();
        let buffer = random_buffer(11);
        // B(x',y') = A(x,y) with x' = N-1-y, y' = x
        let rotated = DMatrix::<Float>::from_fn(SIZE, SIZE, |r,c| buffer[(SIZE-1-c, r)]);

        let (x, y, orientation) = (21.3, 25.6, 0.3);
        let original = describe_keypoint(&octave(&buffer), &keypoint(x, y, orientation), &params).unwrap();
        let turned = describe_keypoint(&octave(&rotated), &keypoint((SIZE-1) as Float - y, x, orientation + float::consts::FRAC_PI_2), &params).unwrap();

        for (a,b) in original.iter().zip(turned.iter()) {
            assert!((a-b).abs() < 1e-6);
        }
    }

    #[test]
    fn descriptor_follows_oblique_rotation() {
        let params = SiftRuntimeParams::default();
        let angle: Float = 0.6;
        let center = (SIZE-1) as Float/2.0;
        let pattern = |x: Float, y: Float| 0.5 + 0.2*(0.35*x + 0.2*y).sin() + 0.15*(0.25*x - 0.4*y).cos()
            + 0.3*(-((x-22.0).powi(2) + (y-27.0).powi(2))/20.0).exp();
        let (sin, cos) = angle.sin_cos();
        let buffer = DMatrix::<Float>::from_fn(SIZE, SIZE, |r,c| pattern(c as Float, r as Float));
        let rotated = DMatrix::<Float>::from_fn(SIZE, SIZE, |r,c| {
            let (dx, dy) = (c as Float - center, r as Float - center);
            pattern(center + cos*dx + sin*dy, center - sin*dx + cos*dy)
        });

        let (x, y, orientation) = (21.3, 25.6, 0.3);
        let (dx, dy) = (x - center, y - center);
        let original = describe_keypoint(&octave(&buffer), &keypoint(x, y, orientation), &params).unwrap();
        let turned = describe_keypoint(&octave(&rotated), &keypoint(center + cos*dx - sin*dy, center + sin*dx + cos*dy, orientation + angle), &params).unwrap();

        assert!((original - turned).norm() < 0.05);
    }

    #[test]
    fn window_outside_octave_is_rejected() {
        let params = SiftRuntimeParams::default();
        let octave = octave(&random_buffer(5));
        assert_eq!(describe_keypoint(&octave, &keypoint(3.0, 24.0, 0.0), &params), Err(Rejection::InsufficientNeighborhood));
        let half_width = descriptor_half_width(sample_spacing(&keypoint(0.0, 0.0, 0.0), &params), &params);
        assert!(!is_rotated_keypoint_within_image(&octave, &keypoint(24.0, 38.0, 0.8), half_width));
        assert!(is_rotated_keypoint_within_image(&octave, &keypoint(24.0, 24.0, 0.8), half_width));
    }

    #[test]
    fn flat_window_is_rejected() {
        let params = SiftRuntimeParams::default();
        let octave = octave(&DMatrix::<Float>::from_element(SIZE, SIZE, 0.3));
        assert_eq!(describe_keypoint(&octave, &keypoint(24.0, 24.0, 0.0), &params), Err(Rejection::FlatNeighborhood));
    }

    #[test]
    fn clipping_caps_dominant_components() {
        let mut descriptor = Descriptor::zeros(128);
        descriptor[0] = 10.0;
        descriptor[1] = 1.0;
        descriptor[2] = 1.0;
        let clipped = normalize_and_clip(descriptor, 0.2).unwrap();
        assert!((clipped.norm() - 1.0).abs() < 1e-12);
        assert!(clipped[0] < 0.99);
        assert!(normalize_and_clip(Descriptor::zeros(8), 0.2).is_err());
    }
}
