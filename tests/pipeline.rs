extern crate nalgebra as na;
extern crate sift;

use color_eyre::eyre::Result;
use na::DMatrix;
use rand::{Rng, SeedableRng, rngs::StdRng};

use sift::{Image, SiftError, SiftRuntimeParams, build_sift_pyramid, extract_feature_vectors, keypoints_from_pyramid, feature_vectors_from_pyramid};
use sift::image::image_encoding::ImageEncoding;
use sift::image::filter::{convolve, gauss_kernel::build_gaussian_kernel};
use sift::Float;
use sift::image::pyramid::sift::detect_extrema;
use sift::image::features::sift_feature::processing::subpixel_refinement;
use sift::image::matching::sift_descriptor::{orientation_histogram::generate_keypoints_from_extrema, local_image_descriptor::describe_keypoint};

/// Blurred uniform noise, so that the scale space holds extrema at several scales.
fn textured_image(width: usize, height: usize, seed: u64) -> Result<Image> {
    let mut rng = StdRng::seed_from_u64(seed);
    let buffer = DMatrix::<Float>::from_fn(height, width, |_,_| rng.gen::<Float>());
    let kernel = build_gaussian_kernel(7, 1.2)?;
    Ok(convolve(&Image::from_matrix(&buffer, ImageEncoding::F64), &kernel, true))
}

fn blobs_image(size: usize, centers: &[(Float,Float,Float)]) -> Image {
    let buffer = DMatrix::<Float>::from_fn(size, size, |r,c| {
        centers.iter().map(|&(cx,cy,sigma)| {
            let d = (c as Float - cx).powi(2) + (r as Float - cy).powi(2);
            (-d/(2.0*sigma*sigma)).exp()
        }).sum()
    });
    Image::from_matrix(&buffer, ImageEncoding::F64)
}

#[test]
fn pipeline_is_deterministic() -> Result<()> {
    let image = textured_image(96, 80, 42)?;
    let params = SiftRuntimeParams::default();
    let first = extract_feature_vectors(&image, &params)?;
    let second = extract_feature_vectors(&image, &params)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn descriptors_are_normalized_and_inside_image() -> Result<()> {
    let image = textured_image(96, 96, 7)?;
    let params = SiftRuntimeParams{contrast_r: 0.01, ..SiftRuntimeParams::default()};
    let features = extract_feature_vectors(&image, &params)?;
    assert!(!features.is_empty());
    for feature in features.iter() {
        assert_eq!(feature.descriptor().len(), params.descriptor_length());
        assert!((feature.descriptor().norm() - 1.0).abs() < 1e-6);
        assert!(feature.x() >= 0.0 && feature.x() <= 95.0);
        assert!(feature.y() >= 0.0 && feature.y() <= 95.0);
        assert!(feature.orientation() >= 0.0 && feature.orientation() < 2.0*std::f64::consts::PI);
        assert!(feature.scale() > 0.0);
    }
    Ok(())
}

#[test]
fn candidates_follow_octave_level_and_row_major_order() -> Result<()> {
    let image = textured_image(80, 80, 3)?;
    let params = SiftRuntimeParams{contrast_r: 0.01, ..SiftRuntimeParams::default()};
    let pyramid = build_sift_pyramid(&image, &params)?;
    let candidates = detect_extrema(&pyramid, params.contrast_r);

    assert!(candidates.len() > 1);
    let keys = candidates.iter().map(|c| (c.octave_level, c.dog_level, c.y_image, c.x_image)).collect::<Vec<_>>();
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    Ok(())
}

#[test]
fn stage_outputs_keep_candidate_order() -> Result<()> {
    let image = textured_image(80, 80, 3)?;
    let params = SiftRuntimeParams{contrast_r: 0.01, ..SiftRuntimeParams::default()};
    let pyramid = build_sift_pyramid(&image, &params)?;

    let expected_keypoints = detect_extrema(&pyramid, params.contrast_r).iter()
        .filter_map(|candidate| subpixel_refinement(&pyramid.octaves[candidate.octave_level].difference_of_gaussians, candidate, &params).ok())
        .filter_map(|feature| generate_keypoints_from_extrema(&pyramid.octaves[feature.octave_level], &feature, &params).ok())
        .flatten()
        .collect::<Vec<_>>();
    let keypoints = keypoints_from_pyramid(&pyramid, &params);
    assert!(!keypoints.is_empty());
    assert_eq!(keypoints, expected_keypoints);

    let expected_descriptors = keypoints.iter()
        .filter_map(|keypoint| describe_keypoint(&pyramid.octaves[keypoint.octave_level], keypoint, &params).ok())
        .collect::<Vec<_>>();
    let features = feature_vectors_from_pyramid(&pyramid, &params);
    assert_eq!(features.iter().map(|f| f.descriptor().clone()).collect::<Vec<_>>(), expected_descriptors);
    Ok(())
}

#[test]
fn translated_blob_moves_its_keypoint() -> Result<()> {
    let params = SiftRuntimeParams{contrast_r: 0.01, ..SiftRuntimeParams::default()};
    let near = |features: &Vec<sift::FeatureVector>, x: Float, y: Float| features.iter().any(|f| (f.x()-x).abs() < 1.0 && (f.y()-y).abs() < 1.0);

    let original = extract_feature_vectors(&blobs_image(96, &[(40.0,40.0,3.0)]), &params)?;
    let translated = extract_feature_vectors(&blobs_image(96, &[(48.0,44.0,3.0)]), &params)?;

    assert!(near(&original, 40.0, 40.0));
    assert!(near(&translated, 48.0, 44.0));
    Ok(())
}

#[test]
fn invalid_inputs_are_fatal() {
    assert!(matches!(Image::from_vec(3, 3, vec![0.0; 8]), Err(SiftError::InvalidParameter(_))));
    assert!(matches!(Image::from_vec(2, 1, vec![0.0, Float::INFINITY]), Err(SiftError::InvalidParameter(_))));

    let tiny = blobs_image(6, &[(3.0,3.0,1.0)]);
    assert!(matches!(extract_feature_vectors(&tiny, &SiftRuntimeParams::default()), Err(SiftError::ScaleSpaceExhausted{..})));
}

#[test]
fn configuration_round_trips_through_yaml() -> Result<()> {
    let params = SiftRuntimeParams{octave_count: 3, sigma_count: 4, double_base_image: true, ..SiftRuntimeParams::default()};
    let yaml = params.to_yaml_string()?;
    assert_eq!(SiftRuntimeParams::from_yaml_str(&yaml)?, params);
    Ok(())
}
