use log::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use crate::{Float, Rejection};
use crate::error::{SiftError, RejectionTally};
use crate::image::Image;
use crate::image::pyramid::{Pyramid,sift::{sift_octave::SiftOctave,sift_runtime_params::SiftRuntimeParams}};
use crate::image::features::sift_feature::{SiftFeature, detect_sift_feature, processing::subpixel_refinement};
use crate::image::matching::sift_descriptor::{
    feature_vector::FeatureVector,
    orientation_histogram::generate_keypoints_from_extrema,
    local_image_descriptor::describe_keypoint,
    keypoint::KeyPoint
};

pub mod sift_runtime_params;
pub mod sift_octave;

pub type SiftPyramid = Pyramid<SiftOctave>;

/// Gaussian scale space of `base_image`. Octaves stop early once a halved level
/// would fall below `min_image_dimensions`.
pub fn build_sift_pyramid(base_image: &Image, runtime_params: &SiftRuntimeParams) -> Result<SiftPyramid, SiftError> {
    runtime_params.validate()?;
    base_image.validate()?;

    let (min_width, min_height) = runtime_params.min_image_dimensions;
    let (octave_base, base_sigma) = match runtime_params.double_base_image {
        true => (Image::upsample_double(base_image), 2.0*runtime_params.sigma_in),
        false => (base_image.clone(), runtime_params.sigma_in)
    };

    if octave_base.width() < min_width || octave_base.height() < min_height {
        return Err(SiftError::ScaleSpaceExhausted {
            requested: runtime_params.octave_count,
            min_width,
            min_height,
            width: base_image.width(),
            height: base_image.height()
        });
    }

    let sigma_count = runtime_params.sigma_count;
    let mut octaves: Vec<SiftOctave> = Vec::with_capacity(runtime_params.octave_count);
    let mut octave_image = octave_base;
    let mut sigma = base_sigma;

    for i in 0..runtime_params.octave_count {

        if i > 0 {
            octave_image = match Image::downsample_half(&octaves[i-1].images[sigma_count], runtime_params.min_image_dimensions) {
                Some(image) => image,
                None => {
                    warn!("capping scale space at {} of {} octaves: octave {} would be smaller than {}x{}", i, runtime_params.octave_count, i, min_width, min_height);
                    break;
                }
            };
            sigma = runtime_params.sigma_initial;
        }

        let inter_pixel_distance = SiftOctave::inter_pixel_distance(i, runtime_params.double_base_image);
        let new_octave = SiftOctave::build_octave(&octave_image, sigma, inter_pixel_distance, runtime_params)?;
        debug!("octave {}: {}x{}, inter pixel distance {}", i, new_octave.width(), new_octave.height(), inter_pixel_distance);

        octaves.push(new_octave);
    }

    Ok(Pyramid{octaves})
}

/// DoG extrema of every octave, ordered by octave, DoG level, then row-major position.
pub fn detect_extrema(pyramid: &SiftPyramid, contrast_threshold: Float) -> Vec<SiftFeature> {
    pyramid.octaves.iter().enumerate().flat_map(|(octave_level, octave)| {
        let dog_count = octave.difference_of_gaussians.len();
        (1..dog_count.saturating_sub(1)).flat_map(move |dog_level| detect_sift_feature(&octave.difference_of_gaussians, octave_level, dog_level, contrast_threshold))
    }).collect()
}

/// Order preserving map over independent items, run on the rayon pool with the `parallel` feature.
fn map_items<T, R, F>(items: &[T], f: F) -> Vec<R> where T: Sync, R: Send, F: Fn(&T) -> R + Sync + Send {
    #[cfg(not(feature = "parallel"))]
    let result: Vec<R> = items.iter().map(f).collect();

    #[cfg(feature = "parallel")]
    let result: Vec<R> = items.par_iter().map(f).collect();

    result
}

fn keep_accepted<T>(results: Vec<Result<T, Rejection>>, tally: &mut RejectionTally) -> Vec<T> {
    results.into_iter().filter_map(|result| match result {
        Ok(item) => Some(item),
        Err(rejection) => {
            tally.record(rejection);
            None
        }
    }).collect()
}

pub fn keypoints_from_pyramid(pyramid: &SiftPyramid, runtime_params: &SiftRuntimeParams) -> Vec<KeyPoint> {
    let mut tally = RejectionTally::default();

    let candidates = detect_extrema(pyramid, runtime_params.contrast_r);
    let refined = keep_accepted(map_items(&candidates, |candidate| {
        subpixel_refinement(&pyramid.octaves[candidate.octave_level].difference_of_gaussians, candidate, runtime_params)
    }), &mut tally);
    let oriented = keep_accepted(map_items(&refined, |feature| {
        generate_keypoints_from_extrema(&pyramid.octaves[feature.octave_level], feature, runtime_params)
    }), &mut tally);
    let keypoints = oriented.into_iter().flatten().collect::<Vec<KeyPoint>>();

    debug!("candidates: {}, refined: {}, keypoints: {}, rejected: {}", candidates.len(), refined.len(), keypoints.len(), tally);
    keypoints
}

pub fn feature_vectors_from_pyramid(pyramid: &SiftPyramid, runtime_params: &SiftRuntimeParams) -> Vec<FeatureVector> {
    let mut tally = RejectionTally::default();

    let keypoints = keypoints_from_pyramid(pyramid, runtime_params);
    let feature_vectors = keep_accepted(map_items(&keypoints, |keypoint| {
        let octave = &pyramid.octaves[keypoint.octave_level];
        describe_keypoint(octave, keypoint, runtime_params).map(|descriptor| FeatureVector::new(keypoint.clone(), descriptor, octave.inter_pixel_distance))
    }), &mut tally);

    debug!("described: {} of {} keypoints, rejected: {}", feature_vectors.len(), keypoints.len(), tally);
    feature_vectors
}

/// Full pipeline from a grayscale image to described keypoints.
pub fn extract_feature_vectors(image: &Image, runtime_params: &SiftRuntimeParams) -> Result<Vec<FeatureVector>, SiftError> {
    let pyramid = build_sift_pyramid(image, runtime_params)?;
    Ok(feature_vectors_from_pyramid(&pyramid, runtime_params))
}
