extern crate nalgebra as na;

use na::{DMatrix, Vector3};

use crate::Float;
use crate::image::Image;
use crate::image::features::Feature;
use std::fmt;


pub mod processing;

/// Scale space extremum. Detection fills the integer sample location; refinement moves it and
/// records the sub-pixel `offset` (x, y, sigma level) and the interpolated `value`.
#[derive(Debug,Clone,PartialEq)]
pub struct SiftFeature {
    pub octave_level: usize,
    pub x_image: usize,
    pub y_image: usize,
    pub dog_level: usize,
    pub offset: Vector3<Float>,
    pub value: Float
}

impl Feature for SiftFeature {
    fn get_x_image(&self) -> usize {
        self.x_image
    }
    fn get_y_image(&self) -> usize {
        self.y_image
    }
    fn get_closest_sigma_level(&self) -> usize {
        self.dog_level
    }
}

impl fmt::Display for SiftFeature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "o: {}, x: {}, y: {}, s: {}", self.octave_level, self.x(), self.y(), self.sigma_level())
    }
}

impl SiftFeature {

    pub fn new(octave_level: usize, x_image: usize, y_image: usize, dog_level: usize, value: Float) -> SiftFeature {
        SiftFeature{octave_level, x_image, y_image, dog_level, offset: Vector3::zeros(), value}
    }

    /// Sub-pixel x in octave coordinates.
    pub fn x(&self) -> Float {
        self.x_image as Float + self.offset[0]
    }

    /// Sub-pixel y in octave coordinates.
    pub fn y(&self) -> Float {
        self.y_image as Float + self.offset[1]
    }

    pub fn sigma_level(&self) -> Float {
        self.dog_level as Float + self.offset[2]
    }

    /// Blur in octave pixels: sigma_initial * 2^(level/s).
    pub fn sigma(&self, sigma_initial: Float, s: usize) -> Float {
        sigma_initial*(self.sigma_level()/(s as Float)).exp2()
    }
}

/// Scans the interior DoG level `dog_level` of one octave for strict extrema of the 26 neighbours.
/// Samples with |D| below `contrast_threshold` are skipped. Output is in row-major order.
pub fn detect_sift_feature(difference_of_gaussians: &[Image], octave_level: usize, dog_level: usize, contrast_threshold: Float) -> Vec<SiftFeature> {

    let mut extrema_vec: Vec<SiftFeature> = Vec::new();

    if dog_level == 0 || dog_level+1 >= difference_of_gaussians.len() {
        return extrema_vec;
    }

    let image_buffer = &difference_of_gaussians[dog_level].buffer;
    let prev_buffer = &difference_of_gaussians[dog_level-1].buffer;
    let next_buffer = &difference_of_gaussians[dog_level+1].buffer;

    for y in 1..image_buffer.nrows().saturating_sub(1) {
        for x in 1..image_buffer.ncols().saturating_sub(1) {

            let sample_value = image_buffer[(y,x)];

            if sample_value.abs() < contrast_threshold {
                continue;
            }

            let (is_smallest_curr, is_largest_curr) = is_sample_extrema_in_neighbourhood(sample_value,x,y,image_buffer,true);
            if !(is_smallest_curr || is_largest_curr) {
                continue;
            }
            let (is_smallest_prev, is_largest_prev) = is_sample_extrema_in_neighbourhood(sample_value,x,y,prev_buffer,false);
            let (is_smallest_next, is_largest_next) = is_sample_extrema_in_neighbourhood(sample_value,x,y,next_buffer,false);

            let is_extrema = (is_smallest_curr && is_smallest_prev && is_smallest_next) || (is_largest_curr && is_largest_prev && is_largest_next);

            if is_extrema {
                extrema_vec.push(SiftFeature::new(octave_level, x, y, dog_level, sample_value));
            }
        }
    }

    extrema_vec
}

fn is_sample_extrema_in_neighbourhood(sample: Float, x_sample: usize, y_sample: usize, neighbourhood_buffer: &DMatrix<Float>, skip_center: bool) -> (bool,bool) {

    let mut is_smallest = true;
    let mut is_largest = true;

    for y in y_sample-1..y_sample+2 {
        for x in x_sample-1..x_sample+2 {

            if x == x_sample && y == y_sample && skip_center {
                continue;
            }

            let value = neighbourhood_buffer[(y,x)];
            is_smallest &= sample < value;
            is_largest &= sample > value;

            if !(is_smallest || is_largest) {
                return (false,false);
            }

        }
    }

    (is_smallest,is_largest)
}
