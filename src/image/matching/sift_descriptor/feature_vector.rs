extern crate nalgebra as na;

use na::DVector;
use crate::Float;
use crate::image::matching::sift_descriptor::keypoint::KeyPoint;

/// Unit length gradient histogram of `grid_size^2 * bins_per_cell` entries.
pub type Descriptor = DVector<Float>;

/// A described keypoint. The accessors report input image coordinates.
#[derive(Debug,Clone,PartialEq)]
pub struct FeatureVector {
    pub keypoint: KeyPoint,
    pub descriptor: Descriptor,
    pub inter_pixel_distance: Float
}

impl FeatureVector {
    pub fn new(keypoint: KeyPoint, descriptor: Descriptor, inter_pixel_distance: Float) -> FeatureVector {
        FeatureVector{keypoint, descriptor, inter_pixel_distance}
    }

    pub fn x(&self) -> Float {
        self.keypoint.x*self.inter_pixel_distance
    }

    pub fn y(&self) -> Float {
        self.keypoint.y*self.inter_pixel_distance
    }

    pub fn scale(&self) -> Float {
        self.keypoint.sigma*self.inter_pixel_distance
    }

    pub fn orientation(&self) -> Float {
        self.keypoint.orientation
    }

    pub fn octave_level(&self) -> usize {
        self.keypoint.octave_level
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }
}
