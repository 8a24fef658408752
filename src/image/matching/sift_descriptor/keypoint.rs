use std::fmt;
use crate::Float;
use crate::image::features::sift_feature::SiftFeature;

/// Refined extremum with an assigned orientation. Coordinates and `sigma` are in octave pixels.
#[derive(Debug,Clone,PartialEq)]
pub struct KeyPoint {
    pub octave_level: usize,
    pub x: Float,
    pub y: Float,
    pub sigma_level: Float,
    pub sigma: Float,
    pub value: Float,
    pub orientation: Float,
    pub magnitude: Float
}

impl KeyPoint {
    pub fn from_feature(feature: &SiftFeature, sigma: Float, orientation: Float, magnitude: Float) -> KeyPoint {
        KeyPoint {
            octave_level: feature.octave_level,
            x: feature.x(),
            y: feature.y(),
            sigma_level: feature.sigma_level(),
            sigma,
            value: feature.value,
            orientation,
            magnitude
        }
    }
}

impl fmt::Display for KeyPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "o: {}, x: {:.3}, y: {:.3}, sigma: {:.3}, orientation: {:.4}", self.octave_level, self.x, self.y, self.sigma, self.orientation)
    }
}
