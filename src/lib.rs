extern crate nalgebra as na;

pub mod error;
pub mod numerics;
pub mod image;
pub mod visualize;
pub mod evaluation;

pub use self::error::{SiftError, Rejection};
pub use self::image::Image;
pub use self::image::pyramid::sift::{
    build_sift_pyramid,
    extract_feature_vectors,
    feature_vectors_from_pyramid,
    keypoints_from_pyramid,
    sift_runtime_params::SiftRuntimeParams
};
pub use self::image::matching::sift_descriptor::{feature_vector::{Descriptor, FeatureVector}, keypoint::KeyPoint};

macro_rules! define_float {
    ($f:tt) => {
        pub use std::$f as float;
        pub type Float = $f;
    }
}

define_float!(f64);

#[repr(u8)]
#[derive(Debug,Copy,Clone,PartialEq)]
pub enum GradientDirection {
    HORIZONTAL,
    VERTICAL,
    SIGMA
}
