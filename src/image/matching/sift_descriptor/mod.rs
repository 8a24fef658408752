pub mod orientation_histogram;
pub mod local_image_descriptor;
pub mod feature_vector;
pub mod keypoint;
