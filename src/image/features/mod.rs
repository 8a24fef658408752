use crate::GradientDirection;

pub mod sift_feature;
pub mod hessian_response;

pub trait Feature {
    fn get_x_image(&self) -> usize;
    fn get_y_image(&self) -> usize;
    fn get_closest_sigma_level(&self) -> usize;
}

/// Integer sample location inside a stack of images, used to probe neighbouring samples.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct SamplePosition {
    pub x: usize,
    pub y: usize,
    pub sigma_level: usize
}

impl SamplePosition {
    pub fn new(x: usize, y: usize, sigma_level: usize) -> SamplePosition {
        SamplePosition{x, y, sigma_level}
    }

    pub fn from_feature<F: Feature>(feature: &F) -> SamplePosition {
        SamplePosition::new(feature.get_x_image(), feature.get_y_image(), feature.get_closest_sigma_level())
    }

    /// Moves one step along `direction`. The caller keeps the result inside the stack.
    pub fn shifted(&self, direction: GradientDirection, step: isize) -> SamplePosition {
        let shift = |v: usize| (v as isize + step) as usize;
        match direction {
            GradientDirection::HORIZONTAL => SamplePosition{x: shift(self.x), ..*self},
            GradientDirection::VERTICAL => SamplePosition{y: shift(self.y), ..*self},
            GradientDirection::SIGMA => SamplePosition{sigma_level: shift(self.sigma_level), ..*self}
        }
    }
}

impl Feature for SamplePosition {
    fn get_x_image(&self) -> usize { self.x }
    fn get_y_image(&self) -> usize { self.y }
    fn get_closest_sigma_level(&self) -> usize { self.sigma_level }
}
