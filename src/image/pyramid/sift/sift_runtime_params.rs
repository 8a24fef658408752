use serde::{Serialize, Deserialize};
use std::fmt;

use crate::Float;
use crate::error::SiftError;

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct SiftRuntimeParams {
    pub octave_count: usize,
    pub sigma_count: usize,
    pub sigma_initial: Float,
    pub sigma_in: Float,
    pub blur_half_factor: Float,
    pub double_base_image: bool,
    pub min_image_dimensions: (usize,usize),
    pub contrast_r: Float,
    pub edge_r: Float,
    pub max_refinement_iterations: usize,
    pub orientation_bins: usize,
    pub orientation_histogram_window_factor: Float,
    pub orientation_radius_factor: Float,
    pub orientation_smoothing_passes: usize,
    pub orientation_peak_ratio: Float,
    pub orientation_isotropy_ratio: Float,
    pub descriptor_grid_size: usize,
    pub descriptor_bins_per_cell: usize,
    pub descriptor_clip: Float
}

impl Default for SiftRuntimeParams {
    fn default() -> SiftRuntimeParams {
        SiftRuntimeParams {
            octave_count: 4,
            sigma_count: 3,
            sigma_initial: 1.6,
            sigma_in: 0.5,
            blur_half_factor: 3.0,
            double_base_image: false,
            min_image_dimensions: (8,8),
            contrast_r: 0.03,
            edge_r: 10.0,
            max_refinement_iterations: 5,
            orientation_bins: 36,
            orientation_histogram_window_factor: 1.5,
            orientation_radius_factor: 3.0,
            orientation_smoothing_passes: 2,
            orientation_peak_ratio: 0.8,
            orientation_isotropy_ratio: 0.5,
            descriptor_grid_size: 4,
            descriptor_bins_per_cell: 8,
            descriptor_clip: 0.2
        }
    }
}

impl SiftRuntimeParams {

    pub fn from_yaml_str(yaml: &str) -> Result<SiftRuntimeParams, SiftError> {
        let params: SiftRuntimeParams = serde_yaml::from_str(yaml)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_yaml_string(&self) -> Result<String, SiftError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Length of a descriptor built with these parameters.
    pub fn descriptor_length(&self) -> usize {
        self.descriptor_grid_size.pow(2)*self.descriptor_bins_per_cell
    }

    pub fn validate(&self) -> Result<(), SiftError> {
        let positive = |value: Float, name: &str| match value.is_finite() && value > 0.0 {
            true => Ok(()),
            false => Err(SiftError::invalid(format!("{} must be positive and finite, got {}", name, value)))
        };
        let non_negative = |value: Float, name: &str| match value.is_finite() && value >= 0.0 {
            true => Ok(()),
            false => Err(SiftError::invalid(format!("{} must be non-negative and finite, got {}", name, value)))
        };
        let at_least = |value: usize, min: usize, name: &str| match value >= min {
            true => Ok(()),
            false => Err(SiftError::invalid(format!("{} must be at least {}, got {}", name, min, value)))
        };

        at_least(self.octave_count, 1, "octave_count")?;
        at_least(self.sigma_count, 1, "sigma_count")?;
        positive(self.sigma_initial, "sigma_initial")?;
        non_negative(self.sigma_in, "sigma_in")?;
        positive(self.blur_half_factor, "blur_half_factor")?;
        at_least(self.min_image_dimensions.0, 3, "min_image_dimensions.0")?;
        at_least(self.min_image_dimensions.1, 3, "min_image_dimensions.1")?;
        non_negative(self.contrast_r, "contrast_r")?;
        at_least(self.max_refinement_iterations, 1, "max_refinement_iterations")?;
        at_least(self.orientation_bins, 3, "orientation_bins")?;
        positive(self.orientation_histogram_window_factor, "orientation_histogram_window_factor")?;
        positive(self.orientation_radius_factor, "orientation_radius_factor")?;
        at_least(self.descriptor_grid_size, 1, "descriptor_grid_size")?;
        at_least(self.descriptor_bins_per_cell, 1, "descriptor_bins_per_cell")?;
        positive(self.descriptor_clip, "descriptor_clip")?;

        if !(self.edge_r.is_finite() && self.edge_r >= 1.0) {
            return Err(SiftError::invalid(format!("edge_r must be at least 1, got {}", self.edge_r)));
        }
        if !(self.orientation_peak_ratio > 0.0 && self.orientation_peak_ratio <= 1.0) {
            return Err(SiftError::invalid(format!("orientation_peak_ratio must lie in (0,1], got {}", self.orientation_peak_ratio)));
        }
        if !(self.orientation_isotropy_ratio > 0.0 && self.orientation_isotropy_ratio <= 1.0) {
            return Err(SiftError::invalid(format!("orientation_isotropy_ratio must lie in (0,1], got {}", self.orientation_isotropy_ratio)));
        }
        Ok(())
    }
}

impl fmt::Display for SiftRuntimeParams {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "octave_count_{}_sigma_count_{}_sigma_initial_{}_sigma_in_{}_double_base_{}_contrast_r_{}_edge_r_{}_orientation_bins_{}_grid_{}_bins_per_cell_{}",
        self.octave_count,self.sigma_count,self.sigma_initial,self.sigma_in,self.double_base_image,self.contrast_r,self.edge_r,self.orientation_bins,self.descriptor_grid_size,self.descriptor_bins_per_cell)
    }
}
