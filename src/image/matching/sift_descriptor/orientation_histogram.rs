use crate::{float,Float};
use crate::error::Rejection;
use crate::image::features::sift_feature::SiftFeature;
use crate::image::pyramid::sift::{sift_octave::SiftOctave, sift_runtime_params::SiftRuntimeParams};
use crate::image::matching::sift_descriptor::keypoint::KeyPoint;
use crate::numerics::{gauss_2d, gradient_and_orientation, lagrange_interpolation_quadratic, wrap_angle};

/// Circular histogram of gradient orientations in radians.
#[derive(Debug,Clone)]
pub struct OrientationHistogram {
    pub bin_range: Float,
    pub bins: Vec<Float>
}

impl OrientationHistogram {

    pub fn new(bin_len: usize) -> OrientationHistogram {
        OrientationHistogram{
            bin_range: 2.0*float::consts::PI/(bin_len as Float),
            bins: vec![0.0;bin_len]
        }
    }

    pub fn add_measurement(&mut self, grad_orientation: (Float,Float), weight: Float) -> () {
        let (grad, orientation) = grad_orientation;
        let index = radian_to_index(self,orientation);
        self.bins[index] += grad*weight;
    }

    pub fn get_value_circular(&self, i: isize) -> Float {
        let len = self.bins.len() as isize;
        self.bins[i.rem_euclid(len) as usize]
    }

    /// One pass of the circular [1,4,6,4,1]/16 filter.
    pub fn smooth(&mut self) -> () {
        let smoothed = (0..self.bins.len()).map(|i| {
            let idx = i as isize;
            (self.get_value_circular(idx-2) + self.get_value_circular(idx+2))/16.0 +
            (self.get_value_circular(idx-1) + self.get_value_circular(idx+1))*4.0/16.0 +
            self.get_value_circular(idx)*6.0/16.0
        }).collect::<Vec<Float>>();
        self.bins = smoothed;
    }

    /// First bin holding the largest value.
    pub fn max_bin(&self) -> usize {
        self.bins.iter().enumerate().fold(0, |best, (i, &v)| match v > self.bins[best] {
            true => i,
            false => best
        })
    }

    pub fn min_value(&self) -> Float {
        self.bins.iter().cloned().fold(Float::INFINITY, Float::min)
    }

    pub fn is_local_peak(&self, index: usize) -> bool {
        let idx = index as isize;
        let value = self.bins[index];
        value > self.get_value_circular(idx-1) && value > self.get_value_circular(idx+1)
    }

    /// Peak orientation refined by a parabola through the peak bin and its two neighbours.
    pub fn interpolated_orientation(&self, index: usize) -> Float {
        let len = self.bins.len();
        let idx = index as isize;
        let left = (idx-1).rem_euclid(len as isize) as usize;
        let right = (index+1) % len;
        let bin_position = lagrange_interpolation_quadratic(
            left as Float, index as Float, right as Float,
            self.bins[left], self.bins[index], self.bins[right],
            0.0, len as Float);
        wrap_angle(index_to_radian(self, bin_position))
    }

    /// A histogram without a valley: its smallest bin reaches `isotropy_ratio` of the largest.
    pub fn is_isotropic(&self, isotropy_ratio: Float) -> bool {
        self.min_value() >= isotropy_ratio*self.bins[self.max_bin()]
    }

    /// Primary peak first, then every other local peak of at least `peak_ratio` of the maximum
    /// in ascending bin order. Isotropic histograms only yield the primary peak.
    pub fn dominant_peaks(&self, peak_ratio: Float, isotropy_ratio: Float) -> Vec<usize> {
        let primary = self.max_bin();
        let max = self.bins[primary];
        let mut peaks = vec![primary];

        if self.is_isotropic(isotropy_ratio) {
            return peaks;
        }

        peaks.extend((0..self.bins.len()).filter(|&i| i != primary && self.bins[i] >= peak_ratio*max && self.is_local_peak(i)));
        peaks
    }
}

/// Center of the (fractional) bin `index`.
pub fn index_to_radian(histogram: &OrientationHistogram, index: Float) -> Float {
    (index + 0.5)*histogram.bin_range
}

pub fn radian_to_index(histogram: &OrientationHistogram, orientation: Float) -> usize {
    let index = (wrap_angle(orientation)/histogram.bin_range).floor() as usize;
    index.min(histogram.bins.len()-1)
}

/// Gaussian weighted gradient histogram over a disc around the refined feature.
pub fn build_orientation_histogram(octave: &SiftOctave, feature: &SiftFeature, runtime_params: &SiftRuntimeParams) -> OrientationHistogram {

    let sigma = feature.sigma(runtime_params.sigma_initial, octave.s());
    let window_sigma = runtime_params.orientation_histogram_window_factor*sigma;
    let radius = (runtime_params.orientation_radius_factor*window_sigma).round() as isize;
    let level = octave.closest_image_level(feature.sigma_level());
    let x_grad = &octave.x_gradient[level];
    let y_grad = &octave.y_gradient[level];

    let x_center = feature.x();
    let y_center = feature.y();
    let x_start = x_center.round() as isize;
    let y_start = y_center.round() as isize;
    let width = octave.width() as isize;
    let height = octave.height() as isize;

    let mut histogram = OrientationHistogram::new(runtime_params.orientation_bins);

    for y in y_start-radius..y_start+radius+1 {
        for x in x_start-radius..x_start+radius+1 {
            if x < 0 || y < 0 || x >= width || y >= height {
                continue;
            }
            let x_float = x as Float;
            let y_float = y as Float;
            if (x_float-x_center).powi(2) + (y_float-y_center).powi(2) > (radius as Float).powi(2) {
                continue;
            }
            let grad_orientation = gradient_and_orientation(x_grad, y_grad, x as usize, y as usize);
            let weight = gauss_2d(x_center, y_center, x_float, y_float, window_sigma);
            histogram.add_measurement(grad_orientation, weight);
        }
    }

    for _ in 0..runtime_params.orientation_smoothing_passes {
        histogram.smooth();
    }

    histogram
}

/// Assigns one keypoint per dominant orientation of the feature's neighbourhood.
pub fn generate_keypoints_from_extrema(octave: &SiftOctave, feature: &SiftFeature, runtime_params: &SiftRuntimeParams) -> Result<Vec<KeyPoint>, Rejection> {

    let histogram = build_orientation_histogram(octave, feature, runtime_params);
    let sigma = feature.sigma(runtime_params.sigma_initial, octave.s());

    if histogram.bins.iter().all(|&v| v <= 0.0) {
        return Err(Rejection::FlatNeighborhood);
    }

    Ok(histogram.dominant_peaks(runtime_params.orientation_peak_ratio, runtime_params.orientation_isotropy_ratio)
        .into_iter()
        .map(|peak| KeyPoint::from_feature(feature, sigma, histogram.interpolated_orientation(peak), histogram.bins[peak]))
        .collect())
}
