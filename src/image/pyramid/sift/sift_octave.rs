use crate::image::Image;
use crate::image::filter::{gauss_kernel::GaussKernel1D, prewitt_kernel::PrewittKernel, gaussian_2_d_convolution, filter_1d_convolution};
use crate::image::pyramid::sift::sift_runtime_params::SiftRuntimeParams;
use crate::error::SiftError;
use crate::{Float,GradientDirection};

/// One octave of the scale space: s+3 gaussian levels, their s+2 differences and
/// central difference gradients of every gaussian level.
#[derive(Debug,Clone)]
pub struct SiftOctave {
    pub images: Vec<Image>,
    pub x_gradient: Vec<Image>,
    pub y_gradient: Vec<Image>,
    pub difference_of_gaussians: Vec<Image>,
    pub sigmas: Vec<Float>,
    pub inter_pixel_distance: Float
}

impl SiftOctave {

    /// `base_sigma` is the blur already present in `base_image`, in octave pixels.
    pub fn build_octave(base_image: &Image, base_sigma: Float, inter_pixel_distance: Float, runtime_params: &SiftRuntimeParams) -> Result<SiftOctave, SiftError> {

        let s = runtime_params.sigma_count;
        let image_count = s + 3;
        let range = 0..image_count;

        let prewitt_kernel = PrewittKernel::new();

        let sigmas: Vec<Float> = range.clone().map(|x| runtime_params.sigma_initial*SiftOctave::generate_k(x as Float, s as Float)).collect();
        let images = sigmas.iter().map(|&sigma| {
            let increment_sqr = sigma.powi(2) - base_sigma.powi(2);
            match increment_sqr {
                v if v <= 0.0 => Ok(base_image.clone()),
                v => GaussKernel1D::with_blur_half_factor(v.sqrt(), runtime_params.blur_half_factor).map(|kernel| gaussian_2_d_convolution(base_image, &kernel))
            }
        }).collect::<Result<Vec<Image>, SiftError>>()?;

        let x_gradient = range.clone().map(|i| filter_1d_convolution(&images, i, GradientDirection::HORIZONTAL, &prewitt_kernel, true)).collect();
        let y_gradient = range.clone().map(|i| filter_1d_convolution(&images, i, GradientDirection::VERTICAL, &prewitt_kernel, true)).collect();

        let difference_of_gaussians = images.windows(2).map(|pair| Image::difference(&pair[1], &pair[0])).collect::<Vec<Image>>();

        Ok(SiftOctave {images,x_gradient,y_gradient,difference_of_gaussians,sigmas,inter_pixel_distance})
    }

    pub fn generate_k(n: Float, s: Float) -> Float {
        let exp = n/s;
        exp.exp2()
    }

    /// Distance between neighbouring samples of octave `octave_level`, in input pixels.
    pub fn inter_pixel_distance(octave_level: usize, double_base_image: bool) -> Float {
        let distance = (octave_level as Float).exp2();
        match double_base_image {
            true => 0.5*distance,
            false => distance
        }
    }

    pub fn s(&self) -> usize {
        self.sigmas.len() - 3
    }

    pub fn width(&self) -> usize {
        self.images[0].width()
    }

    pub fn height(&self) -> usize {
        self.images[0].height()
    }

    /// Gaussian level whose nominal blur is closest to the fractional `sigma_level`.
    pub fn closest_image_level(&self, sigma_level: Float) -> usize {
        let max_level = (self.images.len() - 1) as Float;
        sigma_level.round().max(0.0).min(max_level) as usize
    }
}
