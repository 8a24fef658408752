extern crate nalgebra as na;

use na::DMatrix;
use crate::image::Image;
use crate::{Float, GradientDirection};
use crate::image::features::Feature;
use self::{kernel::Kernel,gauss_kernel::GaussKernel1D};

pub mod gauss_kernel;
pub mod prewitt_kernel;
pub mod laplace_kernel;
pub mod kernel;

/// Mirrors an out of range index back into [0,len) without repeating the edge sample,
/// i.e. -1 -> 1 and len -> len-2. Periodic for offsets larger than the image.
pub fn reflect_index(index: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let period = 2*(len as isize - 1);
    let wrapped = index.rem_euclid(period);
    match wrapped {
        i if i >= len as isize => (period - i) as usize,
        i => i as usize
    }
}

/// Direct 2-D correlation of `image` with `filter_kernel` under reflected borders.
/// With `normalize_output` the response is divided by the kernel's normalizing constant,
/// which is 1 for gaussian kernels.
pub fn convolve(image: &Image, filter_kernel: &dyn Kernel, normalize_output: bool) -> Image {
    let kernel = filter_kernel.kernel();
    let row_radius = ((kernel.nrows()-1)/2) as isize;
    let col_radius = ((kernel.ncols()-1)/2) as isize;
    let width = image.width();
    let height = image.height();
    let divisor = match normalize_output {
        true => filter_kernel.normalizing_constant(),
        false => 1.0
    };

    let buffer = DMatrix::<Float>::from_fn(height, width, |y,x| {
        let mut acc = 0.0;
        for kr in -row_radius..row_radius+1 {
            let sample_y = reflect_index(y as isize + kr, height);
            for kc in -col_radius..col_radius+1 {
                let sample_x = reflect_index(x as isize + kc, width);
                acc += kernel[((kr+row_radius) as usize, (kc+col_radius) as usize)]*image.buffer[(sample_y,sample_x)];
            }
        }
        acc/divisor
    });

    Image{buffer, original_encoding: image.original_encoding}
}

/// Applies a single row kernel along one axis. For `SIGMA` the kernel runs across `source_images`.
pub fn filter_1d_convolution(source_images: &[Image], sigma_level: usize, filter_direction: GradientDirection, filter_kernel: &dyn Kernel, normalize: bool) -> Image {
    let kernel = filter_kernel.kernel();
    let kernel_radius_signed = filter_kernel.radius() as isize;

    let source = &source_images[sigma_level];
    let buffer = &source.buffer;
    let width = buffer.ncols();
    let height = buffer.nrows();
    let divisor = match normalize {
        true => filter_kernel.normalizing_constant(),
        false => 1.0
    };

    let target = DMatrix::<Float>::from_fn(height, width, |y,x| {
        let mut acc = 0.0;
        for kenel_idx in -kernel_radius_signed..kernel_radius_signed+1 {
            let sample_value = match filter_direction {
                GradientDirection::HORIZONTAL => buffer[(y, reflect_index(x as isize + kenel_idx, width))],
                GradientDirection::VERTICAL => buffer[(reflect_index(y as isize + kenel_idx, height), x)],
                GradientDirection::SIGMA => {
                    let level = reflect_index(sigma_level as isize + kenel_idx, source_images.len());
                    source_images[level].buffer[(y,x)]
                }
            };
            acc += sample_value*kernel[(0,(kenel_idx + kernel_radius_signed) as usize)];
        }
        acc/divisor
    });

    Image{buffer: target, original_encoding: source.original_encoding}
}

/// Kernel response at a single (x, y, sigma level) sample of a stack of images,
/// divided by the kernel's normalizing constant.
pub fn gradient_convolution_at_sample(source_images: &[Image], feature: &dyn Feature, filter_kernel: &dyn Kernel, gradient_direction: GradientDirection) -> Float {
    let x_input = feature.get_x_image() as isize;
    let y_input = feature.get_y_image() as isize;
    let sigma_level_input = feature.get_closest_sigma_level() as isize;

    let kernel = filter_kernel.kernel();
    let kernel_radius_signed = filter_kernel.radius() as isize;

    let buffer = &source_images[sigma_level_input as usize].buffer;
    let width = buffer.ncols();
    let height = buffer.nrows();

    let mut convolved_value = 0.0;
    for kenel_idx in -kernel_radius_signed..kernel_radius_signed+1 {
        let kenel_value = kernel[(0,(kenel_idx + kernel_radius_signed) as usize)];
        let sample_value = match gradient_direction {
            GradientDirection::HORIZONTAL => buffer[(y_input as usize, reflect_index(x_input + kenel_idx, width))],
            GradientDirection::VERTICAL => buffer[(reflect_index(y_input + kenel_idx, height), x_input as usize)],
            GradientDirection::SIGMA => {
                let level = reflect_index(sigma_level_input + kenel_idx, source_images.len());
                source_images[level].buffer[(y_input as usize, x_input as usize)]
            }
        };
        convolved_value += kenel_value*sample_value;
    }

    convolved_value/filter_kernel.normalizing_constant()
}

/// Separable gaussian blur: horizontal pass followed by a vertical pass.
pub fn gaussian_2_d_convolution(image: &Image, filter_kernel: &GaussKernel1D) -> Image {
    let horizontal = filter_1d_convolution(std::slice::from_ref(image),0,GradientDirection::HORIZONTAL, filter_kernel, true);
    filter_1d_convolution(std::slice::from_ref(&horizontal),0,GradientDirection::VERTICAL, filter_kernel, true)
}
