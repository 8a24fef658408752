extern crate image as image_rs;
extern crate nalgebra as na;

use image_rs::{GrayImage, DynamicImage, Pixel, Luma};
use na::DMatrix;

use crate::{Float, SiftError};
use self::image_encoding::ImageEncoding;

pub mod image_encoding;
pub mod filter;
pub mod pyramid;
pub mod features;
pub mod matching;

/// Grayscale sample grid. `buffer` is indexed (row, column) i.e. (y, x).
#[derive(Debug,Clone,PartialEq)]
pub struct Image {
    pub buffer: DMatrix<Float>,
    pub original_encoding: ImageEncoding
}

impl Image {

    pub fn width(&self) -> usize {
        self.buffer.ncols()
    }

    pub fn height(&self) -> usize {
        self.buffer.nrows()
    }

    pub fn size(&self) -> usize {
        self.buffer.ncols()*self.buffer.nrows()
    }

    pub fn empty(width: usize, height: usize, image_encoding: ImageEncoding) -> Image {
        let buffer = DMatrix::<Float>::zeros(height,width);
        Image{ buffer, original_encoding: image_encoding}
    }

    pub fn from_matrix(matrix: &DMatrix<Float>, original_encoding: ImageEncoding) -> Image {
        Image{ buffer: matrix.clone(), original_encoding}
    }

    /// Builds an image from row-major samples, as handed over by the image loading collaborator.
    pub fn from_vec(width: usize, height: usize, samples: Vec<Float>) -> Result<Image, SiftError> {
        if width == 0 || height == 0 {
            return Err(SiftError::invalid(format!("image dimensions must be positive, got {}x{}", width, height)));
        }
        if samples.len() != width*height {
            return Err(SiftError::invalid(format!("expected {} samples for a {}x{} image, got {}", width*height, width, height, samples.len())));
        }
        if samples.iter().any(|s| !s.is_finite()) {
            return Err(SiftError::invalid("image contains non-finite samples"));
        }

        Ok(Image{ buffer: DMatrix::<Float>::from_row_slice(height, width, &samples), original_encoding: ImageEncoding::F64})
    }

    /// Converts 8-bit samples to [0,1].
    pub fn from_gray_image(image: &GrayImage, invert_y : bool) -> Image {
        let buffer = Image::image8_to_matrix(image, invert_y)/255.0;
        Image{ buffer, original_encoding:  ImageEncoding::U8}
    }

    pub fn to_image(&self) -> GrayImage {
        Image::matrix_to_image(&self.buffer,  self.original_encoding)
    }

    pub fn validate(&self) -> Result<(), SiftError> {
        if self.size() == 0 {
            return Err(SiftError::invalid("image is empty"));
        }
        if self.buffer.iter().any(|s| !s.is_finite()) {
            return Err(SiftError::invalid("image contains non-finite samples"));
        }
        Ok(())
    }

    pub fn difference(minuend: &Image, subtrahend: &Image) -> Image {
        Image{ buffer: &minuend.buffer - &subtrahend.buffer, original_encoding: ImageEncoding::F64 }
    }

    /// Keeps every second sample starting at index 0. Returns `None` if the result would be
    /// smaller than `(c_min, r_min)` = (min width, min height).
    pub fn downsample_half(image: &Image, (c_min,r_min): (usize,usize)) -> Option<Image> {
        let width = image.width();
        let height = image.height();

        let new_width = width/2;
        let new_height = height/2;

        if new_height < r_min || new_width < c_min || new_height == 0 || new_width == 0 {
            return None;
        }

        let new_buffer = DMatrix::<Float>::from_fn(new_height, new_width, |r,c| image.buffer[(2*r,2*c)]);

        Some(Image{
            buffer: new_buffer,
            original_encoding: image.original_encoding
        })
    }

    /// Bilinear upsampling by a factor of two. The last row and column are clamped.
    pub fn upsample_double(image: &Image) -> Image {
        let width = image.width();
        let height = image.height();

        let new_buffer = DMatrix::<Float>::from_fn(2*height, 2*width, |r,c| {
            let x_prime = c as Float / 2.0;
            let y_prime = r as Float / 2.0;
            image.sample_bilinear(x_prime.min((width-1) as Float), y_prime.min((height-1) as Float))
        });

        Image{
            buffer: new_buffer,
            original_encoding: image.original_encoding
        }
    }

    /// Bilinear interpolation at (x,y). Coordinates are clamped into the image.
    pub fn sample_bilinear(&self, x: Float, y: Float) -> Float {
        let max_x = (self.width()-1) as Float;
        let max_y = (self.height()-1) as Float;
        let x = x.max(0.0).min(max_x);
        let y = y.max(0.0).min(max_y);

        let x_trunc = x.floor();
        let y_trunc = y.floor();
        let x_0 = x_trunc as usize;
        let y_0 = y_trunc as usize;
        let x_1 = (x_0+1).min(self.width()-1);
        let y_1 = (y_0+1).min(self.height()-1);
        let a = x - x_trunc;
        let b = y - y_trunc;

        (1.0-a)*(1.0-b)*self.buffer[(y_0,x_0)] +
        a*(1.0-b)*self.buffer[(y_0,x_1)] +
        (1.0-a)*b*self.buffer[(y_1,x_0)] +
        a*b*self.buffer[(y_1,x_1)]
    }

    fn image8_to_matrix(gray_image: &GrayImage, invert_y: bool) -> DMatrix<Float> {
        let (width, height) = gray_image.dimensions();
        DMatrix::<Float>::from_fn(height as usize, width as usize, |r,c| {
            let y = match invert_y {
                true => height - 1 - r as u32,
                false => r as u32
            };
            gray_image.get_pixel(c as u32, y).channels()[0] as Float
        })
    }

    fn matrix_to_image(matrix: &DMatrix<Float>,  encoding: ImageEncoding) -> GrayImage {
        let (rows, cols) = matrix.shape();

        let mut gray_image = DynamicImage::new_luma8(cols as u32, rows as u32).to_luma8();
        let max = matrix.max();
        let min = matrix.min();
        for c in 0..cols {
            for r in 0..rows {
                let val = matrix[(r, c)];
                let pixel_value =  encoding.normalize_to_gray(max,min,val);
                gray_image.put_pixel(c as u32, r as u32, Luma([pixel_value]));
            }
        }
        gray_image
    }
}
