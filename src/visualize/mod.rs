use crate::image::Image;
use crate::image::image_encoding::ImageEncoding;
use crate::image::matching::sift_descriptor::{orientation_histogram::OrientationHistogram,feature_vector::FeatureVector};
use crate::Float;

/// Full intensity of an image loaded through `Image::from_gray_image`.
const MARKER_VALUE: Float = 1.0;

pub fn display_histogram(histogram: &OrientationHistogram, width_scaling:usize, height: usize) -> Image {

    let bin_len = histogram.bins.len();
    let width = width_scaling*bin_len;
    let mut image = Image::empty(width, height, ImageEncoding::U8);
    let max_val = histogram.bins.iter().cloned().fold(0.0, Float::max);

    if max_val <= 0.0 {
        return image;
    }

    let max_height = height as Float*0.8;

    for (i, &bin_val) in histogram.bins.iter().enumerate() {
        let scale = bin_val/max_val;
        let bin_height = (max_height*scale) as usize;
        for w in 0..width_scaling {
            let x = i*width_scaling+w;
            for y in 0..bin_height {
                image.buffer[(height-1-y,x)] = MARKER_VALUE;
            }
        }
    }

    image
}

/// Square outline centered at (x,y). Parts outside the image are clipped.
pub fn draw_square(image: &mut Image, x: usize, y: usize, side_length: usize) -> () {
    let width = image.width() as isize;
    let height = image.height() as isize;
    let (x, y, side) = (x as isize, y as isize, side_length as isize);

    let mut set = |c: isize, r: isize| {
        if c >= 0 && r >= 0 && c < width && r < height {
            image.buffer[(r as usize, c as usize)] = MARKER_VALUE;
        }
    };

    for i in x-side..x+side+1 {
        set(i, y + side);
        set(i, y - side);
    }
    for j in y-side+1..y+side {
        set(x + side, j);
        set(x - side, j);
    }
}

/// Needle from the feature position along its orientation, `scale_factor` times its scale long.
pub fn visualize_keypoint(image: &mut Image, feature_vector: &FeatureVector, scale_factor: Float) -> () {
    let length = scale_factor*feature_vector.scale();
    let (orientation_sin, orientation_cos) = feature_vector.orientation().sin_cos();
    let steps = (length.ceil() as usize).max(1)*2;
    let max_x = image.width() as Float - 1.0;
    let max_y = image.height() as Float - 1.0;

    for i in 0..steps+1 {
        let t = i as Float/steps as Float;
        let x = feature_vector.x() + t*length*orientation_cos;
        let y = feature_vector.y() + t*length*orientation_sin;
        if x < 0.0 || y < 0.0 || x > max_x || y > max_y {
            break;
        }
        image.buffer[(y.round() as usize, x.round() as usize)] = MARKER_VALUE;
    }
}

/// Copy of `image` with a square and an orientation needle per feature.
pub fn draw_feature_vectors(image: &Image, feature_vectors: &[FeatureVector]) -> Image {
    let mut target_image = image.clone();
    for feature_vector in feature_vectors {
        let x = feature_vector.x().round().max(0.0) as usize;
        let y = feature_vector.y().round().max(0.0) as usize;
        let side_length = feature_vector.scale().round().max(1.0) as usize;
        draw_square(&mut target_image, x, y, side_length);
        visualize_keypoint(&mut target_image, feature_vector, 3.0);
    }
    target_image
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::image::matching::sift_descriptor::{keypoint::KeyPoint, feature_vector::Descriptor};

    #[test]
    fn square_is_clipped_at_border() {
        let mut image = Image::empty(10, 10, ImageEncoding::F64);
        draw_square(&mut image, 1, 1, 2);
        assert_eq!(image.buffer[(3,0)], MARKER_VALUE);
        assert_eq!(image.buffer[(1,3)], MARKER_VALUE);
        assert_eq!(image.buffer[(1,1)], 0.0);
    }

    #[test]
    fn needle_follows_orientation() {
        let mut image = Image::empty(20, 20, ImageEncoding::F64);
        let keypoint = KeyPoint{octave_level: 0, x: 5.0, y: 5.0, sigma_level: 1.0, sigma: 2.0, value: 0.1, orientation: 0.0, magnitude: 1.0};
        visualize_keypoint(&mut image, &FeatureVector::new(keypoint, Descriptor::zeros(128), 1.0), 3.0);
        assert_eq!(image.buffer[(5,11)], MARKER_VALUE);
        assert_eq!(image.buffer[(6,8)], 0.0);
    }

    #[test]
    fn histogram_bars_scale_to_maximum() {
        let mut histogram = OrientationHistogram::new(4);
        histogram.bins = vec![1.0, 0.5, 0.0, 0.0];
        let image = display_histogram(&histogram, 2, 10);
        assert_eq!((image.width(), image.height()), (8,10));
        assert_eq!(image.buffer[(2,0)], MARKER_VALUE);
        assert_eq!(image.buffer[(9,2)], MARKER_VALUE);
        assert_eq!(image.buffer[(5,2)], 0.0);
        assert_eq!(image.buffer[(9,4)], 0.0);
    }
}
