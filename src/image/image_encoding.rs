use crate::Float;

#[repr(u8)]
#[derive(Debug,Copy,Clone,PartialEq)]
pub enum ImageEncoding {
    U8,
    F64
}

impl ImageEncoding {
    // https://en.wikipedia.org/wiki/Normalization_(image_processing)
    pub fn normalize_to_gray(&self, max: Float, min : Float, value: Float) -> u8 {
        let range = 255 as Float; // 255 - 0
        match max - min {
            spread if spread <= 0.0 => 0,
            spread => ((value - min) * (range / spread)).round().max(0.0).min(range) as u8
        }
    }
}
