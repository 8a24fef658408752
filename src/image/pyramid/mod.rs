pub mod sift;

#[derive(Debug,Clone)]
pub struct Pyramid<T> {
    pub octaves: Vec<T>
}

impl<T> Pyramid<T> {
    pub fn octave_count(&self) -> usize {
        self.octaves.len()
    }
}
