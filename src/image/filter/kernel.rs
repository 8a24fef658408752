extern crate nalgebra as na;

use na::DMatrix;
use crate::Float;

pub trait Kernel {
    // Filter weights. One dimensional kernels are stored as a single row
    fn kernel(&self) -> &DMatrix<Float>;
    // Half of the width of the kernel save the center element
    fn radius(&self) -> usize {
        (self.kernel().ncols()-1)/2
    }
    // Divisor applied to normalized responses
    fn normalizing_constant(&self) -> Float;
}
