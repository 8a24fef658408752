extern crate nalgebra as na;

use na::DMatrix;
use std::collections::BTreeSet;
use crate::Float;
use crate::error::SiftError;

fn check_lengths<L>(actual: &[L], predicted: &[L]) -> Result<(), SiftError> {
    if actual.is_empty() {
        return Err(SiftError::invalid("no labels to evaluate"));
    }
    if actual.len() != predicted.len() {
        return Err(SiftError::invalid(format!("{} actual labels but {} predictions", actual.len(), predicted.len())));
    }
    Ok(())
}

/// Percentage (0-100) of predictions that differ from the actual label.
pub fn error_rate<L: PartialEq>(actual: &[L], predicted: &[L]) -> Result<Float, SiftError> {
    check_lengths(actual, predicted)?;
    let mismatches = actual.iter().zip(predicted.iter()).filter(|(a,p)| a != p).count();
    Ok(100.0*mismatches as Float/actual.len() as Float)
}

/// Counts of (actual, predicted) label pairs. Rows follow the actual label, columns the prediction,
/// both in the sorted order of all labels seen in either sequence.
#[derive(Debug,Clone,PartialEq)]
pub struct ConfusionMatrix<L: Ord> {
    pub labels: Vec<L>,
    pub counts: DMatrix<usize>
}

impl<L: Ord + Clone> ConfusionMatrix<L> {
    pub fn new(actual: &[L], predicted: &[L]) -> Result<ConfusionMatrix<L>, SiftError> {
        check_lengths(actual, predicted)?;
        let labels = actual.iter().chain(predicted.iter()).cloned().collect::<BTreeSet<L>>().into_iter().collect::<Vec<L>>();
        let mut counts = DMatrix::<usize>::zeros(labels.len(), labels.len());

        for (a,p) in actual.iter().zip(predicted.iter()) {
            if let (Ok(row), Ok(col)) = (labels.binary_search(a), labels.binary_search(p)) {
                counts[(row,col)] += 1;
            }
        }

        Ok(ConfusionMatrix{labels, counts})
    }

    pub fn count(&self, actual: &L, predicted: &L) -> usize {
        match (self.labels.binary_search(actual), self.labels.binary_search(predicted)) {
            (Ok(row), Ok(col)) => self.counts[(row,col)],
            _ => 0
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Share of the diagonal, in [0,1].
    pub fn accuracy(&self) -> Float {
        let correct: usize = (0..self.labels.len()).map(|i| self.counts[(i,i)]).sum();
        correct as Float/self.total() as Float
    }
}
