use std::fmt;
use thiserror::Error;

/// Failures that abort a pipeline run before or while the scale space is built.
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("scale space exhausted: {width}x{height} image cannot hold a single octave of at least {min_width}x{min_height} ({requested} requested)")]
    ScaleSpaceExhausted {
        requested: usize,
        min_width: usize,
        min_height: usize,
        width: usize,
        height: usize
    },

    #[error("could not parse configuration: {0}")]
    Config(#[from] serde_yaml::Error)
}

impl SiftError {
    pub fn invalid<S: Into<String>>(message: S) -> SiftError {
        SiftError::InvalidParameter(message.into())
    }
}

/// Per candidate / per keypoint filtering outcome. Rejected items are dropped by the pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Rejection {
    LocalizationFailed,
    LowContrast,
    EdgeResponseRejected,
    FlatNeighborhood,
    InsufficientNeighborhood
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Rejection::LocalizationFailed => "localization failed",
            Rejection::LowContrast => "low contrast",
            Rejection::EdgeResponseRejected => "edge response",
            Rejection::FlatNeighborhood => "flat neighborhood",
            Rejection::InsufficientNeighborhood => "insufficient neighborhood"
        };
        write!(f, "{}", name)
    }
}

/// Tally of rejections per stage, used for the debug log of a pipeline run.
#[derive(Debug, Default, Clone)]
pub struct RejectionTally {
    pub localization_failed: usize,
    pub low_contrast: usize,
    pub edge_response: usize,
    pub flat_neighborhood: usize,
    pub insufficient_neighborhood: usize
}

impl RejectionTally {
    pub fn record(&mut self, rejection: Rejection) -> () {
        match rejection {
            Rejection::LocalizationFailed => self.localization_failed += 1,
            Rejection::LowContrast => self.low_contrast += 1,
            Rejection::EdgeResponseRejected => self.edge_response += 1,
            Rejection::FlatNeighborhood => self.flat_neighborhood += 1,
            Rejection::InsufficientNeighborhood => self.insufficient_neighborhood += 1
        }
    }

    pub fn total(&self) -> usize {
        self.localization_failed + self.low_contrast + self.edge_response + self.flat_neighborhood + self.insufficient_neighborhood
    }
}

impl fmt::Display for RejectionTally {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "localization: {}, contrast: {}, edge: {}, flat: {}, border: {}",
            self.localization_failed, self.low_contrast, self.edge_response, self.flat_neighborhood, self.insufficient_neighborhood)
    }
}

#[cfg(test)]
mod test {
    use super::{Rejection, RejectionTally};

    #[test]
    fn tally_counts_each_rejection_kind() {
        let mut tally = RejectionTally::default();
        tally.record(Rejection::LowContrast);
        tally.record(Rejection::LowContrast);
        tally.record(Rejection::EdgeResponseRejected);
        assert_eq!(tally.low_contrast, 2);
        assert_eq!(tally.edge_response, 1);
        assert_eq!(tally.total(), 3);
    }
}
