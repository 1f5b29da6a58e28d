use std::error::Error;
use std::fmt;

use log::debug;
use network::{EvalError, Evaluator, Guess, Network};
use raster::{NormalizeError, Normalizer, PixelBuffer};

/// Failure of the end-to-end pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizeError {
    /// Nothing legible on the canvas: the drawing was blank or the
    /// network's response carried no signal. Both degenerate cases fold
    /// into one user-facing outcome.
    NoLegibleInput,
    /// Contract violation between the normalizer's output and the
    /// network's input layer.
    Evaluation(EvalError),
}

impl fmt::Display for RecognizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognizeError::NoLegibleInput => write!(f, "no legible input"),
            RecognizeError::Evaluation(e) => write!(f, "evaluation failed: {}", e),
        }
    }
}

impl Error for RecognizeError {}

impl From<NormalizeError> for RecognizeError {
    fn from(e: NormalizeError) -> Self {
        match e {
            NormalizeError::DegenerateInput => RecognizeError::NoLegibleInput,
        }
    }
}

impl From<EvalError> for RecognizeError {
    fn from(e: EvalError) -> Self {
        match e {
            EvalError::DegenerateOutput => RecognizeError::NoLegibleInput,
            other => RecognizeError::Evaluation(other),
        }
    }
}

/// Result of a successful recognition: the ranked guesses plus the
/// canonical buffer they were computed from, for preview rendering.
#[derive(Debug)]
pub struct Recognition {
    pub guesses: Vec<Guess>,
    pub normalized: PixelBuffer,
}

/// The full drawing-to-guesses pipeline: normalize the raw raster into
/// the canonical frame, then forward-propagate it through the network.
pub struct Recognizer<'n> {
    normalizer: Normalizer,
    evaluator: Evaluator<'n>,
}

impl<'n> Recognizer<'n> {
    pub fn new(network: &'n Network) -> Self {
        Self {
            normalizer: Normalizer::default(),
            evaluator: Evaluator::new(network),
        }
    }

    pub fn recognize(&mut self, drawing: &PixelBuffer) -> Result<Recognition, RecognizeError> {
        let normalized = self.normalizer.normalize(drawing)?;
        debug!(
            "normalized {}x{} drawing into {}x{} grid",
            drawing.width(),
            drawing.height(),
            normalized.width(),
            normalized.height()
        );

        let guesses = self.evaluator.evaluate(normalized.as_slice())?;

        Ok(Recognition {
            guesses,
            normalized,
        })
    }
}
