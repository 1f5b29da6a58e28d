use serde::Deserialize;

/// Scalar nonlinearity applied to a node's weighted input sum.
///
/// The wire tags match the descriptor artifact: `NONE` marks the identity
/// pass-through used by input nodes and raw-score output nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Activation {
    #[serde(rename = "SIGMOID")]
    Sigmoid,
    #[serde(rename = "RELU")]
    Relu,
    #[serde(rename = "NONE")]
    Identity,
}

impl Activation {
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Relu => x.max(0.0),
            Activation::Identity => x,
        }
    }
}
