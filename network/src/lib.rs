pub mod activation;
pub mod descriptor;
pub mod evaluator;
pub mod model;

pub use activation::Activation;
pub use descriptor::{EdgeDescriptor, LayerDescriptor, NetworkDescriptor, NodeDescriptor};
pub use evaluator::{EvalError, Evaluator, Guess};
pub use model::{ModelError, Network};
