use std::error::Error;
use std::fmt;

use crate::activation::Activation;
use crate::descriptor::NetworkDescriptor;

/// Construction-time failure: the descriptor violates the topology rules.
/// Fatal at startup; a constructed [`Network`] is trusted afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    MalformedNetwork(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::MalformedNetwork(msg) => write!(f, "malformed network: {}", msg),
        }
    }
}

impl Error for ModelError {}

/// A weighted edge into a node, referencing its source by
/// `(layer index, node index)`. Sources always sit in an earlier layer,
/// though not necessarily the previous one.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub(crate) from_layer: usize,
    pub(crate) from_node: usize,
    pub(crate) weight: f32,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) bias: f32,
    pub(crate) activation: Activation,
    pub(crate) inputs: Vec<Edge>,
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub(crate) nodes: Vec<Node>,
}

impl Layer {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Immutable topology and weights of a pretrained network.
///
/// Layer 0 is the synthesized input layer (identity pass-through, one node
/// per pixel, row-major); the last layer is the output layer, one node per
/// recognized class in ascending class order. Activations are NOT stored
/// here: they live in each [`crate::Evaluator`]'s scratch state, so one
/// `Network` can back any number of evaluators.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) layers: Vec<Layer>,
}

impl Network {
    /// Build and validate a network from its descriptor. This is the only
    /// place topology is checked: every edge must point at an existing
    /// node in a strictly earlier layer, so a single forward pass visits
    /// sources before their dependents.
    pub fn from_descriptor(descriptor: NetworkDescriptor) -> Result<Self, ModelError> {
        if descriptor.input_layer_length < 1 {
            return Err(ModelError::MalformedNetwork(
                "input layer must have at least one node".to_string(),
            ));
        }

        let input_layer = Layer {
            nodes: vec![
                Node {
                    bias: 0.0,
                    activation: Activation::Identity,
                    inputs: Vec::new(),
                };
                descriptor.input_layer_length
            ],
        };

        let mut layer_sizes = vec![descriptor.input_layer_length];
        let mut layers = vec![input_layer];

        for (i, layer) in descriptor.other_layers.into_iter().enumerate() {
            // Descriptor layer i sits at index i + 1 in the full network.
            let layer_index = i + 1;

            if layer.nodes.is_empty() {
                return Err(ModelError::MalformedNetwork(format!(
                    "layer {} has no nodes",
                    layer_index
                )));
            }

            let mut nodes = Vec::with_capacity(layer.nodes.len());
            for (n, node) in layer.nodes.into_iter().enumerate() {
                let mut inputs = Vec::with_capacity(node.inputs.len());
                for edge in node.inputs {
                    if edge.from_layer >= layer_index {
                        return Err(ModelError::MalformedNetwork(format!(
                            "layer {}, node {}: edge references layer {}, which is not an earlier layer",
                            layer_index, n, edge.from_layer
                        )));
                    }
                    if edge.from_node >= layer_sizes[edge.from_layer] {
                        return Err(ModelError::MalformedNetwork(format!(
                            "layer {}, node {}: edge references node {} of layer {}, which has {} nodes",
                            layer_index,
                            n,
                            edge.from_node,
                            edge.from_layer,
                            layer_sizes[edge.from_layer]
                        )));
                    }
                    inputs.push(Edge {
                        from_layer: edge.from_layer,
                        from_node: edge.from_node,
                        weight: edge.weight,
                    });
                }
                nodes.push(Node {
                    bias: node.bias,
                    activation: node.activation_function,
                    inputs,
                });
            }

            layer_sizes.push(nodes.len());
            layers.push(Layer { nodes });
        }

        Ok(Self { layers })
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Number of input-layer nodes, i.e. the pixel count an evaluation
    /// input must match.
    pub fn input_len(&self) -> usize {
        self.layers[0].len()
    }

    /// Number of output-layer nodes, i.e. the recognized class count.
    pub fn output_len(&self) -> usize {
        self.layers[self.layers.len() - 1].len()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Total edge count, which bounds the cost of one evaluation.
    pub fn edge_count(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|layer| layer.nodes.iter())
            .map(|node| node.inputs.len())
            .sum()
    }
}
