use std::cmp::Ordering;
use std::error::Error;
use std::fmt;

use log::debug;

use crate::model::Network;

/// Evaluation-time failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The network has fewer than two layers; there is nothing to read
    /// an output from. A caller programming error, checked before any
    /// scratch state is touched.
    InvalidNetwork,
    /// Input length does not match the input layer. Also a caller
    /// programming error.
    InvalidInputLength { expected: usize, actual: usize },
    /// Every output node produced zero, so confidences are undefined.
    /// Reported explicitly instead of dividing by zero into NaN.
    DegenerateOutput,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::InvalidNetwork => {
                write!(f, "network must have at least an input and an output layer")
            }
            EvalError::InvalidInputLength { expected, actual } => write!(
                f,
                "input has {} values but the input layer has {} nodes",
                actual, expected
            ),
            EvalError::DegenerateOutput => {
                write!(f, "output activations sum to zero; confidences are undefined")
            }
        }
    }
}

impl Error for EvalError {}

/// One ranked answer: a class and its share of the output layer's total
/// activation. A relative score, not a calibrated probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guess {
    pub class_value: usize,
    pub confidence: f32,
}

impl fmt::Display for Guess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}%)", self.class_value, self.confidence * 100.0)
    }
}

/// Forward-propagation engine over a shared immutable [`Network`].
///
/// The per-node activations are scratch state owned here, shaped like the
/// network's layers and overwritten on every call. Concurrent evaluation
/// therefore needs one `Evaluator` per caller; the weights behind the
/// shared reference are never written.
pub struct Evaluator<'n> {
    network: &'n Network,
    activations: Vec<Vec<f32>>,
}

impl<'n> Evaluator<'n> {
    pub fn new(network: &'n Network) -> Self {
        let activations = network
            .layers()
            .iter()
            .map(|layer| vec![0.0; layer.len()])
            .collect();
        Self {
            network,
            activations,
        }
    }

    /// Run one forward pass and rank the output classes by confidence.
    ///
    /// Guesses come back sorted by descending confidence; equal
    /// confidences keep ascending class order. Deterministic: the same
    /// input always yields bit-identical guesses.
    pub fn evaluate(&mut self, input: &[f32]) -> Result<Vec<Guess>, EvalError> {
        let layers = self.network.layers();

        if layers.len() < 2 {
            return Err(EvalError::InvalidNetwork);
        }
        if input.len() != layers[0].len() {
            return Err(EvalError::InvalidInputLength {
                expected: layers[0].len(),
                actual: input.len(),
            });
        }

        self.activations[0].copy_from_slice(input);

        // Ascending layer order; the construction-time DAG check
        // guarantees every edge source is already computed.
        for li in 1..layers.len() {
            let (computed, rest) = self.activations.split_at_mut(li);
            let current = &mut rest[0];

            for (ni, node) in layers[li].nodes.iter().enumerate() {
                let mut sum = node.bias;
                for edge in &node.inputs {
                    sum += edge.weight * computed[edge.from_layer][edge.from_node];
                }
                current[ni] = node.activation.apply(sum);
            }
        }

        let output = &self.activations[layers.len() - 1];
        let total: f32 = output.iter().sum();
        debug!("output activations {:?}, sum {}", output, total);

        if total == 0.0 {
            return Err(EvalError::DegenerateOutput);
        }

        let mut guesses: Vec<Guess> = output
            .iter()
            .enumerate()
            .map(|(class_value, &activation)| Guess {
                class_value,
                confidence: activation / total,
            })
            .collect();

        // Stable sort: ties preserve the ascending class order the
        // guesses were built in.
        guesses.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });

        Ok(guesses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::Activation;
    use crate::descriptor::{EdgeDescriptor, LayerDescriptor, NetworkDescriptor, NodeDescriptor};

    fn node(
        bias: f32,
        activation: Activation,
        inputs: Vec<(usize, usize, f32)>,
    ) -> NodeDescriptor {
        NodeDescriptor {
            bias,
            activation_function: activation,
            inputs: inputs
                .into_iter()
                .map(|(from_layer, from_node, weight)| EdgeDescriptor {
                    from_layer,
                    from_node,
                    weight,
                })
                .collect(),
        }
    }

    fn layer(nodes: Vec<NodeDescriptor>) -> LayerDescriptor {
        LayerDescriptor { nodes }
    }

    /// 4 inputs -> 2 RELU hidden nodes (fully wired, weights 1) -> 2
    /// IDENTITY outputs, each reading one hidden node.
    fn reference_network() -> Network {
        let descriptor = NetworkDescriptor {
            input_layer_length: 4,
            other_layers: vec![
                layer(vec![
                    node(
                        0.0,
                        Activation::Relu,
                        vec![(0, 0, 1.0), (0, 1, 1.0), (0, 2, 1.0), (0, 3, 1.0)],
                    ),
                    node(
                        0.0,
                        Activation::Relu,
                        vec![(0, 0, 1.0), (0, 1, 1.0), (0, 2, 1.0), (0, 3, 1.0)],
                    ),
                ]),
                layer(vec![
                    node(0.0, Activation::Identity, vec![(1, 0, 1.0)]),
                    node(0.0, Activation::Identity, vec![(1, 1, 1.0)]),
                ]),
            ],
        };
        Network::from_descriptor(descriptor).unwrap()
    }

    #[test]
    fn reference_scenario_splits_confidence_evenly() {
        let network = reference_network();
        let mut evaluator = Evaluator::new(&network);

        let guesses = evaluator.evaluate(&[1.0, 1.0, 0.0, 0.0]).unwrap();

        assert_eq!(guesses.len(), 2);
        // Hidden and output activations are both [2, 2]; equal
        // confidences keep ascending class order.
        assert_eq!(guesses[0].class_value, 0);
        assert_eq!(guesses[1].class_value, 1);
        assert_eq!(guesses[0].confidence, 0.5);
        assert_eq!(guesses[1].confidence, 0.5);
    }

    #[test]
    fn guesses_are_ranked_descending() {
        let descriptor = NetworkDescriptor {
            input_layer_length: 1,
            other_layers: vec![layer(vec![
                node(0.0, Activation::Identity, vec![(0, 0, 1.0)]),
                node(0.0, Activation::Identity, vec![(0, 0, 3.0)]),
                node(0.0, Activation::Identity, vec![(0, 0, 2.0)]),
            ])],
        };
        let network = Network::from_descriptor(descriptor).unwrap();
        let mut evaluator = Evaluator::new(&network);

        let guesses = evaluator.evaluate(&[1.0]).unwrap();

        let classes: Vec<usize> = guesses.iter().map(|g| g.class_value).collect();
        assert_eq!(classes, vec![1, 2, 0]);
        for pair in guesses.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn confidences_sum_to_one() {
        let descriptor = NetworkDescriptor {
            input_layer_length: 3,
            other_layers: vec![
                layer(vec![
                    node(
                        0.2,
                        Activation::Sigmoid,
                        vec![(0, 0, 0.7), (0, 1, -1.3), (0, 2, 0.4)],
                    ),
                    node(
                        -0.5,
                        Activation::Sigmoid,
                        vec![(0, 0, -0.2), (0, 1, 0.9), (0, 2, 1.1)],
                    ),
                ]),
                layer(vec![
                    node(0.1, Activation::Sigmoid, vec![(1, 0, 1.5), (1, 1, -0.8)]),
                    node(0.0, Activation::Sigmoid, vec![(1, 0, -0.4), (1, 1, 0.6)]),
                    node(-0.3, Activation::Sigmoid, vec![(1, 0, 0.3), (1, 1, 0.2)]),
                ]),
            ],
        };
        let network = Network::from_descriptor(descriptor).unwrap();
        let mut evaluator = Evaluator::new(&network);

        let guesses = evaluator.evaluate(&[0.9, 0.1, 0.5]).unwrap();

        let total: f32 = guesses.iter().map(|g| g.confidence).sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(guesses.iter().all(|g| g.confidence >= 0.0));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let network = reference_network();
        let mut evaluator = Evaluator::new(&network);

        let input = [0.3, 0.8, 0.0, 0.4];
        let first = evaluator.evaluate(&input).unwrap();
        let second = evaluator.evaluate(&input).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn skip_edges_read_earlier_layers_directly() {
        // The output node bypasses the hidden layer for one of its
        // inputs, reading the input layer across a layer boundary.
        let descriptor = NetworkDescriptor {
            input_layer_length: 2,
            other_layers: vec![
                layer(vec![node(0.0, Activation::Relu, vec![(0, 0, 2.0)])]),
                layer(vec![node(
                    0.0,
                    Activation::Identity,
                    vec![(1, 0, 1.0), (0, 1, 10.0)],
                )]),
            ],
        };
        let network = Network::from_descriptor(descriptor).unwrap();
        let mut evaluator = Evaluator::new(&network);

        let guesses = evaluator.evaluate(&[1.0, 0.5]).unwrap();

        // 2*1.0 through the hidden node, plus 10*0.5 straight from the
        // input layer.
        assert_eq!(guesses[0].confidence, 1.0);
        assert_eq!(guesses.len(), 1);
    }

    #[test]
    fn rejects_single_layer_network() {
        let descriptor = NetworkDescriptor {
            input_layer_length: 2,
            other_layers: vec![],
        };
        let network = Network::from_descriptor(descriptor).unwrap();
        let mut evaluator = Evaluator::new(&network);

        assert_eq!(
            evaluator.evaluate(&[0.0, 1.0]),
            Err(EvalError::InvalidNetwork)
        );
    }

    #[test]
    fn rejects_wrong_input_length() {
        let network = reference_network();
        let mut evaluator = Evaluator::new(&network);

        assert_eq!(
            evaluator.evaluate(&[1.0, 2.0]),
            Err(EvalError::InvalidInputLength {
                expected: 4,
                actual: 2
            })
        );
    }

    #[test]
    fn zero_output_sum_is_degenerate_not_nan() {
        // Opposite IDENTITY weights cancel exactly: +1 and -1.
        let descriptor = NetworkDescriptor {
            input_layer_length: 1,
            other_layers: vec![layer(vec![
                node(0.0, Activation::Identity, vec![(0, 0, 1.0)]),
                node(0.0, Activation::Identity, vec![(0, 0, -1.0)]),
            ])],
        };
        let network = Network::from_descriptor(descriptor).unwrap();
        let mut evaluator = Evaluator::new(&network);

        assert_eq!(
            evaluator.evaluate(&[1.0]),
            Err(EvalError::DegenerateOutput)
        );
    }

    #[test]
    fn random_networks_produce_normalized_rankings() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..10 {
            // Random dense 6 -> 5 -> 4 sigmoid network; sigmoid outputs
            // are strictly positive, so the ranking is always defined.
            let hidden = (0..5)
                .map(|_| {
                    node(
                        rng.gen_range(-1.0..1.0),
                        Activation::Sigmoid,
                        (0..6).map(|i| (0, i, rng.gen_range(-1.0..1.0))).collect(),
                    )
                })
                .collect();
            let output = (0..4)
                .map(|_| {
                    node(
                        rng.gen_range(-1.0..1.0),
                        Activation::Sigmoid,
                        (0..5).map(|i| (1, i, rng.gen_range(-1.0..1.0))).collect(),
                    )
                })
                .collect();
            let descriptor = NetworkDescriptor {
                input_layer_length: 6,
                other_layers: vec![layer(hidden), layer(output)],
            };
            let network = Network::from_descriptor(descriptor).unwrap();
            let mut evaluator = Evaluator::new(&network);

            let input: Vec<f32> = (0..6).map(|_| rng.gen_range(0.0..1.0)).collect();
            let guesses = evaluator.evaluate(&input).unwrap();

            assert_eq!(guesses.len(), 4);
            let total: f32 = guesses.iter().map(|g| g.confidence).sum();
            assert!((total - 1.0).abs() < 1e-5);
            for pair in guesses.windows(2) {
                assert!(pair[0].confidence >= pair[1].confidence);
            }
        }
    }

    #[test]
    fn failed_preconditions_do_not_require_a_fresh_evaluator() {
        // Contract violations are checked before scratch mutation, so a
        // later valid call on the same evaluator still works.
        let network = reference_network();
        let mut evaluator = Evaluator::new(&network);

        assert!(evaluator.evaluate(&[1.0]).is_err());
        let guesses = evaluator.evaluate(&[1.0, 1.0, 0.0, 0.0]).unwrap();
        assert_eq!(guesses[0].confidence, 0.5);
    }
}
