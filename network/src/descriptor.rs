use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::activation::Activation;

/// On-wire description of a pretrained network, as exported by the
/// training pipeline. Field names are camelCase in the JSON artifact.
///
/// The input layer is not spelled out node by node: only its length is
/// recorded, and [`crate::Network::from_descriptor`] synthesizes the
/// pass-through nodes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    pub input_layer_length: usize,
    pub other_layers: Vec<LayerDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayerDescriptor {
    pub nodes: Vec<NodeDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub bias: f32,
    pub activation_function: Activation,
    pub inputs: Vec<EdgeDescriptor>,
}

/// A weighted edge from a node in an earlier layer. `from_layer` indexes
/// the full layer list, input layer included.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDescriptor {
    pub from_layer: usize,
    pub from_node: usize,
    pub weight: f32,
}

impl NetworkDescriptor {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load the descriptor artifact from disk. Parse failures surface as
    /// `InvalidData` so the caller sees one error type for both.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
