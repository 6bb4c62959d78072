use crate::raw::LayerId;

use thiserror::Error;

/// The errors that can occur while building or updating a layer tree.
///
/// Every variant is fatal for the mutation that produced it. The tree may be left partially updated, so callers should
/// rebuild it from a fresh snapshot rather than attempt to repair it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayerTreeError {
	#[error("Layer {layer} is not a child of its owning group {group}")]
	LayerNotInGroup { layer: LayerId, group: LayerId },

	#[error("Layer {layer} is owned by group {group}, which is not part of the tree")]
	GroupNotFound { layer: LayerId, group: LayerId },

	#[error("Layer {layer} cannot be placed at index {requested}, the closest reachable index is {reached}")]
	IndexMismatch { layer: LayerId, requested: usize, reached: usize },

	#[error("Layer {layer} has an unrecognized type {kind:?}")]
	UnknownLayerType { layer: LayerId, kind: Option<String> },

	#[error("Layer {0} already exists in the tree")]
	DuplicateLayer(LayerId),

	#[error("A change references layer {0}, which was never materialized")]
	UnmaterializedLayer(LayerId),

	#[error("A change addressed to layer {change} was applied to layer {layer}")]
	IdMismatch { layer: LayerId, change: LayerId },

	#[error("Layer {0} is not a group")]
	NotAGroup(LayerId),

	#[error("Layer {0} was not found")]
	LayerNotFound(LayerId),

	#[error("Failed to parse the layer description:\n{0}")]
	InvalidJson(String),
}

impl From<serde_json::Error> for LayerTreeError {
	fn from(error: serde_json::Error) -> Self {
		LayerTreeError::InvalidJson(error.to_string())
	}
}
