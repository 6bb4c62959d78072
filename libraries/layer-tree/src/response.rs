use crate::raw::{LayerBounds, LayerId};

use serde::Serialize;
use std::fmt;

/// Describes a single effect of applying a change to the layer tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LayerResponse {
	Rename {
		id: LayerId,
		new_name: String,
		/// The name held immediately before the rename
		previous_name: Option<String>,
	},
	Visibility {
		id: LayerId,
		visible: bool,
	},
	Clipping {
		id: LayerId,
		clipped: bool,
	},
	Bounds {
		id: LayerId,
		bounds: LayerBounds,
		previous_bounds: Option<LayerBounds>,
	},
	Created {
		id: LayerId,
		group: LayerId,
	},
	Deleted {
		id: LayerId,
	},
	/// The layer was placed again, either within its previous group or in a different one.
	Moved {
		id: LayerId,
		previous_group: Option<LayerId>,
		group: LayerId,
	},
}

impl LayerResponse {
	pub fn id(&self) -> &LayerId {
		match self {
			LayerResponse::Rename { id, .. }
			| LayerResponse::Visibility { id, .. }
			| LayerResponse::Clipping { id, .. }
			| LayerResponse::Bounds { id, .. }
			| LayerResponse::Created { id, .. }
			| LayerResponse::Deleted { id }
			| LayerResponse::Moved { id, .. } => id,
		}
	}
}

impl fmt::Display for LayerResponse {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			LayerResponse::Rename { .. } => write!(f, "Rename"),
			LayerResponse::Visibility { .. } => write!(f, "Visibility"),
			LayerResponse::Clipping { .. } => write!(f, "Clipping"),
			LayerResponse::Bounds { .. } => write!(f, "Bounds"),
			LayerResponse::Created { .. } => write!(f, "Created"),
			LayerResponse::Deleted { .. } => write!(f, "Deleted"),
			LayerResponse::Moved { .. } => write!(f, "Moved"),
		}
	}
}
