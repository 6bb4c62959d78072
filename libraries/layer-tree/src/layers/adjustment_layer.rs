use crate::raw::LayerProperties;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A layer that applies a color or tone adjustment to the layers below it.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct AdjustmentLayer {
	pub adjustment: Option<Value>,
}

impl AdjustmentLayer {
	pub fn from_properties(properties: &LayerProperties) -> Self {
		Self {
			adjustment: properties.adjustment.clone(),
		}
	}
}
