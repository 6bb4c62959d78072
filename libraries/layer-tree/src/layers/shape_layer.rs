use crate::raw::LayerProperties;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A vector layer filled along a path.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ShapeLayer {
	pub fill: Option<Value>,
	pub path: Option<Value>,
}

impl ShapeLayer {
	pub fn from_properties(properties: &LayerProperties) -> Self {
		Self {
			fill: properties.fill.clone(),
			path: properties.path.clone(),
		}
	}
}
