use crate::raw::LayerProperties;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A layer embedding or linking another document.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct SmartObjectLayer {
	pub smart_object: Option<Value>,
	/// Timeline information for video and animated content
	pub time_content: Option<Value>,
}

impl SmartObjectLayer {
	pub fn from_properties(properties: &LayerProperties) -> Self {
		Self {
			smart_object: properties.smart_object.clone(),
			time_content: properties.time_content.clone(),
		}
	}
}
