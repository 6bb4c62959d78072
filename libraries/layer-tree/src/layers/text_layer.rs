use crate::raw::LayerProperties;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct TextLayer {
	/// Text content along with its styling and layout, as sent by the host
	pub text: Option<Value>,
}

impl TextLayer {
	pub fn from_properties(properties: &LayerProperties) -> Self {
		Self { text: properties.text.clone() }
	}
}
