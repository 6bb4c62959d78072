use crate::raw::LayerProperties;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A plain raster layer.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct PixelLayer {
	pub pixels: Option<Value>,
}

impl PixelLayer {
	pub fn from_properties(properties: &LayerProperties) -> Self {
		Self { pixels: properties.pixels.clone() }
	}
}

/// The locked bottom-most raster layer of a document.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct BackgroundLayer {
	/// Which aspects of the layer the host prevents from being edited
	pub protection: Option<Value>,
	pub pixels: Option<Value>,
}

impl BackgroundLayer {
	pub fn from_properties(properties: &LayerProperties) -> Self {
		Self {
			protection: properties.protection.clone(),
			pixels: properties.pixels.clone(),
		}
	}
}
