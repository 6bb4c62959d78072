use super::adjustment_layer::AdjustmentLayer;
use super::group_layer::GroupLayer;
use super::pixel_layer::{BackgroundLayer, PixelLayer};
use super::shape_layer::ShapeLayer;
use super::smart_object_layer::SmartObjectLayer;
use super::text_layer::TextLayer;
use crate::LayerTreeError;
use crate::raw::{LayerBounds, LayerId, RawLayer, RawLayerChange};
use crate::response::LayerResponse;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// =========
// LayerKind
// =========

/// The type tag of a layer, as named by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
	Layer,
	Background,
	Shape,
	Text,
	Adjustment,
	SmartObject,
	Group,
}

impl LayerKind {
	pub fn from_tag(tag: &str) -> Option<Self> {
		match tag {
			"layer" => Some(LayerKind::Layer),
			"backgroundLayer" => Some(LayerKind::Background),
			"shapeLayer" => Some(LayerKind::Shape),
			"textLayer" => Some(LayerKind::Text),
			"adjustmentLayer" => Some(LayerKind::Adjustment),
			"smartObjectLayer" => Some(LayerKind::SmartObject),
			"layerSection" => Some(LayerKind::Group),
			_ => None,
		}
	}

	pub fn tag(&self) -> &'static str {
		match self {
			LayerKind::Layer => "layer",
			LayerKind::Background => "backgroundLayer",
			LayerKind::Shape => "shapeLayer",
			LayerKind::Text => "textLayer",
			LayerKind::Adjustment => "adjustmentLayer",
			LayerKind::SmartObject => "smartObjectLayer",
			LayerKind::Group => "layerSection",
		}
	}
}

impl fmt::Display for LayerKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.tag())
	}
}

// =============
// LayerDataType
// =============

/// The content specific to each type of layer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum LayerDataType {
	Layer(PixelLayer),
	Background(BackgroundLayer),
	Shape(ShapeLayer),
	Text(TextLayer),
	Adjustment(AdjustmentLayer),
	SmartObject(SmartObjectLayer),
	/// A layer that wraps a [GroupLayer] struct.
	Group(GroupLayer),
}

impl LayerDataType {
	/// Builds the content of a layer of the given kind from its descriptor. Groups are created empty.
	pub fn from_raw(kind: LayerKind, raw: &RawLayer) -> Self {
		let properties = &raw.properties;
		match kind {
			LayerKind::Layer => LayerDataType::Layer(PixelLayer::from_properties(properties)),
			LayerKind::Background => LayerDataType::Background(BackgroundLayer::from_properties(properties)),
			LayerKind::Shape => LayerDataType::Shape(ShapeLayer::from_properties(properties)),
			LayerKind::Text => LayerDataType::Text(TextLayer::from_properties(properties)),
			LayerKind::Adjustment => LayerDataType::Adjustment(AdjustmentLayer::from_properties(properties)),
			LayerKind::SmartObject => LayerDataType::SmartObject(SmartObjectLayer::from_properties(properties)),
			LayerKind::Group => LayerDataType::Group(GroupLayer::from_properties(properties)),
		}
	}
}

impl From<&LayerDataType> for LayerKind {
	fn from(data: &LayerDataType) -> Self {
		use LayerDataType::*;

		match data {
			Layer(_) => LayerKind::Layer,
			Background(_) => LayerKind::Background,
			Shape(_) => LayerKind::Shape,
			Text(_) => LayerKind::Text,
			Adjustment(_) => LayerKind::Adjustment,
			SmartObject(_) => LayerKind::SmartObject,
			Group(_) => LayerKind::Group,
		}
	}
}

// =========
// LayerNode
// =========

fn return_true() -> bool {
	true
}

/// A node of the layer tree: the attributes every layer shares, plus its type specific [LayerDataType].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayerNode {
	pub id: LayerId,
	/// The position declared by the host when the layer was created. It only orders siblings during construction and is
	/// not kept up to date afterwards, use [LayerNode::find_layer] for the current position.
	pub index: Option<usize>,
	pub name: Option<String>,
	pub bounds: Option<LayerBounds>,
	#[serde(default = "return_true")]
	pub visible: bool,
	#[serde(default)]
	pub clipped: bool,
	pub mask: Option<Value>,
	pub generator_settings: Option<Value>,
	/// The group whose children contain this layer, `None` for the document root.
	/// Detached layers keep naming their last group until they are placed again.
	pub group: Option<LayerId>,
	pub data: LayerDataType,
}

impl LayerNode {
	pub fn new(id: LayerId, data: LayerDataType) -> Self {
		Self {
			id,
			index: None,
			name: None,
			bounds: None,
			visible: true,
			clipped: false,
			mask: None,
			generator_settings: None,
			group: None,
			data,
		}
	}

	/// Builds a childless node from a descriptor, taking the shared attributes from it.
	pub fn from_raw(kind: LayerKind, raw: &RawLayer, group: Option<LayerId>) -> Self {
		let properties = &raw.properties;
		Self {
			id: raw.id.clone(),
			index: raw.index,
			name: raw.name.clone(),
			bounds: properties.bounds,
			visible: properties.visible.unwrap_or(true),
			clipped: properties.clipped.unwrap_or(false),
			mask: properties.mask.clone(),
			generator_settings: properties.generator_settings.clone(),
			group,
			data: LayerDataType::from_raw(kind, raw),
		}
	}

	pub fn kind(&self) -> LayerKind {
		LayerKind::from(&self.data)
	}

	pub fn is_group(&self) -> bool {
		matches!(self.data, LayerDataType::Group(_))
	}

	/// Number of slots the layer takes up in the host's flattened index space.
	/// A leaf takes one, a group takes two for its section markers plus the size of each child.
	pub fn size(&self) -> usize {
		match &self.data {
			LayerDataType::Group(group) => 2 + group.layers.iter().map(LayerNode::size).sum::<usize>(),
			_ => 1,
		}
	}

	/// Iterate over this layer and all the layers it encapsulates, in document order.
	pub fn iter(&self) -> LayerIter<'_> {
		LayerIter { stack: vec![self] }
	}

	/// Get a mutable reference to the group wrapped by the layer.
	/// This operation will fail if the [layer type](LayerNode::data) is not `LayerDataType::Group`.
	pub fn as_group_mut(&mut self) -> Result<&mut GroupLayer, LayerTreeError> {
		match &mut self.data {
			LayerDataType::Group(group) => Ok(group),
			_ => Err(LayerTreeError::NotAGroup(self.id.clone())),
		}
	}

	/// Get a reference to the group wrapped by the layer.
	/// This operation will fail if the [layer type](LayerNode::data) is not `LayerDataType::Group`.
	pub fn as_group(&self) -> Result<&GroupLayer, LayerTreeError> {
		match &self.data {
			LayerDataType::Group(group) => Ok(group),
			_ => Err(LayerTreeError::NotAGroup(self.id.clone())),
		}
	}

	/// Renames the layer, returning the rename if the name actually changed.
	pub fn set_name(&mut self, new_name: impl Into<String>) -> Option<LayerResponse> {
		let new_name = new_name.into();
		if self.name.as_deref() == Some(new_name.as_str()) {
			return None;
		}

		let previous_name = self.name.replace(new_name.clone());
		Some(LayerResponse::Rename {
			id: self.id.clone(),
			new_name,
			previous_name,
		})
	}

	pub fn set_visible(&mut self, visible: bool) -> Option<LayerResponse> {
		(self.visible != visible).then(|| {
			self.visible = visible;
			LayerResponse::Visibility { id: self.id.clone(), visible }
		})
	}

	pub fn set_clipped(&mut self, clipped: bool) -> Option<LayerResponse> {
		(self.clipped != clipped).then(|| {
			self.clipped = clipped;
			LayerResponse::Clipping { id: self.id.clone(), clipped }
		})
	}

	pub fn set_bounds(&mut self, bounds: LayerBounds) -> Option<LayerResponse> {
		if self.bounds == Some(bounds) {
			return None;
		}

		let previous_bounds = self.bounds.replace(bounds);
		Some(LayerResponse::Bounds {
			id: self.id.clone(),
			bounds,
			previous_bounds,
		})
	}

	/// Applies the attribute changes of a record addressed to this layer.
	/// Structural fields (`index`, `added`, `removed`, `layers`) are handled by [LayerNode::apply_layer_changes] instead.
	pub fn apply_change(&mut self, change: &RawLayerChange) -> Result<Vec<LayerResponse>, LayerTreeError> {
		if change.id != self.id {
			return Err(LayerTreeError::IdMismatch {
				layer: self.id.clone(),
				change: change.id.clone(),
			});
		}

		let properties = &change.properties;
		let responses = [
			change.name.as_ref().and_then(|name| self.set_name(name.as_str())),
			properties.visible.and_then(|visible| self.set_visible(visible)),
			properties.clipped.and_then(|clipped| self.set_clipped(clipped)),
			properties.bounds.and_then(|bounds| self.set_bounds(bounds)),
		];

		Ok(responses.into_iter().flatten().collect())
	}
}

impl fmt::Display for LayerNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.id, self.name.as_deref().unwrap_or("-"))?;

		if let LayerDataType::Group(group) = &self.data {
			f.write_str("[")?;
			for (position, layer) in group.layers.iter().enumerate() {
				if position > 0 {
					f.write_str(",")?;
				}
				write!(f, "{layer}")?;
			}
			f.write_str("]")?;
		}

		Ok(())
	}
}

// =========
// LayerIter
// =========

/// An iterator over the layers encapsulated by a layer.
/// See [LayerNode::iter] for more information.
#[derive(Debug, Default)]
pub struct LayerIter<'a> {
	pub stack: Vec<&'a LayerNode>,
}

impl<'a> Iterator for LayerIter<'a> {
	type Item = &'a LayerNode;

	fn next(&mut self) -> Option<Self::Item> {
		self.stack.pop().map(|layer| {
			if let LayerDataType::Group(group) = &layer.data {
				self.stack.extend(group.layers.iter().rev());
			}
			layer
		})
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use serde_json::json;

	fn layer(id: &str, name: Option<&str>) -> LayerNode {
		let mut layer = LayerNode::new(id.into(), LayerDataType::Layer(PixelLayer::default()));
		layer.name = name.map(String::from);
		layer
	}

	fn change(value: serde_json::Value) -> RawLayerChange {
		serde_json::from_value(value).unwrap()
	}

	#[test]
	fn leaves_have_unit_size() {
		assert_eq!(layer("A", None).size(), 1);
		assert_eq!(LayerNode::new("T".into(), LayerDataType::Text(TextLayer::default())).size(), 1);
		assert_eq!(LayerNode::new("G".into(), LayerDataType::Group(GroupLayer::default())).size(), 2);
	}

	#[test]
	fn display_uses_placeholder_for_missing_names() {
		assert_eq!(layer("A", Some("Sky")).to_string(), "A:Sky");
		assert_eq!(layer("7", None).to_string(), "7:-");
	}

	#[test]
	fn renaming_reports_the_previous_name() {
		let mut layer = layer("A", Some("A"));

		assert_eq!(layer.set_name("A"), None);
		assert_eq!(
			layer.set_name("A2"),
			Some(LayerResponse::Rename {
				id: "A".into(),
				new_name: "A2".to_string(),
				previous_name: Some("A".to_string()),
			})
		);
		assert_eq!(layer.name.as_deref(), Some("A2"));
	}

	#[test]
	fn apply_change_rejects_foreign_records() {
		let mut layer = layer("A", None);
		let result = layer.apply_change(&change(json!({ "id": "B", "name": "B" })));

		assert_eq!(result, Err(LayerTreeError::IdMismatch { layer: "A".into(), change: "B".into() }));
		assert_eq!(layer.name, None);
	}

	#[test]
	fn apply_change_only_reports_actual_changes() {
		let mut layer = layer("A", Some("A"));

		let responses = layer.apply_change(&change(json!({ "id": "A", "name": "A", "visible": false, "clipped": false }))).unwrap();
		assert_eq!(responses, vec![LayerResponse::Visibility { id: "A".into(), visible: false }]);

		let responses = layer.apply_change(&change(json!({ "id": "A" }))).unwrap();
		assert!(responses.is_empty());
	}

	#[test]
	fn responses_serialize_with_op_tags() {
		let response = layer("A", Some("A")).set_name("A2").unwrap();
		assert_eq!(
			serde_json::to_value(&response).unwrap(),
			json!({ "op": "rename", "id": "A", "newName": "A2", "previousName": "A" })
		);
	}

	#[test]
	fn kind_tags_round_trip() {
		for kind in [
			LayerKind::Layer,
			LayerKind::Background,
			LayerKind::Shape,
			LayerKind::Text,
			LayerKind::Adjustment,
			LayerKind::SmartObject,
			LayerKind::Group,
		] {
			assert_eq!(LayerKind::from_tag(kind.tag()), Some(kind));
		}
		assert_eq!(LayerKind::from_tag("artboardSection"), None);
	}
}
