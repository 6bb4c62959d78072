//! Serde models of the records the host application sends: full layer descriptors for snapshots, and change records for
//! incremental updates. Payloads the tree does not interpret are carried as opaque [`Value`]s.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// =======
// LayerId
// =======

/// Identifies a layer across the whole document. The host sends either integers or strings, both are kept as text.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for LayerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("LayerId").field(&self.0).finish()
	}
}

impl fmt::Display for LayerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for LayerId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl From<String> for LayerId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl From<u64> for LayerId {
	fn from(id: u64) -> Self {
		Self(id.to_string())
	}
}

impl<'de> Deserialize<'de> for LayerId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct LayerIdVisitor;

		impl Visitor<'_> for LayerIdVisitor {
			type Value = LayerId;

			fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
				formatter.write_str("a layer id as a string or an integer")
			}

			fn visit_str<E: de::Error>(self, value: &str) -> Result<LayerId, E> {
				Ok(LayerId::from(value))
			}

			fn visit_string<E: de::Error>(self, value: String) -> Result<LayerId, E> {
				Ok(LayerId::from(value))
			}

			fn visit_u64<E: de::Error>(self, value: u64) -> Result<LayerId, E> {
				Ok(LayerId::from(value))
			}

			fn visit_i64<E: de::Error>(self, value: i64) -> Result<LayerId, E> {
				Ok(LayerId(value.to_string()))
			}
		}

		deserializer.deserialize_any(LayerIdVisitor)
	}
}

// ===========
// LayerBounds
// ===========

/// Axis-aligned rectangle in document pixels, in the host's `top`/`left`/`bottom`/`right` form.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerBounds {
	pub top: f64,
	pub left: f64,
	pub bottom: f64,
	pub right: f64,
}

impl LayerBounds {
	pub fn width(&self) -> f64 {
		self.right - self.left
	}

	pub fn height(&self) -> f64 {
		self.bottom - self.top
	}
}

// ===============
// LayerProperties
// ===============

/// Attributes shared by descriptors and change records. Everything except `bounds`, `visible` and `clipped` is opaque.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerProperties {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bounds: Option<LayerBounds>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub visible: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub clipped: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub mask: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub generator_settings: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pixels: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub protection: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub fill: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub path: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub text: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub adjustment: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub smart_object: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub time_content: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub blend_options: Option<Value>,
}

// ========
// RawLayer
// ========

/// A layer descriptor as found in a full document snapshot.
/// The document root is a descriptor without a `type`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawLayer {
	pub id: LayerId,
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub index: Option<usize>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub layers: Vec<RawLayer>,
	#[serde(flatten)]
	pub properties: LayerProperties,
}

// ==============
// RawLayerChange
// ==============

/// An incremental change to one layer, possibly carrying nested changes for the children of a group.
///
/// `index` is only present when the layer's position or existence changed. Records of added layers also carry the
/// descriptor fields needed to create the layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawLayerChange {
	pub id: LayerId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub index: Option<usize>,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub added: bool,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub removed: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub layers: Option<Vec<RawLayerChange>>,
	#[serde(flatten)]
	pub properties: LayerProperties,
}

impl RawLayerChange {
	/// The descriptor used to create the layer of an `added` record.
	/// Children are left out since they arrive as nested change records of their own.
	pub fn to_descriptor(&self) -> RawLayer {
		RawLayer {
			id: self.id.clone(),
			kind: self.kind.clone(),
			index: self.index,
			name: self.name.clone(),
			layers: Vec::new(),
			properties: self.properties.clone(),
		}
	}

	/// Whether this record changes the layer's position or existence, which requires detaching it before the batch.
	pub fn is_structural(&self) -> bool {
		self.index.is_some() || self.removed
	}

	pub fn has_attribute_changes(&self) -> bool {
		let properties = &self.properties;
		self.name.is_some() || properties.visible.is_some() || properties.clipped.is_some() || properties.bounds.is_some()
	}

	/// Iterate over this record and all nested records, depth first.
	pub fn iter(&self) -> RawLayerChangeIter<'_> {
		RawLayerChangeIter { stack: vec![self] }
	}
}

/// Depth-first iterator over a change record and its nested records.
#[derive(Debug, Default)]
pub struct RawLayerChangeIter<'a> {
	pub stack: Vec<&'a RawLayerChange>,
}

impl<'a> Iterator for RawLayerChangeIter<'a> {
	type Item = &'a RawLayerChange;

	fn next(&mut self) -> Option<Self::Item> {
		self.stack.pop().map(|change| {
			if let Some(layers) = &change.layers {
				self.stack.extend(layers.iter().rev());
			}
			change
		})
	}
}
