use super::layer_info::{LayerDataType, LayerNode};
use crate::LayerTreeError;
use crate::raw::{LayerId, LayerProperties};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A layer that encapsulates other layers, including potentially more groups.
/// The contained layers are stored in ascending order of their flattened index, so the bottom-most layer comes first.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct GroupLayer {
	pub blend_options: Option<Value>,
	/// The [LayerNode]s contained in the group
	pub layers: Vec<LayerNode>,
}

impl GroupLayer {
	pub fn from_properties(properties: &LayerProperties) -> Self {
		Self {
			blend_options: properties.blend_options.clone(),
			layers: Vec::new(),
		}
	}

	/// Position of a direct child within [GroupLayer::layers].
	pub fn position(&self, layer_id: &LayerId) -> Option<usize> {
		self.layers.iter().position(|layer| layer.id == *layer_id)
	}
}

/// A layer found by [LayerNode::find_layer], along with its flattened index relative to the group that was searched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoundLayer<'a> {
	pub layer: &'a LayerNode,
	pub index: usize,
}

/// One slot of the host's flattened index space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlatEntry<'a> {
	/// The slot of a layer itself. For a group, this is the slot above all of its children.
	Layer(&'a LayerNode),
	/// The marker closing the section of the given group, below all of its children.
	SectionEnd(&'a LayerNode),
}

// =====================================
// LayerNode: flattened index arithmetic
// =====================================

impl LayerNode {
	/// Inserts `layer` so that its flattened index within this group becomes `index`, descending into a child group when
	/// the index lies within that child's span.
	///
	/// Indices are relative to this group: its first child starts at 0, and a layer's index is the last slot of its span
	/// (for a group, the slot above its children). Fails if no position in the current tree yields exactly `index`.
	pub fn add_layer_at_index(&mut self, mut layer: LayerNode, index: usize) -> Result<(), LayerTreeError> {
		let group_id = self.id.clone();
		let group = self.as_group_mut()?;
		let layer_size = layer.size();

		// The index the layer would take if it were inserted before the child at `position`
		let mut current_index = layer_size - 1;
		let mut position = 0;
		while position < group.layers.len() && index > current_index {
			let child = &mut group.layers[position];
			let next_index = current_index + child.size();

			if index < next_index && child.is_group() {
				// The child's own children start right after the section end marker that begins its span
				let span_start = current_index + 1 - layer_size;
				log::trace!("Descending into group {} to place layer {} at index {}", child.id, layer.id, index - span_start - 1);
				return child.add_layer_at_index(layer, index - span_start - 1);
			}

			current_index = next_index;
			position += 1;
		}

		if current_index != index {
			return Err(LayerTreeError::IndexMismatch {
				layer: layer.id,
				requested: index,
				reached: current_index,
			});
		}

		layer.group = Some(group_id);
		group.layers.insert(position, layer);
		Ok(())
	}

	/// Searches the layers encapsulated by this group for `layer_id`.
	/// The returned index is the layer's flattened index relative to this group, as accepted by [LayerNode::add_layer_at_index].
	pub fn find_layer(&self, layer_id: &LayerId) -> Option<FoundLayer<'_>> {
		let LayerDataType::Group(group) = &self.data else { return None };

		let mut offset = 0;
		for layer in &group.layers {
			let size = layer.size();
			if layer.id == *layer_id {
				return Some(FoundLayer { layer, index: offset + size - 1 });
			}
			if let Some(found) = layer.find_layer(layer_id) {
				// Account for the section end marker at the start of the child's span
				return Some(FoundLayer {
					layer: found.layer,
					index: offset + 1 + found.index,
				});
			}
			offset += size;
		}

		None
	}

	/// Searches the layers encapsulated by this group for `layer_id`, not including the group itself.
	pub fn find_layer_mut(&mut self, layer_id: &LayerId) -> Option<&mut LayerNode> {
		let LayerDataType::Group(group) = &mut self.data else { return None };

		group
			.layers
			.iter_mut()
			.find_map(|layer| if layer.id == *layer_id { Some(layer) } else { layer.find_layer_mut(layer_id) })
	}

	/// The layer whose own slot is at `index` relative to this group. Section end markers have no layer of their own.
	pub fn layer_at_index(&self, index: usize) -> Option<&LayerNode> {
		let LayerDataType::Group(group) = &self.data else { return None };

		let mut offset = 0;
		for layer in &group.layers {
			let size = layer.size();
			if index < offset + size {
				return match index - offset {
					local if local == size - 1 => Some(layer),
					0 => None,
					local => layer.layer_at_index(local - 1),
				};
			}
			offset += size;
		}

		None
	}

	/// Lists the slots of this group's flattened index space in ascending order.
	pub fn flatten(&self) -> Vec<FlatEntry<'_>> {
		let mut entries = Vec::new();
		self.flatten_into(&mut entries);
		entries
	}

	fn flatten_into<'a>(&'a self, entries: &mut Vec<FlatEntry<'a>>) {
		let LayerDataType::Group(group) = &self.data else { return };

		for layer in &group.layers {
			if layer.is_group() {
				entries.push(FlatEntry::SectionEnd(layer));
				layer.flatten_into(entries);
			}
			entries.push(FlatEntry::Layer(layer));
		}
	}

	/// Removes the direct child `layer_id` from this group and returns it.
	/// The detached layer keeps naming this group as its owner until it is placed again.
	pub fn detach_layer(&mut self, layer_id: &LayerId) -> Result<LayerNode, LayerTreeError> {
		let group_id = self.id.clone();
		let group = self.as_group_mut()?;

		let position = group.position(layer_id).ok_or_else(|| LayerTreeError::LayerNotInGroup {
			layer: layer_id.clone(),
			group: group_id,
		})?;
		Ok(group.layers.remove(position))
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::layers::pixel_layer::PixelLayer;
	use pretty_assertions::assert_eq;

	fn leaf(id: &str) -> LayerNode {
		let mut layer = LayerNode::new(id.into(), LayerDataType::Layer(PixelLayer::default()));
		layer.name = Some(id.to_string());
		layer
	}

	fn group(id: &str) -> LayerNode {
		let mut layer = LayerNode::new(id.into(), LayerDataType::Group(GroupLayer::default()));
		layer.name = Some(id.to_string());
		layer
	}

	/// root[A, G[B, H[C]], D]
	fn nested_tree() -> LayerNode {
		let mut root = group("root");
		root.add_layer_at_index(leaf("A"), 0).unwrap();
		root.add_layer_at_index(group("G"), 2).unwrap();
		root.add_layer_at_index(leaf("B"), 2).unwrap();
		root.add_layer_at_index(group("H"), 4).unwrap();
		root.add_layer_at_index(leaf("C"), 4).unwrap();
		root.add_layer_at_index(leaf("D"), 7).unwrap();
		root
	}

	fn ids(root: &LayerNode) -> Vec<String> {
		root.iter().skip(1).map(|layer| layer.id.to_string()).collect()
	}

	#[test]
	fn insertion_builds_nested_groups() {
		let root = nested_tree();

		assert_eq!(root.to_string(), "root:root[A:A,G:G[B:B,H:H[C:C]],D:D]");
		assert_eq!(root.size(), 2 + 1 + (2 + 1 + (2 + 1)) + 1);
		assert_eq!(ids(&root), ["A", "G", "B", "H", "C", "D"]);
	}

	#[test]
	fn inserted_layers_point_at_their_group() {
		let root = nested_tree();

		for layer in root.iter().skip(1) {
			let expected = match layer.id.as_str() {
				"A" | "G" | "D" => "root",
				"B" | "H" => "G",
				_ => "H",
			};
			assert_eq!(layer.group, Some(expected.into()), "owner of {}", layer.id);
		}
	}

	#[test]
	fn insertion_at_zero_prepends() {
		let mut root = nested_tree();
		root.add_layer_at_index(leaf("Z"), 0).unwrap();

		assert_eq!(root.to_string(), "root:root[Z:Z,A:A,G:G[B:B,H:H[C:C]],D:D]");
	}

	#[test]
	fn insertion_after_last_child_appends() {
		let mut root = nested_tree();
		let children_size = root.size() - 2;
		root.add_layer_at_index(leaf("Z"), children_size).unwrap();

		let mut empty = group("E");
		empty.add_layer_at_index(leaf("Y"), 0).unwrap();
		let children_size = root.size() - 2;
		root.add_layer_at_index(empty, children_size + 3 - 1).unwrap();

		assert_eq!(root.to_string(), "root:root[A:A,G:G[B:B,H:H[C:C]],D:D,Z:Z,E:E[Y:Y]]");
	}

	#[test]
	fn group_insertion_descends_with_group_sizes() {
		let mut root = nested_tree();
		// A at 0, G spans 1..=6 with B at 2 and H spanning 3..=5
		let mut section = group("S");
		section.add_layer_at_index(leaf("X"), 0).unwrap();
		root.add_layer_at_index(section, 5).unwrap();

		assert_eq!(root.to_string(), "root:root[A:A,G:G[B:B,S:S[X:X],H:H[C:C]],D:D]");
		assert_eq!(root.find_layer(&"S".into()).map(|found| found.index), Some(5));
		assert_eq!(root.find_layer(&"X".into()).map(|found| found.index), Some(4));
	}

	#[test]
	fn unreachable_indices_are_rejected() {
		let mut root = group("root");
		assert_eq!(
			root.add_layer_at_index(leaf("A"), 1),
			Err(LayerTreeError::IndexMismatch {
				layer: "A".into(),
				requested: 1,
				reached: 0
			})
		);

		// A group can never end up at index 0
		assert!(matches!(root.add_layer_at_index(group("G"), 0), Err(LayerTreeError::IndexMismatch { reached: 1, .. })));
		assert_eq!(root.to_string(), "root:root[]");
	}

	#[test]
	fn leaves_cannot_hold_layers() {
		let mut layer = leaf("A");
		assert_eq!(layer.add_layer_at_index(leaf("B"), 0), Err(LayerTreeError::NotAGroup("A".into())));
	}

	#[test]
	fn find_layer_reports_flattened_index() {
		let root = nested_tree();
		let index_of = |id: &str| root.find_layer(&id.into()).map(|found| found.index);

		assert_eq!(index_of("A"), Some(0));
		assert_eq!(index_of("B"), Some(2));
		assert_eq!(index_of("C"), Some(4));
		assert_eq!(index_of("H"), Some(5));
		assert_eq!(index_of("G"), Some(6));
		assert_eq!(index_of("D"), Some(7));
		assert_eq!(index_of("root"), None);
		assert_eq!(index_of("missing"), None);

		let group = root.find_layer(&"G".into()).unwrap().layer;
		assert_eq!(group.find_layer(&"C".into()).map(|found| found.index), Some(2));
	}

	#[test]
	fn flatten_agrees_with_find_layer() {
		let root = nested_tree();
		let entries = root.flatten();

		assert_eq!(entries.len(), root.size() - 2);
		for layer in root.iter().skip(1) {
			let found = root.find_layer(&layer.id).unwrap();
			assert_eq!(entries[found.index], FlatEntry::Layer(layer));
			assert_eq!(root.layer_at_index(found.index).map(|layer| &layer.id), Some(&layer.id));
		}

		assert_eq!(entries[1], FlatEntry::SectionEnd(root.find_layer(&"G".into()).unwrap().layer));
		assert_eq!(root.layer_at_index(1), None);
		assert_eq!(root.layer_at_index(3), None);
		assert_eq!(root.layer_at_index(8), None);
	}

	#[test]
	fn detach_then_reinsert_round_trips() {
		let original = nested_tree();

		for layer in original.iter().skip(1) {
			let mut root = original.clone();
			let index = root.find_layer(&layer.id).unwrap().index;
			let group_id = layer.group.clone().unwrap();

			let owner = if group_id == root.id { &mut root } else { root.find_layer_mut(&group_id).unwrap() };
			let detached = owner.detach_layer(&layer.id).unwrap();
			assert_eq!(root.size(), original.size() - detached.size());
			assert!(root.find_layer(&layer.id).is_none());

			root.add_layer_at_index(detached, index).unwrap();
			assert_eq!(root.to_string(), original.to_string(), "reinserting {}", layer.id);
			assert_eq!(root, original);
		}
	}

	#[test]
	fn detaching_a_stranger_fails() {
		let mut root = nested_tree();
		assert_eq!(
			root.detach_layer(&"C".into()),
			Err(LayerTreeError::LayerNotInGroup {
				layer: "C".into(),
				group: "root".into()
			})
		);
	}
}
