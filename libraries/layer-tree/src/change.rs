//! Applies batches of host change records to an existing layer tree.
//!
//! Layers whose position or existence changes are first detached by the caller and handed over in a [ChangedLayers]
//! table. A batch is then applied to each group in two passes: every changed child is materialized and brought to its
//! final size (recursing into nested changes), and only then are the children placed, since placement depends on the
//! sizes of their siblings.

use crate::LayerTreeError;
use crate::factory::create_layer;
use crate::layers::layer_info::LayerNode;
use crate::raw::{LayerId, RawLayerChange};

use rustc_hash::FxHashMap;

/// Layers touched by a batch, keyed by their id.
pub type ChangedLayers = FxHashMap<LayerId, ChangedLayer>;

/// A layer held outside of the tree while a batch is applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangedLayer {
	/// The detached or newly created layer, taken back out when it is placed in the tree
	pub layer: Option<LayerNode>,
	/// The group that owned the layer before it was placed by the batch
	pub previous_group: Option<LayerId>,
}

impl ChangedLayer {
	pub fn detached(layer: LayerNode) -> Self {
		Self {
			previous_group: layer.group.clone(),
			layer: Some(layer),
		}
	}

	pub fn is_placed(&self) -> bool {
		self.layer.is_none()
	}
}

impl LayerNode {
	/// Applies the change records addressed to the children of this group.
	///
	/// `parent_index` is the new flattened index of this group in its parent's host frame, or `None` when this group is
	/// the document root. Newly created layers are registered in `changed_layers`.
	pub fn apply_layer_changes(&mut self, changes: &[RawLayerChange], changed_layers: &mut ChangedLayers, parent_index: Option<usize>) -> Result<(), LayerTreeError> {
		self.as_group()?;

		let mut indexed_changes = changes.iter().filter(|change| change.index.is_some()).collect::<Vec<_>>();
		indexed_changes.sort_by_key(|change| change.index);

		let final_size = self.materialize_changes(&indexed_changes, changed_layers)?;

		// Translate host indices into this group's frame, whose first child sits right above the section end marker
		let offset = match parent_index {
			None => 0,
			Some(parent_index) => parent_index.checked_sub(final_size - 2).ok_or_else(|| LayerTreeError::IndexMismatch {
				layer: self.id.clone(),
				requested: parent_index,
				reached: final_size - 1,
			})?,
		};

		for change in indexed_changes.iter().filter(|change| !change.removed) {
			let Some(index) = change.index else { continue };

			let Some((changed_layer, layer)) = changed_layers
				.get_mut(&change.id)
				.and_then(|changed_layer| changed_layer.layer.take().map(|layer| (changed_layer, layer)))
			else {
				log::warn!("Skipping placement of layer {} in group {}, it is not waiting to be placed", change.id, self.id);
				continue;
			};
			if !change.added {
				changed_layer.previous_group = layer.group.clone();
			}

			let local_index = index.checked_sub(offset).ok_or_else(|| LayerTreeError::IndexMismatch {
				layer: change.id.clone(),
				requested: index,
				reached: offset,
			})?;
			log::trace!("Placing layer {} at index {} of group {}", layer.id, local_index, self.id);
			self.add_layer_at_index(layer, local_index)?;
		}

		Ok(())
	}

	/// Creates or looks up the layer of every indexed change, applies nested changes to them, and returns the size this
	/// group will have once they are all placed.
	fn materialize_changes(&self, indexed_changes: &[&RawLayerChange], changed_layers: &mut ChangedLayers) -> Result<usize, LayerTreeError> {
		let mut final_size = self.size();

		for change in indexed_changes {
			if change.added {
				if changed_layers.contains_key(&change.id) {
					return Err(LayerTreeError::DuplicateLayer(change.id.clone()));
				}
				let layer = create_layer(Some(&self.id), &change.to_descriptor())?;
				changed_layers.insert(change.id.clone(), ChangedLayer { layer: Some(layer), previous_group: None });
			}

			let Some(mut layer) = changed_layers.get_mut(&change.id).and_then(|changed_layer| changed_layer.layer.take()) else {
				if change.removed {
					log::debug!("Layer {} was removed before it was materialized", change.id);
					continue;
				}
				return Err(LayerTreeError::UnmaterializedLayer(change.id.clone()));
			};

			let result = match &change.layers {
				Some(nested_changes) => layer.apply_layer_changes(nested_changes, changed_layers, change.index),
				None => Ok(()),
			};
			if !change.removed {
				final_size += layer.size();
			}

			if let Some(changed_layer) = changed_layers.get_mut(&change.id) {
				changed_layer.layer = Some(layer);
			}
			result?;
		}

		Ok(final_size)
	}
}
