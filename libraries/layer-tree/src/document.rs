use crate::LayerTreeError;
use crate::change::{ChangedLayer, ChangedLayers};
use crate::factory::create_layer;
use crate::layers::group_layer::FlatEntry;
use crate::layers::layer_info::LayerNode;
use crate::raw::{LayerId, RawLayer, RawLayerChange};
use crate::response::LayerResponse;

use serde::Deserialize;
use std::fmt;

/// A batch of change records, sent either as a bare array or as an event object carrying them in `layers`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ChangeBatch {
	Records(Vec<RawLayerChange>),
	Event { layers: Vec<RawLayerChange> },
}

/// The layer tree of a host document, built from a snapshot and kept current by applying batches of change records.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
	pub root: LayerNode,
}

impl Document {
	pub fn from_snapshot(raw: &RawLayer) -> Result<Self, LayerTreeError> {
		let root = create_layer(None, raw)?;
		root.as_group()?;

		log::debug!("Loaded document {} with {} layers", root.id, root.iter().count() - 1);
		Ok(Self { root })
	}

	pub fn from_json(json: &str) -> Result<Self, LayerTreeError> {
		let raw: RawLayer = serde_json::from_str(json)?;
		Self::from_snapshot(&raw)
	}

	pub fn parse_changes(json: &str) -> Result<Vec<RawLayerChange>, LayerTreeError> {
		let batch: ChangeBatch = serde_json::from_str(json)?;
		Ok(match batch {
			ChangeBatch::Records(changes) | ChangeBatch::Event { layers: changes } => changes,
		})
	}

	pub fn size(&self) -> usize {
		self.root.size()
	}

	/// Looks up a layer anywhere in the document, including the root itself.
	pub fn layer(&self, layer_id: &LayerId) -> Option<&LayerNode> {
		if self.root.id == *layer_id {
			return Some(&self.root);
		}
		self.root.find_layer(layer_id).map(|found| found.layer)
	}

	pub fn layer_mut(&mut self, layer_id: &LayerId) -> Option<&mut LayerNode> {
		if self.root.id == *layer_id {
			return Some(&mut self.root);
		}
		self.root.find_layer_mut(layer_id)
	}

	/// The host's flattened index of a layer. The root has none.
	pub fn layer_index(&self, layer_id: &LayerId) -> Option<usize> {
		self.root.find_layer(layer_id).map(|found| found.index)
	}

	pub fn layer_at_index(&self, index: usize) -> Option<&LayerNode> {
		self.root.layer_at_index(index)
	}

	pub fn flatten(&self) -> Vec<FlatEntry<'_>> {
		self.root.flatten()
	}

	/// Removes a layer from the group that owns it. Detaching the root, or a layer that is not part of the document, does nothing.
	pub fn detach(&mut self, layer_id: &LayerId) -> Result<Option<LayerNode>, LayerTreeError> {
		detach_from(&mut self.root, layer_id)
	}

	/// Applies a batch of change records and reports their effects.
	///
	/// Every layer whose position or existence changes is detached first, then the batch is applied from the root down,
	/// and finally the attribute changes are applied to the layers that remain in the document. An error leaves the
	/// document partially updated.
	pub fn apply_changes(&mut self, changes: &[RawLayerChange]) -> Result<Vec<LayerResponse>, LayerTreeError> {
		if let Some(change) = changes.iter().flat_map(RawLayerChange::iter).find(|change| change.added && self.layer(&change.id).is_some()) {
			return Err(LayerTreeError::DuplicateLayer(change.id.clone()));
		}

		let anchored_changes = changes.iter().map(|change| self.anchor_unmoved_groups(change)).collect::<Vec<_>>();

		let mut changed_layers = ChangedLayers::default();
		for change in anchored_changes.iter().flat_map(RawLayerChange::iter) {
			if change.added || !change.is_structural() || changed_layers.contains_key(&change.id) {
				continue;
			}
			match self.detach_changed(&change.id, &mut changed_layers)? {
				Some(layer) => {
					changed_layers.insert(change.id.clone(), ChangedLayer::detached(layer));
				}
				None => log::debug!("Layer {} is not part of the document, nothing to detach", change.id),
			}
		}
		log::debug!("Detached {} layers before applying {} change records", changed_layers.len(), changes.len());

		self.root.apply_layer_changes(&anchored_changes, &mut changed_layers, None)?;

		let mut responses = Vec::new();
		for change in changes.iter().flat_map(RawLayerChange::iter) {
			let changed_layer = changed_layers.get(&change.id);

			if change.removed {
				if changed_layer.is_some() {
					responses.push(LayerResponse::Deleted { id: change.id.clone() });
				}
				continue;
			}

			if let (Some(changed_layer), Some(_)) = (changed_layer, change.index) {
				if let Some(group) = self.layer(&change.id).and_then(|layer| layer.group.clone()) {
					responses.push(if change.added {
						LayerResponse::Created { id: change.id.clone(), group }
					} else {
						LayerResponse::Moved {
							id: change.id.clone(),
							previous_group: changed_layer.previous_group.clone(),
							group,
						}
					});
				}
			}

			if change.added || !change.has_attribute_changes() {
				continue;
			}
			let layer = self.layer_mut(&change.id).ok_or_else(|| LayerTreeError::LayerNotFound(change.id.clone()))?;
			responses.extend(layer.apply_change(change)?);
		}

		Ok(responses)
	}

	/// Gives records of groups that stay in place, but whose children change, the group's current index.
	/// The group is then detached and placed again at that same index, after its children have been updated.
	fn anchor_unmoved_groups(&self, change: &RawLayerChange) -> RawLayerChange {
		let mut change = change.clone();

		if change.index.is_none() && !change.added && !change.removed && change.layers.is_some() {
			change.index = self.layer_index(&change.id);
			if let Some(index) = change.index {
				log::trace!("Anchoring unmoved group {} at index {}", change.id, index);
			}
		}
		if let Some(layers) = &change.layers {
			change.layers = Some(layers.iter().map(|layer| self.anchor_unmoved_groups(layer)).collect());
		}

		change
	}

	/// Detaches a layer from the document, or from a subtree that has already been detached earlier in the batch.
	fn detach_changed(&mut self, layer_id: &LayerId, changed_layers: &mut ChangedLayers) -> Result<Option<LayerNode>, LayerTreeError> {
		if let Some(layer) = detach_from(&mut self.root, layer_id)? {
			return Ok(Some(layer));
		}

		for detached in changed_layers.values_mut().filter_map(|changed_layer| changed_layer.layer.as_mut()) {
			if let Some(layer) = detach_from(detached, layer_id)? {
				return Ok(Some(layer));
			}
		}

		Ok(None)
	}
}

fn detach_from(root: &mut LayerNode, layer_id: &LayerId) -> Result<Option<LayerNode>, LayerTreeError> {
	let Some(group_id) = root.find_layer(layer_id).and_then(|found| found.layer.group.clone()) else {
		return Ok(None);
	};

	let owner = if group_id == root.id {
		root
	} else {
		root.find_layer_mut(&group_id).ok_or_else(|| LayerTreeError::GroupNotFound {
			layer: layer_id.clone(),
			group: group_id.clone(),
		})?
	};
	owner.detach_layer(layer_id).map(Some)
}

impl fmt::Display for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.root, f)
	}
}
