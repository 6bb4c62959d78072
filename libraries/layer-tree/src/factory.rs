use crate::LayerTreeError;
use crate::layers::layer_info::{LayerKind, LayerNode};
use crate::raw::{LayerId, RawLayer};

/// Creates the layer described by `raw`, including all of its descendants.
///
/// A descriptor without a `type` is only valid without a parent, where it describes the document root, which is a group.
/// Children of a group are placed in ascending order of their declared `index`.
pub fn create_layer(parent: Option<&LayerId>, raw: &RawLayer) -> Result<LayerNode, LayerTreeError> {
	let kind = match (parent, raw.kind.as_deref()) {
		(None, None) => LayerKind::Group,
		(_, Some(tag)) => LayerKind::from_tag(tag).ok_or_else(|| unknown_type(raw))?,
		(Some(_), None) => return Err(unknown_type(raw)),
	};

	let mut layer = LayerNode::from_raw(kind, raw, parent.cloned());
	if kind != LayerKind::Group {
		return Ok(layer);
	}

	let mut children = raw.layers.iter().collect::<Vec<_>>();
	children.sort_by_key(|child| child.index);

	let mut children_size = 0;
	for child in children {
		let child = create_layer(Some(&layer.id), child)?;
		ensure_unique(&layer, &child)?;
		let size = child.size();
		layer.add_layer_at_index(child, children_size + size - 1)?;
		children_size += size;
	}

	Ok(layer)
}

/// Fails if `layer` or any of its descendants shares an id with `group` or a layer already inside it.
pub fn ensure_unique(group: &LayerNode, layer: &LayerNode) -> Result<(), LayerTreeError> {
	match layer.iter().find(|descendant| descendant.id == group.id || group.find_layer(&descendant.id).is_some()) {
		Some(duplicate) => Err(LayerTreeError::DuplicateLayer(duplicate.id.clone())),
		None => Ok(()),
	}
}

fn unknown_type(raw: &RawLayer) -> LayerTreeError {
	LayerTreeError::UnknownLayerType {
		layer: raw.id.clone(),
		kind: raw.kind.clone(),
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::layers::layer_info::LayerDataType;
	use serde_json::json;

	fn raw(value: serde_json::Value) -> RawLayer {
		serde_json::from_value(value).unwrap()
	}

	#[test]
	fn untyped_root_becomes_a_group() {
		let root = create_layer(None, &raw(json!({ "id": "root" }))).unwrap();

		assert_eq!(root.kind(), LayerKind::Group);
		assert_eq!(root.group, None);
		assert_eq!(root.size(), 2);
	}

	#[test]
	fn untyped_children_are_rejected() {
		let result = create_layer(None, &raw(json!({ "id": "root", "layers": [{ "id": "A", "index": 0 }] })));
		assert_eq!(result, Err(LayerTreeError::UnknownLayerType { layer: "A".into(), kind: None }));
	}

	#[test]
	fn unknown_types_are_rejected() {
		let result = create_layer(Some(&"root".into()), &raw(json!({ "id": "A", "type": "artboardSection", "index": 0 })));
		assert_eq!(
			result,
			Err(LayerTreeError::UnknownLayerType {
				layer: "A".into(),
				kind: Some("artboardSection".to_string())
			})
		);
	}

	#[test]
	fn repeated_ids_are_rejected() {
		let sibling = create_layer(None, &raw(json!({ "id": "root", "layers": [
			{ "id": "A", "type": "layer", "index": 0 },
			{ "id": "G", "type": "layerSection", "index": 2, "layers": [{ "id": "A", "type": "layer", "index": 1 }] },
		]})));
		assert_eq!(sibling, Err(LayerTreeError::DuplicateLayer("A".into())));

		let ancestor = create_layer(None, &raw(json!({ "id": "root", "layers": [{ "id": "root", "type": "layer", "index": 0 }] })));
		assert_eq!(ancestor, Err(LayerTreeError::DuplicateLayer("root".into())));
	}

	#[test]
	fn variants_keep_their_payloads() {
		let layer = create_layer(
			Some(&"root".into()),
			&raw(json!({ "id": 3, "type": "smartObjectLayer", "index": 0, "smartObject": { "linked": false }, "visible": false })),
		)
		.unwrap();

		assert_eq!(layer.group, Some("root".into()));
		assert!(!layer.visible);
		let LayerDataType::SmartObject(smart_object) = &layer.data else { panic!("expected a smart object, got {:?}", layer.kind()) };
		assert_eq!(smart_object.smart_object, Some(json!({ "linked": false })));
		assert_eq!(smart_object.time_content, None);
	}

	#[test]
	fn children_are_sorted_by_declared_index() {
		let root = create_layer(
			None,
			&raw(json!({
				"id": "root",
				"layers": [
					{ "id": "T", "type": "textLayer", "index": 5, "name": "Title" },
					{ "id": "G", "type": "layerSection", "index": 3, "name": "Group", "layers": [
						{ "id": "S", "type": "shapeLayer", "index": 2 },
						{ "id": "P", "type": "layer", "index": 1 },
					]},
					{ "id": "BG", "type": "backgroundLayer", "index": 0, "name": "Background" },
				],
			})),
		)
		.unwrap();

		assert_eq!(root.to_string(), "root:-[BG:Background,G:Group[P:-,S:-],T:Title]");
		assert_eq!(root.size(), 2 + 1 + 4 + 1);
		assert_eq!(root.find_layer(&"T".into()).map(|found| found.index), Some(5));
		assert_eq!(root.find_layer(&"P".into()).unwrap().layer.group, Some("G".into()));
	}
}
