//! # Layers
//! A document consists of a tree of [Layers](layer_info::LayerNode) mirroring the host application's layer stack.
//! There are currently these different types of layers:
//! * [Group layers](group_layer::GroupLayer), which encapsulate sub-layers
//! * [Pixel layers](pixel_layer::PixelLayer) and [background layers](pixel_layer::BackgroundLayer), which hold raster content
//! * [Shape layers](shape_layer::ShapeLayer), which contain a fill and a vector path
//! * [Text layers](text_layer::TextLayer), which contain a description of laid out text
//! * [Adjustment layers](adjustment_layer::AdjustmentLayer), which modify the layers below them
//! * [Smart object layers](smart_object_layer::SmartObjectLayer), which embed or link another document
//!
//! The content of all layers is opaque to this crate, only the structure of the tree is interpreted.
//!
//! ## Flattened indices
//! The host addresses layers by a single linear index over the whole document.
//! A leaf layer occupies one slot of that index space, while a group occupies one slot for the marker closing its
//! section, the slots of its children, and finally one slot for the group itself.

/// Contains the [AdjustmentLayer](adjustment_layer::AdjustmentLayer) type.
pub mod adjustment_layer;
/// Contains the [GroupLayer](group_layer::GroupLayer) type that encapsulates other layers, including more groups.
pub mod group_layer;
/// Contains the base [LayerNode](layer_info::LayerNode) type, an abstraction over the different types of layers.
pub mod layer_info;
/// Contains the raster layer types.
pub mod pixel_layer;
/// Contains the [ShapeLayer](shape_layer::ShapeLayer) type.
pub mod shape_layer;
/// Contains the [SmartObjectLayer](smart_object_layer::SmartObjectLayer) type.
pub mod smart_object_layer;
/// Contains the [TextLayer](text_layer::TextLayer) type.
pub mod text_layer;
