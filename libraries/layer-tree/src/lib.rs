pub mod change;
pub mod document;
pub mod error;
pub mod factory;
pub mod layers;
pub mod raw;
pub mod response;

pub use change::{ChangedLayer, ChangedLayers};
pub use document::Document;
pub use error::LayerTreeError;
pub use factory::create_layer;
pub use layers::layer_info::{LayerDataType, LayerKind, LayerNode};
pub use raw::{LayerId, RawLayer, RawLayerChange};
pub use response::LayerResponse;
