//! Layer panel read-model and stacking changes

use serde::{Deserialize, Serialize};

use crate::scene::{DrawableObject, ObjectId, ObjectKind, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Image,
    Text,
}

/// One row of the layer panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerItem {
    pub id: ObjectId,
    pub kind: LayerKind,
    pub name: String,
    pub visible: bool,
    /// Index in the stacking order of user objects (0 = bottom)
    pub z: usize,
}

impl LayerItem {
    fn from_object(obj: &DrawableObject, z: usize) -> Self {
        let kind = match obj.kind {
            ObjectKind::Image { .. } => LayerKind::Image,
            ObjectKind::Text { .. } => LayerKind::Text,
        };
        Self {
            id: obj.id.clone(),
            kind,
            name: obj.name().to_string(),
            visible: obj.visible,
            z,
        }
    }
}

/// Objects whose bounding-box center lies over a page, bottom to top
pub fn layer_list(scene: &Scene) -> Vec<LayerItem> {
    let pages = &scene.layout().pages;
    scene
        .objects()
        .iter()
        .enumerate()
        .filter(|(_, obj)| {
            let center_x = obj.bounding_box().center_x();
            pages.iter().any(|p| p.rect.spans_x(center_x))
        })
        .map(|(z, obj)| LayerItem::from_object(obj, z))
        .collect()
}

/// Move an object to a new position in the stacking order.
///
/// The index is clamped to the user-object range, so markers stay beneath.
/// Returns false when the object is not in the scene.
pub fn move_to_index(scene: &mut Scene, id: &ObjectId, new_index: usize) -> bool {
    let Some(obj) = scene.remove(id) else {
        return false;
    };
    // The object is out of the scene here, so len() is the top position
    let clamped = new_index.min(scene.len());
    scene.insert(clamped, obj);
    true
}
