//! Owned scene graph of the spread being edited
//!
//! The scene holds the current spread layout and the user objects in
//! stacking order (first = bottom). Page markers are derived from the
//! layout on demand, so they always render beneath user objects and never
//! end up in snapshots or persisted records.

mod object;

pub use object::*;

use crate::constraint;
use crate::layout::{Marker, SpreadLayout};
use crate::types::Theme;

/// Whole-scene copy of the user objects, used for undo
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub objects: Vec<DrawableObject>,
}

/// An entry of the render list
#[derive(Debug, Clone, PartialEq)]
pub enum RenderItem<'a> {
    Marker(Marker),
    Object(&'a DrawableObject),
}

#[derive(Debug, Clone)]
pub struct Scene {
    layout: SpreadLayout,
    objects: Vec<DrawableObject>,
}

impl Scene {
    pub fn new(layout: SpreadLayout) -> Self {
        Self {
            layout,
            objects: Vec::new(),
        }
    }

    pub fn layout(&self) -> &SpreadLayout {
        &self.layout
    }

    /// Swap in a freshly computed layout and re-clip every object to it
    pub fn set_layout(&mut self, layout: SpreadLayout) {
        self.layout = layout;
        for obj in &mut self.objects {
            constraint::reclip(obj, &self.layout);
        }
    }

    /// User objects in stacking order
    pub fn objects(&self) -> &[DrawableObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: &ObjectId) -> Option<&DrawableObject> {
        self.objects.iter().find(|o| &o.id == id)
    }

    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut DrawableObject> {
        self.objects.iter_mut().find(|o| &o.id == id)
    }

    pub fn position(&self, id: &ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| &o.id == id)
    }

    /// Add an object on top of the stack
    pub fn add(&mut self, obj: DrawableObject) {
        self.objects.push(obj);
    }

    /// Constrain and clip to the owner page, then add on top
    pub fn place(&mut self, mut obj: DrawableObject) {
        constraint::apply(&mut obj, &self.layout);
        self.objects.push(obj);
    }

    /// Mutate an object in place and re-apply its page constraint.
    /// Returns false when no object has `id`.
    pub fn modify(&mut self, id: &ObjectId, f: impl FnOnce(&mut DrawableObject)) -> bool {
        let Some(obj) = self.objects.iter_mut().find(|o| &o.id == id) else {
            return false;
        };
        f(obj);
        constraint::apply(obj, &self.layout);
        true
    }

    pub fn insert(&mut self, index: usize, obj: DrawableObject) {
        let index = index.min(self.objects.len());
        self.objects.insert(index, obj);
    }

    pub fn remove(&mut self, id: &ObjectId) -> Option<DrawableObject> {
        let index = self.position(id)?;
        Some(self.objects.remove(index))
    }

    /// Remove every user object; markers are unaffected
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn replace_objects(&mut self, objects: Vec<DrawableObject>) {
        self.objects = objects;
    }

    /// Markers first, then user objects, back to front
    pub fn render_list(&self, theme: Theme) -> Vec<RenderItem<'_>> {
        self.layout
            .markers(theme)
            .into_iter()
            .map(RenderItem::Marker)
            .chain(self.objects.iter().map(RenderItem::Object))
            .collect()
    }

    /// Topmost visible object whose bounding box contains the point
    pub fn hit_test(&self, x: f32, y: f32) -> Option<&DrawableObject> {
        self.objects
            .iter()
            .rev()
            .filter(|o| o.visible)
            .find(|o| o.bounding_box().contains_point(x, y))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            objects: self.objects.clone(),
        }
    }

    /// Replace the objects with a snapshot's, re-clipped to the current layout
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.objects = snapshot.objects.clone();
        for obj in &mut self.objects {
            constraint::reclip(obj, &self.layout);
        }
    }
}
