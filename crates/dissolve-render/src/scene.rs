//! Scene attachment.
//!
//! The scene only knows which particle sets are currently shown. It holds plain
//! [`RenderableId`]s; the particle data stays with the model that owns it.

/// Handle of a particle set that can be attached to a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderableId(pub usize);

/// A scene that particle sets are attached to and detached from.
pub trait Scene {
    /// Attaches a renderable. Returns false if it was already attached.
    fn attach(&mut self, id: RenderableId) -> bool;

    /// Detaches a renderable. Returns false if it was not attached.
    fn detach(&mut self, id: RenderableId) -> bool;

    /// Returns whether a renderable is attached.
    fn contains(&self, id: RenderableId) -> bool;

    /// Returns the attached renderables in attachment order.
    fn children(&self) -> &[RenderableId];
}

/// A single root node with an ordered list of attached children.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    children: Vec<RenderableId>,
}

impl SceneGraph {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of attached renderables.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Detaches everything.
    pub fn clear(&mut self) {
        self.children.clear();
    }
}

impl Scene for SceneGraph {
    fn attach(&mut self, id: RenderableId) -> bool {
        if self.contains(id) {
            return false;
        }
        log::trace!("attached {id:?}");
        self.children.push(id);
        true
    }

    fn detach(&mut self, id: RenderableId) -> bool {
        let before = self.children.len();
        self.children.retain(|c| *c != id);
        let detached = self.children.len() != before;
        if detached {
            log::trace!("detached {id:?}");
        }
        detached
    }

    fn contains(&self, id: RenderableId) -> bool {
        self.children.contains(&id)
    }

    fn children(&self) -> &[RenderableId] {
        &self.children
    }
}
