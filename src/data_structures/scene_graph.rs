//! Scene graph and hierarchical scene organization.
//!
//! Nodes live in an arena ([`SceneGraph`]) and refer to each other through
//! stable [`NodeId`] keys: a node lists its children in insertion order and
//! remembers its parent. A node is in at most one child list at a time.
//!
//! World transforms are never cached. [`SceneGraph::world_matrix`] folds the
//! local transforms from the root down every time it is asked, which keeps
//! edits made through [`SceneGraph::set_local_transform`] immediately visible.

use cgmath::{Deg, InnerSpace, Matrix4, SquareMatrix, Vector3};
use log::warn;
use slotmap::{SlotMap, new_key_type};

use crate::{
    data_structures::{
        camera::Camera,
        light::Light,
        material::MaterialTable,
        mesh::Mesh,
    },
    object::Object,
    render::{Driver, Render},
};

new_key_type! {
    /// Stable handle of a node inside a [`SceneGraph`].
    pub struct NodeId;
}

/// What a node is, besides being a transform in the hierarchy.
#[derive(Clone, Debug)]
pub enum NodeKind {
    Group,
    Mesh(Mesh),
    Light(Light),
    Camera(Camera),
}

#[derive(Debug)]
pub struct Node {
    object: Object,
    local: Matrix4<f32>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            object: Object::new(name),
            local: Matrix4::identity(),
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn with_transform(mut self, local: Matrix4<f32>) -> Self {
        self.local = local;
        self
    }

    pub fn object(&self) -> &Object {
        &self.object
    }

    pub fn id(&self) -> u32 {
        self.object.id()
    }

    pub fn name(&self) -> &str {
        self.object.name()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn local_transform(&self) -> Matrix4<f32> {
        self.local
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn as_camera(&self) -> Option<&Camera> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn is_light(&self) -> bool {
        matches!(self.kind, NodeKind::Light(_))
    }

    /// Which pass of the render list this node belongs to.
    pub fn get_render(&self, materials: &MaterialTable) -> Render {
        match &self.kind {
            NodeKind::Light(_) => Render::Light,
            NodeKind::Mesh(mesh) => {
                let transparent = mesh
                    .material()
                    .and_then(|id| materials.get(id))
                    .is_some_and(|material| material.is_transparent());
                if transparent {
                    Render::Transparent
                } else {
                    Render::Default
                }
            }
            NodeKind::Group | NodeKind::Camera(_) => Render::None,
        }
    }

    /// Draws this node alone, never its children.
    ///
    /// Groups and cameras draw nothing. Lights are configured through
    /// [`Light::render`] by the render list since they need a hardware slot.
    pub fn render(&self, materials: &MaterialTable, driver: &mut dyn Driver) {
        if let NodeKind::Mesh(mesh) = &self.kind {
            mesh.render(materials, driver);
        }
    }
}

/// Arena that owns every node of a scene.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached node; attach it with [`SceneGraph::add_child`].
    pub fn insert(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        self.nodes.insert(node)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn local_transform(&self, id: NodeId) -> Option<Matrix4<f32>> {
        self.nodes.get(id).map(|node| node.local)
    }

    pub fn set_local_transform(&mut self, id: NodeId, local: Matrix4<f32>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.local = local;
        }
    }

    fn post_multiply(&mut self, id: NodeId, transform: Matrix4<f32>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.local = node.local * transform;
        }
    }

    pub fn translate(&mut self, id: NodeId, translation: Vector3<f32>) {
        self.post_multiply(id, Matrix4::from_translation(translation));
    }

    /// Rotates by `angle` degrees around `axis`, which must be non-zero.
    pub fn rotate(&mut self, id: NodeId, angle: f32, axis: Vector3<f32>) {
        if axis.magnitude2() == 0.0 {
            warn!("ignoring rotation around a zero axis");
            return;
        }
        self.post_multiply(id, Matrix4::from_axis_angle(axis.normalize(), Deg(angle)));
    }

    pub fn scale(&mut self, id: NodeId, factor: Vector3<f32>) {
        self.post_multiply(
            id,
            Matrix4::from_nonuniform_scale(factor.x, factor.y, factor.z),
        );
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn num_children(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    fn is_ancestor(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        while let Some(parent) = self.parent(id) {
            if parent == ancestor {
                return true;
            }
            id = parent;
        }
        false
    }

    /// Appends `child` to `parent`'s children.
    ///
    /// A child that already has a parent is detached from it first. Returns
    /// `false` and leaves the graph untouched when either id is unknown or
    /// the edge would create a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.contains(parent) || !self.contains(child) {
            return false;
        }
        if parent == child || self.is_ancestor(child, parent) {
            warn!("refusing to attach a node below its own subtree");
            return false;
        }
        if let Some(previous) = self.parent(child) {
            self.remove_child(previous, child);
        }
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        true
    }

    /// Detaches `child` from `parent`. Returns `false` if it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(parent) else {
            return false;
        };
        let Some(pos) = node.children.iter().position(|&c| c == child) else {
            return false;
        };
        node.children.remove(pos);
        if let Some(child) = self.nodes.get_mut(child) {
            child.parent = None;
        }
        true
    }

    /// Detaches `id` and frees it together with all of its descendants.
    /// Returns how many nodes were freed.
    pub fn remove_subtree(&mut self, id: NodeId) -> usize {
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        removed
    }

    /// `world(parent) * local`, recursively up to the root.
    pub fn world_matrix(&self, id: NodeId) -> Option<Matrix4<f32>> {
        let node = self.nodes.get(id)?;
        match node.parent {
            Some(parent) => Some(self.world_matrix(parent)? * node.local),
            None => Some(node.local),
        }
    }

    /// View matrix of a camera placed at `id`. `None` for unknown ids or a
    /// singular world matrix.
    pub fn inverse_camera_matrix(&self, id: NodeId) -> Option<Matrix4<f32>> {
        self.world_matrix(id)?.invert()
    }

    /// First node called `name` in depth-first pre-order below (and
    /// including) `start`.
    pub fn find_by_name(&self, start: NodeId, name: &str) -> Option<NodeId> {
        self.walk(start).find(|&id| self.nodes[id].name() == name)
    }

    /// Depth-first pre-order iterator over `start` and its descendants.
    pub fn walk(&self, start: NodeId) -> Walk<'_> {
        let nodes_to_visit = if self.contains(start) {
            vec![start]
        } else {
            Vec::new()
        };
        Walk {
            graph: self,
            nodes_to_visit,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }
}

impl std::ops::Index<NodeId> for SceneGraph {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

pub struct Walk<'a> {
    graph: &'a SceneGraph,
    nodes_to_visit: Vec<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.nodes_to_visit.pop()?;
        // reversed so the first child is visited next
        self.nodes_to_visit
            .extend(self.graph.children(id).iter().rev().copied());
        Some(id)
    }
}
