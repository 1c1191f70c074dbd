//! Render ordering and the draw driver seam.
//!
//! This module defines the [`Render`] enum, which classifies each scene node
//! into a pass, the [`Driver`] trait that receives the actual draw calls, and
//! the [`RenderList`] that turns a scene graph into an ordered frame.
//!
//! # Frame policy
//!
//! - every hardware light slot is disabled before anything else
//! - lights come first and each takes the next free slot; lights past the
//!   budget are dropped with a warning
//! - opaque meshes and plain nodes render in traversal order
//! - meshes with a transparent material are deferred and replayed at the end,
//!   in traversal order, between [`Driver::begin_transparent`] and
//!   [`Driver::end_transparent`]. They are not depth sorted, so overlapping
//!   transparent surfaces depend on scene-graph order.
//!

use std::collections::VecDeque;

use cgmath::Matrix4;
use image::RgbaImage;
use log::warn;

use crate::{
    config::MAX_HARDWARE_LIGHTS,
    data_structures::{
        light::{LightParams, LightSlot},
        material::Material,
        mesh::Mesh,
        scene_graph::{NodeId, NodeKind, SceneGraph},
        texture::{Texture, TextureHandle},
    },
    object::Object,
    scene::Scene,
};

/// Specifies which pass a scene node is rendered in.
///
/// - `None` renders nothing (groups, cameras)
/// - `Light` configures a hardware light slot
/// - `Default` renders an opaque mesh immediately
/// - `Transparent` defers a mesh to the transparent pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Render {
    None,
    Light,
    Default,
    Transparent,
}

/// Immediate-mode drawing backend.
///
/// Implementations own whatever graphics state the calls map to. The render
/// list calls [`Driver::load_model_view`] before every node it draws.
pub trait Driver {
    fn set_projection(&mut self, projection: &Matrix4<f32>);

    fn load_model_view(&mut self, model_view: &Matrix4<f32>);

    fn disable_light(&mut self, slot: LightSlot);

    /// Writes `params` into `slot` and enables it.
    fn configure_light(&mut self, slot: LightSlot, params: &LightParams);

    /// `None` means draw unlit and untextured.
    fn bind_material(&mut self, material: Option<&Material>);

    fn draw_mesh(&mut self, mesh: &Mesh);

    /// Blending on, depth writes off, back-face culling off.
    fn begin_transparent(&mut self);

    /// Restores the state changed by [`Driver::begin_transparent`].
    fn end_transparent(&mut self);

    fn upload_texture(
        &mut self,
        texture: &Texture,
        pixels: &RgbaImage,
    ) -> anyhow::Result<TextureHandle>;
}

/// Driver that accepts every call and draws nothing. Useful for headless
/// tooling that only wants [`FrameStats`].
#[derive(Debug, Default)]
pub struct NullDriver {
    next_texture: u32,
}

impl Driver for NullDriver {
    fn set_projection(&mut self, _: &Matrix4<f32>) {}

    fn load_model_view(&mut self, _: &Matrix4<f32>) {}

    fn disable_light(&mut self, _: LightSlot) {}

    fn configure_light(&mut self, _: LightSlot, _: &LightParams) {}

    fn bind_material(&mut self, _: Option<&Material>) {}

    fn draw_mesh(&mut self, _: &Mesh) {}

    fn begin_transparent(&mut self) {}

    fn end_transparent(&mut self) {}

    fn upload_texture(&mut self, _: &Texture, _: &RgbaImage) -> anyhow::Result<TextureHandle> {
        self.next_texture += 1;
        Ok(TextureHandle(self.next_texture))
    }
}

/// A node captured during [`RenderList::pass`] with its world matrix at that
/// moment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub node: NodeId,
    pub world: Matrix4<f32>,
}

/// What happened during one [`RenderList::render`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Lights that received a slot.
    pub lights: usize,
    /// Lights past the budget, in the order they were encountered.
    pub dropped_lights: Vec<NodeId>,
    pub opaque: usize,
    pub transparent: usize,
}

/// Frame-local, ordered list of scene nodes.
///
/// Per frame the caller runs [`RenderList::clear`], [`RenderList::pass`] on
/// the root with an identity matrix and then [`RenderList::render`].
#[derive(Debug)]
pub struct RenderList {
    object: Object,
    instances: VecDeque<Instance>,
    max_lights: usize,
}

impl Default for RenderList {
    fn default() -> Self {
        Self::new(MAX_HARDWARE_LIGHTS)
    }
}

impl RenderList {
    /// `max_lights` is capped at [`MAX_HARDWARE_LIGHTS`].
    pub fn new(max_lights: usize) -> Self {
        Self {
            object: Object::new("RenderList"),
            instances: VecDeque::new(),
            max_lights: max_lights.min(MAX_HARDWARE_LIGHTS),
        }
    }

    pub fn object(&self) -> &Object {
        &self.object
    }

    pub fn max_lights(&self) -> usize {
        self.max_lights
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Captures `node` and its subtree. Lights go to the front of the list,
    /// everything else to the back.
    pub fn pass(&mut self, graph: &SceneGraph, node: NodeId, parent_matrix: Matrix4<f32>) {
        let Some(current) = graph.get(node) else {
            return;
        };
        let world = parent_matrix * current.local_transform();
        let instance = Instance { node, world };
        if current.is_light() {
            self.instances.push_front(instance);
        } else {
            self.instances.push_back(instance);
        }
        for &child in current.children() {
            self.pass(graph, child, world);
        }
    }

    /// Draws the captured instances against `view`.
    ///
    /// Instances whose node was removed from the graph since the pass are
    /// skipped.
    pub fn render(&self, scene: &Scene, view: Matrix4<f32>, driver: &mut dyn Driver) -> FrameStats {
        let mut stats = FrameStats::default();
        for slot in 0..MAX_HARDWARE_LIGHTS {
            driver.disable_light(slot);
        }

        let mut transparents = Vec::new();
        for instance in &self.instances {
            let Some(node) = scene.graph.get(instance.node) else {
                continue;
            };
            match node.get_render(&scene.materials) {
                Render::Light => {
                    let NodeKind::Light(light) = node.kind() else {
                        continue;
                    };
                    if stats.lights < self.max_lights {
                        driver.load_model_view(&(view * instance.world));
                        light.render(stats.lights, driver);
                        stats.lights += 1;
                    } else {
                        warn!(
                            "light limit of {} reached, light '{}' is disabled for this frame",
                            self.max_lights,
                            node.name()
                        );
                        stats.dropped_lights.push(instance.node);
                    }
                }
                Render::Transparent => transparents.push(instance),
                Render::Default => {
                    driver.load_model_view(&(view * instance.world));
                    node.render(&scene.materials, driver);
                    stats.opaque += 1;
                }
                Render::None => {
                    driver.load_model_view(&(view * instance.world));
                    node.render(&scene.materials, driver);
                }
            }
        }

        for instance in transparents {
            let node = &scene.graph[instance.node];
            driver.load_model_view(&(view * instance.world));
            driver.begin_transparent();
            node.render(&scene.materials, driver);
            driver.end_transparent();
            stats.transparent += 1;
        }
        stats
    }
}
