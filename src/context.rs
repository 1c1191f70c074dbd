use std::path::Path;

use anyhow::Context as _;
use cgmath::{Matrix4, SquareMatrix};
use log::{error, info, warn};

use crate::{
    config::{EngineConfig, MAX_HARDWARE_LIGHTS},
    data_structures::scene_graph::NodeId,
    render::{Driver, FrameStats, RenderList},
    resources::ovo,
    scene::Scene,
};

/// Owns the engine configuration and the per-frame render list.
///
/// One context drives one scene per frame:
///
/// ```no_run
/// # use ovo_scene::{config::EngineConfig, context::Context, render::NullDriver};
/// # fn main() -> anyhow::Result<()> {
/// let mut ctx = Context::new(EngineConfig::default());
/// let scene = ctx.load_scene("assets/room.ovo")?;
/// let camera = scene.find_by_name("Camera").expect("scene has a camera");
/// ctx.render_frame(&scene, camera, &mut NullDriver::default());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Context {
    pub config: EngineConfig,
    list: RenderList,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Context {
    /// A light budget outside `1..=8` is clamped into that range with a
    /// warning.
    pub fn new(mut config: EngineConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!("{e}, clamping");
            config.max_lights = config.max_lights.clamp(1, MAX_HARDWARE_LIGHTS);
        }
        let list = RenderList::new(config.max_lights);
        Self { config, list }
    }

    pub fn list(&self) -> &RenderList {
        &self.list
    }

    /// Loads an OVO file, resolving textures against the configured
    /// texture directory.
    pub fn load_scene(&self, path: impl AsRef<Path>) -> anyhow::Result<Scene> {
        let path = path.as_ref();
        let scene = ovo::load_scene(path, &self.config.texture_dir)
            .inspect_err(|e| error!("failed to load {}: {e}", path.display()))
            .with_context(|| format!("loading scene {}", path.display()))?;
        let stats = scene.stats();
        info!(
            "scene {} ready: {} meshes, {} lights, {} vertices",
            path.display(),
            stats.meshes,
            stats.lights,
            stats.vertices
        );
        Ok(scene)
    }

    /// Renders `scene` as seen from the camera node `camera`.
    ///
    /// Returns `None` without drawing when `camera` is not a camera node of
    /// this scene or its world matrix cannot be inverted.
    pub fn render_frame(
        &mut self,
        scene: &Scene,
        camera: NodeId,
        driver: &mut dyn Driver,
    ) -> Option<FrameStats> {
        let Some(projection) = scene
            .graph
            .get(camera)
            .and_then(|node| node.as_camera())
            .map(|camera| camera.projection_matrix())
        else {
            warn!("render_frame called without a camera node");
            return None;
        };
        let Some(view) = scene.graph.inverse_camera_matrix(camera) else {
            warn!("camera '{}' has a singular world matrix", scene.graph[camera].name());
            return None;
        };
        driver.set_projection(&projection);
        Some(self.render_frame_with_view(scene, view, driver))
    }

    /// Renders `scene` with an explicit view matrix. The projection is left
    /// as the driver has it.
    pub fn render_frame_with_view(
        &mut self,
        scene: &Scene,
        view: Matrix4<f32>,
        driver: &mut dyn Driver,
    ) -> FrameStats {
        self.list.clear();
        self.list.pass(&scene.graph, scene.root, Matrix4::identity());
        self.list.render(scene, view, driver)
    }
}
