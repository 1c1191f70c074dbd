//! A loaded scene: node arena, root and material table.

use log::{debug, warn};

use crate::{
    data_structures::{
        material::MaterialTable,
        scene_graph::{Node, NodeId, NodeKind, SceneGraph},
    },
    render::Driver,
};

/// Counts collected by [`Scene::stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub nodes: usize,
    pub groups: usize,
    pub meshes: usize,
    pub lights: usize,
    pub cameras: usize,
    pub vertices: usize,
    pub faces: usize,
    pub materials: usize,
}

#[derive(Debug)]
pub struct Scene {
    pub graph: SceneGraph,
    pub root: NodeId,
    pub materials: MaterialTable,
}

impl Scene {
    /// Empty scene holding a single group node called `root_name`.
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut graph = SceneGraph::new();
        let root = graph.insert(Node::group(root_name));
        Self {
            graph,
            root,
            materials: MaterialTable::new(),
        }
    }

    pub fn from_parts(graph: SceneGraph, root: NodeId, materials: MaterialTable) -> Self {
        Self {
            graph,
            root,
            materials,
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.graph.find_by_name(self.root, name)
    }

    /// Counts only what is reachable from the root.
    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats {
            materials: self.materials.len(),
            ..Default::default()
        };
        for id in self.graph.walk(self.root) {
            stats.nodes += 1;
            match self.graph[id].kind() {
                NodeKind::Group => stats.groups += 1,
                NodeKind::Mesh(mesh) => {
                    stats.meshes += 1;
                    stats.vertices += mesh.vertices().len();
                    stats.faces += mesh.faces().len();
                }
                NodeKind::Light(_) => stats.lights += 1,
                NodeKind::Camera(_) => stats.cameras += 1,
            }
        }
        stats
    }

    /// Decodes every material texture that has no handle yet and hands the
    /// pixels to `driver`. Textures that fail to load are left without a
    /// handle and their material renders untextured.
    ///
    /// Returns how many textures were uploaded.
    pub fn upload_textures(&mut self, driver: &mut dyn Driver) -> usize {
        let mut uploaded = 0;
        for (_, material) in self.materials.iter_mut() {
            let material_name = material.name().to_string();
            let Some(texture) = material.texture_mut() else {
                continue;
            };
            if texture.handle().is_some() {
                continue;
            }
            let result = texture
                .load_image()
                .and_then(|pixels| driver.upload_texture(texture, &pixels));
            match result {
                Ok(handle) => {
                    debug!(
                        "uploaded texture {} for material {material_name}",
                        texture.file_path().display()
                    );
                    texture.set_handle(handle);
                    uploaded += 1;
                }
                Err(e) => warn!(
                    "material {material_name} renders untextured, texture {} failed: {e:#}",
                    texture.file_path().display()
                ),
            }
        }
        uploaded
    }
}
