//! Camera projections.
//!
//! A camera is an ordinary scene node, so its view matrix is the inverse of
//! its world matrix (see [`SceneGraph::inverse_camera_matrix`](crate::data_structures::scene_graph::SceneGraph::inverse_camera_matrix)).
//! This type only carries the projection.

use cgmath::{Deg, Matrix4, SquareMatrix};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in degrees.
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    projection: Projection,
    matrix: Matrix4<f32>,
}

impl Camera {
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::from_projection(Projection::Perspective {
            fov_y,
            aspect,
            near,
            far,
        })
    }

    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self::from_projection(Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            near,
            far,
        })
    }

    pub fn from_projection(projection: Projection) -> Self {
        let mut camera = Self {
            projection,
            matrix: Matrix4::identity(),
        };
        camera.update_projection();
        camera
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.matrix
    }

    /// Overrides the cached matrix without touching the parameters. The next
    /// setter call recomputes it from the parameters again.
    pub fn set_projection_matrix(&mut self, matrix: Matrix4<f32>) {
        self.matrix = matrix;
    }

    /// Only meaningful for perspective cameras; ignored otherwise.
    pub fn set_fov(&mut self, fov: f32) {
        if let Projection::Perspective { fov_y, .. } = &mut self.projection {
            *fov_y = fov;
        }
        self.update_projection();
    }

    /// Keeps minimised windows (height 0) from producing a division by zero.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        let height = if height <= 0.0 { 1.0 } else { height };
        if let Projection::Perspective { aspect, .. } = &mut self.projection {
            *aspect = width / height;
        }
        self.update_projection();
    }

    pub fn set_near(&mut self, value: f32) {
        match &mut self.projection {
            Projection::Perspective { near, .. } | Projection::Orthographic { near, .. } => {
                *near = value
            }
        }
        self.update_projection();
    }

    pub fn set_far(&mut self, value: f32) {
        match &mut self.projection {
            Projection::Perspective { far, .. } | Projection::Orthographic { far, .. } => {
                *far = value
            }
        }
        self.update_projection();
    }

    /// Replaces the projection with an orthographic box.
    pub fn set_frustum(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            near,
            far,
        };
        self.update_projection();
    }

    fn update_projection(&mut self) {
        self.matrix = match self.projection {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => cgmath::perspective(Deg(fov_y), aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => cgmath::ortho(left, right, bottom, top, near, far),
        };
    }
}
