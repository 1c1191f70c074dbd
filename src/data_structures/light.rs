//! Fixed-function light sources.
//!
//! Lights are a closed set: [`LightKind::Omni`], [`LightKind::Directional`]
//! and [`LightKind::Spot`]. Each one turns into a [`LightParams`] record when
//! it is pushed into a hardware slot.

use cgmath::{InnerSpace, Matrix4, Vector3, Vector4, Zero};

use crate::render::Driver;

/// Cutoff reported for omni lights: the whole sphere.
pub const OMNI_CUTOFF: f32 = 180.0;

/// Hardware light slot, `0..max_lights`.
pub type LightSlot = usize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    Omni {
        cutoff: f32,
    },
    Directional {
        direction: Vector3<f32>,
    },
    Spot {
        direction: Vector3<f32>,
        cutoff: f32,
        exponent: f32,
    },
}

/// Everything a driver needs to configure one light slot.
///
/// `position` is in the coordinate frame of the model-view matrix loaded just
/// before the light is configured; `w == 0` marks a directional light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightParams {
    pub ambient: Vector4<f32>,
    pub diffuse: Vector4<f32>,
    pub specular: Vector4<f32>,
    pub position: Vector4<f32>,
    pub cutoff: f32,
    pub spot_direction: Vector3<f32>,
    pub spot_exponent: f32,
    pub constant_attenuation: f32,
    pub linear_attenuation: f32,
    pub quadratic_attenuation: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    ambient: Vector4<f32>,
    diffuse: Vector4<f32>,
    specular: Vector4<f32>,
    position: Vector4<f32>,
    attenuation: f32,
    kind: LightKind,
}

fn opaque(color: Vector3<f32>) -> Vector4<f32> {
    color.extend(1.0)
}

fn normalize_or_forward(direction: Vector3<f32>) -> Vector3<f32> {
    if direction.is_zero() {
        -Vector3::unit_z()
    } else {
        direction.normalize()
    }
}

impl Light {
    /// Positional light radiating in every direction. Its position is the
    /// translation part of `transform`.
    pub fn omni(
        transform: &Matrix4<f32>,
        ambient: Vector3<f32>,
        diffuse: Vector3<f32>,
        specular: Vector3<f32>,
    ) -> Self {
        Self {
            ambient: opaque(ambient),
            diffuse: opaque(diffuse),
            specular: opaque(specular),
            position: transform.w.truncate().extend(1.0),
            attenuation: 1.0,
            kind: LightKind::Omni {
                cutoff: OMNI_CUTOFF,
            },
        }
    }

    /// Light infinitely far away shining along `direction`.
    pub fn directional(
        ambient: Vector3<f32>,
        diffuse: Vector3<f32>,
        specular: Vector3<f32>,
        direction: Vector3<f32>,
    ) -> Self {
        let direction = normalize_or_forward(direction);
        Self {
            ambient: opaque(ambient),
            diffuse: opaque(diffuse),
            specular: opaque(specular),
            position: direction.extend(0.0),
            attenuation: 1.0,
            kind: LightKind::Directional { direction },
        }
    }

    /// Cone light; `cutoff` is the half angle in degrees.
    pub fn spot(
        transform: &Matrix4<f32>,
        ambient: Vector3<f32>,
        diffuse: Vector3<f32>,
        specular: Vector3<f32>,
        direction: Vector3<f32>,
        cutoff: f32,
        exponent: f32,
    ) -> Self {
        Self {
            ambient: opaque(ambient),
            diffuse: opaque(diffuse),
            specular: opaque(specular),
            position: transform.w.truncate().extend(1.0),
            attenuation: 1.0,
            kind: LightKind::Spot {
                direction: normalize_or_forward(direction),
                cutoff,
                exponent,
            },
        }
    }

    pub fn kind(&self) -> &LightKind {
        &self.kind
    }

    pub fn ambient(&self) -> Vector4<f32> {
        self.ambient
    }

    pub fn diffuse(&self) -> Vector4<f32> {
        self.diffuse
    }

    pub fn specular(&self) -> Vector4<f32> {
        self.specular
    }

    pub fn position(&self) -> Vector4<f32> {
        self.position
    }

    pub fn is_positional(&self) -> bool {
        self.position.w != 0.0
    }

    pub fn set_ambient(&mut self, ambient: Vector4<f32>) {
        self.ambient = ambient;
    }

    pub fn set_diffuse(&mut self, diffuse: Vector4<f32>) {
        self.diffuse = diffuse;
    }

    pub fn set_specular(&mut self, specular: Vector4<f32>) {
        self.specular = specular;
    }

    pub fn set_position(&mut self, position: Vector4<f32>) {
        self.position = position;
    }

    /// Attenuation factor derived from the exported radius. It is kept for
    /// inspection only and does not reach [`LightParams`].
    pub fn attenuation(&self) -> f32 {
        self.attenuation
    }

    pub fn set_attenuation(&mut self, attenuation: f32) {
        self.attenuation = attenuation.clamp(0.0, 1.0);
    }

    pub fn cutoff(&self) -> Option<f32> {
        match self.kind {
            LightKind::Omni { cutoff } | LightKind::Spot { cutoff, .. } => Some(cutoff),
            LightKind::Directional { .. } => None,
        }
    }

    pub fn direction(&self) -> Option<Vector3<f32>> {
        match self.kind {
            LightKind::Directional { direction } | LightKind::Spot { direction, .. } => {
                Some(direction)
            }
            LightKind::Omni { .. } => None,
        }
    }

    pub fn spot_exponent(&self) -> Option<f32> {
        match self.kind {
            LightKind::Spot { exponent, .. } => Some(exponent),
            _ => None,
        }
    }

    /// Slot parameters for this light.
    ///
    /// Positional lights are placed at the origin because the model-view
    /// matrix loaded before them already carries their world transform.
    pub fn params(&self) -> LightParams {
        let origin = Vector4::new(0.0, 0.0, 0.0, 1.0);
        let (position, cutoff, spot_direction, spot_exponent) = match self.kind {
            LightKind::Omni { cutoff } => (origin, cutoff, -Vector3::unit_z(), 0.0),
            LightKind::Directional { direction } => {
                (direction.extend(0.0), OMNI_CUTOFF, -Vector3::unit_z(), 0.0)
            }
            LightKind::Spot {
                direction,
                cutoff,
                exponent,
            } => (origin, cutoff, direction, exponent),
        };
        LightParams {
            ambient: self.ambient,
            diffuse: self.diffuse,
            specular: self.specular,
            position,
            cutoff,
            spot_direction,
            spot_exponent,
            constant_attenuation: 1.0,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
        }
    }

    /// Pushes this light into hardware slot `slot` and enables it.
    pub fn render(&self, slot: LightSlot, driver: &mut dyn Driver) {
        driver.configure_light(slot, &self.params());
    }
}
