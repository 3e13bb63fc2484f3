//! Serializable light placements for a scene
//!
//! A [`LightRig`] is what configuration files and scene code edit. It is
//! turned into the fixed-size [`LightsUniforms`] record once per frame by
//! [`LightRig::build`], which rejects rigs with the wrong number of lights.

use serde::{Deserialize, Serialize};

use crate::error::ContractResult;
use crate::foundation::math::Vec3;
use crate::render::camera::CameraInfo;
use crate::render::lighting::{
    Attenuation, BaseLight, DirectionalLight, LightsUniforms, PointLight, SpotLight,
};

/// Directional light placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLightDesc {
    /// Linear RGB colour
    pub color: [f32; 3],
    /// Direction the light travels in
    pub direction: [f32; 3],
    /// Ambient coefficient
    pub ambient: f32,
    /// Diffuse coefficient
    pub diffuse: f32,
    /// Specular coefficient
    pub specular: f32,
}

/// Point light placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLightDesc {
    /// Linear RGB colour
    pub color: [f32; 3],
    /// World-space position
    pub position: [f32; 3],
    /// Ambient coefficient
    pub ambient: f32,
    /// Diffuse coefficient
    pub diffuse: f32,
    /// Specular coefficient
    pub specular: f32,
    /// Distance falloff
    pub attenuation: Attenuation,
}

/// Spot light placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotLightDesc {
    /// Linear RGB colour
    pub color: [f32; 3],
    /// World-space position, replaced by the camera's when `follow_camera` is set
    pub position: [f32; 3],
    /// Cone axis, replaced by the camera's view direction when `follow_camera` is set
    pub direction: [f32; 3],
    /// Inner cone half-angle in degrees
    pub inner_degrees: f32,
    /// Outer cone half-angle in degrees
    pub outer_degrees: f32,
    /// Attach the light to the camera, like a torch
    pub follow_camera: bool,
    /// Ambient coefficient
    pub ambient: f32,
    /// Diffuse coefficient
    pub diffuse: f32,
    /// Specular coefficient
    pub specular: f32,
    /// Distance falloff
    pub attenuation: Attenuation,
}

/// Every light of a scene, before packing into GPU records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightRig {
    /// Intensity applied to every light
    pub intensity: f32,
    /// Directional lights
    pub directional: Vec<DirectionalLightDesc>,
    /// Point lights
    pub point: Vec<PointLightDesc>,
    /// Spot lights
    pub spot: Vec<SpotLightDesc>,
}

const POINT_LIGHTS: [([f32; 3], [f32; 3]); 5] = [
    ([-4.0, 2.0, -12.0], [0.6, 0.1, 0.25]),
    ([-5.7, 6.2, 2.0], [0.2, 0.7, 0.9]),
    ([1.0, 3.0, -2.0], [1.0, 0.9, 0.0]),
    ([2.3, -3.3, -4.0], [0.05, 0.1, 0.9]),
    ([10.0, 0.0, -3.0], [0.34, 0.75, 0.2]),
];

impl Default for LightRig {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            directional: vec![DirectionalLightDesc {
                color: [1.0, 1.0, 1.0],
                direction: [-0.2, -1.0, -0.3],
                ambient: 0.05,
                diffuse: 0.4,
                specular: 0.5,
            }],
            point: POINT_LIGHTS
                .iter()
                .map(|&(position, color)| PointLightDesc {
                    color,
                    position,
                    ambient: 0.1,
                    diffuse: 0.7,
                    specular: 0.9,
                    attenuation: Attenuation::new(1.0, 0.09, 0.032),
                })
                .collect(),
            spot: vec![SpotLightDesc {
                color: [1.0, 1.0, 1.0],
                position: [0.0, 0.0, 3.0],
                direction: [0.0, 0.0, -1.0],
                inner_degrees: 1.0,
                outer_degrees: 10.0,
                follow_camera: true,
                ambient: 0.1,
                diffuse: 1.0,
                specular: 1.0,
                attenuation: Attenuation::new(1.0, 0.09, 0.32),
            }],
        }
    }
}

impl LightRig {
    /// Move every camera-attached spot light to the camera's pose
    pub fn attach_spot_to(&mut self, camera: &CameraInfo) {
        for spot in self.spot.iter_mut().filter(|s| s.follow_camera) {
            spot.position = camera.position;
            spot.direction = camera.front;
        }
    }

    /// Pack the rig into the per-frame light record
    ///
    /// Fails on a wrong light count or a zero or non-finite light direction.
    pub fn build(&self) -> ContractResult<LightsUniforms> {
        let base = |color: [f32; 3], ambient, diffuse, specular| {
            BaseLight::new(Vec3::from(color), self.intensity, ambient, diffuse, specular)
        };

        let directional: Vec<_> = self
            .directional
            .iter()
            .map(|d| DirectionalLight::new(base(d.color, d.ambient, d.diffuse, d.specular), Vec3::from(d.direction)))
            .collect();
        let point: Vec<_> = self
            .point
            .iter()
            .map(|p| {
                PointLight::new(
                    base(p.color, p.ambient, p.diffuse, p.specular),
                    p.attenuation,
                    Vec3::from(p.position),
                )
            })
            .collect();
        let spot: Vec<_> = self
            .spot
            .iter()
            .map(|s| {
                let point = PointLight::new(
                    base(s.color, s.ambient, s.diffuse, s.specular),
                    s.attenuation,
                    Vec3::from(s.position),
                );
                SpotLight::with_cone_degrees(point, Vec3::from(s.direction), s.inner_degrees, s.outer_degrees)
            })
            .collect();

        let lights = LightsUniforms::new(&directional, &point, &spot)?;
        log::debug!(
            "Packed light rig: {} directional, {} point, {} spot",
            directional.len(),
            point.len(),
            spot.len()
        );
        Ok(lights)
    }
}
