//! Light records and the reference shading model
//!
//! The light structs are bound as three fixed-length arrays, one buffer per
//! light kind. [`shade`] is the host-side twin of `shade` in `lighting.wgsl`
//! and is what the attenuation and spot cone behaviour is tested against.
//! The distance guard is the shared constant [`DISTANCE_EPSILON`], declared
//! with the same value in `shader_types.wgsl` and checked by reflection.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::bindings::BufferIndex;
use crate::error::{ContractError, ContractResult};
use crate::foundation::math::{utils::smoothstep, Vec3, Vec4};
use crate::layout::gpu_layout;
use crate::render::camera::CameraInfo;
use crate::render::uniform::MaterialInfo;

/// Length of the directional light array
pub const NUMBER_OF_DIRECTIONAL_LIGHTS: usize = 1;
/// Length of the point light array
pub const NUMBER_OF_POINT_LIGHTS: usize = 5;
/// Length of the spot light array
pub const NUMBER_OF_SPOT_LIGHTS: usize = 1;
/// Light distances below this are attenuated as if they were this
pub const DISTANCE_EPSILON: f32 = 1e-4;

/// Coefficients shared by every light kind
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BaseLight {
    /// Linear RGB colour
    pub color: [f32; 3],
    /// Scale applied to `color`
    pub intensity: f32,
    /// Ambient coefficient
    pub ambient: f32,
    /// Diffuse coefficient
    pub diffuse: f32,
    /// Specular coefficient
    pub specular: f32,
    _pad: f32,
}

gpu_layout!(BaseLight => "BaseLight" { color, intensity, ambient, diffuse, specular, _pad });

impl BaseLight {
    /// Create base coefficients
    pub fn new(color: Vec3, intensity: f32, ambient: f32, diffuse: f32, specular: f32) -> Self {
        Self {
            color: color.into(),
            intensity,
            ambient,
            diffuse,
            specular,
            _pad: 0.0,
        }
    }

    /// `color * intensity`
    pub fn radiance(&self) -> Vec3 {
        Vec3::from(self.color) * self.intensity
    }
}

/// Distance falloff `1 / (constant + linear * d + exponent * d^2)`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Attenuation {
    /// Constant term
    pub constant: f32,
    /// Linear term
    pub linear: f32,
    /// Quadratic term
    pub exponent: f32,
}

gpu_layout!(Attenuation => "Attenuation" { constant, linear, exponent });

impl Attenuation {
    /// No falloff
    pub const NONE: Self = Self::new(1.0, 0.0, 0.0);

    /// Create falloff coefficients
    pub const fn new(constant: f32, linear: f32, exponent: f32) -> Self {
        Self { constant, linear, exponent }
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        Self::NONE
    }
}

/// Infinitely distant light
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DirectionalLight {
    /// Shared coefficients
    pub base: BaseLight,
    /// Unit direction the light travels in (light to scene)
    pub direction: [f32; 3],
    _pad: f32,
}

gpu_layout!(DirectionalLight => "DirectionalLight" { base, direction, _pad });

impl DirectionalLight {
    /// Create a directional light; `direction` is normalized
    pub fn new(base: BaseLight, direction: Vec3) -> Self {
        Self {
            base,
            direction: direction.normalize().into(),
            _pad: 0.0,
        }
    }

    /// Direction as a vector
    pub fn direction(&self) -> Vec3 {
        Vec3::from(self.direction)
    }
}

/// Positional light with distance falloff
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLight {
    /// Shared coefficients
    pub base: BaseLight,
    /// Distance falloff
    pub attenuation: Attenuation,
    _pad0: f32,
    /// World-space position
    pub position: [f32; 3],
    _pad1: f32,
}

gpu_layout!(PointLight => "PointLight" { base, attenuation, _pad0, position, _pad1 });

impl PointLight {
    /// Create a point light
    pub fn new(base: BaseLight, attenuation: Attenuation, position: Vec3) -> Self {
        Self {
            base,
            attenuation,
            position: position.into(),
            ..Zeroable::zeroed()
        }
    }

    /// Position as a vector
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }
}

/// Point light restricted to a cone
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpotLight {
    /// Position, falloff and coefficients
    pub point_light: PointLight,
    /// Unit cone axis (light to scene)
    pub direction: [f32; 3],
    /// Cosine of the inner half-angle (full intensity inside)
    pub cut_off: f32,
    /// Cosine of the outer half-angle (no light outside)
    pub outer_cut_off: f32,
    _pad: [f32; 3],
}

gpu_layout!(SpotLight => "SpotLight" { point_light, direction, cut_off, outer_cut_off, _pad });

impl SpotLight {
    /// Create a spot light from cone cosines; `direction` is normalized
    pub fn new(point_light: PointLight, direction: Vec3, cut_off: f32, outer_cut_off: f32) -> Self {
        Self {
            point_light,
            direction: direction.normalize().into(),
            cut_off,
            outer_cut_off,
            _pad: [0.0; 3],
        }
    }

    /// Create a spot light from cone half-angles in degrees
    pub fn with_cone_degrees(point_light: PointLight, direction: Vec3, inner_degrees: f32, outer_degrees: f32) -> Self {
        Self::new(
            point_light,
            direction,
            inner_degrees.to_radians().cos(),
            outer_degrees.to_radians().cos(),
        )
    }

    /// Cone axis as a vector
    pub fn direction(&self) -> Vec3 {
        Vec3::from(self.direction)
    }
}

/// Every light bound for one frame
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightsUniforms {
    /// Directional lights
    pub directional_lights: [DirectionalLight; NUMBER_OF_DIRECTIONAL_LIGHTS],
    /// Point lights
    pub point_lights: [PointLight; NUMBER_OF_POINT_LIGHTS],
    /// Spot lights
    pub spot_lights: [SpotLight; NUMBER_OF_SPOT_LIGHTS],
}

gpu_layout!(LightsUniforms => "LightsUniforms" { directional_lights, point_lights, spot_lights });

fn check_directions(directions: impl Iterator<Item = [f32; 3]>, kind: &'static str) -> ContractResult<()> {
    for (index, direction) in directions.enumerate() {
        let direction = Vec3::from(direction);
        if !direction.iter().all(|c| c.is_finite()) || direction.norm_squared() == 0.0 {
            return Err(ContractError::InvalidDirection { kind, index });
        }
    }
    Ok(())
}

fn exact<T: Copy, const N: usize>(lights: &[T], kind: &'static str) -> ContractResult<[T; N]> {
    <[T; N]>::try_from(lights).map_err(|_| ContractError::LightCount {
        kind,
        expected: N,
        actual: lights.len(),
    })
}

impl LightsUniforms {
    /// Fill the container; each slice must have exactly the array length
    ///
    /// Directional and spot lights must have finite, non-zero directions. The
    /// constructors normalize a zero direction to NaN, which is rejected here.
    pub fn new(
        directional: &[DirectionalLight],
        point: &[PointLight],
        spot: &[SpotLight],
    ) -> ContractResult<Self> {
        check_directions(directional.iter().map(|d| d.direction), "directional")?;
        check_directions(spot.iter().map(|s| s.direction), "spot")?;
        Ok(Self {
            directional_lights: exact(directional, "directional")?,
            point_lights: exact(point, "point")?,
            spot_lights: exact(spot, "spot")?,
        })
    }

    /// Bytes for the [`BufferIndex::DirectionalLightInfo`] buffer
    pub fn directional_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.directional_lights)
    }

    /// Bytes for the [`BufferIndex::PointLightInfo`] buffer
    pub fn point_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.point_lights)
    }

    /// Bytes for the [`BufferIndex::SpotLightInfo`] buffer
    pub fn spot_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.spot_lights)
    }

    /// Slot and bytes of each light buffer
    pub fn bindings(&self) -> [(BufferIndex, &[u8]); 3] {
        [
            (BufferIndex::DirectionalLightInfo, self.directional_bytes()),
            (BufferIndex::PointLightInfo, self.point_bytes()),
            (BufferIndex::SpotLightInfo, self.spot_bytes()),
        ]
    }
}

/// Surface point being shaded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    /// World-space position
    pub position: Vec3,
    /// Unit world-space normal
    pub normal: Vec3,
    /// Unit vector from the fragment towards the eye
    pub view_direction: Vec3,
    /// Sampled colour texel, used when the material samples a texture
    pub texel: Vec4,
}

impl Fragment {
    /// Create a fragment with a white texel
    pub fn new(position: Vec3, normal: Vec3, view_direction: Vec3) -> Self {
        Self {
            position,
            normal: normal.normalize(),
            view_direction: view_direction.normalize(),
            texel: Vec4::new(1.0, 1.0, 1.0, 1.0),
        }
    }

    /// Create a fragment viewed from `camera`
    pub fn seen_from(position: Vec3, normal: Vec3, camera: &CameraInfo) -> Self {
        Self::new(position, normal, camera.position() - position)
    }

    /// Set the sampled texel
    #[must_use]
    pub fn with_texel(mut self, texel: Vec4) -> Self {
        self.texel = texel;
        self
    }
}

/// Distance falloff factor, with `distance` clamped below by [`DISTANCE_EPSILON`]
///
/// A non-positive denominator gives 0 rather than a negative or infinite factor.
pub fn attenuation_factor(attenuation: &Attenuation, distance: f32) -> f32 {
    let d = distance.max(DISTANCE_EPSILON);
    let denominator = attenuation.constant + attenuation.linear * d + attenuation.exponent * d * d;
    if denominator > 0.0 {
        1.0 / denominator
    } else {
        0.0
    }
}

/// Cone falloff for a fragment whose light vector makes cosine `theta` with the axis
///
/// 0 at or outside `outer_cut_off`, 1 at or inside `cut_off`, smooth between.
/// When `cut_off <= outer_cut_off` the cone has a hard edge at `cut_off`.
pub fn spot_factor(theta: f32, cut_off: f32, outer_cut_off: f32) -> f32 {
    if cut_off > outer_cut_off {
        smoothstep(outer_cut_off, cut_off, theta)
    } else if theta >= cut_off {
        1.0
    } else {
        0.0
    }
}

/// Cosine between the spot axis and the direction from the light to `position`
pub fn spot_theta(light: &SpotLight, position: Vec3) -> f32 {
    let (l, _) = light_vector(light.point_light.position(), position, Vec3::z());
    l.dot(&(-light.direction()).normalize())
}

/// Unit vector from `position` towards `light` and the distance between them
fn light_vector(light: Vec3, position: Vec3, fallback: Vec3) -> (Vec3, f32) {
    let to_light = light - position;
    let distance = to_light.norm();
    if distance > 0.0 {
        (to_light / distance, distance)
    } else {
        (fallback, 0.0)
    }
}

fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(&incident) * normal
}

/// Phong ambient + diffuse + specular term of one light, before falloff
fn light_term(base: &BaseLight, l: Vec3, fragment: &Fragment, albedo: Vec3, shininess: f32) -> Vec3 {
    let n = fragment.normal;
    let ambient = albedo * base.ambient;
    let diffuse = albedo * (base.diffuse * n.dot(&l).max(0.0));
    let highlight = fragment.view_direction.dot(&reflect(-l, n)).max(0.0).powf(shininess);
    let specular = Vec3::repeat(base.specular * highlight);
    (ambient + diffuse + specular).component_mul(&base.radiance())
}

/// Contribution of a directional light
pub fn directional_contribution(light: &DirectionalLight, fragment: &Fragment, albedo: Vec3, shininess: f32) -> Vec3 {
    let l = (-light.direction()).normalize();
    light_term(&light.base, l, fragment, albedo, shininess)
}

/// Contribution of a point light, attenuated by distance
pub fn point_contribution(light: &PointLight, fragment: &Fragment, albedo: Vec3, shininess: f32) -> Vec3 {
    let (l, distance) = light_vector(light.position(), fragment.position, fragment.normal);
    let falloff = attenuation_factor(&light.attenuation, distance);
    light_term(&light.base, l, fragment, albedo, shininess) * falloff
}

/// Contribution of a spot light: the point term scaled by the cone falloff
pub fn spot_contribution(light: &SpotLight, fragment: &Fragment, albedo: Vec3, shininess: f32) -> Vec3 {
    let cone = spot_factor(spot_theta(light, fragment.position), light.cut_off, light.outer_cut_off);
    point_contribution(&light.point_light, fragment, albedo, shininess) * cone
}

/// Unclamped sum of every light's contribution, in linear space
pub fn accumulate(fragment: &Fragment, material: &MaterialInfo, lights: &LightsUniforms) -> Vec3 {
    let albedo = surface_color(fragment, material).xyz();
    let shininess = material.shininess;

    let directional = lights
        .directional_lights
        .iter()
        .map(|light| directional_contribution(light, fragment, albedo, shininess));
    let point = lights
        .point_lights
        .iter()
        .map(|light| point_contribution(light, fragment, albedo, shininess));
    let spot = lights
        .spot_lights
        .iter()
        .map(|light| spot_contribution(light, fragment, albedo, shininess));

    directional.chain(point).chain(spot).fold(Vec3::zeros(), |sum, c| sum + c)
}

/// Texel or flat material colour, depending on the material flag
pub fn surface_color(fragment: &Fragment, material: &MaterialInfo) -> Vec4 {
    if material.uses_texture() {
        fragment.texel
    } else {
        material.color()
    }
}

/// Display colour of `fragment`: the accumulated light clamped to [0, 1]
pub fn shade(fragment: &Fragment, material: &MaterialInfo, lights: &LightsUniforms) -> Vec4 {
    let rgb = accumulate(fragment, material, lights);
    let alpha = surface_color(fragment, material).w;
    Vec4::new(rgb.x, rgb.y, rgb.z, alpha).map(|c| c.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GpuLayout;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-6;

    fn white_base(ambient: f32, diffuse: f32, specular: f32) -> BaseLight {
        BaseLight::new(Vec3::new(1.0, 1.0, 1.0), 1.0, ambient, diffuse, specular)
    }

    fn dark_lights() -> LightsUniforms {
        Zeroable::zeroed()
    }

    #[test]
    fn test_light_record_sizes() {
        assert_eq!(BaseLight::host_layout().size, 32);
        assert_eq!(Attenuation::host_layout().size, 12);
        assert_eq!(Attenuation::host_layout().align, 4);
        assert_eq!(DirectionalLight::host_layout().size, 48);
        assert_eq!(PointLight::host_layout().size, 64);
        assert_eq!(PointLight::host_layout().field("position").map(|f| f.offset), Some(48));
        assert_eq!(SpotLight::host_layout().size, 96);
        assert_eq!(SpotLight::host_layout().field("cut_off").map(|f| f.offset), Some(76));
        let lights = LightsUniforms::host_layout();
        assert_eq!(lights.size, 464);
        assert_eq!(lights.field("point_lights").map(|f| f.offset), Some(48));
        assert_eq!(lights.field("spot_lights").map(|f| f.offset), Some(368));
    }

    #[test]
    fn test_light_counts_are_enforced() {
        let d = DirectionalLight::new(white_base(0.1, 0.5, 0.5), Vec3::new(0.0, -1.0, 0.0));
        let p = PointLight::new(white_base(0.1, 0.5, 0.5), Attenuation::NONE, Vec3::zeros());
        let s = SpotLight::new(p, Vec3::new(0.0, 0.0, -1.0), 0.9, 0.8);

        assert!(LightsUniforms::new(&[d], &[p; 5], &[s]).is_ok());

        let err = LightsUniforms::new(&[d], &[p; 4], &[s]).unwrap_err();
        assert!(matches!(err, ContractError::LightCount { kind: "point", expected: 5, actual: 4 }));
        let err = LightsUniforms::new(&[d], &[p; 6], &[s]).unwrap_err();
        assert!(matches!(err, ContractError::LightCount { kind: "point", expected: 5, actual: 6 }));
        let err = LightsUniforms::new(&[d, d], &[p; 5], &[s]).unwrap_err();
        assert!(matches!(err, ContractError::LightCount { kind: "directional", .. }));
        let err = LightsUniforms::new(&[d], &[p; 5], &[]).unwrap_err();
        assert!(matches!(err, ContractError::LightCount { kind: "spot", expected: 1, actual: 0 }));
    }

    #[test]
    fn test_zero_or_non_finite_directions_are_rejected() {
        let base = white_base(0.1, 0.5, 0.5);
        let d = DirectionalLight::new(base, Vec3::new(0.0, -1.0, 0.0));
        let p = PointLight::new(base, Attenuation::NONE, Vec3::zeros());
        let s = SpotLight::new(p, Vec3::new(0.0, 0.0, -1.0), 0.9, 0.8);

        let unaimed = DirectionalLight::new(base, Vec3::zeros());
        assert!(unaimed.direction.iter().any(|c| c.is_nan()));
        let err = LightsUniforms::new(&[unaimed], &[p; 5], &[s]).unwrap_err();
        assert!(matches!(err, ContractError::InvalidDirection { kind: "directional", index: 0 }));

        let unaimed = SpotLight::new(p, Vec3::zeros(), 0.9, 0.8);
        let err = LightsUniforms::new(&[d], &[p; 5], &[unaimed]).unwrap_err();
        assert!(matches!(err, ContractError::InvalidDirection { kind: "spot", index: 0 }));

        let mut raw = d;
        raw.direction = [0.0; 3];
        assert!(LightsUniforms::new(&[raw], &[p; 5], &[s]).is_err());
        raw.direction = [f32::INFINITY, 0.0, 0.0];
        assert!(LightsUniforms::new(&[raw], &[p; 5], &[s]).is_err());
    }

    #[test]
    fn test_light_buffer_bytes() {
        let lights = dark_lights();
        let [(d_slot, d), (p_slot, p), (s_slot, s)] = lights.bindings();
        assert_eq!((d_slot, d.len()), (BufferIndex::DirectionalLightInfo, 48));
        assert_eq!((p_slot, p.len()), (BufferIndex::PointLightInfo, 320));
        assert_eq!((s_slot, s.len()), (BufferIndex::SpotLightInfo, 96));
    }

    #[test]
    fn test_attenuation_without_falloff() {
        assert_relative_eq!(attenuation_factor(&Attenuation::new(1.0, 0.0, 0.0), 10.0), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_attenuation_quadratic() {
        let factor = attenuation_factor(&Attenuation::new(1.0, 0.1, 0.01), 10.0);
        assert_relative_eq!(factor, 1.0 / 3.0, epsilon = EPSILON);
    }

    #[test]
    fn test_attenuation_guards_zero_distance() {
        let inverse_square = Attenuation::new(0.0, 0.0, 1.0);
        let factor = attenuation_factor(&inverse_square, 0.0);
        assert!(factor.is_finite());
        assert_relative_eq!(factor, 1.0 / (DISTANCE_EPSILON * DISTANCE_EPSILON), max_relative = 1e-4);
        assert_eq!(attenuation_factor(&inverse_square, DISTANCE_EPSILON / 2.0), factor);
        assert_relative_eq!(attenuation_factor(&inverse_square, 0.01), 10_000.0, max_relative = 1e-4);
        assert_eq!(attenuation_factor(&Attenuation::new(0.0, 0.0, 0.0), 5.0), 0.0);
    }

    #[test]
    fn test_spot_factor_edges() {
        assert_eq!(spot_factor(0.8, 0.9, 0.8), 0.0);
        assert_eq!(spot_factor(0.9, 0.9, 0.8), 1.0);
        assert_eq!(spot_factor(0.5, 0.9, 0.8), 0.0);
        let mid = spot_factor(0.85, 0.9, 0.8);
        assert!(mid > 0.0 && mid < 1.0);
        // Degenerate cone
        assert_eq!(spot_factor(0.9, 0.9, 0.9), 1.0);
        assert_eq!(spot_factor(0.89, 0.9, 0.95), 0.0);
    }

    fn spot_setup(cut_off: f32, outer_cut_off: f32, fragment_position: Vec3) -> (SpotLight, Fragment) {
        let point = PointLight::new(white_base(0.1, 0.8, 0.5), Attenuation::new(1.0, 0.09, 0.032), Vec3::zeros());
        let spot = SpotLight::new(point, Vec3::new(0.0, 0.0, -1.0), cut_off, outer_cut_off);
        let fragment = Fragment::new(fragment_position, Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 1.0));
        (spot, fragment)
    }

    #[test]
    fn test_spot_at_cut_off_matches_point_light() {
        let position = Vec3::new(0.5, 0.2, -4.0);
        let (aimed, _) = spot_setup(0.0, 0.0, position);
        let theta = spot_theta(&aimed, position);

        let (spot, fragment) = spot_setup(theta, theta - 0.05, position);
        let albedo = Vec3::new(0.8, 0.6, 0.4);
        let from_spot = spot_contribution(&spot, &fragment, albedo, 32.0);
        let from_point = point_contribution(&spot.point_light, &fragment, albedo, 32.0);
        assert_eq!(from_spot, from_point);
        assert!(from_point.x > 0.0);
    }

    #[test]
    fn test_spot_at_and_beyond_outer_cut_off_is_dark() {
        let albedo = Vec3::new(1.0, 1.0, 1.0);

        let position = Vec3::new(0.5, 0.2, -4.0);
        let (aimed, _) = spot_setup(0.0, 0.0, position);
        let theta = spot_theta(&aimed, position);
        let (spot, fragment) = spot_setup(theta + 0.01, theta, position);
        assert_eq!(spot_contribution(&spot, &fragment, albedo, 32.0), Vec3::zeros());

        // Far outside the cone, close to the light
        let (spot, fragment) = spot_setup(0.99, 0.98, Vec3::new(3.0, 0.0, -0.1));
        assert_eq!(spot_contribution(&spot, &fragment, albedo, 32.0), Vec3::zeros());
        // Far outside the cone, far from the light
        let (spot, fragment) = spot_setup(0.99, 0.98, Vec3::new(300.0, 0.0, -10.0));
        assert_eq!(spot_contribution(&spot, &fragment, albedo, 32.0), Vec3::zeros());
    }

    #[test]
    fn test_with_cone_degrees() {
        let point = PointLight::new(white_base(0.0, 1.0, 1.0), Attenuation::NONE, Vec3::zeros());
        let spot = SpotLight::with_cone_degrees(point, Vec3::new(0.0, -2.0, 0.0), 0.0, 60.0);
        assert_relative_eq!(spot.cut_off, 1.0, epsilon = EPSILON);
        assert_relative_eq!(spot.outer_cut_off, 0.5, epsilon = EPSILON);
        assert_eq!(spot.direction, [0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_directional_lambert_term() {
        let mut lights = dark_lights();
        lights.directional_lights[0] = DirectionalLight::new(white_base(0.1, 0.5, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let material = MaterialInfo::new(Vec4::new(1.0, 0.5, 0.25, 1.0), 16.0, false);
        let fragment = Fragment::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 1.0));

        let color = shade(&fragment, &material, &lights);
        assert_relative_eq!(color, Vec4::new(0.6, 0.3, 0.15, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_texture_flag_selects_texel() {
        let mut lights = dark_lights();
        lights.directional_lights[0] = DirectionalLight::new(white_base(1.0, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let fragment = Fragment::new(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0))
            .with_texel(Vec4::new(1.0, 0.0, 0.0, 1.0));

        let textured = MaterialInfo::new(Vec4::new(0.0, 1.0, 0.0, 1.0), 8.0, true);
        let flat = MaterialInfo::new(Vec4::new(0.0, 1.0, 0.0, 1.0), 8.0, false);
        assert_relative_eq!(shade(&fragment, &textured, &lights), Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_relative_eq!(shade(&fragment, &flat, &lights), Vec4::new(0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn test_only_output_is_clamped() {
        let mut lights = dark_lights();
        for (i, light) in lights.point_lights.iter_mut().enumerate() {
            *light = PointLight::new(
                BaseLight::new(Vec3::new(1.0, 1.0, 1.0), 2.0, 0.5, 0.5, 0.0),
                Attenuation::NONE,
                Vec3::new(i as f32, 1.0, 0.0),
            );
        }
        let material = MaterialInfo::new(Vec4::new(1.0, 1.0, 1.0, 1.0), 1.0, false);
        let fragment = Fragment::new(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));

        let raw = accumulate(&fragment, &material, &lights);
        assert!(raw.x > 1.0);
        assert_eq!(shade(&fragment, &material, &lights), Vec4::new(1.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn test_coincident_point_light_stays_finite() {
        let mut lights = dark_lights();
        lights.point_lights[0] = PointLight::new(white_base(0.2, 0.5, 0.5), Attenuation::new(1.0, 0.09, 0.032), Vec3::zeros());
        let material = MaterialInfo::default();
        let fragment = Fragment::new(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let color = shade(&fragment, &material, &lights);
        assert!(color.iter().all(|c| c.is_finite()));
    }
}
