//! Shadow, main-pass and per-effect records
//!
//! `ShadowPass`, `MainPass` and `ObjectData` are each 256 bytes so that one
//! buffer can hold many of them at dynamic offsets. Their `pad*` members are
//! reserved: always written as zero and never read.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{mat4_from_columns, mat4_to_columns, Mat4, Mat4Ext, Vec3, Vec4};
use crate::layout::gpu_layout;

const ZERO_MAT4: [[f32; 4]; 4] = [[0.0; 4]; 4];

/// View-projection of the light for the depth-only shadow pass
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShadowPass {
    /// Light view-projection matrix (column-major)
    pub view_projection: [[f32; 4]; 4],
    /// Reserved
    pub pad1: [[f32; 4]; 4],
    /// Reserved
    pub pad2: [[f32; 4]; 4],
    /// Reserved
    pub pad3: [[f32; 4]; 4],
}

gpu_layout!(ShadowPass => "ShadowPass" { view_projection, pad1, pad2, pad3 });

impl ShadowPass {
    /// Create the record from the light's view-projection
    pub fn new(view_projection: &Mat4) -> Self {
        Self {
            view_projection: mat4_to_columns(view_projection),
            pad1: ZERO_MAT4,
            pad2: ZERO_MAT4,
            pad3: ZERO_MAT4,
        }
    }

    /// Orthographic shadow camera for a directional light
    ///
    /// Covers a cube of half-size `extent` centred on `focus`, seen along `direction`.
    pub fn for_directional_light(direction: Vec3, focus: Vec3, extent: f32) -> Self {
        let direction = direction.normalize();
        let up = if direction.cross(&Vec3::y()).norm_squared() < 1e-6 {
            Vec3::z()
        } else {
            Vec3::y()
        };
        let eye = focus - direction * extent;
        let view = Mat4::look_at(eye, focus, up);
        let projection = Mat4::orthographic(-extent, extent, -extent, extent, 0.0, 2.0 * extent);
        Self::new(&(projection * view))
    }

    /// Light view-projection as a matrix
    pub fn view_projection(&self) -> Mat4 {
        mat4_from_columns(self.view_projection)
    }
}

/// Camera and shadow matrices for the shadow-receiving main pass
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MainPass {
    /// Camera view-projection matrix (column-major)
    pub view_projection: [[f32; 4]; 4],
    /// Same matrix as [`ShadowPass::view_projection`]
    pub shadow_view_projection: [[f32; 4]; 4],
    /// World-space light position, `w = 1`
    pub light_position: [f32; 4],
    /// Reserved
    pub pad00: [f32; 4],
    /// Reserved
    pub pad01: [f32; 4],
    /// Reserved
    pub pad02: [f32; 4],
    /// Reserved
    pub pad1: [[f32; 4]; 4],
}

gpu_layout!(MainPass => "MainPass" {
    view_projection, shadow_view_projection, light_position, pad00, pad01, pad02, pad1
});

impl MainPass {
    /// Create the record from the camera view-projection and the shadow pass it samples
    pub fn new(camera_view_projection: &Mat4, shadow: &ShadowPass, light_position: Vec3) -> Self {
        Self {
            view_projection: mat4_to_columns(camera_view_projection),
            shadow_view_projection: shadow.view_projection,
            light_position: [light_position.x, light_position.y, light_position.z, 1.0],
            ..Zeroable::zeroed()
        }
    }

    /// Shadow-map texture coordinate (x, y) and depth (z) of a world position
    ///
    /// Same mapping as `shadow_coordinates` in `shadow.wgsl`: NDC x/y to
    /// [0, 1] with y flipped, depth after the perspective divide.
    pub fn shadow_coordinates(&self, world: Vec3) -> Vec3 {
        let clip = mat4_from_columns(self.shadow_view_projection) * Vec4::new(world.x, world.y, world.z, 1.0);
        let ndc = clip.xyz() / clip.w;
        Vec3::new(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5, ndc.z)
    }
}

/// Per-object record for the shadow and main passes
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectData {
    /// Object-to-world matrix (column-major)
    pub local_to_world: [[f32; 4]; 4],
    /// Flat object colour
    pub color: [f32; 4],
    /// Reserved
    pub pad0: [f32; 4],
    /// Reserved
    pub pad01: [f32; 4],
    /// Reserved
    pub pad02: [f32; 4],
    /// Reserved
    pub pad1: [[f32; 4]; 4],
    /// Reserved
    pub pad2: [[f32; 4]; 4],
}

gpu_layout!(ObjectData => "ObjectData" {
    local_to_world, color, pad0, pad01, pad02, pad1, pad2
});

impl ObjectData {
    /// Create the record for one object
    pub fn new(local_to_world: &Mat4, color: Vec4) -> Self {
        Self {
            local_to_world: mat4_to_columns(local_to_world),
            color: color.into(),
            ..Zeroable::zeroed()
        }
    }
}

/// Time shared by animated effects
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Default)]
pub struct Constants {
    /// Seconds since the scene started
    pub time: f32,
}

gpu_layout!(Constants => "Constants" { time });

/// Edge threshold of the toon effect
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Default)]
pub struct ToonConstants {
    /// Cosine below which a fragment is drawn as an outline
    pub toon_edge: f32,
}

gpu_layout!(ToonConstants => "ToonConstants" { toon_edge });

/// Parameters of the fire-ball displacement effect
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Default)]
pub struct FireBallConstants {
    /// Effect time (scene time scaled by [`FireBallConstants::TIME_SCALE`])
    pub time: f32,
    /// Noise frequency
    pub frequency: f32,
    /// Displacement strength
    pub explosion: f32,
}

gpu_layout!(FireBallConstants => "FireBallConstants" { time, frequency, explosion });

impl FireBallConstants {
    /// Factor applied to scene time
    pub const TIME_SCALE: f32 = 0.2;

    /// Constants for scene time `scene_time`
    pub fn at(scene_time: f32, frequency: f32, explosion: f32) -> Self {
        Self {
            time: scene_time * Self::TIME_SCALE,
            frequency,
            explosion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GpuLayout;
    use approx::assert_relative_eq;

    #[test]
    fn test_pass_records_fill_one_dynamic_offset() {
        assert_eq!(ShadowPass::host_layout().size, 256);
        assert_eq!(MainPass::host_layout().size, 256);
        assert_eq!(ObjectData::host_layout().size, 256);
        assert_eq!(MainPass::host_layout().field("light_position").map(|f| f.offset), Some(128));
        assert_eq!(ObjectData::host_layout().field("pad1").map(|f| f.offset), Some(128));
    }

    #[test]
    fn test_padding_is_zero() {
        let shadow = ShadowPass::new(&Mat4::identity());
        let main = MainPass::new(&Mat4::identity(), &shadow, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(main.pad00, [0.0; 4]);
        assert_eq!(main.pad1, ZERO_MAT4);
        assert_eq!(main.light_position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(main.shadow_view_projection, shadow.view_projection);
        let object = ObjectData::new(&Mat4::identity(), Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(object.pad2, ZERO_MAT4);
    }

    #[test]
    fn test_shadow_coordinates_of_focus_are_centred() {
        let focus = Vec3::new(2.0, 0.0, -1.0);
        let shadow = ShadowPass::for_directional_light(Vec3::new(-0.2, -1.0, -0.3), focus, 10.0);
        let main = MainPass::new(&Mat4::identity(), &shadow, Vec3::zeros());

        let uvd = main.shadow_coordinates(focus);
        assert_relative_eq!(uvd.x, 0.5, epsilon = 1e-5);
        assert_relative_eq!(uvd.y, 0.5, epsilon = 1e-5);
        assert_relative_eq!(uvd.z, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_shadow_depth_grows_away_from_light() {
        let shadow = ShadowPass::for_directional_light(Vec3::new(0.0, -1.0, 0.0), Vec3::zeros(), 5.0);
        let main = MainPass::new(&Mat4::identity(), &shadow, Vec3::new(0.0, 5.0, 0.0));

        let top = main.shadow_coordinates(Vec3::new(0.0, 4.0, 0.0));
        let bottom = main.shadow_coordinates(Vec3::new(0.0, -4.0, 0.0));
        assert!(top.z < bottom.z);
        assert!((0.0..=1.0).contains(&top.z) && (0.0..=1.0).contains(&bottom.z));
    }

    #[test]
    fn test_fire_ball_time_is_scaled() {
        let constants = FireBallConstants::at(10.0, 3.0, 0.5);
        assert_relative_eq!(constants.time, 2.0);
        assert_eq!(constants.frequency, 3.0);
        assert_eq!(FireBallConstants::host_layout().size, 12);
        assert_eq!(ToonConstants::host_layout().size, 4);
    }
}
