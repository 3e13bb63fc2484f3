//! Camera state and the `CameraInfo` record read by lighting shaders

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::layout::gpu_layout;

/// Camera position and view direction, bound at [`BufferIndex::CameraInfo`](crate::bindings::BufferIndex::CameraInfo)
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraInfo {
    /// World-space eye position
    pub position: [f32; 3],
    _pad0: f32,
    /// Unit view direction
    pub front: [f32; 3],
    _pad1: f32,
}

gpu_layout!(CameraInfo => "CameraInfo" { position, _pad0, front, _pad1 });

impl CameraInfo {
    /// Create camera info from a position and view direction
    ///
    /// A zero or non-finite `front` is replaced by `-Z` with a warning, so the
    /// record never carries NaN.
    pub fn new(position: Vec3, front: Vec3) -> Self {
        let front = match front.try_normalize(f32::EPSILON) {
            Some(unit) if unit.iter().all(|c| c.is_finite()) => unit,
            _ => {
                log::warn!("Camera front {front:?} cannot be normalized, using -Z");
                -Vec3::z()
            }
        };
        Self {
            position: position.into(),
            front: front.into(),
            ..Zeroable::zeroed()
        }
    }

    /// Eye position as a vector
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    /// View direction as a vector
    pub fn front(&self) -> Vec3 {
        Vec3::from(self.front)
    }
}

/// Perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// World-space eye position
    pub position: Vec3,
    /// Unit view direction
    pub front: Vec3,
    /// World up vector
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Width over height
    pub aspect: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            front: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov_y: 45.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    /// Create a perspective camera at `position` looking along `front`
    pub fn new(position: Vec3, front: Vec3, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            front: front.normalize(),
            fov_y,
            aspect,
            near,
            far,
            ..Default::default()
        }
    }

    /// Point the camera at `target`
    pub fn look_at(&mut self, target: Vec3) {
        let dir = target - self.position;
        if dir.norm_squared() > f32::EPSILON {
            self.front = dir.normalize();
        }
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.front, self.up)
    }

    /// View-to-clip matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Projection times view
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Record for the [`BufferIndex::CameraInfo`](crate::bindings::BufferIndex::CameraInfo) slot
    pub fn camera_info(&self) -> CameraInfo {
        CameraInfo::new(self.position, self.front)
    }
}
