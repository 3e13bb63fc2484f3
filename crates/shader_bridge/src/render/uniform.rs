//! Per-draw and per-instance uniform records
//!
//! Non-instanced draws upload a [`Uniform`] and a [`MaterialInfo`] at their
//! own slots. Instanced draws upload one [`InstanceUniform`] per instance
//! through an [`InstanceBuffer`], whose index `i` belongs to instance `i` of
//! the draw.

use bytemuck::{Pod, Zeroable};

use crate::bindings::BufferIndex;
use crate::error::{ContractError, ContractResult};
use crate::foundation::math::{
    mat3_from_padded_columns, mat3_to_padded_columns, mat4_from_columns, mat4_to_columns, Mat3,
    Mat4, Transform, Vec4,
};
use crate::layout::{gpu_layout, GpuLayout};
use crate::render::camera::Camera;

/// Lowest shininess exponent accepted by [`MaterialInfo::new`]
pub const MIN_SHININESS: f32 = 1.0;
/// Highest shininess exponent accepted by [`MaterialInfo::new`]
pub const MAX_SHININESS: f32 = 128.0;

/// Transform bundle for one draw
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Uniform {
    /// View-to-clip matrix (column-major)
    pub projection_matrix: [[f32; 4]; 4],
    /// Object-to-world matrix (column-major)
    pub model_matrix: [[f32; 4]; 4],
    /// World-to-view matrix (column-major)
    pub view_matrix: [[f32; 4]; 4],
    /// Inverse-transpose of the model's upper 3x3, as three padded columns
    pub normal_matrix: [[f32; 4]; 3],
}

gpu_layout!(Uniform => "Uniform" { projection_matrix, model_matrix, view_matrix, normal_matrix });

/// Inverse-transpose of the upper 3x3 of `model`
///
/// Returns identity (and logs a warning) when the upper 3x3 is singular.
pub fn normal_matrix(model: &Mat4) -> Mat3 {
    let upper: Mat3 = model.fixed_view::<3, 3>(0, 0).into_owned();
    if let Some(inverse) = upper.try_inverse() {
        inverse.transpose()
    } else {
        log::warn!("Model matrix is not invertible, using identity for normal matrix");
        Mat3::identity()
    }
}

impl Default for Uniform {
    fn default() -> Self {
        Self::from_transform_chain(&Mat4::identity(), &Mat4::identity(), &Mat4::identity())
    }
}

impl Uniform {
    /// Build the record from object-to-world, world-to-view and view-to-clip matrices
    pub fn from_transform_chain(object_to_world: &Mat4, world_to_view: &Mat4, view_to_clip: &Mat4) -> Self {
        Self {
            projection_matrix: mat4_to_columns(view_to_clip),
            model_matrix: mat4_to_columns(object_to_world),
            view_matrix: mat4_to_columns(world_to_view),
            normal_matrix: mat3_to_padded_columns(&normal_matrix(object_to_world)),
        }
    }

    /// Build the record for an object seen through `camera`
    pub fn for_object(transform: &Transform, camera: &Camera) -> Self {
        Self::from_transform_chain(
            &transform.to_matrix(),
            &camera.view_matrix(),
            &camera.projection_matrix(),
        )
    }

    /// Model matrix as a nalgebra matrix
    pub fn model(&self) -> Mat4 {
        mat4_from_columns(self.model_matrix)
    }

    /// Normal matrix as a nalgebra matrix
    pub fn normal(&self) -> Mat3 {
        mat3_from_padded_columns(&self.normal_matrix)
    }

    /// Projection * view * model
    pub fn model_view_projection(&self) -> Mat4 {
        mat4_from_columns(self.projection_matrix)
            * mat4_from_columns(self.view_matrix)
            * self.model()
    }
}

/// Surface parameters for one draw
///
/// [`MaterialInfo::new`] clamps the specular exponent to
/// `[MIN_SHININESS, MAX_SHININESS]`; in-range values are stored unchanged.
/// Writing `shininess` directly bypasses the clamp, and the shaders use
/// whatever value is uploaded.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialInfo {
    /// Flat base colour (RGBA), used when no texture is sampled
    pub color: [f32; 4],
    /// Specular exponent; higher means a tighter highlight (1 to 128 through `new`)
    pub shininess: f32,
    /// Non-zero to sample the colour texture instead of `color`
    pub use_texture: u32,
    _pad: [u32; 2],
}

gpu_layout!(MaterialInfo => "MaterialInfo" { color, shininess, use_texture, _pad });

impl Default for MaterialInfo {
    fn default() -> Self {
        Self::new(Vec4::new(1.0, 1.0, 1.0, 1.0), 32.0, false)
    }
}

impl MaterialInfo {
    /// Create a material; shininess is clamped to `[MIN_SHININESS, MAX_SHININESS]`
    pub fn new(color: Vec4, shininess: f32, use_texture: bool) -> Self {
        Self {
            color: color.into(),
            shininess: shininess.clamp(MIN_SHININESS, MAX_SHININESS),
            use_texture: u32::from(use_texture),
            _pad: [0; 2],
        }
    }

    /// Whether the shader samples the colour texture
    pub fn uses_texture(&self) -> bool {
        self.use_texture != 0
    }

    /// Base colour as a vector
    pub fn color(&self) -> Vec4 {
        Vec4::from(self.color)
    }
}

/// Transform and material of one instance in an instanced draw
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Default)]
pub struct InstanceUniform {
    /// Per-instance transforms
    pub transform: Uniform,
    /// Per-instance material
    pub material: MaterialInfo,
}

gpu_layout!(InstanceUniform => "InstanceUniform" { transform, material });

impl InstanceUniform {
    /// Combine a transform bundle and a material
    pub fn new(transform: Uniform, material: MaterialInfo) -> Self {
        Self { transform, material }
    }
}

/// Fixed-capacity array of [`InstanceUniform`] records for one instanced draw
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceBuffer {
    capacity: usize,
    instances: Vec<InstanceUniform>,
}

impl InstanceBuffer {
    /// Stride of one record in bytes
    pub const STRIDE: usize = std::mem::size_of::<InstanceUniform>();

    /// Create an empty buffer that accepts at most `capacity` instances
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            instances: Vec::with_capacity(capacity),
        }
    }

    /// Append an instance; fails once the buffer is full
    pub fn push(&mut self, instance: InstanceUniform) -> ContractResult<()> {
        if self.instances.len() >= self.capacity {
            return Err(ContractError::InstanceOverflow { capacity: self.capacity });
        }
        self.instances.push(instance);
        Ok(())
    }

    /// Append every instance or none
    pub fn extend_from_slice(&mut self, instances: &[InstanceUniform]) -> ContractResult<()> {
        if self.instances.len() + instances.len() > self.capacity {
            return Err(ContractError::InstanceOverflow { capacity: self.capacity });
        }
        self.instances.extend_from_slice(instances);
        Ok(())
    }

    /// Remove every instance, keeping the capacity
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Maximum number of instances
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of instances to draw
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// The instances, in draw order
    pub fn instances(&self) -> &[InstanceUniform] {
        &self.instances
    }

    /// Bytes for the [`BufferIndex::Instances`] buffer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Size of the GPU allocation needed for the full capacity
    pub fn allocation_size(&self) -> usize {
        self.capacity * Self::STRIDE
    }

    /// Decode records from bytes laid out like [`Self::as_bytes`]
    ///
    /// The input need not be aligned; an empty slice yields no instances.
    pub fn read_back(bytes: &[u8]) -> ContractResult<Vec<InstanceUniform>> {
        if bytes.len() % Self::STRIDE != 0 {
            return Err(ContractError::MisalignedBytes {
                len: bytes.len(),
                stride: Self::STRIDE,
            });
        }
        Ok(bytes
            .chunks_exact(Self::STRIDE)
            .map(bytemuck::pod_read_unaligned::<InstanceUniform>)
            .collect())
    }
}

/// Buffers bound for one draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawPayload {
    /// Ordinary draw with its own transform and material buffers
    Single {
        /// Transform bundle
        uniform: Uniform,
        /// Material
        material: MaterialInfo,
    },
    /// Instanced draw reading per-instance records
    Instanced(InstanceBuffer),
}

impl DrawPayload {
    /// Slot and bytes of every buffer this draw binds
    pub fn bindings(&self) -> Vec<(BufferIndex, &[u8])> {
        match self {
            Self::Single { uniform, material } => vec![
                (BufferIndex::Uniforms, uniform.as_bytes()),
                (BufferIndex::MaterialInfo, material.as_bytes()),
            ],
            Self::Instanced(buffer) => vec![(BufferIndex::Instances, buffer.as_bytes())],
        }
    }

    /// Number of instances the draw call should request
    pub fn instance_count(&self) -> usize {
        match self {
            Self::Single { .. } => 1,
            Self::Instanced(buffer) => buffer.instance_count(),
        }
    }
}
