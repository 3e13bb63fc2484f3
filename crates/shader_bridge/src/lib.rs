//! # Shader Bridge
//!
//! The binary contract between a forward rasterizer's host code and its
//! shaders.
//!
//! ## Features
//!
//! - **Slot registries**: buffer, vertex attribute, texture and sampler slots
//!   shared by both sides
//! - **GPU records**: `#[repr(C)]` uniforms, materials, instances, cameras and
//!   lights with WGSL-compatible padding
//! - **Reference shading**: the Phong lighting model evaluated on the host
//! - **Conformance**: WGSL sources reflected with naga and compared against the
//!   host records byte for byte
//! - **Vulkan descriptors**: vertex input and descriptor set layouts from the
//!   same registries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shader_bridge::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     shader_bridge::foundation::logging::init();
//!
//!     let config = ContractConfig::default();
//!     let camera = Camera::default();
//!     let mut builder = FrameBuilder::new(0);
//!     builder.camera(&camera).light_rig(&config.lights)?;
//!     let frame = builder.finish();
//!
//!     for (slot, bytes) in frame.bindings_for(PassKind::Lit).unwrap_or_default() {
//!         println!("{slot}: {} bytes", bytes.len());
//!     }
//!
//!     ShaderSource::LIGHTING.verify()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod backend;
pub mod bindings;
pub mod config;
pub mod error;
pub mod foundation;
pub mod layout;
pub mod render;
pub mod shader;

pub use error::{ContractError, ContractResult};

/// Common imports for contract users
pub mod prelude {
    pub use crate::{
        bindings::{BindingKind, BufferIndex, SamplerIndex, TextureIndex, VertexAttribute},
        config::{Config, ContractConfig},
        error::{ContractError, ContractResult},
        foundation::math::{Mat4, Transform, Vec3, Vec4},
        layout::{GpuLayout, StructLayout},
        render::{
            Camera, CameraInfo, DrawPayload, FrameBuilder, FrameRing, InstanceBuffer,
            InstanceUniform, LightRig, LightsUniforms, MaterialInfo, PassKind, Uniform, Vertex,
        },
        shader::{ShaderReflection, ShaderSource},
    };
}
