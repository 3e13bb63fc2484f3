//! Vulkan vertex input and descriptor set layouts
//!
//! Descriptor set numbers follow the WGSL bind groups: set 0 holds the
//! buffers (binding = [`BufferIndex`] slot), set 1 the textures and set 2 the
//! samplers.

use ash::vk;

use crate::bindings::{BindingKind, BufferIndex, SamplerIndex, TextureIndex};
use crate::render::vertex::{Vertex, VertexFormat, VertexStepMode};

/// Vulkan vertex layout implementation for the shared [`Vertex`] type
pub struct VulkanVertexLayout;

impl VulkanVertexLayout {
    /// Vulkan format of a vertex attribute format
    pub const fn format(format: VertexFormat) -> vk::Format {
        match format {
            VertexFormat::Float32x2 => vk::Format::R32G32_SFLOAT,
            VertexFormat::Float32x3 => vk::Format::R32G32B32_SFLOAT,
            VertexFormat::Float32x4 => vk::Format::R32G32B32A32_SFLOAT,
        }
    }

    /// Vertex input binding description for the mesh vertex stream
    pub fn binding_description() -> vk::VertexInputBindingDescription {
        let layout = Vertex::layout();
        vk::VertexInputBindingDescription {
            binding: layout.buffer.slot(),
            stride: layout.stride,
            input_rate: match layout.step {
                VertexStepMode::PerVertex => vk::VertexInputRate::VERTEX,
                VertexStepMode::PerInstance => vk::VertexInputRate::INSTANCE,
            },
        }
    }

    /// One attribute description per vertex attribute, in location order
    pub fn attribute_descriptions() -> Vec<vk::VertexInputAttributeDescription> {
        let layout = Vertex::layout();
        layout
            .attributes
            .iter()
            .map(|attr| vk::VertexInputAttributeDescription {
                binding: layout.buffer.slot(),
                location: attr.location(),
                format: Self::format(attr.format),
                offset: attr.offset,
            })
            .collect()
    }

    /// Binding and attribute descriptions together, for pipeline creation
    pub fn input_state() -> (vk::VertexInputBindingDescription, Vec<vk::VertexInputAttributeDescription>) {
        (Self::binding_description(), Self::attribute_descriptions())
    }
}

/// Descriptor type of a buffer slot, `None` for the vertex stream
pub const fn descriptor_type(index: BufferIndex) -> Option<vk::DescriptorType> {
    match index.binding_kind() {
        BindingKind::Vertex => None,
        BindingKind::Uniform => Some(vk::DescriptorType::UNIFORM_BUFFER),
        BindingKind::ReadOnlyStorage => Some(vk::DescriptorType::STORAGE_BUFFER),
    }
}

fn layout_binding(binding: u32, ty: vk::DescriptorType, stage_flags: vk::ShaderStageFlags) -> vk::DescriptorSetLayoutBinding {
    vk::DescriptorSetLayoutBinding::builder()
        .binding(binding)
        .descriptor_type(ty)
        .descriptor_count(1)
        .stage_flags(stage_flags)
        .build()
}

/// Set 0 layout: one binding per uniform or storage buffer slot
pub fn descriptor_set_layout_bindings(stage_flags: vk::ShaderStageFlags) -> Vec<vk::DescriptorSetLayoutBinding> {
    BufferIndex::ALL
        .iter()
        .filter_map(|&index| {
            descriptor_type(index).map(|ty| layout_binding(index.slot(), ty, stage_flags))
        })
        .collect()
}

/// Set 1 layout: one sampled image per texture slot
pub fn texture_set_layout_bindings(stage_flags: vk::ShaderStageFlags) -> Vec<vk::DescriptorSetLayoutBinding> {
    TextureIndex::ALL
        .iter()
        .map(|index| layout_binding(index.slot(), vk::DescriptorType::SAMPLED_IMAGE, stage_flags))
        .collect()
}

/// Set 2 layout: one sampler per sampler slot
pub fn sampler_set_layout_bindings(stage_flags: vk::ShaderStageFlags) -> Vec<vk::DescriptorSetLayoutBinding> {
    SamplerIndex::ALL
        .iter()
        .map(|index| layout_binding(index.slot(), vk::DescriptorType::SAMPLER, stage_flags))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_input_matches_schema() {
        let (binding, attributes) = VulkanVertexLayout::input_state();
        assert_eq!(binding.binding, 0);
        assert_eq!(binding.stride, 64);
        assert_eq!(binding.input_rate, vk::VertexInputRate::VERTEX);

        let tex = &attributes[1];
        assert_eq!(tex.location, 1);
        assert_eq!(tex.offset, 16);
        assert_eq!(tex.format, vk::Format::R32G32_SFLOAT);
        assert_eq!(attributes[2].format, vk::Format::R32G32B32A32_SFLOAT);
        assert_eq!(attributes[3].offset, 48);
    }

    #[test]
    fn test_buffer_set_skips_vertex_stream() {
        let bindings = descriptor_set_layout_bindings(vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT);
        assert_eq!(bindings.len(), BufferIndex::ALL.len() - 1);
        assert!(bindings.iter().all(|b| b.binding != BufferIndex::MeshPositions.slot()));

        let instances = bindings.iter().find(|b| b.binding == BufferIndex::Instances.slot()).unwrap();
        assert_eq!(instances.descriptor_type, vk::DescriptorType::STORAGE_BUFFER);
        let main_pass = bindings.iter().find(|b| b.binding == BufferIndex::MainPass.slot()).unwrap();
        assert_eq!(main_pass.descriptor_type, vk::DescriptorType::UNIFORM_BUFFER);
        assert_eq!(main_pass.descriptor_count, 1);
    }

    #[test]
    fn test_texture_and_sampler_sets() {
        let textures = texture_set_layout_bindings(vk::ShaderStageFlags::FRAGMENT);
        assert_eq!(textures.len(), TextureIndex::ALL.len());
        assert_eq!(textures[5].binding, TextureIndex::ShadowMap.slot());
        let samplers = sampler_set_layout_bindings(vk::ShaderStageFlags::FRAGMENT);
        assert_eq!(samplers[1].descriptor_type, vk::DescriptorType::SAMPLER);
    }
}
