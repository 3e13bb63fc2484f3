//! Slot registries shared by host and shader code
//!
//! Every buffer, vertex attribute, texture and sampler binding point is
//! declared exactly once here. Each registry is a `#[repr(u32)]` enum, so a
//! duplicated slot is a compile error (E0081), and each also carries a
//! `const` assertion over its full slot table.

use std::fmt;

use crate::error::{ContractError, ContractResult};
use crate::render::lighting::{
    NUMBER_OF_DIRECTIONAL_LIGHTS, NUMBER_OF_POINT_LIGHTS, NUMBER_OF_SPOT_LIGHTS,
};

/// WGSL bind group holding every `BufferIndex` binding (binding number = slot)
pub const BUFFER_GROUP: u32 = 0;
/// WGSL bind group holding every `TextureIndex` binding
pub const TEXTURE_GROUP: u32 = 1;
/// WGSL bind group holding every `SamplerIndex` binding
pub const SAMPLER_GROUP: u32 = 2;

macro_rules! slot_registry {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident in $category:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $slot:literal => $label:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant = $slot,
            )+
        }

        impl $name {
            /// Every entry of the registry, in slot order of declaration
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Human-readable registry category used in error messages
            pub const CATEGORY: &'static str = $category;

            /// Slot number this entry is bound at
            pub const fn slot(self) -> u32 {
                self as u32
            }

            /// Entry bound at `slot`, if any
            pub const fn from_slot(slot: u32) -> Option<Self> {
                match slot {
                    $($slot => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Like [`Self::from_slot`] but reports unassigned slots as an error
            pub fn try_from_slot(slot: u32) -> ContractResult<Self> {
                Self::from_slot(slot).ok_or(ContractError::UnknownSlot {
                    category: Self::CATEGORY,
                    slot,
                })
            }

            /// Identifier used for this entry in shader source
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}@{}", self.label(), self.slot())
            }
        }

        const _: () = {
            let slots: &[u32] = &[$($slot),+];
            let mut i = 0;
            while i < slots.len() {
                let mut j = i + 1;
                while j < slots.len() {
                    assert!(slots[i] != slots[j], concat!("duplicate slot in ", stringify!($name)));
                    j += 1;
                }
                i += 1;
            }
        };
    };
}

slot_registry! {
    /// Buffer binding points
    ///
    /// The mesh vertex stream is bound as a vertex buffer; every other entry
    /// is a WGSL global in group [`BUFFER_GROUP`] with binding = slot.
    pub enum BufferIndex in "buffer" {
        /// Interleaved [`Vertex`](crate::render::vertex::Vertex) stream
        MeshPositions = 0 => "mesh_positions",
        /// Per-draw [`Uniform`](crate::render::uniform::Uniform)
        Uniforms = 1 => "uniforms",
        /// Per-instance [`InstanceUniform`](crate::render::uniform::InstanceUniform) array
        Instances = 2 => "instances",
        /// [`CameraInfo`](crate::render::camera::CameraInfo)
        CameraInfo = 3 => "camera",
        /// Per-draw [`MaterialInfo`](crate::render::uniform::MaterialInfo)
        MaterialInfo = 4 => "material",
        /// Directional light array
        DirectionalLightInfo = 5 => "directional_lights",
        /// Point light array
        PointLightInfo = 6 => "point_lights",
        /// Spot light array
        SpotLightInfo = 7 => "spot_lights",
        /// Shared effect [`Constants`](crate::render::passes::Constants)
        Constants = 8 => "constants",
        /// [`ToonConstants`](crate::render::passes::ToonConstants)
        Toon = 9 => "toon",
        /// [`FireBallConstants`](crate::render::passes::FireBallConstants)
        FireBall = 10 => "fire_ball",
        /// Depth-only [`ShadowPass`](crate::render::passes::ShadowPass)
        ShadowPass = 11 => "shadow_pass",
        /// Shadow-receiving [`MainPass`](crate::render::passes::MainPass)
        MainPass = 12 => "main_pass",
        /// Per-object [`ObjectData`](crate::render::passes::ObjectData)
        ObjectData = 13 => "object_data",
    }
}

slot_registry! {
    /// Vertex attribute locations (`@location(n)` in the shader)
    pub enum VertexAttribute in "vertex attribute" {
        /// Object-space position
        Position = 0 => "position",
        /// Texture coordinate
        TexCoord = 1 => "tex_coord",
        /// Vertex colour
        Color = 2 => "color",
        /// Object-space normal
        Normal = 3 => "normal",
    }
}

slot_registry! {
    /// Texture binding points in group [`TEXTURE_GROUP`]
    pub enum TextureIndex in "texture" {
        /// Base colour texture
        Color = 0 => "color_texture",
        /// Alpha mask
        Mask = 1 => "mask_texture",
        /// Tangent-space normal map
        NormalMap = 2 => "normal_map",
        /// Diffuse map
        DiffuseMap = 3 => "diffuse_map",
        /// Specular map
        SpecularMap = 4 => "specular_map",
        /// Depth texture written by the shadow pass
        ShadowMap = 5 => "shadow_map",
    }
}

slot_registry! {
    /// Sampler binding points in group [`SAMPLER_GROUP`]
    pub enum SamplerIndex in "sampler" {
        /// Filtering sampler for colour textures
        Main = 0 => "main_sampler",
        /// Depth comparison sampler for the shadow map
        ShadowCompare = 1 => "shadow_sampler",
    }
}

/// How a buffer slot is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Vertex input stream
    Vertex,
    /// Uniform buffer (`var<uniform>`)
    Uniform,
    /// Read-only storage buffer (`var<storage, read>`)
    ReadOnlyStorage,
}

impl BufferIndex {
    /// Binding kind of this slot
    pub const fn binding_kind(self) -> BindingKind {
        match self {
            Self::MeshPositions => BindingKind::Vertex,
            Self::Instances => BindingKind::ReadOnlyStorage,
            _ => BindingKind::Uniform,
        }
    }

    /// Whether the slot is a shader global (anything but the vertex stream)
    pub const fn is_shader_global(self) -> bool {
        !matches!(self.binding_kind(), BindingKind::Vertex)
    }

    /// WGSL type of the value bound at this slot
    pub fn shader_type_name(self) -> String {
        match self {
            Self::MeshPositions => "VertexIn".to_string(),
            Self::Uniforms => "Uniform".to_string(),
            Self::Instances => "array<InstanceUniform>".to_string(),
            Self::CameraInfo => "CameraInfo".to_string(),
            Self::MaterialInfo => "MaterialInfo".to_string(),
            Self::DirectionalLightInfo => {
                format!("array<DirectionalLight, {NUMBER_OF_DIRECTIONAL_LIGHTS}>")
            }
            Self::PointLightInfo => format!("array<PointLight, {NUMBER_OF_POINT_LIGHTS}>"),
            Self::SpotLightInfo => format!("array<SpotLight, {NUMBER_OF_SPOT_LIGHTS}>"),
            Self::Constants => "Constants".to_string(),
            Self::Toon => "ToonConstants".to_string(),
            Self::FireBall => "FireBallConstants".to_string(),
            Self::ShadowPass => "ShadowPass".to_string(),
            Self::MainPass => "MainPass".to_string(),
            Self::ObjectData => "ObjectData".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_buffer_slots_are_injective() {
        let slots: HashSet<u32> = BufferIndex::ALL.iter().map(|k| k.slot()).collect();
        assert_eq!(slots.len(), BufferIndex::ALL.len());
    }

    #[test]
    fn test_every_registry_round_trips_through_from_slot() {
        for &kind in BufferIndex::ALL {
            assert_eq!(BufferIndex::from_slot(kind.slot()), Some(kind));
        }
        for &kind in VertexAttribute::ALL {
            assert_eq!(VertexAttribute::from_slot(kind.slot()), Some(kind));
        }
        for &kind in TextureIndex::ALL {
            assert_eq!(TextureIndex::from_slot(kind.slot()), Some(kind));
        }
        for &kind in SamplerIndex::ALL {
            assert_eq!(SamplerIndex::from_slot(kind.slot()), Some(kind));
        }
    }

    #[test]
    fn test_slot_numbers_are_stable() {
        assert_eq!(BufferIndex::MeshPositions.slot(), 0);
        assert_eq!(BufferIndex::Uniforms.slot(), 1);
        assert_eq!(BufferIndex::Instances.slot(), 2);
        assert_eq!(BufferIndex::CameraInfo.slot(), 3);
        assert_eq!(BufferIndex::MaterialInfo.slot(), 4);
        assert_eq!(BufferIndex::DirectionalLightInfo.slot(), 5);
        assert_eq!(BufferIndex::PointLightInfo.slot(), 6);
        assert_eq!(BufferIndex::SpotLightInfo.slot(), 7);
        assert_eq!(BufferIndex::Constants.slot(), 8);
        assert_eq!(BufferIndex::Toon.slot(), 9);
        assert_eq!(BufferIndex::FireBall.slot(), 10);
        assert_eq!(VertexAttribute::Normal.slot(), 3);
        assert_eq!(TextureIndex::SpecularMap.slot(), 4);
    }

    #[test]
    fn test_unassigned_slot_is_rejected() {
        assert_eq!(BufferIndex::from_slot(14), None);
        let err = VertexAttribute::try_from_slot(7).unwrap_err();
        assert!(matches!(
            err,
            ContractError::UnknownSlot { category: "vertex attribute", slot: 7 }
        ));
    }

    #[test]
    fn test_labels_are_unique() {
        let labels: HashSet<&str> = BufferIndex::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(labels.len(), BufferIndex::ALL.len());
    }

    #[test]
    fn test_binding_kinds() {
        assert_eq!(BufferIndex::MeshPositions.binding_kind(), BindingKind::Vertex);
        assert_eq!(BufferIndex::Instances.binding_kind(), BindingKind::ReadOnlyStorage);
        assert_eq!(BufferIndex::MainPass.binding_kind(), BindingKind::Uniform);
        assert_eq!(BufferIndex::PointLightInfo.shader_type_name(), "array<PointLight, 5>");
        assert_eq!(BufferIndex::Uniforms.to_string(), "uniforms@1");
    }
}
