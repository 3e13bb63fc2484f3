//! Vertex attribute schema
//!
//! One table describes where each attribute lives inside [`Vertex`]. The
//! host vertex-buffer description ([`Vertex::layout`], and the Vulkan one in
//! [`crate::backend::vulkan`]) and the shader's `VertexIn` declaration
//! ([`wgsl_vertex_input`]) are both generated from it.
//!
//! Position, colour and normal each occupy a 16-byte slot. The texture
//! coordinate is a tightly packed pair of floats in the slot after the
//! position; the rest of that slot is filler. The stride is 64 bytes.

use std::fmt::Write as _;

use bytemuck::{Pod, Zeroable};

use crate::bindings::{BufferIndex, VertexAttribute};
use crate::error::{ContractError, ContractResult};

/// Interleaved mesh vertex as stored in the [`BufferIndex::MeshPositions`] buffer
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    _pad0: f32,
    /// Texture coordinate, tightly packed
    pub tex_coord: [f32; 2],
    _pad1: [f32; 2],
    /// Vertex colour (RGBA)
    pub color: [f32; 4],
    /// Object-space normal
    pub normal: [f32; 3],
    _pad2: f32,
}

const _: () = assert!(std::mem::size_of::<Vertex>() == 64);

/// Component format of one vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// Two 32-bit floats
    Float32x2,
    /// Three 32-bit floats
    Float32x3,
    /// Four 32-bit floats
    Float32x4,
}

impl VertexFormat {
    /// Number of components
    pub const fn components(self) -> u32 {
        match self {
            Self::Float32x2 => 2,
            Self::Float32x3 => 3,
            Self::Float32x4 => 4,
        }
    }

    /// Size in bytes
    pub const fn size(self) -> u32 {
        self.components() * 4
    }

    /// Matching WGSL type
    pub const fn wgsl_type(self) -> &'static str {
        match self {
            Self::Float32x2 => "vec2<f32>",
            Self::Float32x3 => "vec3<f32>",
            Self::Float32x4 => "vec4<f32>",
        }
    }
}

/// Rate at which a vertex buffer advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexStepMode {
    /// Once per vertex
    PerVertex,
    /// Once per instance
    PerInstance,
}

/// Location, format and offset of one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttributeDescriptor {
    /// Attribute kind, which also fixes its `@location`
    pub attribute: VertexAttribute,
    /// Component format
    pub format: VertexFormat,
    /// Byte offset within one vertex
    pub offset: u32,
}

impl VertexAttributeDescriptor {
    /// Shader location of the attribute
    pub const fn location(&self) -> u32 {
        self.attribute.slot()
    }

    fn end(&self) -> u32 {
        self.offset + self.format.size()
    }
}

/// Description of one vertex buffer and its attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayoutDescriptor {
    /// Buffer slot the vertex stream is bound at
    pub buffer: BufferIndex,
    /// Distance between consecutive vertices in bytes
    pub stride: u32,
    /// Step mode
    pub step: VertexStepMode,
    /// Attributes in location order
    pub attributes: Vec<VertexAttributeDescriptor>,
}

impl VertexLayoutDescriptor {
    /// Descriptor of a single attribute
    pub fn attribute(&self, attribute: VertexAttribute) -> Option<&VertexAttributeDescriptor> {
        self.attributes.iter().find(|a| a.attribute == attribute)
    }

    /// Check that attributes are disjoint, inside the stride and 4-byte aligned
    pub fn validate(&self) -> ContractResult<()> {
        let invalid = |msg: String| Err(ContractError::InvalidVertexLayout(msg));

        if self.buffer.binding_kind() != crate::bindings::BindingKind::Vertex {
            return invalid(format!("{} is not a vertex buffer slot", self.buffer));
        }

        let mut sorted: Vec<_> = self.attributes.clone();
        sorted.sort_by_key(|a| a.offset);

        for (i, attr) in sorted.iter().enumerate() {
            if attr.offset % 4 != 0 {
                return invalid(format!("{} offset {} is not 4-byte aligned", attr.attribute, attr.offset));
            }
            if attr.end() > self.stride {
                return invalid(format!(
                    "{} ends at byte {} past the {}-byte stride",
                    attr.attribute,
                    attr.end(),
                    self.stride
                ));
            }
            if let Some(next) = sorted.get(i + 1) {
                if attr.end() > next.offset {
                    return invalid(format!("{} overlaps {}", attr.attribute, next.attribute));
                }
            }
            if sorted[..i].iter().any(|a| a.attribute == attr.attribute) {
                return invalid(format!("{} declared twice", attr.attribute));
            }
        }
        Ok(())
    }
}

impl Vertex {
    /// Create a vertex
    pub fn new(position: [f32; 3], tex_coord: [f32; 2], color: [f32; 4], normal: [f32; 3]) -> Self {
        Self {
            position,
            tex_coord,
            color,
            normal,
            ..Zeroable::zeroed()
        }
    }

    /// Vertex buffer layout, with offsets measured from the struct
    pub fn layout() -> VertexLayoutDescriptor {
        let offset = |o: usize| o as u32;
        VertexLayoutDescriptor {
            buffer: BufferIndex::MeshPositions,
            stride: std::mem::size_of::<Self>() as u32,
            step: VertexStepMode::PerVertex,
            attributes: vec![
                VertexAttributeDescriptor {
                    attribute: VertexAttribute::Position,
                    format: VertexFormat::Float32x3,
                    offset: offset(memoffset::offset_of!(Vertex, position)),
                },
                VertexAttributeDescriptor {
                    attribute: VertexAttribute::TexCoord,
                    format: VertexFormat::Float32x2,
                    offset: offset(memoffset::offset_of!(Vertex, tex_coord)),
                },
                VertexAttributeDescriptor {
                    attribute: VertexAttribute::Color,
                    format: VertexFormat::Float32x4,
                    offset: offset(memoffset::offset_of!(Vertex, color)),
                },
                VertexAttributeDescriptor {
                    attribute: VertexAttribute::Normal,
                    format: VertexFormat::Float32x3,
                    offset: offset(memoffset::offset_of!(Vertex, normal)),
                },
            ],
        }
    }
}

/// Shader-side `VertexIn` declaration generated from [`Vertex::layout`]
pub fn wgsl_vertex_input() -> String {
    let mut out = String::from("struct VertexIn {\n");
    for attr in Vertex::layout().attributes {
        let _ = writeln!(
            out,
            "    @location({}) {}: {},",
            attr.location(),
            attr.attribute.label(),
            attr.format.wgsl_type()
        );
    }
    out.push_str("}\n");
    out
}
