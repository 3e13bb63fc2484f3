//! Byte layout descriptors for records shared with shader code
//!
//! Host layouts are measured from the Rust structs with `memoffset`, shader
//! layouts are measured from the WGSL module (see [`crate::shader`]), and
//! [`StructLayout::check_against`] compares the two.

pub mod schema;

use std::fmt;
use std::ops::Range;

use bytemuck::Pod;

use crate::error::{ContractError, ContractResult};

/// One member of a struct: name, byte offset and byte size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    /// Member name
    pub name: String,
    /// Byte offset from the start of the struct
    pub offset: usize,
    /// Size of the member in bytes
    pub size: usize,
    /// Host-only filler that mirrors implicit shader padding
    pub padding: bool,
}

impl FieldLayout {
    /// Create a field from a measured byte span
    ///
    /// Names starting with `_` are host filler and are marked as padding.
    pub fn measured(name: &str, span: Range<usize>) -> Self {
        Self {
            name: name.to_string(),
            offset: span.start,
            size: span.end - span.start,
            padding: name.starts_with('_'),
        }
    }

    /// Byte just past the end of the member
    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// Size, alignment and member layout of one struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructLayout {
    /// Struct name as declared in shader code
    pub name: String,
    /// Total size in bytes, including trailing padding
    pub size: usize,
    /// Required alignment in bytes
    pub align: usize,
    /// Members in declaration order
    pub fields: Vec<FieldLayout>,
}

impl StructLayout {
    /// Look up a member by name
    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Members that carry contract data (host filler excluded)
    pub fn contract_fields(&self) -> impl Iterator<Item = &FieldLayout> {
        self.fields.iter().filter(|f| !f.padding)
    }

    /// Bytes not covered by any member
    pub fn implicit_padding(&self) -> usize {
        self.size - self.fields.iter().map(|f| f.size).sum::<usize>()
    }

    /// Compare a host layout against the shader's layout of the same struct
    ///
    /// Sizes and alignments must be equal, and the host's contract fields must
    /// match the shader's members one to one in order, name, offset and size.
    pub fn check_against(&self, shader: &Self) -> ContractResult<()> {
        let mismatch = |detail: String| ContractError::LayoutMismatch {
            struct_name: shader.name.clone(),
            detail,
        };

        if self.size != shader.size {
            return Err(mismatch(format!(
                "host size {} != shader size {}",
                self.size, shader.size
            )));
        }
        if self.align != shader.align {
            return Err(mismatch(format!(
                "host alignment {} != shader alignment {}",
                self.align, shader.align
            )));
        }

        let mut host_fields = self.contract_fields();
        for member in &shader.fields {
            let Some(field) = host_fields.next() else {
                return Err(mismatch(format!("host has no field for shader member `{}`", member.name)));
            };
            if field.name != member.name {
                return Err(mismatch(format!(
                    "field `{}` on host where shader declares `{}` at offset {}",
                    field.name, member.name, member.offset
                )));
            }
            if field.offset != member.offset {
                return Err(mismatch(format!(
                    "`{}` at host offset {} but shader offset {}",
                    field.name, field.offset, member.offset
                )));
            }
            if field.size != member.size {
                return Err(mismatch(format!(
                    "`{}` is {} bytes on host but {} in shader",
                    field.name, field.size, member.size
                )));
            }
        }
        if let Some(extra) = host_fields.next() {
            return Err(mismatch(format!("host field `{}` is not declared in the shader", extra.name)));
        }
        Ok(())
    }
}

impl fmt::Display for StructLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (size {}, align {})", self.name, self.size, self.align)?;
        for field in &self.fields {
            let marker = if field.padding { " (pad)" } else { "" };
            writeln!(f, "  {:>4} {:<24} {:>4}{}", field.offset, field.name, field.size, marker)?;
        }
        Ok(())
    }
}

/// A plain-data record with a shader-side twin
pub trait GpuLayout: Pod {
    /// Name of the matching struct in WGSL
    const SHADER_NAME: &'static str;

    /// Layout of the host struct, measured from the type itself
    fn host_layout() -> StructLayout;

    /// Raw bytes as uploaded to the GPU
    fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Implement [`GpuLayout`] by measuring the listed fields of a struct
///
/// Every field must be listed in declaration order, filler included.
macro_rules! gpu_layout {
    ($ty:path => $shader:literal { $($field:ident),+ $(,)? }) => {
        impl $crate::layout::GpuLayout for $ty {
            const SHADER_NAME: &'static str = $shader;

            fn host_layout() -> $crate::layout::StructLayout {
                $crate::layout::StructLayout {
                    name: $shader.to_string(),
                    size: ::std::mem::size_of::<$ty>(),
                    align: ::std::mem::align_of::<$ty>(),
                    fields: vec![
                        $($crate::layout::FieldLayout::measured(
                            stringify!($field),
                            ::memoffset::span_of!($ty, $field),
                        )),+
                    ],
                }
            }
        }
    };
}

pub(crate) use gpu_layout;
