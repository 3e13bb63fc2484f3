//! Shader-side declarations and reflection-based conformance checks
//!
//! The WGSL sources under `shaders/` are compiled into the crate. Each pass
//! shader is checked with the shared type declarations prepended, so every
//! pass sees exactly the structs the host lays out.

mod reflection;

#[cfg(test)]
mod conformance_tests;

pub use reflection::{ConformanceReport, GlobalBinding, ShaderReflection, VertexInput};

use crate::error::ContractResult;

/// A bundled WGSL source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSource {
    /// File name under `shaders/`
    pub name: &'static str,
    /// WGSL text
    pub source: &'static str,
}

impl ShaderSource {
    /// Shared record declarations
    pub const TYPES: Self = Self {
        name: "shader_types.wgsl",
        source: include_str!("../../shaders/shader_types.wgsl"),
    };

    /// Multi-light Phong pass
    pub const LIGHTING: Self = Self {
        name: "lighting.wgsl",
        source: include_str!("../../shaders/lighting.wgsl"),
    };

    /// Shadow and shadow-receiving passes
    pub const SHADOW: Self = Self {
        name: "shadow.wgsl",
        source: include_str!("../../shaders/shadow.wgsl"),
    };

    /// Toon and fire-ball effects
    pub const EFFECTS: Self = Self {
        name: "effects.wgsl",
        source: include_str!("../../shaders/effects.wgsl"),
    };

    /// Every pass shader
    pub const PASSES: [Self; 3] = [Self::LIGHTING, Self::SHADOW, Self::EFFECTS];

    /// Source with the shared declarations prepended
    pub fn composed(&self) -> String {
        if *self == Self::TYPES {
            self.source.to_string()
        } else {
            format!("{}\n{}", Self::TYPES.source, self.source)
        }
    }

    /// Reflect the composed source
    pub fn reflect(&self) -> ContractResult<ShaderReflection> {
        ShaderReflection::from_wgsl(&self.composed())
    }

    /// Reflect and run every conformance check
    pub fn verify(&self) -> ContractResult<ConformanceReport> {
        let report = self.reflect()?.verify_all()?;
        log::info!("{}: {}", self.name, report);
        Ok(report)
    }
}
