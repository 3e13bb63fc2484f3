//! Error types for contract producers and conformance checks

use crate::bindings::BufferIndex;
use crate::config::ConfigError;

/// Result type for contract operations
pub type ContractResult<T> = Result<T, ContractError>;

/// Errors raised while producing GPU records or checking them against shader code
#[derive(thiserror::Error, Debug)]
pub enum ContractError {
    /// A light array was populated with the wrong number of entries
    #[error("Expected exactly {expected} {kind} light(s), got {actual}")]
    LightCount {
        /// Light variant ("directional", "point" or "spot")
        kind: &'static str,
        /// Fixed length of the array in the light buffer
        expected: usize,
        /// Number of lights supplied by the producer
        actual: usize,
    },

    /// A light direction is zero or not finite
    #[error("{kind} light {index} has a zero or non-finite direction")]
    InvalidDirection {
        /// Light variant ("directional" or "spot")
        kind: &'static str,
        /// Position of the light in its array
        index: usize,
    },

    /// More instances were pushed than the instance buffer was sized for
    #[error("Instance buffer full: capacity is {capacity} instance(s)")]
    InstanceOverflow {
        /// Capacity the buffer was created with
        capacity: usize,
    },

    /// A byte slice could not be read as an array of records
    #[error("Byte length {len} is not a multiple of the {stride}-byte record stride")]
    MisalignedBytes {
        /// Length of the rejected slice
        len: usize,
        /// Size of one record
        stride: usize,
    },

    /// A slot number does not belong to any registry entry
    #[error("No {category} is registered at slot {slot}")]
    UnknownSlot {
        /// Registry category ("buffer", "vertex attribute", ...)
        category: &'static str,
        /// Rejected slot number
        slot: u32,
    },

    /// WGSL source failed to parse
    #[error("Shader parse error:\n{0}")]
    ShaderParse(String),

    /// WGSL module parsed but failed validation
    #[error("Shader validation error: {0}")]
    ShaderValidation(String),

    /// A struct the host shares is not declared by the shader
    #[error("Shader does not declare struct `{0}`")]
    MissingStruct(String),

    /// Host and shader disagree on a struct layout
    #[error("Layout mismatch in `{struct_name}`: {detail}")]
    LayoutMismatch {
        /// Shader-side struct name
        struct_name: String,
        /// First difference found
        detail: String,
    },

    /// A buffer is bound at the wrong slot or with the wrong type
    #[error("Binding mismatch at {slot:?}: {detail}")]
    BindingMismatch {
        /// Registry entry being checked
        slot: BufferIndex,
        /// What differs
        detail: String,
    },

    /// Texture or sampler binding differs from the registry
    #[error("Resource binding mismatch for `{name}`: {detail}")]
    ResourceBindingMismatch {
        /// Shader-side global name
        name: String,
        /// What differs
        detail: String,
    },

    /// Vertex input declaration differs from the host vertex layout
    #[error("Vertex input mismatch: {0}")]
    VertexInputMismatch(String),

    /// The host vertex layout descriptor is internally inconsistent
    #[error("Invalid vertex layout: {0}")]
    InvalidVertexLayout(String),

    /// A shader constant differs from its host value
    #[error("Shader constant `{name}`: {detail}")]
    ConstantMismatch {
        /// Constant name
        name: String,
        /// What differs
        detail: String,
    },

    /// Shader source was written against a different layout revision
    #[error("Shader declares layout schema {found:?}, host is at revision {expected}")]
    SchemaMismatch {
        /// Host revision
        expected: u32,
        /// Revision found in the shader marker, if any
        found: Option<u32>,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
