//! Backend-specific descriptions derived from the shared contract

pub mod vulkan;
