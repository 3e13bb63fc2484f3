//! Records the host writes and the shaders read
//!
//! - [`vertex`]: vertex stream layout
//! - [`uniform`]: per-object transforms, materials and instance buffers
//! - [`camera`]: camera and the camera record
//! - [`lighting`]: light records and the reference shading model
//! - [`light_rig`]: serializable light setup that builds the light records
//! - [`passes`]: shadow, main-pass and effect records
//! - [`frame`]: per-frame hand-off between threads

pub mod camera;
pub mod frame;
pub mod light_rig;
pub mod lighting;
pub mod passes;
pub mod uniform;
pub mod vertex;

pub use camera::{Camera, CameraInfo};
pub use frame::{FrameBuilder, FrameRing, FrameSnapshot, PassKind};
pub use light_rig::LightRig;
pub use lighting::{
    Attenuation, BaseLight, DirectionalLight, Fragment, LightsUniforms, PointLight, SpotLight,
};
pub use passes::{Constants, FireBallConstants, MainPass, ObjectData, ShadowPass, ToonConstants};
pub use uniform::{DrawPayload, InstanceBuffer, InstanceUniform, MaterialInfo, Uniform};
pub use vertex::{Vertex, VertexLayoutDescriptor};
