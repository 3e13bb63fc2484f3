//! Per-frame record hand-off
//!
//! A [`FrameBuilder`] is owned by the one thread that prepares a frame. Once
//! every record is written, [`FrameBuilder::finish`] freezes them into an
//! `Arc<FrameSnapshot>` that any number of threads (encoders, upload workers)
//! read without locking. [`FrameRing`] keeps the last few snapshots alive
//! while the GPU may still be reading them.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::bindings::BufferIndex;
use crate::config::{ConfigError, ContractConfig, MAX_FRAMES_IN_FLIGHT};
use crate::error::ContractResult;
use crate::layout::GpuLayout;
use crate::render::camera::{Camera, CameraInfo};
use crate::render::light_rig::LightRig;
use crate::render::lighting::LightsUniforms;
use crate::render::passes::{
    Constants, FireBallConstants, MainPass, ObjectData, ShadowPass, ToonConstants,
};
use crate::render::uniform::DrawPayload;

/// Render pass whose records are being bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Depth-only pass from the light
    Shadow,
    /// Main pass that samples the shadow map
    ShadowReceiver,
    /// Multi-light Phong pass
    Lit,
    /// Toon-shaded pass
    Toon,
    /// Fire-ball effect pass
    FireBall,
}

/// Immutable records for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    frame_index: u64,
    camera: CameraInfo,
    lights: LightsUniforms,
    constants: Constants,
    toon: ToonConstants,
    fire_ball: FireBallConstants,
    shadow: Option<(ShadowPass, MainPass)>,
    objects: Vec<ObjectData>,
    draws: Vec<DrawPayload>,
}

impl FrameSnapshot {
    /// Monotonic frame number
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Camera record
    pub fn camera(&self) -> &CameraInfo {
        &self.camera
    }

    /// Light record
    pub fn lights(&self) -> &LightsUniforms {
        &self.lights
    }

    /// Shared effect constants
    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    /// Draws recorded for the frame, in submission order
    pub fn draws(&self) -> &[DrawPayload] {
        &self.draws
    }

    /// Per-object records for the shadow passes
    pub fn objects(&self) -> &[ObjectData] {
        &self.objects
    }

    /// Bytes of the [`BufferIndex::ObjectData`] buffer, `None` when no object was added
    fn object_bytes(&self) -> Option<&[u8]> {
        if self.objects.is_empty() {
            None
        } else {
            Some(bytemuck::cast_slice(&self.objects))
        }
    }

    /// Frame-level buffers bound for `pass`
    ///
    /// Returns `None` for the shadow passes when no shadow records were
    /// produced or no object was added, since an empty buffer cannot be bound.
    pub fn bindings_for(&self, pass: PassKind) -> Option<Vec<(BufferIndex, &[u8])>> {
        let lights = self.lights.bindings();
        let bindings = match pass {
            PassKind::Shadow => {
                let (shadow, _) = self.shadow.as_ref()?;
                vec![
                    (BufferIndex::ShadowPass, shadow.as_bytes()),
                    (BufferIndex::ObjectData, self.object_bytes()?),
                ]
            }
            PassKind::ShadowReceiver => {
                let (_, main) = self.shadow.as_ref()?;
                vec![
                    (BufferIndex::MainPass, main.as_bytes()),
                    (BufferIndex::ObjectData, self.object_bytes()?),
                ]
            }
            PassKind::Lit => {
                let mut bindings = vec![(BufferIndex::CameraInfo, self.camera.as_bytes())];
                bindings.extend(lights);
                bindings
            }
            PassKind::Toon => vec![
                (BufferIndex::CameraInfo, self.camera.as_bytes()),
                lights[0],
                (BufferIndex::Constants, self.constants.as_bytes()),
                (BufferIndex::Toon, self.toon.as_bytes()),
            ],
            PassKind::FireBall => vec![
                (BufferIndex::Constants, self.constants.as_bytes()),
                (BufferIndex::FireBall, self.fire_ball.as_bytes()),
            ],
        };
        Some(bindings)
    }
}

/// Single-writer builder for a [`FrameSnapshot`]
#[derive(Debug)]
pub struct FrameBuilder {
    snapshot: FrameSnapshot,
}

impl FrameBuilder {
    /// Start frame `frame_index` with a default camera and no light
    pub fn new(frame_index: u64) -> Self {
        Self {
            snapshot: FrameSnapshot {
                frame_index,
                camera: Camera::default().camera_info(),
                lights: bytemuck::Zeroable::zeroed(),
                constants: Constants::default(),
                toon: ToonConstants::default(),
                fire_ball: FireBallConstants::default(),
                shadow: None,
                objects: Vec::new(),
                draws: Vec::new(),
            },
        }
    }

    /// Set the camera
    pub fn camera(&mut self, camera: &Camera) -> &mut Self {
        self.snapshot.camera = camera.camera_info();
        self
    }

    /// Set the light record directly
    pub fn lights(&mut self, lights: LightsUniforms) -> &mut Self {
        self.snapshot.lights = lights;
        self
    }

    /// Pack `rig` for this frame, attaching camera-following spots to the current camera
    pub fn light_rig(&mut self, rig: &LightRig) -> ContractResult<&mut Self> {
        let mut rig = rig.clone();
        rig.attach_spot_to(&self.snapshot.camera);
        self.snapshot.lights = rig.build()?;
        Ok(self)
    }

    /// Set scene time and the effect parameters derived from it
    pub fn effects(&mut self, time: f32, toon_edge: f32, fire_ball_frequency: f32, fire_ball_explosion: f32) -> &mut Self {
        self.snapshot.constants = Constants { time };
        self.snapshot.toon = ToonConstants { toon_edge };
        self.snapshot.fire_ball = FireBallConstants::at(time, fire_ball_frequency, fire_ball_explosion);
        self
    }

    /// Set the shadow records
    pub fn shadow(&mut self, shadow: ShadowPass, main: MainPass) -> &mut Self {
        self.snapshot.shadow = Some((shadow, main));
        self
    }

    /// Add an object to the shadow passes
    pub fn object(&mut self, object: ObjectData) -> &mut Self {
        self.snapshot.objects.push(object);
        self
    }

    /// Record a draw
    pub fn draw(&mut self, draw: DrawPayload) -> &mut Self {
        self.snapshot.draws.push(draw);
        self
    }

    /// Freeze the records for readers
    pub fn finish(self) -> Arc<FrameSnapshot> {
        log::debug!(
            "Frame {} ready: {} draw(s), {} shadow object(s)",
            self.snapshot.frame_index,
            self.snapshot.draws.len(),
            self.snapshot.objects.len()
        );
        Arc::new(self.snapshot)
    }
}

/// Published snapshots that may still be in use by the GPU
#[derive(Debug)]
pub struct FrameRing {
    frames_in_flight: usize,
    frames: VecDeque<Arc<FrameSnapshot>>,
}

impl FrameRing {
    /// Create a ring holding `frames_in_flight` snapshots (1 to 3)
    pub fn new(frames_in_flight: usize) -> ContractResult<Self> {
        if !(1..=MAX_FRAMES_IN_FLIGHT).contains(&frames_in_flight) {
            return Err(ConfigError::Invalid {
                field: "frames_in_flight",
                reason: format!("must be between 1 and {MAX_FRAMES_IN_FLIGHT}, got {frames_in_flight}"),
            }
            .into());
        }
        Ok(Self {
            frames_in_flight,
            frames: VecDeque::with_capacity(frames_in_flight),
        })
    }

    /// Create a ring sized from configuration
    pub fn from_config(config: &ContractConfig) -> ContractResult<Self> {
        Self::new(config.frames_in_flight)
    }

    /// Publish a snapshot, returning the one it retires once the ring is full
    pub fn publish(&mut self, snapshot: Arc<FrameSnapshot>) -> Option<Arc<FrameSnapshot>> {
        let retired = if self.frames.len() == self.frames_in_flight {
            self.frames.pop_front()
        } else {
            None
        };
        if let Some(old) = &retired {
            log::trace!("Retiring frame {}", old.frame_index());
        }
        self.frames.push_back(snapshot);
        retired
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> Option<&Arc<FrameSnapshot>> {
        self.frames.back()
    }

    /// Number of snapshots currently held
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether nothing has been published yet
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
