//! The model pipeline: one asset, fetched once, normalized for display.
//!
//! The fetch runs as a spawned task and reports back through tagged
//! [`LoadEvent`]s; [`ModelPipeline`] is the single observer consuming them.
//! Success yields a staged, material-normalized [`ModelData`] exactly once;
//! failure is terminal and leaves the scene untouched. There is no retry,
//! cancellation or timeout: a hung fetch simply never produces an event.

use cgmath::Vector3;

use crate::scene::{data::ModelData, material::normalize_materials};

/// The asset displayed by the viewer.
pub const MODEL_ASSET: &str = "camera.glb";

/// Uniform scale applied to the model root before display.
pub const DISPLAY_SCALE: f32 = 1.2;
/// Vertical offset applied to the model root before display.
pub const DISPLAY_LIFT: f32 = 0.8;

/// An observation reported by the in-flight fetch task.
pub enum LoadEvent {
    /// Percent complete. Zero or many of these may arrive.
    Progress(f32),
    /// The decoded asset. Arrives at most once.
    Ready(ModelData),
    /// Fetch or decode error. Terminal.
    Failed(anyhow::Error),
}

/// Pipeline lifecycle. `Ready` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Consumes [`LoadEvent`]s and tracks the pipeline lifecycle.
#[derive(Debug)]
pub struct ModelPipeline {
    phase: LoadPhase,
}

impl ModelPipeline {
    pub fn new() -> Self {
        Self {
            phase: LoadPhase::Idle,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Marks the fetch as started. Returns false if a fetch already ran;
    /// the pipeline fires once per process lifetime.
    pub fn begin(&mut self) -> bool {
        if self.phase != LoadPhase::Idle {
            log::warn!("model pipeline already started, ignoring begin");
            return false;
        }
        self.phase = LoadPhase::Loading;
        true
    }

    /// Feeds one event through the pipeline.
    ///
    /// On the first `Ready` while loading, stages the model for display
    /// (root transform constants, material normalization) and hands it to
    /// the caller for upload and scene attachment. Every other case is
    /// diagnostics only. Events arriving in a terminal phase are dropped.
    pub fn observe(&mut self, event: LoadEvent) -> Option<ModelData> {
        match (self.phase, event) {
            (LoadPhase::Loading, LoadEvent::Progress(percent)) => {
                log::info!("loading model: {:.0}%", percent);
                None
            }
            (LoadPhase::Loading, LoadEvent::Ready(mut model)) => {
                self.phase = LoadPhase::Ready;
                stage_for_display(&mut model);
                let visited = normalize_materials(&mut model);
                log::info!("model {} ready, {} meshes normalized", model.label, visited);
                Some(model)
            }
            (LoadPhase::Loading, LoadEvent::Failed(err)) => {
                self.phase = LoadPhase::Failed;
                log::error!("error loading model: {:#}", err);
                None
            }
            (phase, _) => {
                log::warn!("ignoring load event in phase {:?}", phase);
                None
            }
        }
    }
}

impl Default for ModelPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the fixed display transform to the model root. The constants are
/// tuned for this asset, not derived from its content.
pub fn stage_for_display(model: &mut ModelData) {
    model.transform.scale = Vector3::new(DISPLAY_SCALE, DISPLAY_SCALE, DISPLAY_SCALE);
    model.transform.position.y = DISPLAY_LIFT;
}
