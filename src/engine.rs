//! The compositor: layer stack, snapshot injection, and the seams to the
//! scene graph and renderer.

use anyhow::{Context, Result};
use compositor_core::{
    evaluate_frame, seconds_to_frame, AudioLevels, DrivenValues, EvalContext, EvaluatedPath,
    LayerEvaluation,
};
use compositor_data::model::Layer;
use glam::DMat4;

/// Scene-graph operations the engine needs from its host. Transforms arrive
/// as composed local matrices; parent-space combination stays on the host
/// side.
pub trait SceneGraphHandle {
    fn set_local_transform(&mut self, layer: &str, transform: DMat4);
    fn set_opacity(&mut self, layer: &str, opacity: f64);
    fn attach(&mut self, layer: &str);
    fn detach(&mut self, layer: &str);
}

/// Renderer-side acceptor for evaluated vector geometry.
pub trait PathSink {
    fn accept(&mut self, layer: &str, path: &EvaluatedPath);
}

/// Owns the declarative layers plus the per-pass driven and audio snapshots.
///
/// Snapshots are swapped wholesale between passes and read-only during one
/// frame's evaluation; evaluation itself is synchronous and self-contained,
/// so stopping mid-sequence needs no teardown.
pub struct Compositor {
    layers: Vec<Layer>,
    fps: f64,
    driven: DrivenValues,
    audio: AudioLevels,
}

impl Compositor {
    pub fn new(fps: f64) -> Self {
        Self {
            layers: Vec::new(),
            fps,
            driven: DrivenValues::new(),
            audio: AudioLevels::new(),
        }
    }

    /// Loads a layer stack from its JSON form. Keyframes are normalized
    /// (sorted, duplicate frames last-wins) on the way in; a genuinely
    /// invalid layer is a loading error, not an evaluation-time panic.
    pub fn from_json(json: &str, fps: f64) -> Result<Self> {
        let mut layers: Vec<Layer> =
            serde_json::from_str(json).context("parsing layer stack")?;
        for layer in &mut layers {
            layer.normalize();
        }
        let mut compositor = Self::new(fps);
        compositor.layers = layers;
        Ok(compositor)
    }

    pub fn push_layer(&mut self, mut layer: Layer) {
        layer.normalize();
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Seconds → frame for time-remap consumers. Truncation is `floor`.
    pub fn frame_at(&self, seconds: f64) -> i64 {
        seconds_to_frame(seconds, self.fps)
    }

    /// Replaces the driven-value snapshot for subsequent passes.
    pub fn set_driven_values(&mut self, driven: DrivenValues) {
        self.driven = driven;
    }

    /// Replaces the audio-level snapshot for subsequent passes.
    pub fn set_audio_levels(&mut self, audio: AudioLevels) {
        self.audio = audio;
    }

    /// Evaluates every layer at `frame`, in stack order. One entry per layer;
    /// hidden layers stay `Hidden` rather than carrying stale state.
    pub fn evaluate_frame(&self, frame: i64) -> Vec<LayerEvaluation> {
        let ctx = EvalContext {
            frame,
            driven: &self.driven,
            audio: &self.audio,
        };
        self.layers
            .iter()
            .map(|layer| evaluate_frame(layer, &ctx))
            .collect()
    }

    /// Evaluates `frame` and pushes the results into the host seams: hidden
    /// layers detach, visible layers attach and receive transform, opacity,
    /// and geometry.
    pub fn apply_frame(
        &self,
        frame: i64,
        scene: &mut dyn SceneGraphHandle,
        sink: &mut dyn PathSink,
    ) {
        for (layer, evaluation) in self.layers.iter().zip(self.evaluate_frame(frame)) {
            match evaluation {
                LayerEvaluation::Hidden => scene.detach(&layer.name),
                LayerEvaluation::Visible(state) => {
                    scene.attach(&layer.name);
                    scene.set_local_transform(&layer.name, state.transform.matrix());
                    scene.set_opacity(&layer.name, state.opacity);
                    for path in &state.paths {
                        sink.accept(&layer.name, path);
                    }
                    tracing::trace!(
                        layer = %layer.name,
                        frame,
                        paths = state.paths.len(),
                        "applied layer state"
                    );
                }
            }
        }
    }
}
