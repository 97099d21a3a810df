//! Audio envelope → per-frame modulation levels.
//!
//! No decoding happens here: the envelope is injected pre-analyzed (one level
//! per frame, nominally in [0, 1]). Bindings pick which targets a level feeds
//! and how a consumer should combine it.

use compositor_core::{AudioLevels, AudioTarget, ModulationMode, ModulationRange};
use serde::{Deserialize, Serialize};

/// Routes the envelope to one modulation target. `gain` scales the analyzed
/// level before it lands in the snapshot; `mode`/`range` describe how generic
/// consumers should combine it with a base value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AudioBinding {
    pub target: AudioTarget,
    #[serde(default)]
    pub mode: ModulationMode,
    #[serde(default)]
    pub range: Option<ModulationRange>,
    #[serde(default = "default_gain")]
    pub gain: f64,
}

fn default_gain() -> f64 {
    1.0
}

impl AudioBinding {
    pub fn new(target: AudioTarget) -> Self {
        Self {
            target,
            mode: ModulationMode::default(),
            range: None,
            gain: 1.0,
        }
    }

    /// Applies this binding's modulation to `base` against a snapshot.
    pub fn apply(&self, base: f64, levels: &AudioLevels) -> f64 {
        levels.apply(base, self.target, self.mode, self.range)
    }
}

/// Pre-analyzed audio levels, one per frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioEnvelope {
    levels: Vec<f64>,
}

impl AudioEnvelope {
    pub fn new(levels: Vec<f64>) -> Self {
        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level at `frame`. Frames before the envelope are silent; frames past
    /// its end hold the final level.
    pub fn level_at(&self, frame: i64) -> f64 {
        if frame < 0 {
            return 0.0;
        }
        match self.levels.get(frame as usize) {
            Some(level) => *level,
            None => self.levels.last().copied().unwrap_or(0.0),
        }
    }

    /// Builds the per-frame snapshot the evaluation pass reads: every bound
    /// target receives the frame's level times the binding gain, clamped to
    /// the nominal [0, 1].
    pub fn materialize(&self, frame: i64, bindings: &[AudioBinding]) -> AudioLevels {
        let level = self.level_at(frame);
        bindings
            .iter()
            .map(|binding| (binding.target, (level * binding.gain).clamp(0.0, 1.0)))
            .collect()
    }
}
