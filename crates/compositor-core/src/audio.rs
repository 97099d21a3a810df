use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters an audio analysis value can modulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AudioTarget {
    LayerOpacity,
    LayerScale,
    LayerRotation,
    PositionX,
    PositionY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModulationMode {
    #[default]
    Add,
    Multiply,
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModulationRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// Additive scale for `Add` mode: a full-scale audio value (1.0) pushes a
/// property by 100 units, the typical magnitude of position/opacity/scale
/// channels. Compatibility constant; do not re-derive.
pub const ADD_MODE_SCALE: f64 = 100.0;

/// Immutable per-frame snapshot of audio-analysis values, nominally in [0,1].
/// Absent targets mean no modulation.
#[derive(Debug, Clone, Default)]
pub struct AudioLevels(HashMap<AudioTarget, f64>);

impl AudioLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, target: AudioTarget, value: f64) {
        self.0.insert(target, value);
    }

    pub fn get(&self, target: AudioTarget) -> f64 {
        self.0.get(&target).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Applies audio modulation to `base`. A level of exactly 0.0 (the
    /// additive identity, not a magnitude threshold) short-circuits to the
    /// unmodified base for every mode. Applied after driver resolution, as
    /// the last stage before transform composition.
    pub fn apply(
        &self,
        base: f64,
        target: AudioTarget,
        mode: ModulationMode,
        range: Option<ModulationRange>,
    ) -> f64 {
        let level = self.get(target);
        if level == 0.0 {
            return base;
        }

        let modulated = match mode {
            // 0.5 is unity gain: 0 halves, 1 doubles.
            ModulationMode::Multiply => base * (0.5 + level),
            ModulationMode::Replace => level,
            ModulationMode::Add => base + level * ADD_MODE_SCALE,
        };

        match range {
            Some(ModulationRange { min, max }) => {
                let mut v = modulated;
                if let Some(lo) = min {
                    v = v.max(lo);
                }
                if let Some(hi) = max {
                    v = v.min(hi);
                }
                v
            }
            None => modulated,
        }
    }

    /// Uniform multiplier for the `LayerScale` special case: one audio value
    /// drives both X and Y through `0.5 + level`, after per-axis driver
    /// resolution.
    pub fn scale_multiplier(&self) -> f64 {
        let level = self.get(AudioTarget::LayerScale);
        if level == 0.0 {
            1.0
        } else {
            0.5 + level
        }
    }
}

impl FromIterator<(AudioTarget, f64)> for AudioLevels {
    fn from_iter<I: IntoIterator<Item = (AudioTarget, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_target_is_identity_for_every_mode() {
        let levels = AudioLevels::new();
        for mode in [
            ModulationMode::Add,
            ModulationMode::Multiply,
            ModulationMode::Replace,
        ] {
            assert_eq!(levels.apply(37.0, AudioTarget::LayerOpacity, mode, None), 37.0);
        }
    }

    #[test]
    fn multiply_gain_curve() {
        let levels: AudioLevels = [(AudioTarget::LayerScale, 0.5)].into_iter().collect();
        assert_eq!(
            levels.apply(80.0, AudioTarget::LayerScale, ModulationMode::Multiply, None),
            80.0
        );
        let loud: AudioLevels = [(AudioTarget::LayerScale, 1.0)].into_iter().collect();
        assert_eq!(
            loud.apply(80.0, AudioTarget::LayerScale, ModulationMode::Multiply, None),
            160.0
        );
    }

    #[test]
    fn add_mode_scales_onto_property_range() {
        let levels: AudioLevels = [(AudioTarget::PositionX, 0.25)].into_iter().collect();
        assert_eq!(
            levels.apply(10.0, AudioTarget::PositionX, ModulationMode::Add, None),
            35.0
        );
    }

    #[test]
    fn replace_discards_base() {
        let levels: AudioLevels = [(AudioTarget::LayerRotation, 0.7)].into_iter().collect();
        assert_eq!(
            levels.apply(999.0, AudioTarget::LayerRotation, ModulationMode::Replace, None),
            0.7
        );
    }

    #[test]
    fn range_bounds_clamp_independently() {
        let levels: AudioLevels = [(AudioTarget::LayerOpacity, 1.0)].into_iter().collect();
        let clamped = levels.apply(
            90.0,
            AudioTarget::LayerOpacity,
            ModulationMode::Add,
            Some(ModulationRange {
                min: None,
                max: Some(100.0),
            }),
        );
        assert_eq!(clamped, 100.0);
    }
}
