use std::collections::HashMap;

/// Immutable snapshot of externally-computed driver outputs, keyed by dotted
/// property path. Swapped wholesale between evaluation passes; read-only
/// during a frame.
///
/// Drivers operate per scalar channel: a driven `transform.position.x`
/// overrides exactly that channel and nothing else.
#[derive(Debug, Clone, Default)]
pub struct DrivenValues(HashMap<String, f64>);

impl DrivenValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: impl Into<String>, value: f64) {
        self.0.insert(path.into(), value);
    }

    pub fn get(&self, path: &str) -> Option<f64> {
        self.0.get(path).copied()
    }

    /// Presence overrides; absence falls back to the interpolated base value.
    pub fn resolve(&self, base: f64, path: &str) -> f64 {
        self.get(path).unwrap_or(base)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for DrivenValues {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Stable property-path names for the driven-value map.
pub mod paths {
    pub const OPACITY: &str = "opacity";
    pub const POSITION_X: &str = "transform.position.x";
    pub const POSITION_Y: &str = "transform.position.y";
    pub const POSITION_Z: &str = "transform.position.z";
    pub const SCALE_X: &str = "transform.scale.x";
    pub const SCALE_Y: &str = "transform.scale.y";
    pub const SCALE_Z: &str = "transform.scale.z";
    pub const ROTATION_X: &str = "transform.rotationX";
    pub const ROTATION_Y: &str = "transform.rotationY";
    pub const ROTATION_Z: &str = "transform.rotationZ";
    pub const ORIGIN_X: &str = "transform.origin.x";
    pub const ORIGIN_Y: &str = "transform.origin.y";
    pub const ORIGIN_Z: &str = "transform.origin.z";

    pub fn control_point_x(index: usize) -> String {
        format!("controlPoint[{index}].x")
    }

    pub fn control_point_y(index: usize) -> String {
        format!("controlPoint[{index}].y")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_overrides_base_exactly() {
        let driven: DrivenValues = [(paths::POSITION_X, 42.0)].into_iter().collect();
        assert_eq!(driven.resolve(7.5, paths::POSITION_X), 42.0);
        assert_eq!(driven.resolve(7.5, paths::POSITION_Y), 7.5);
    }

    #[test]
    fn control_point_paths_are_stable() {
        assert_eq!(paths::control_point_x(3), "controlPoint[3].x");
        assert_eq!(paths::control_point_y(0), "controlPoint[0].y");
    }
}
