use compositor_data::model::{AnimatableProperty, BezierPath, Easing, Interpolation, Keyframe};
use glam::{DVec2, DVec3};

/// Value types the keyframe evaluator can blend. Composite types interpolate
/// component-wise.
pub trait Interpolatable: Sized + Clone {
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Interpolatable for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Interpolatable for DVec2 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        DVec2::lerp(*self, *other, t)
    }
}

impl Interpolatable for DVec3 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        DVec3::lerp(*self, *other, t)
    }
}

impl Interpolatable for [f64; 2] {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        [
            self[0] + (other[0] - self[0]) * t,
            self[1] + (other[1] - self[1]) * t,
        ]
    }
}

impl Interpolatable for [f64; 4] {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        let mut out = [0.0; 4];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self[i] + (other[i] - self[i]) * t;
        }
        out
    }
}

impl Interpolatable for BezierPath {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        if t <= 0.0 {
            return self.clone();
        }
        if t >= 1.0 {
            return other.clone();
        }

        // Vertex counts should match for morph targets; fall back to the
        // shorter path when they don't.
        let count = self.vertices.len().min(other.vertices.len());
        if count == 0 {
            return self.clone();
        }

        let mut vertices = Vec::with_capacity(count);
        for i in 0..count {
            let a = &self.vertices[i];
            let b = &other.vertices[i];
            vertices.push(compositor_data::model::BezierVertex {
                point: a.point.lerp(&b.point, t),
                in_handle: a.in_handle.lerp(&b.in_handle, t),
                out_handle: a.out_handle.lerp(&b.out_handle, t),
            });
        }
        BezierPath {
            vertices,
            closed: self.closed,
        }
    }
}

/// Solves the cubic-bezier timing curve `y(x)` for control points `p1`, `p2`
/// (unit square, endpoints pinned to (0,0)/(1,1)) via Newton-Raphson.
pub fn solve_cubic_bezier(p1: DVec2, p2: DVec2, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let mut t = x;
    for _ in 0..8 {
        let one_minus_t = 1.0 - t;
        let x_est = 3.0 * one_minus_t * one_minus_t * t * p1.x
            + 3.0 * one_minus_t * t * t * p2.x
            + t * t * t;

        let err = x_est - x;
        if err.abs() < 1e-6 {
            break;
        }

        let dx_dt = 3.0 * one_minus_t * one_minus_t * p1.x
            + 6.0 * one_minus_t * t * (p2.x - p1.x)
            + 3.0 * t * t * (1.0 - p2.x);

        if dx_dt.abs() < 1e-9 {
            break;
        }
        t -= err / dx_dt;
    }

    let one_minus_t = 1.0 - t;
    3.0 * one_minus_t * one_minus_t * t * p1.y + 3.0 * one_minus_t * t * t * p2.y + t * t * t
}

/// Converts a time in seconds to the frame it falls in. Truncation is always
/// `floor` so the mapping stays monotonic.
pub fn seconds_to_frame(seconds: f64, fps: f64) -> i64 {
    (seconds * fps).floor() as i64
}

pub struct Animator;

impl Animator {
    /// Resolves an animatable property at `frame`.
    ///
    /// Non-animated properties pass through untouched. Outside the keyframe
    /// range the first/last value is clamped. Inside a segment the outgoing
    /// keyframe's interpolation mode decides: hold freezes until the next
    /// keyframe, linear lerps, bezier runs `t` through the easing curve
    /// before lerping. Referentially transparent for identical inputs.
    pub fn resolve<T: Interpolatable>(prop: &AnimatableProperty<T>, frame: i64) -> T {
        if !prop.animated || prop.keyframes.is_empty() {
            return prop.value.clone();
        }

        let keyframes = &prop.keyframes;

        // Binary search: first keyframe with kf.frame > frame. The current
        // segment is [idx-1, idx].
        let idx = keyframes.partition_point(|kf| kf.frame <= frame);

        if idx == 0 {
            return keyframes[0].value.clone();
        }
        if idx >= keyframes.len() {
            return keyframes[keyframes.len() - 1].value.clone();
        }

        let kf_start = &keyframes[idx - 1];
        let kf_end = &keyframes[idx];
        Self::blend_segment(kf_start, kf_end, frame)
    }

    fn blend_segment<T: Interpolatable>(kf_start: &Keyframe<T>, kf_end: &Keyframe<T>, frame: i64) -> T {
        let duration = (kf_end.frame - kf_start.frame) as f64;
        if duration <= 0.0 {
            return kf_start.value.clone();
        }

        let local_t = (((frame - kf_start.frame) as f64) / duration).clamp(0.0, 1.0);

        match kf_start.interpolation {
            Interpolation::Hold => kf_start.value.clone(),
            Interpolation::Linear => kf_start.value.lerp(&kf_end.value, local_t),
            Interpolation::Bezier => {
                let Easing {
                    out_handle,
                    in_handle,
                } = kf_start.easing.unwrap_or_default();
                let p1 = DVec2::new(out_handle[0], out_handle[1]);
                let p2 = DVec2::new(in_handle[0], in_handle[1]);
                let eased = solve_cubic_bezier(p1, p2, local_t);
                kf_start.value.lerp(&kf_end.value, eased)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_prop() -> AnimatableProperty<f64> {
        AnimatableProperty::animated(
            -1.0,
            vec![
                Keyframe::new(0, 0.0),
                Keyframe::new(10, 10.0),
                Keyframe::new(20, 30.0),
            ],
        )
    }

    #[test]
    fn resolve_segments_and_clamps() {
        let prop = linear_prop();
        assert_eq!(Animator::resolve(&prop, 0), 0.0);
        assert_eq!(Animator::resolve(&prop, 10), 10.0);
        assert_eq!(Animator::resolve(&prop, 20), 30.0);
        assert_eq!(Animator::resolve(&prop, -5), 0.0);
        assert_eq!(Animator::resolve(&prop, 1000), 30.0);
        assert_eq!(Animator::resolve(&prop, 5), 5.0);
        assert_eq!(Animator::resolve(&prop, 15), 20.0);
    }

    #[test]
    fn non_animated_passthrough_everywhere() {
        let prop = AnimatableProperty::fixed(42.5);
        for frame in [-1000, -1, 0, 7, 99999] {
            assert_eq!(Animator::resolve(&prop, frame), 42.5);
        }
    }

    #[test]
    fn animated_flag_off_ignores_keyframes() {
        let mut prop = linear_prop();
        prop.animated = false;
        assert_eq!(Animator::resolve(&prop, 15), -1.0);
    }

    #[test]
    fn hold_freezes_until_next_keyframe() {
        let prop = AnimatableProperty::animated(
            0.0,
            vec![
                Keyframe::new(10, 1.0).with_interpolation(Interpolation::Hold),
                Keyframe::new(20, 9.0),
            ],
        );
        for frame in 10..20 {
            assert_eq!(Animator::resolve(&prop, frame), 1.0);
        }
        assert_eq!(Animator::resolve(&prop, 20), 9.0);
    }

    #[test]
    fn bezier_easing_is_monotonic_and_pinned() {
        let prop = AnimatableProperty::animated(
            0.0,
            vec![
                Keyframe::new(0, 0.0).with_easing(Easing {
                    out_handle: [0.42, 0.0],
                    in_handle: [0.58, 1.0],
                }),
                Keyframe::new(100, 100.0),
            ],
        );
        assert_eq!(Animator::resolve(&prop, 0), 0.0);
        assert_eq!(Animator::resolve(&prop, 100), 100.0);
        let mut prev = 0.0;
        for frame in 1..100 {
            let v = Animator::resolve(&prop, frame);
            assert!(v >= prev, "eased curve must not go backwards");
            prev = v;
        }
        // Ease-in-out is slower than linear near the start.
        assert!(Animator::resolve(&prop, 10) < 10.0);
    }

    #[test]
    fn vectors_interpolate_component_wise() {
        let prop = AnimatableProperty::animated(
            [0.0, 0.0],
            vec![Keyframe::new(0, [0.0, -10.0]), Keyframe::new(10, [10.0, 10.0])],
        );
        assert_eq!(Animator::resolve(&prop, 5), [5.0, 0.0]);
    }

    #[test]
    fn seconds_to_frame_floors() {
        assert_eq!(seconds_to_frame(0.99, 30.0), 29);
        assert_eq!(seconds_to_frame(1.0, 30.0), 30);
        assert_eq!(seconds_to_frame(1.034, 30.0), 31);
    }
}
