//! Motion blur from frame-to-frame transform deltas.
//!
//! Velocity comes out of consecutive `RenderTransform`s read back through the
//! `scene_*` accessors, since the composer sign-flips Y and Z rotation on the
//! way to screen space. The blur itself is a weighted accumulation of the
//! source image at sub-frame offsets across the shutter window.

use std::borrow::Cow;
use std::collections::HashMap;

use compositor_core::RenderTransform;
use image::RgbaImage;

/// Shutter and sampling parameters. Angle is in degrees of the frame period
/// (180 = half-open shutter); phase shifts the window relative to the frame
/// instant (-90 with a 180 angle centers it).
#[derive(Debug, Clone, Copy)]
pub struct MotionBlurSettings {
    pub shutter_angle: f64,
    pub shutter_phase: f64,
    pub samples_per_frame: usize,
    /// Skip threshold on `sqrt(dx^2 + dy^2)`, in pixels per frame.
    pub velocity_threshold: f64,
    /// Skip threshold on rotation delta, degrees per frame.
    pub rotation_threshold: f64,
    /// Skip threshold on uniform scale delta per frame.
    pub scale_threshold: f64,
}

impl Default for MotionBlurSettings {
    fn default() -> Self {
        Self {
            shutter_angle: 180.0,
            shutter_phase: -90.0,
            samples_per_frame: 16,
            velocity_threshold: 0.5,
            rotation_threshold: 0.1,
            scale_threshold: 0.01,
        }
    }
}

/// Per-frame motion deltas in authoring (Y-down) space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocitySample {
    pub dx: f64,
    pub dy: f64,
    pub d_rotation: f64,
    pub d_scale: f64,
}

impl VelocitySample {
    pub fn magnitude(&self) -> f64 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }
}

/// Carries per-layer previous transforms between frames and produces blurred
/// frames. The history must be cleared when blur is disabled so re-enabling
/// does not spike with a stale velocity.
#[derive(Debug, Default)]
pub struct MotionBlurProcessor {
    settings: MotionBlurSettings,
    previous: HashMap<String, RenderTransform>,
}

impl MotionBlurProcessor {
    pub fn new(settings: MotionBlurSettings) -> Self {
        Self {
            settings,
            previous: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &MotionBlurSettings {
        &self.settings
    }

    /// Velocity of `layer` from the previously recorded transform to
    /// `current`, recording `current` for the next call. The first call for a
    /// layer (or the first after `clear_history`) reports zero motion.
    pub fn compute_velocity(&mut self, layer: &str, current: &RenderTransform) -> VelocitySample {
        let velocity = match self.previous.get(layer) {
            None => VelocitySample::default(),
            Some(prev) => VelocitySample {
                dx: current.position.x - prev.position.x,
                dy: current.scene_y() - prev.scene_y(),
                d_rotation: current.scene_rotation_z() - prev.scene_rotation_z(),
                d_scale: (current.scale.x + current.scale.y) / 2.0
                    - (prev.scale.x + prev.scale.y) / 2.0,
            },
        };
        self.previous.insert(layer.to_string(), *current);
        velocity
    }

    /// Drops all recorded transforms. Call when motion blur is toggled off.
    pub fn clear_history(&mut self) {
        self.previous.clear();
    }

    /// Whether this velocity is worth blurring at all.
    pub fn is_significant(&self, velocity: &VelocitySample) -> bool {
        velocity.magnitude() >= self.settings.velocity_threshold
            || velocity.d_rotation.abs() >= self.settings.rotation_threshold
            || velocity.d_scale.abs() >= self.settings.scale_threshold
    }

    /// Blurs `source` along the translation component of `velocity`.
    ///
    /// Near-static frames return the source unchanged (borrowed, no copy).
    /// Otherwise `samples_per_frame` taps are spread across the shutter
    /// window `shutter_angle / 360` of a frame, positioned by
    /// `shutter_phase`, and averaged with equal weight.
    pub fn blur<'a>(&self, velocity: &VelocitySample, source: &'a RgbaImage) -> Cow<'a, RgbaImage> {
        if !self.is_significant(velocity) {
            return Cow::Borrowed(source);
        }
        let samples = self.settings.samples_per_frame.max(2);
        let window = self.settings.shutter_angle / 360.0;
        let phase = self.settings.shutter_phase / 360.0;

        let (width, height) = source.dimensions();
        let mut accum = vec![0u32; (width * height * 4) as usize];

        for s in 0..samples {
            let t = phase + window * (s as f64 / (samples - 1) as f64);
            let offset_x = (velocity.dx * t).round() as i64;
            let offset_y = (velocity.dy * t).round() as i64;

            for y in 0..height as i64 {
                for x in 0..width as i64 {
                    let src_x = (x - offset_x).clamp(0, width as i64 - 1) as u32;
                    let src_y = (y - offset_y).clamp(0, height as i64 - 1) as u32;
                    let pixel = source.get_pixel(src_x, src_y);
                    let base = ((y as u32 * width + x as u32) * 4) as usize;
                    for c in 0..4 {
                        accum[base + c] += pixel.0[c] as u32;
                    }
                }
            }
        }

        let mut out = RgbaImage::new(width, height);
        let divisor = samples as u32;
        for (i, pixel) in out.pixels_mut().enumerate() {
            let base = i * 4;
            for c in 0..4 {
                pixel.0[c] = (accum[base + c] / divisor) as u8;
            }
        }
        Cow::Owned(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn transform_at(x: f64, scene_y: f64) -> RenderTransform {
        RenderTransform {
            position: DVec3::new(x, -scene_y, 0.0),
            scale: DVec3::splat(1.0),
            rotation: DVec3::ZERO,
        }
    }

    #[test]
    fn first_frame_has_zero_velocity() {
        let mut processor = MotionBlurProcessor::default();
        let v = processor.compute_velocity("a", &transform_at(100.0, 50.0));
        assert_eq!(v, VelocitySample::default());
    }

    #[test]
    fn velocity_reads_back_through_scene_accessors() {
        let mut processor = MotionBlurProcessor::default();
        processor.compute_velocity("a", &transform_at(0.0, 0.0));
        let v = processor.compute_velocity("a", &transform_at(3.0, 4.0));
        assert_eq!(v.dx, 3.0);
        assert_eq!(v.dy, 4.0);
        assert_eq!(v.magnitude(), 5.0);
    }

    #[test]
    fn below_threshold_returns_the_source_untouched() {
        let processor = MotionBlurProcessor::default();
        let source = RgbaImage::from_pixel(8, 8, image::Rgba([10, 20, 30, 255]));
        let velocity = VelocitySample {
            dx: 0.1,
            dy: 0.1,
            d_rotation: 0.0,
            d_scale: 0.0,
        };
        let out = processor.blur(&velocity, &source);
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn fast_motion_produces_a_new_image() {
        let processor = MotionBlurProcessor::default();
        let mut source = RgbaImage::from_pixel(16, 16, image::Rgba([0, 0, 0, 255]));
        source.put_pixel(8, 8, image::Rgba([255, 255, 255, 255]));
        let velocity = VelocitySample {
            dx: 8.0,
            dy: 0.0,
            d_rotation: 0.0,
            d_scale: 0.0,
        };
        let out = processor.blur(&velocity, &source);
        assert!(matches!(out, Cow::Owned(_)));
        // The bright pixel smears: its original cell no longer holds the
        // full value.
        assert!(out.get_pixel(8, 8).0[0] < 255);
    }

    #[test]
    fn clear_history_resets_to_zero_velocity() {
        let mut processor = MotionBlurProcessor::default();
        processor.compute_velocity("a", &transform_at(0.0, 0.0));
        processor.compute_velocity("a", &transform_at(50.0, 0.0));
        processor.clear_history();
        let v = processor.compute_velocity("a", &transform_at(500.0, 0.0));
        assert_eq!(v, VelocitySample::default());
    }

    #[test]
    fn rotation_alone_can_trip_the_threshold() {
        let processor = MotionBlurProcessor::default();
        let velocity = VelocitySample {
            dx: 0.0,
            dy: 0.0,
            d_rotation: 5.0,
            d_scale: 0.0,
        };
        assert!(processor.is_significant(&velocity));
    }
}
