//! Frame-driving engine over the deterministic evaluation core.
//!
//! Owns the layer stack and the per-pass driven/audio snapshots, and bridges
//! evaluated state to renderer-side collaborators (scene graph, path sink,
//! motion blur).

pub mod audio;
pub mod engine;
pub mod motion_blur;

pub use audio::{AudioBinding, AudioEnvelope};
pub use engine::{Compositor, PathSink, SceneGraphHandle};
pub use motion_blur::{MotionBlurProcessor, MotionBlurSettings, VelocitySample};

pub use compositor_core as core;
pub use compositor_data as data;
