//! Per-layer, per-frame evaluation: visibility gating, the opacity and
//! transform pipelines, and the content hook per layer kind.

use std::collections::{BTreeMap, HashMap};

use compositor_data::model::{Layer, LayerContent, SplineData};
use glam::DVec3;
use serde_json::json;

use crate::animatable::Animator;
use crate::audio::{AudioLevels, AudioTarget, ModulationMode, ModulationRange};
use crate::drivers::{paths, DrivenValues};
use crate::transform::{self, RenderTransform};
use crate::{warn_unsupported, EvaluatedPath};

/// Everything one evaluation pass may read. The driven and audio snapshots
/// are externally owned and swapped wholesale between passes; they are never
/// mutated mid-frame.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub frame: i64,
    pub driven: &'a DrivenValues,
    pub audio: &'a AudioLevels,
}

/// Effect parameters resolved at one frame, paired with the effect's type
/// name. Pixel processing happens elsewhere; this is the parameter feed.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedEffect {
    pub effect_type: String,
    pub parameters: BTreeMap<String, f64>,
}

/// A spline control point with its animatable channels resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatedControlPoint {
    pub position: [f64; 2],
    pub in_handle: [f64; 2],
    pub out_handle: [f64; 2],
}

/// The complete evaluated state of one visible layer at one frame. A fresh
/// value per call; it never aliases the declarative layer or the snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedLayerState {
    pub name: String,
    /// Final layer opacity, clamped to [0, 100].
    pub opacity: f64,
    pub transform: RenderTransform,
    pub motion_blur: bool,
    pub paths: Vec<EvaluatedPath>,
    pub control_points: Vec<EvaluatedControlPoint>,
    pub effects: Vec<EvaluatedEffect>,
    /// Loose layer-kind-specific values for consumers that introspect.
    pub properties: HashMap<String, serde_json::Value>,
}

/// Outcome of evaluating a layer at a frame. `Hidden` is terminal: no
/// geometry or effect work was performed, and no stale state exists for
/// consumers to mistake as current.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEvaluation {
    Hidden,
    Visible(Box<EvaluatedLayerState>),
}

impl LayerEvaluation {
    pub fn visible(&self) -> Option<&EvaluatedLayerState> {
        match self {
            LayerEvaluation::Hidden => None,
            LayerEvaluation::Visible(state) => Some(state),
        }
    }
}

/// Evaluates one layer at one frame.
///
/// Frames outside `[in_point, out_point]`, or a `visible=false` layer, short-
/// circuit to `Hidden` before any property work. Otherwise every scalar
/// channel runs interpolation, then driven override, then (position, scale,
/// rotation, opacity only) audio modulation, and the channels compose into a
/// render transform.
pub fn evaluate_frame(layer: &Layer, ctx: &EvalContext) -> LayerEvaluation {
    if !layer.visible || ctx.frame < layer.in_point || ctx.frame > layer.out_point {
        return LayerEvaluation::Hidden;
    }

    let opacity = evaluate_opacity(layer, ctx);
    let render_transform = evaluate_transform(layer, ctx);

    let mut paths = Vec::new();
    let mut control_points = Vec::new();
    let mut properties = HashMap::new();

    match &layer.content {
        LayerContent::Shape { items } => {
            paths = crate::evaluate_shape_items(items, ctx.frame);
            properties.insert("pathCount".to_string(), json!(paths.len()));
        }
        LayerContent::Spline { data } => {
            control_points = evaluated_control_points(data, ctx);
            properties.insert("closed".to_string(), json!(data.closed));
            properties.insert(
                "controlPoints".to_string(),
                json!(control_points
                    .iter()
                    .map(|cp| cp.position)
                    .collect::<Vec<_>>()),
            );
        }
        LayerContent::Null => {}
        LayerContent::Unknown => warn_unsupported("layer kind", "unknown"),
    }

    let effects = layer
        .effects
        .iter()
        .filter(|effect| effect.enabled)
        .map(|effect| EvaluatedEffect {
            effect_type: effect.effect_type.clone(),
            parameters: effect
                .parameters
                .iter()
                .map(|(name, prop)| (name.clone(), Animator::resolve(prop, ctx.frame)))
                .collect(),
        })
        .collect();

    LayerEvaluation::Visible(Box::new(EvaluatedLayerState {
        name: layer.name.clone(),
        opacity,
        transform: render_transform,
        motion_blur: layer.motion_blur,
        paths,
        control_points,
        effects,
        properties,
    }))
}

/// Opacity pipeline: interpolate, driven override, multiply-mode audio
/// modulation bounded to [0, 100].
fn evaluate_opacity(layer: &Layer, ctx: &EvalContext) -> f64 {
    let base = Animator::resolve(&layer.opacity, ctx.frame);
    let driven = ctx.driven.resolve(base, paths::OPACITY);
    ctx.audio
        .apply(
            driven,
            AudioTarget::LayerOpacity,
            ModulationMode::Multiply,
            Some(ModulationRange {
                min: Some(0.0),
                max: Some(100.0),
            }),
        )
        .clamp(0.0, 100.0)
}

fn evaluate_transform(layer: &Layer, ctx: &EvalContext) -> RenderTransform {
    let frame = ctx.frame;
    let t = &layer.transform;
    let channel = |prop: &compositor_data::model::AnimatableProperty<f64>, path: &str| {
        ctx.driven.resolve(Animator::resolve(prop, frame), path)
    };

    let mut position = DVec3::new(
        channel(&t.position_x, paths::POSITION_X),
        channel(&t.position_y, paths::POSITION_Y),
        channel(&t.position_z, paths::POSITION_Z),
    );
    position.x = ctx
        .audio
        .apply(position.x, AudioTarget::PositionX, ModulationMode::Add, None);
    position.y = ctx
        .audio
        .apply(position.y, AudioTarget::PositionY, ModulationMode::Add, None);

    // Per-axis drivers first, then the uniform scale multiplier: one audio
    // value drives X and Y together rather than per axis.
    let mut scale = DVec3::new(
        channel(&t.scale_x, paths::SCALE_X),
        channel(&t.scale_y, paths::SCALE_Y),
        channel(&t.scale_z, paths::SCALE_Z),
    );
    let uniform = ctx.audio.scale_multiplier();
    scale.x *= uniform;
    scale.y *= uniform;

    let mut rotation = DVec3::new(
        channel(&t.rotation_x, paths::ROTATION_X),
        channel(&t.rotation_y, paths::ROTATION_Y),
        channel(&t.rotation_z, paths::ROTATION_Z),
    );
    rotation.z = ctx.audio.apply(
        rotation.z,
        AudioTarget::LayerRotation,
        ModulationMode::Add,
        None,
    );

    let origin = DVec3::new(
        channel(&t.origin_x, paths::ORIGIN_X),
        channel(&t.origin_y, paths::ORIGIN_Y),
        channel(&t.origin_z, paths::ORIGIN_Z),
    );

    transform::compose(position, scale, rotation, origin, layer.three_d)
}

/// Resolves a spline's control points at a frame, honoring per-point driven
/// channels (`controlPoint[i].x` / `.y`). Used by consumers like text-on-path
/// that need geometry without a full render.
pub fn evaluated_control_points(
    data: &SplineData,
    ctx: &EvalContext,
) -> Vec<EvaluatedControlPoint> {
    data.control_points
        .iter()
        .enumerate()
        .map(|(i, cp)| {
            let x = ctx.driven.resolve(
                Animator::resolve(&cp.x, ctx.frame),
                &paths::control_point_x(i),
            );
            let y = ctx.driven.resolve(
                Animator::resolve(&cp.y, ctx.frame),
                &paths::control_point_y(i),
            );
            EvaluatedControlPoint {
                position: [x, y],
                in_handle: cp.in_handle,
                out_handle: cp.out_handle,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use compositor_data::model::{AnimatableProperty, Keyframe, SplineControlPoint};

    fn base_layer() -> Layer {
        Layer {
            name: "layer".to_string(),
            visible: true,
            in_point: 0,
            out_point: 100,
            three_d: false,
            motion_blur: false,
            transform: Default::default(),
            opacity: AnimatableProperty::fixed(100.0),
            content: LayerContent::Null,
            effects: Vec::new(),
        }
    }

    fn ctx<'a>(frame: i64, driven: &'a DrivenValues, audio: &'a AudioLevels) -> EvalContext<'a> {
        EvalContext {
            frame,
            driven,
            audio,
        }
    }

    #[test]
    fn out_of_range_frames_are_hidden() {
        let mut layer = base_layer();
        layer.in_point = 10;
        layer.out_point = 20;
        let driven = DrivenValues::new();
        let audio = AudioLevels::new();
        assert_eq!(
            evaluate_frame(&layer, &ctx(9, &driven, &audio)),
            LayerEvaluation::Hidden
        );
        assert_eq!(
            evaluate_frame(&layer, &ctx(21, &driven, &audio)),
            LayerEvaluation::Hidden
        );
        assert!(evaluate_frame(&layer, &ctx(10, &driven, &audio))
            .visible()
            .is_some());
        assert!(evaluate_frame(&layer, &ctx(20, &driven, &audio))
            .visible()
            .is_some());
    }

    #[test]
    fn invisible_layer_short_circuits() {
        let mut layer = base_layer();
        layer.visible = false;
        let driven = DrivenValues::new();
        let audio = AudioLevels::new();
        assert_eq!(
            evaluate_frame(&layer, &ctx(0, &driven, &audio)),
            LayerEvaluation::Hidden
        );
    }

    #[test]
    fn driven_position_overrides_keyframes() {
        let mut layer = base_layer();
        layer.transform.position_x = AnimatableProperty::animated(
            0.0,
            vec![Keyframe::new(0, 0.0), Keyframe::new(100, 500.0)],
        );
        let driven: DrivenValues = [(paths::POSITION_X, 42.0)].into_iter().collect();
        let audio = AudioLevels::new();
        for frame in [0, 37, 100] {
            let out = evaluate_frame(&layer, &ctx(frame, &driven, &audio));
            assert_eq!(out.visible().unwrap().transform.position.x, 42.0);
        }
    }

    #[test]
    fn audio_opacity_multiplies_and_clamps() {
        let layer = base_layer();
        let driven = DrivenValues::new();
        let audio: AudioLevels = [(AudioTarget::LayerOpacity, 1.0)].into_iter().collect();
        let out = evaluate_frame(&layer, &ctx(0, &driven, &audio));
        // 100 * (0.5 + 1.0) clamps back to 100.
        assert_eq!(out.visible().unwrap().opacity, 100.0);

        let quiet: AudioLevels = [(AudioTarget::LayerOpacity, 0.2)].into_iter().collect();
        let out = evaluate_frame(&layer, &ctx(0, &driven, &quiet));
        assert!((out.visible().unwrap().opacity - 70.0).abs() < 1e-12);
    }

    #[test]
    fn uniform_audio_scale_applies_after_drivers() {
        let layer = base_layer();
        let driven: DrivenValues = [(paths::SCALE_X, 200.0)].into_iter().collect();
        let audio: AudioLevels = [(AudioTarget::LayerScale, 1.0)].into_iter().collect();
        let out = evaluate_frame(&layer, &ctx(0, &driven, &audio));
        let scale = out.visible().unwrap().transform.scale;
        // X: 200% driven then 1.5x audio; Y: 100% then 1.5x; Z untouched.
        assert!((scale.x - 3.0).abs() < 1e-12);
        assert!((scale.y - 1.5).abs() < 1e-12);
        assert!((scale.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disabled_effects_are_skipped() {
        let mut layer = base_layer();
        layer.effects = vec![
            compositor_data::model::EffectInstance {
                effect_type: "glow".to_string(),
                enabled: true,
                parameters: [("radius".to_string(), AnimatableProperty::fixed(4.0))]
                    .into_iter()
                    .collect(),
            },
            compositor_data::model::EffectInstance {
                effect_type: "levels".to_string(),
                enabled: false,
                parameters: BTreeMap::new(),
            },
        ];
        let driven = DrivenValues::new();
        let audio = AudioLevels::new();
        let out = evaluate_frame(&layer, &ctx(0, &driven, &audio));
        let effects = &out.visible().unwrap().effects;
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].effect_type, "glow");
        assert_eq!(effects[0].parameters["radius"], 4.0);
    }

    #[test]
    fn spline_control_points_honor_driven_channels() {
        let mut layer = base_layer();
        layer.content = LayerContent::Spline {
            data: SplineData {
                control_points: vec![
                    SplineControlPoint {
                        x: AnimatableProperty::fixed(1.0),
                        y: AnimatableProperty::fixed(2.0),
                        in_handle: [0.0, 0.0],
                        out_handle: [5.0, 0.0],
                    },
                    SplineControlPoint {
                        x: AnimatableProperty::fixed(3.0),
                        y: AnimatableProperty::fixed(4.0),
                        in_handle: [-5.0, 0.0],
                        out_handle: [0.0, 0.0],
                    },
                ],
                closed: false,
            },
        };
        let driven: DrivenValues = [(paths::control_point_x(1), 30.0)].into_iter().collect();
        let audio = AudioLevels::new();
        let out = evaluate_frame(&layer, &ctx(0, &driven, &audio));
        let cps = &out.visible().unwrap().control_points;
        assert_eq!(cps[0].position, [1.0, 2.0]);
        assert_eq!(cps[1].position, [30.0, 4.0]);
        assert_eq!(cps[1].in_handle, [-5.0, 0.0]);
    }

    #[test]
    fn repeated_evaluation_is_identical() {
        let mut layer = base_layer();
        layer.transform.rotation_z = AnimatableProperty::animated(
            0.0,
            vec![Keyframe::new(0, 0.0), Keyframe::new(50, 180.0)],
        );
        let driven: DrivenValues = [(paths::POSITION_Y, -7.25)].into_iter().collect();
        let audio: AudioLevels = [(AudioTarget::LayerRotation, 0.3)].into_iter().collect();
        let a = evaluate_frame(&layer, &ctx(25, &driven, &audio));
        let b = evaluate_frame(&layer, &ctx(25, &driven, &audio));
        assert_eq!(a, b);
    }
}
