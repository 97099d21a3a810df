//! Deterministic per-frame evaluation for layered vector compositions.
//!
//! The pipeline per layer and frame: keyframe interpolation, driven-value
//! overrides, audio modulation, transform composition, then shape generation
//! and the path-operator chain. Every call is self-contained; evaluating the
//! same frame twice with the same snapshots produces identical output.

pub mod animatable;
pub mod audio;
pub mod drivers;
pub mod geometry;
pub mod layer;
pub mod modifiers;
pub mod repeater;
pub mod shapes;
pub mod transform;

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

use compositor_data::model::{
    BezierPath, FillRule, FillStyle, GradientFillStyle, GradientKind, GradientStop, GroupTransform,
    LineCap, LineJoin, ShapeItem, StrokeStyle,
};
use kurbo::{Affine, Point};

pub use animatable::{seconds_to_frame, solve_cubic_bezier, Animator, Interpolatable};
pub use audio::{AudioLevels, AudioTarget, ModulationMode, ModulationRange};
pub use drivers::DrivenValues;
pub use layer::{
    evaluate_frame, evaluated_control_points, EvalContext, EvaluatedControlPoint, EvaluatedEffect,
    EvaluatedLayerState, LayerEvaluation,
};
pub use transform::RenderTransform;

use repeater::RepeatedPath;

/// Logs one warning per unsupported kind/name pair for the process lifetime,
/// then stays quiet. Forward-compatible content is a no-op, not log spam.
pub(crate) fn warn_unsupported(kind: &str, name: &str) {
    static SEEN: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    let seen = SEEN.get_or_init(|| Mutex::new(HashSet::new()));
    if let Ok(mut set) = seen.lock() {
        if set.insert(format!("{kind}:{name}")) {
            tracing::warn!(kind, name, "unsupported item type, evaluating as no-op");
        }
    }
}

/// Resolved fill paint.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedFill {
    pub color: [f64; 4],
    pub opacity: f64,
    pub rule: FillRule,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedDash {
    /// Alternating dash/gap lengths, already normalized to an even count.
    pub pattern: Vec<f64>,
    pub offset: f64,
}

/// Resolved stroke paint.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedStroke {
    pub color: [f64; 4],
    pub width: f64,
    pub opacity: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
    pub dash: Option<EvaluatedDash>,
}

/// Resolved gradient paint.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedGradient {
    pub kind: GradientKind,
    pub start_point: [f64; 2],
    pub end_point: [f64; 2],
    pub stops: Vec<GradientStop>,
    pub opacity: f64,
    pub rule: FillRule,
}

/// One renderer-ready path with at most one paint attached. A shape group
/// with several styles emits one `EvaluatedPath` per style per path, in paint
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedPath {
    pub path: BezierPath,
    /// Percentage multiplier accumulated from repeaters and group opacity.
    pub opacity: f64,
    pub fill: Option<EvaluatedFill>,
    pub stroke: Option<EvaluatedStroke>,
    pub gradient_fill: Option<EvaluatedGradient>,
}

impl EvaluatedPath {
    fn bare(active: &RepeatedPath) -> Self {
        Self {
            path: active.path.clone(),
            opacity: active.opacity,
            fill: None,
            stroke: None,
            gradient_fill: None,
        }
    }
}

enum PendingStyle {
    Fill(EvaluatedFill),
    Stroke(EvaluatedStroke),
    Gradient(EvaluatedGradient),
}

/// Walks a layer's ordered shape-item list at `frame` and returns the styled
/// output paths. The declarative items are never mutated; operators run over
/// fresh copies in declared order.
///
/// Items with no style in their group still surface as bare geometry so
/// consumers that only need outlines (e.g. text-on-path) see them.
pub fn evaluate_shape_items(items: &[ShapeItem], frame: i64) -> Vec<EvaluatedPath> {
    let (mut styled, active) = walk_group(items, frame);
    if styled.is_empty() {
        styled.extend(active.iter().map(EvaluatedPath::bare));
    }
    styled
}

/// Evaluates one group scope. Returns the styled outputs emitted inside the
/// group and the group's final geometry, which joins the parent's active set
/// so parent operators still reach it.
fn walk_group(items: &[ShapeItem], frame: i64) -> (Vec<EvaluatedPath>, Vec<RepeatedPath>) {
    let mut outputs: Vec<EvaluatedPath> = Vec::new();
    let mut active: Vec<RepeatedPath> = Vec::new();
    let mut styles: Vec<PendingStyle> = Vec::new();

    let mut push_generated = |active: &mut Vec<RepeatedPath>, path: BezierPath| {
        active.push(RepeatedPath {
            path,
            opacity: 100.0,
        });
    };

    for item in items {
        match item {
            ShapeItem::Rectangle(shape) => {
                push_generated(&mut active, shapes::generate_rectangle(shape, frame));
            }
            ShapeItem::Ellipse(shape) => {
                push_generated(&mut active, shapes::generate_ellipse(shape, frame));
            }
            ShapeItem::Polystar(shape) => {
                push_generated(&mut active, shapes::generate_polystar(shape, frame));
            }
            ShapeItem::Path(shape) => {
                push_generated(&mut active, shapes::generate_path(shape, frame));
            }

            ShapeItem::Fill(style) => styles.push(PendingStyle::Fill(evaluate_fill(style, frame))),
            ShapeItem::Stroke(style) => {
                styles.push(PendingStyle::Stroke(evaluate_stroke(style, frame)))
            }
            ShapeItem::GradientFill(style) => {
                styles.push(PendingStyle::Gradient(evaluate_gradient(style, frame)))
            }

            ShapeItem::Trim(op) => {
                let trim = modifiers::resolve_trim(op, frame);
                let count = active.len();
                let mut trimmed = Vec::with_capacity(count);
                for (index, entry) in active.iter().enumerate() {
                    let (window_start, span) = trim.window(index, count);
                    for path in modifiers::trim_one(&entry.path, window_start, span) {
                        trimmed.push(RepeatedPath {
                            path,
                            opacity: entry.opacity,
                        });
                    }
                }
                active = trimmed;
            }
            ShapeItem::Merge(op) => {
                active = reassociate(active, |paths| modifiers::merge_paths(paths, op));
            }
            ShapeItem::OffsetPath(op) => {
                let mut offset = Vec::with_capacity(active.len());
                for entry in &active {
                    for path in modifiers::offset_paths(vec![entry.path.clone()], op, frame) {
                        offset.push(RepeatedPath {
                            path,
                            opacity: entry.opacity,
                        });
                    }
                }
                active = offset;
            }
            ShapeItem::PuckerBloat(op) => {
                active = reassociate(active, |paths| {
                    modifiers::pucker_bloat_paths(paths, op, frame)
                });
            }
            ShapeItem::WigglePath(op) => {
                active = reassociate(active, |paths| modifiers::wiggle_paths(paths, op, frame));
            }
            ShapeItem::ZigZag(op) => {
                active = reassociate(active, |paths| modifiers::zigzag_paths(paths, op, frame));
            }
            ShapeItem::Twist(op) => {
                active = reassociate(active, |paths| modifiers::twist_paths(paths, op, frame));
            }
            ShapeItem::RoundCorners(op) => {
                active = reassociate(active, |paths| {
                    modifiers::round_corners_paths(paths, op, frame)
                });
            }

            ShapeItem::Repeater(data) => {
                let source_count = active.len();
                if source_count > 0 {
                    let source_opacities: Vec<f64> =
                        active.iter().map(|entry| entry.opacity).collect();
                    let paths: Vec<BezierPath> =
                        active.iter().map(|entry| entry.path.clone()).collect();
                    let expanded = repeater::expand(&paths, data, frame);
                    active = expanded
                        .into_iter()
                        .enumerate()
                        .map(|(j, mut copy)| {
                            // Copies come out in blocks preserving input
                            // order, so the source is j mod source_count.
                            copy.opacity *= source_opacities[j % source_count] / 100.0;
                            copy
                        })
                        .collect();
                }
            }

            ShapeItem::Transform(group_transform) => {
                apply_group_transform(&mut active, group_transform, frame);
            }

            ShapeItem::Group(group) => {
                let (child_outputs, child_active) = walk_group(&group.items, frame);
                outputs.extend(child_outputs);
                active.extend(child_active);
            }

            ShapeItem::Unknown => warn_unsupported("shape item", "unknown"),
        }
    }

    // Styles paint the group's final geometry, one output per style per path,
    // in declared style order.
    for style in &styles {
        for entry in &active {
            let mut out = EvaluatedPath::bare(entry);
            match style {
                PendingStyle::Fill(fill) => out.fill = Some(fill.clone()),
                PendingStyle::Stroke(stroke) => out.stroke = Some(stroke.clone()),
                PendingStyle::Gradient(gradient) => out.gradient_fill = Some(gradient.clone()),
            }
            outputs.push(out);
        }
    }

    (outputs, active)
}

fn reassociate(
    active: Vec<RepeatedPath>,
    f: impl FnOnce(Vec<BezierPath>) -> Vec<BezierPath>,
) -> Vec<RepeatedPath> {
    let opacities: Vec<f64> = active.iter().map(|entry| entry.opacity).collect();
    let paths: Vec<BezierPath> = active.into_iter().map(|entry| entry.path).collect();
    let out = f(paths);
    debug_assert_eq!(out.len(), opacities.len());
    out.into_iter()
        .zip(opacities)
        .map(|(path, opacity)| RepeatedPath { path, opacity })
        .collect()
}

fn apply_group_transform(active: &mut [RepeatedPath], transform: &GroupTransform, frame: i64) {
    let anchor = Animator::resolve(&transform.anchor, frame);
    let position = Animator::resolve(&transform.position, frame);
    let scale = Animator::resolve(&transform.scale, frame);
    let rotation = Animator::resolve(&transform.rotation, frame);
    let opacity = Animator::resolve(&transform.opacity, frame);

    let affine = Affine::translate((position[0], position[1]))
        * Affine::rotate(rotation.to_radians())
        * Affine::scale_non_uniform(scale[0] / 100.0, scale[1] / 100.0)
        * Affine::translate((-anchor[0], -anchor[1]));
    let coeffs = affine.as_coeffs();

    for entry in active.iter_mut() {
        for v in &mut entry.path.vertices {
            let p = affine * Point::new(v.point[0], v.point[1]);
            v.point = [p.x, p.y];
            v.in_handle = [
                coeffs[0] * v.in_handle[0] + coeffs[2] * v.in_handle[1],
                coeffs[1] * v.in_handle[0] + coeffs[3] * v.in_handle[1],
            ];
            v.out_handle = [
                coeffs[0] * v.out_handle[0] + coeffs[2] * v.out_handle[1],
                coeffs[1] * v.out_handle[0] + coeffs[3] * v.out_handle[1],
            ];
        }
        entry.opacity *= opacity / 100.0;
    }
}

fn evaluate_fill(style: &FillStyle, frame: i64) -> EvaluatedFill {
    EvaluatedFill {
        color: Animator::resolve(&style.color, frame),
        opacity: Animator::resolve(&style.opacity, frame),
        rule: style.rule,
    }
}

fn evaluate_stroke(style: &StrokeStyle, frame: i64) -> EvaluatedStroke {
    EvaluatedStroke {
        color: Animator::resolve(&style.color, frame),
        width: Animator::resolve(&style.width, frame),
        opacity: Animator::resolve(&style.opacity, frame),
        cap: style.cap,
        join: style.join,
        miter_limit: style.miter_limit,
        dash: evaluate_dash(style, frame),
    }
}

/// Dash normalization: all-zero patterns mean a solid stroke, odd-length
/// patterns are doubled so dash/gap pairs stay aligned, and the offset wraps
/// into one pattern period.
fn evaluate_dash(style: &StrokeStyle, frame: i64) -> Option<EvaluatedDash> {
    if style.dash_pattern.is_empty() {
        return None;
    }
    let mut pattern: Vec<f64> = style
        .dash_pattern
        .iter()
        .map(|p| Animator::resolve(p, frame).max(0.0))
        .collect();
    if pattern.iter().all(|&d| d == 0.0) {
        return None;
    }
    if pattern.len() % 2 == 1 {
        let doubled = pattern.clone();
        pattern.extend(doubled);
    }
    let period: f64 = pattern.iter().sum();
    let offset = if period > 0.0 {
        Animator::resolve(&style.dash_offset, frame).rem_euclid(period)
    } else {
        0.0
    };
    Some(EvaluatedDash { pattern, offset })
}

fn evaluate_gradient(style: &GradientFillStyle, frame: i64) -> EvaluatedGradient {
    // Degenerate stop spans (two stops at one position) are legal; consumers
    // treat them as a hard color switch rather than dividing by the span.
    EvaluatedGradient {
        kind: style.kind,
        start_point: Animator::resolve(&style.start_point, frame),
        end_point: Animator::resolve(&style.end_point, frame),
        stops: style.stops.clone(),
        opacity: Animator::resolve(&style.opacity, frame),
        rule: style.rule,
    }
}
