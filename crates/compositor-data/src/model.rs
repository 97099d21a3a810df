use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    /// Keyframe frames are not strictly increasing. Carries the index of the
    /// first offending keyframe.
    #[error("keyframe {index} is not after its predecessor")]
    UnorderedKeyframes { index: usize },
}

// ================================================================================================
// Animatable properties
// ================================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Linear,
    Hold,
    Bezier,
}

/// Cubic-bezier easing control points in the unit square, mapping segment
/// progress to eased progress. `(0,0)/(1,1)` handles reproduce linear timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Easing {
    #[serde(default)]
    pub out_handle: [f64; 2],
    #[serde(default = "one_one")]
    pub in_handle: [f64; 2],
}

fn one_one() -> [f64; 2] {
    [1.0, 1.0]
}

impl Default for Easing {
    fn default() -> Self {
        Self {
            out_handle: [0.0, 0.0],
            in_handle: [1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    pub frame: i64,
    pub value: T,
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default)]
    pub easing: Option<Easing>,
}

impl<T> Keyframe<T> {
    pub fn new(frame: i64, value: T) -> Self {
        Self {
            frame,
            value,
            interpolation: Interpolation::Linear,
            easing: None,
        }
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.interpolation = Interpolation::Bezier;
        self.easing = Some(easing);
        self
    }
}

/// A property that is either a static value or a keyframed curve.
///
/// Keyframes are kept sorted by frame ascending. Authoring duplicate frames is
/// repaired by `normalize_keyframes` (last one wins); callers that would
/// rather reject bad input can use `validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatableProperty<T> {
    pub value: T,
    #[serde(default)]
    pub animated: bool,
    #[serde(default = "Vec::new")]
    pub keyframes: Vec<Keyframe<T>>,
}

impl<T: Default> Default for AnimatableProperty<T> {
    fn default() -> Self {
        Self::fixed(T::default())
    }
}

impl<T> AnimatableProperty<T> {
    pub fn fixed(value: T) -> Self {
        Self {
            value,
            animated: false,
            keyframes: Vec::new(),
        }
    }

    pub fn animated(value: T, keyframes: Vec<Keyframe<T>>) -> Self {
        let mut prop = Self {
            value,
            animated: true,
            keyframes,
        };
        prop.normalize_keyframes();
        prop
    }

    /// Stable-sorts keyframes by frame ascending and collapses duplicate
    /// frames, keeping the last authored keyframe for each frame.
    pub fn normalize_keyframes(&mut self) {
        self.keyframes.sort_by_key(|kf| kf.frame);
        let mut deduped: Vec<Keyframe<T>> = Vec::with_capacity(self.keyframes.len());
        for kf in self.keyframes.drain(..) {
            match deduped.last_mut() {
                Some(prev) if prev.frame == kf.frame => *prev = kf,
                _ => deduped.push(kf),
            }
        }
        self.keyframes = deduped;
    }

    /// Checks the strictly-increasing frame invariant without repairing it.
    pub fn validate(&self) -> Result<(), ModelError> {
        for (index, pair) in self.keyframes.windows(2).enumerate() {
            if pair[1].frame <= pair[0].frame {
                return Err(ModelError::UnorderedKeyframes { index: index + 1 });
            }
        }
        Ok(())
    }
}

// ================================================================================================
// Bezier paths
// ================================================================================================

/// One on-curve point with its tangent handles. Handles are offsets **relative
/// to `point`**; absolute control points only exist at explicit conversion
/// boundaries (see `compositor_core::geometry`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BezierVertex {
    pub point: [f64; 2],
    #[serde(default)]
    pub in_handle: [f64; 2],
    #[serde(default)]
    pub out_handle: [f64; 2],
}

impl BezierVertex {
    pub fn corner(x: f64, y: f64) -> Self {
        Self {
            point: [x, y],
            in_handle: [0.0, 0.0],
            out_handle: [0.0, 0.0],
        }
    }

    pub fn smooth(point: [f64; 2], in_handle: [f64; 2], out_handle: [f64; 2]) -> Self {
        Self {
            point,
            in_handle,
            out_handle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BezierPath {
    #[serde(default)]
    pub vertices: Vec<BezierVertex>,
    #[serde(default)]
    pub closed: bool,
}

impl BezierPath {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Reverses winding. Handles swap roles when the traversal direction
    /// flips.
    pub fn reversed(&self) -> Self {
        let vertices = self
            .vertices
            .iter()
            .rev()
            .map(|v| BezierVertex {
                point: v.point,
                in_handle: v.out_handle,
                out_handle: v.in_handle,
            })
            .collect();
        Self {
            vertices,
            closed: self.closed,
        }
    }
}

// ================================================================================================
// Shape content tree
// ================================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Miter,
    #[default]
    Round,
    Bevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectangleShape {
    #[serde(default = "vec2_prop_zero")]
    pub position: AnimatableProperty<[f64; 2]>,
    #[serde(default = "vec2_prop_zero")]
    pub size: AnimatableProperty<[f64; 2]>,
    /// Per-corner radii, clockwise from top-left.
    #[serde(default)]
    pub corner_radii: AnimatableProperty<[f64; 4]>,
    #[serde(default)]
    pub reversed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EllipseShape {
    #[serde(default = "vec2_prop_zero")]
    pub position: AnimatableProperty<[f64; 2]>,
    pub size: AnimatableProperty<[f64; 2]>,
    #[serde(default)]
    pub reversed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolystarKind {
    #[default]
    Star,
    Polygon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolystarShape {
    #[serde(default = "vec2_prop_zero")]
    pub position: AnimatableProperty<[f64; 2]>,
    #[serde(default)]
    pub kind: PolystarKind,
    pub points: AnimatableProperty<f64>,
    pub outer_radius: AnimatableProperty<f64>,
    /// Ignored for polygons.
    #[serde(default)]
    pub inner_radius: AnimatableProperty<f64>,
    #[serde(default)]
    pub outer_roundness: AnimatableProperty<f64>,
    #[serde(default)]
    pub inner_roundness: AnimatableProperty<f64>,
    #[serde(default)]
    pub rotation: AnimatableProperty<f64>,
    #[serde(default)]
    pub reversed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathShape {
    pub path: AnimatableProperty<BezierPath>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillStyle {
    #[serde(default = "color_prop_white")]
    pub color: AnimatableProperty<[f64; 4]>,
    #[serde(default = "percent_prop_full")]
    pub opacity: AnimatableProperty<f64>,
    #[serde(default)]
    pub rule: FillRule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrokeStyle {
    #[serde(default = "color_prop_white")]
    pub color: AnimatableProperty<[f64; 4]>,
    #[serde(default = "scalar_prop_one")]
    pub width: AnimatableProperty<f64>,
    #[serde(default = "percent_prop_full")]
    pub opacity: AnimatableProperty<f64>,
    #[serde(default)]
    pub cap: LineCap,
    #[serde(default)]
    pub join: LineJoin,
    #[serde(default = "default_miter_limit")]
    pub miter_limit: f64,
    /// Alternating dash/gap lengths; empty means a solid stroke.
    #[serde(default)]
    pub dash_pattern: Vec<AnimatableProperty<f64>>,
    #[serde(default)]
    pub dash_offset: AnimatableProperty<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    #[default]
    Linear,
    Radial,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: f64,
    pub color: [f64; 4],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientFillStyle {
    #[serde(default)]
    pub kind: GradientKind,
    #[serde(default = "vec2_prop_zero")]
    pub start_point: AnimatableProperty<[f64; 2]>,
    #[serde(default = "vec2_prop_zero")]
    pub end_point: AnimatableProperty<[f64; 2]>,
    #[serde(default)]
    pub stops: Vec<GradientStop>,
    #[serde(default = "percent_prop_full")]
    pub opacity: AnimatableProperty<f64>,
    #[serde(default)]
    pub rule: FillRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimMode {
    #[default]
    Simultaneously,
    Individually,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrimOp {
    #[serde(default)]
    pub start: AnimatableProperty<f64>,
    #[serde(default = "percent_prop_full")]
    pub end: AnimatableProperty<f64>,
    #[serde(default)]
    pub offset: AnimatableProperty<f64>,
    #[serde(default)]
    pub mode: TrimMode,
}

/// `Add` concatenates subpaths with winding preserved; `Subtract` appends the
/// later paths with reversed winding so a `nonzero` fill carves them out.
/// `Intersect`/`Exclude` are accepted but currently pass geometry through
/// unchanged (boolean rasterization belongs to the renderer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    #[default]
    Add,
    Subtract,
    Intersect,
    Exclude,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeOp {
    #[serde(default)]
    pub mode: MergeMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffsetOp {
    #[serde(default)]
    pub amount: AnimatableProperty<f64>,
    #[serde(default)]
    pub join: LineJoin,
    #[serde(default = "default_miter_limit")]
    pub miter_limit: f64,
    #[serde(default = "scalar_prop_one")]
    pub copies: AnimatableProperty<f64>,
    #[serde(default)]
    pub copy_offset: AnimatableProperty<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuckerBloatOp {
    /// Percentage; positive bloats, negative puckers.
    #[serde(default)]
    pub amount: AnimatableProperty<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WiggleOp {
    #[serde(default)]
    pub amount: AnimatableProperty<f64>,
    #[serde(default)]
    pub temporal_phase: AnimatableProperty<f64>,
    #[serde(default)]
    pub seed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZigZagOp {
    #[serde(default)]
    pub ridges: AnimatableProperty<f64>,
    #[serde(default)]
    pub size: AnimatableProperty<f64>,
    #[serde(default)]
    pub smooth: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwistOp {
    #[serde(default)]
    pub angle: AnimatableProperty<f64>,
    #[serde(default = "vec2_prop_zero")]
    pub center: AnimatableProperty<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundCornersOp {
    #[serde(default)]
    pub radius: AnimatableProperty<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeOrder {
    #[default]
    Above,
    Below,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepeaterTransform {
    #[serde(default = "vec2_prop_zero")]
    pub anchor: AnimatableProperty<[f64; 2]>,
    #[serde(default = "vec2_prop_zero")]
    pub position: AnimatableProperty<[f64; 2]>,
    #[serde(default = "vec2_prop_hundred")]
    pub scale: AnimatableProperty<[f64; 2]>,
    #[serde(default)]
    pub rotation: AnimatableProperty<f64>,
    #[serde(default = "percent_prop_full")]
    pub start_opacity: AnimatableProperty<f64>,
    #[serde(default = "percent_prop_full")]
    pub end_opacity: AnimatableProperty<f64>,
}

impl Default for RepeaterTransform {
    fn default() -> Self {
        Self {
            anchor: vec2_prop_zero(),
            position: vec2_prop_zero(),
            scale: vec2_prop_hundred(),
            rotation: AnimatableProperty::fixed(0.0),
            start_opacity: percent_prop_full(),
            end_opacity: percent_prop_full(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepeaterData {
    #[serde(default = "scalar_prop_one")]
    pub copies: AnimatableProperty<f64>,
    #[serde(default)]
    pub offset: AnimatableProperty<f64>,
    #[serde(default)]
    pub transform: RepeaterTransform,
    #[serde(default)]
    pub composite: CompositeOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupTransform {
    #[serde(default = "vec2_prop_zero")]
    pub anchor: AnimatableProperty<[f64; 2]>,
    #[serde(default = "vec2_prop_zero")]
    pub position: AnimatableProperty<[f64; 2]>,
    #[serde(default = "vec2_prop_hundred")]
    pub scale: AnimatableProperty<[f64; 2]>,
    #[serde(default)]
    pub rotation: AnimatableProperty<f64>,
    #[serde(default = "percent_prop_full")]
    pub opacity: AnimatableProperty<f64>,
}

impl Default for GroupTransform {
    fn default() -> Self {
        Self {
            anchor: vec2_prop_zero(),
            position: vec2_prop_zero(),
            scale: vec2_prop_hundred(),
            rotation: AnimatableProperty::fixed(0.0),
            opacity: percent_prop_full(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupShape {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub items: Vec<ShapeItem>,
}

/// One entry of a layer's flat, ordered vector-content list. Order is
/// semantic: operators apply to the generators declared before them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShapeItem {
    Rectangle(RectangleShape),
    Ellipse(EllipseShape),
    Polystar(PolystarShape),
    Path(PathShape),
    Fill(FillStyle),
    Stroke(StrokeStyle),
    GradientFill(GradientFillStyle),
    Trim(TrimOp),
    Merge(MergeOp),
    OffsetPath(OffsetOp),
    PuckerBloat(PuckerBloatOp),
    WigglePath(WiggleOp),
    ZigZag(ZigZagOp),
    Twist(TwistOp),
    RoundCorners(RoundCornersOp),
    Repeater(RepeaterData),
    Transform(GroupTransform),
    Group(GroupShape),
    /// Unrecognized item types deserialize here and evaluate as no-ops.
    #[serde(other)]
    Unknown,
}

// ================================================================================================
// Layers
// ================================================================================================

/// Transform channels are stored per scalar so drivers and audio modulation
/// can target individual axes (`transform.position.x`, `transform.rotationZ`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerTransform {
    #[serde(default)]
    pub position_x: AnimatableProperty<f64>,
    #[serde(default)]
    pub position_y: AnimatableProperty<f64>,
    #[serde(default)]
    pub position_z: AnimatableProperty<f64>,
    #[serde(default = "scalar_prop_hundred")]
    pub scale_x: AnimatableProperty<f64>,
    #[serde(default = "scalar_prop_hundred")]
    pub scale_y: AnimatableProperty<f64>,
    #[serde(default = "scalar_prop_hundred")]
    pub scale_z: AnimatableProperty<f64>,
    #[serde(default)]
    pub rotation_x: AnimatableProperty<f64>,
    #[serde(default)]
    pub rotation_y: AnimatableProperty<f64>,
    #[serde(default)]
    pub rotation_z: AnimatableProperty<f64>,
    #[serde(default)]
    pub origin_x: AnimatableProperty<f64>,
    #[serde(default)]
    pub origin_y: AnimatableProperty<f64>,
    #[serde(default)]
    pub origin_z: AnimatableProperty<f64>,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            position_x: AnimatableProperty::fixed(0.0),
            position_y: AnimatableProperty::fixed(0.0),
            position_z: AnimatableProperty::fixed(0.0),
            scale_x: scalar_prop_hundred(),
            scale_y: scalar_prop_hundred(),
            scale_z: scalar_prop_hundred(),
            rotation_x: AnimatableProperty::fixed(0.0),
            rotation_y: AnimatableProperty::fixed(0.0),
            rotation_z: AnimatableProperty::fixed(0.0),
            origin_x: AnimatableProperty::fixed(0.0),
            origin_y: AnimatableProperty::fixed(0.0),
            origin_z: AnimatableProperty::fixed(0.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplineControlPoint {
    #[serde(default)]
    pub x: AnimatableProperty<f64>,
    #[serde(default)]
    pub y: AnimatableProperty<f64>,
    #[serde(default)]
    pub in_handle: [f64; 2],
    #[serde(default)]
    pub out_handle: [f64; 2],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplineData {
    #[serde(default)]
    pub control_points: Vec<SplineControlPoint>,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayerContent {
    Shape {
        #[serde(default)]
        items: Vec<ShapeItem>,
    },
    Spline {
        #[serde(default)]
        data: SplineData,
    },
    #[default]
    Null,
    /// Unrecognized layer kinds deserialize here; they evaluate transform and
    /// opacity but produce no content.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectInstance {
    pub effect_type: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub parameters: BTreeMap<String, AnimatableProperty<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub in_point: i64,
    #[serde(default = "default_out_point")]
    pub out_point: i64,
    #[serde(default)]
    pub three_d: bool,
    #[serde(default)]
    pub motion_blur: bool,
    #[serde(default)]
    pub transform: LayerTransform,
    #[serde(default = "percent_prop_full")]
    pub opacity: AnimatableProperty<f64>,
    #[serde(default)]
    pub content: LayerContent,
    #[serde(default)]
    pub effects: Vec<EffectInstance>,
}

impl Layer {
    /// Repairs keyframe ordering across every animatable property the layer
    /// carries, including nested shape items, spline channels, and effect
    /// parameters. Loaders call this once; evaluation assumes sorted frames.
    pub fn normalize(&mut self) {
        self.opacity.normalize_keyframes();
        let t = &mut self.transform;
        for prop in [
            &mut t.position_x,
            &mut t.position_y,
            &mut t.position_z,
            &mut t.scale_x,
            &mut t.scale_y,
            &mut t.scale_z,
            &mut t.rotation_x,
            &mut t.rotation_y,
            &mut t.rotation_z,
            &mut t.origin_x,
            &mut t.origin_y,
            &mut t.origin_z,
        ] {
            prop.normalize_keyframes();
        }

        match &mut self.content {
            LayerContent::Shape { items } => {
                for item in items {
                    item.normalize();
                }
            }
            LayerContent::Spline { data } => {
                for cp in &mut data.control_points {
                    cp.x.normalize_keyframes();
                    cp.y.normalize_keyframes();
                }
            }
            LayerContent::Null | LayerContent::Unknown => {}
        }

        for effect in &mut self.effects {
            for prop in effect.parameters.values_mut() {
                prop.normalize_keyframes();
            }
        }
    }
}

impl ShapeItem {
    fn normalize(&mut self) {
        match self {
            ShapeItem::Rectangle(s) => {
                s.position.normalize_keyframes();
                s.size.normalize_keyframes();
                s.corner_radii.normalize_keyframes();
            }
            ShapeItem::Ellipse(s) => {
                s.position.normalize_keyframes();
                s.size.normalize_keyframes();
            }
            ShapeItem::Polystar(s) => {
                s.position.normalize_keyframes();
                s.points.normalize_keyframes();
                s.outer_radius.normalize_keyframes();
                s.inner_radius.normalize_keyframes();
                s.outer_roundness.normalize_keyframes();
                s.inner_roundness.normalize_keyframes();
                s.rotation.normalize_keyframes();
            }
            ShapeItem::Path(s) => s.path.normalize_keyframes(),
            ShapeItem::Fill(s) => {
                s.color.normalize_keyframes();
                s.opacity.normalize_keyframes();
            }
            ShapeItem::Stroke(s) => {
                s.color.normalize_keyframes();
                s.width.normalize_keyframes();
                s.opacity.normalize_keyframes();
                for dash in &mut s.dash_pattern {
                    dash.normalize_keyframes();
                }
                s.dash_offset.normalize_keyframes();
            }
            ShapeItem::GradientFill(s) => {
                s.start_point.normalize_keyframes();
                s.end_point.normalize_keyframes();
                s.opacity.normalize_keyframes();
            }
            ShapeItem::Trim(s) => {
                s.start.normalize_keyframes();
                s.end.normalize_keyframes();
                s.offset.normalize_keyframes();
            }
            ShapeItem::OffsetPath(s) => {
                s.amount.normalize_keyframes();
                s.copies.normalize_keyframes();
                s.copy_offset.normalize_keyframes();
            }
            ShapeItem::PuckerBloat(s) => s.amount.normalize_keyframes(),
            ShapeItem::WigglePath(s) => {
                s.amount.normalize_keyframes();
                s.temporal_phase.normalize_keyframes();
            }
            ShapeItem::ZigZag(s) => {
                s.ridges.normalize_keyframes();
                s.size.normalize_keyframes();
            }
            ShapeItem::Twist(s) => {
                s.angle.normalize_keyframes();
                s.center.normalize_keyframes();
            }
            ShapeItem::RoundCorners(s) => s.radius.normalize_keyframes(),
            ShapeItem::Repeater(s) => {
                s.copies.normalize_keyframes();
                s.offset.normalize_keyframes();
                s.transform.anchor.normalize_keyframes();
                s.transform.position.normalize_keyframes();
                s.transform.scale.normalize_keyframes();
                s.transform.rotation.normalize_keyframes();
                s.transform.start_opacity.normalize_keyframes();
                s.transform.end_opacity.normalize_keyframes();
            }
            ShapeItem::Transform(s) => {
                s.anchor.normalize_keyframes();
                s.position.normalize_keyframes();
                s.scale.normalize_keyframes();
                s.rotation.normalize_keyframes();
                s.opacity.normalize_keyframes();
            }
            ShapeItem::Group(g) => {
                for item in &mut g.items {
                    item.normalize();
                }
            }
            ShapeItem::Merge(_) | ShapeItem::Unknown => {}
        }
    }
}

// Serde defaults

fn default_true() -> bool {
    true
}

fn default_out_point() -> i64 {
    i64::MAX
}

fn default_miter_limit() -> f64 {
    4.0
}

fn scalar_prop_one() -> AnimatableProperty<f64> {
    AnimatableProperty::fixed(1.0)
}

fn scalar_prop_hundred() -> AnimatableProperty<f64> {
    AnimatableProperty::fixed(100.0)
}

fn percent_prop_full() -> AnimatableProperty<f64> {
    AnimatableProperty::fixed(100.0)
}

fn vec2_prop_zero() -> AnimatableProperty<[f64; 2]> {
    AnimatableProperty::fixed([0.0, 0.0])
}

fn vec2_prop_hundred() -> AnimatableProperty<[f64; 2]> {
    AnimatableProperty::fixed([100.0, 100.0])
}

fn color_prop_white() -> AnimatableProperty<[f64; 4]> {
    AnimatableProperty::fixed([1.0, 1.0, 1.0, 1.0])
}
