//! Repeater expansion: one path set becomes `copies` transformed instances
//! with per-copy opacity, in an exact paint order.

use crate::animatable::Animator;
use compositor_data::model::{BezierPath, CompositeOrder, RepeaterData};
use kurbo::{Affine, Point};

/// One expanded copy. Opacity is a percentage multiplier the style stage
/// folds into fills and strokes.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatedPath {
    pub path: BezierPath,
    pub opacity: f64,
}

/// Expands `paths` into `copies` instances. Copy `i` receives the repeater
/// transform raised to `offset + i` (position and rotation scale linearly,
/// scale compounds exponentially, all about the anchor) and an opacity lerped
/// from `start_opacity` to `end_opacity` across the copy index.
///
/// Paint order: `Below` emits copy 0 first then ascending copies; `Above`
/// emits descending copies first so copy 0 paints last on top.
pub fn expand(paths: &[BezierPath], data: &RepeaterData, frame: i64) -> Vec<RepeatedPath> {
    let copies = Animator::resolve(&data.copies, frame).round() as i64;
    if copies <= 1 {
        return paths
            .iter()
            .map(|p| RepeatedPath {
                path: p.clone(),
                opacity: 100.0,
            })
            .collect();
    }

    let offset = Animator::resolve(&data.offset, frame);
    let anchor = Animator::resolve(&data.transform.anchor, frame);
    let position = Animator::resolve(&data.transform.position, frame);
    let scale = Animator::resolve(&data.transform.scale, frame);
    let rotation = Animator::resolve(&data.transform.rotation, frame);
    let start_opacity = Animator::resolve(&data.transform.start_opacity, frame);
    let end_opacity = Animator::resolve(&data.transform.end_opacity, frame);

    let indices: Vec<i64> = match data.composite {
        CompositeOrder::Below => (0..copies).collect(),
        CompositeOrder::Above => (0..copies).rev().collect(),
    };

    let mut out = Vec::with_capacity(indices.len() * paths.len());
    for i in indices {
        let k = offset + i as f64;
        let affine = copy_affine(anchor, position, scale, rotation, k);

        let t = i as f64 / (copies - 1) as f64;
        let opacity = start_opacity + (end_opacity - start_opacity) * t;

        for path in paths {
            out.push(RepeatedPath {
                path: transform_path(path, affine),
                opacity,
            });
        }
    }
    out
}

fn copy_affine(anchor: [f64; 2], position: [f64; 2], scale: [f64; 2], rotation: f64, k: f64) -> Affine {
    let sx = (scale[0] / 100.0).powf(k);
    let sy = (scale[1] / 100.0).powf(k);
    Affine::translate((position[0] * k + anchor[0], position[1] * k + anchor[1]))
        * Affine::rotate((rotation * k).to_radians())
        * Affine::scale_non_uniform(sx, sy)
        * Affine::translate((-anchor[0], -anchor[1]))
}

/// Applies the affine to vertex points, and its linear part to the relative
/// handles.
fn transform_path(path: &BezierPath, affine: Affine) -> BezierPath {
    let coeffs = affine.as_coeffs();
    let linear = |h: [f64; 2]| -> [f64; 2] {
        [
            coeffs[0] * h[0] + coeffs[2] * h[1],
            coeffs[1] * h[0] + coeffs[3] * h[1],
        ]
    };

    let mut out = path.clone();
    for v in &mut out.vertices {
        let p = affine * Point::new(v.point[0], v.point[1]);
        v.point = [p.x, p.y];
        v.in_handle = linear(v.in_handle);
        v.out_handle = linear(v.out_handle);
    }
    out
}
