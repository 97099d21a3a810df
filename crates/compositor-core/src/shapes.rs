//! Parametric shape generators. Each generator resolves its own animatable
//! parameters at the requested frame and emits a fresh relative-handle path.

use crate::animatable::Animator;
use compositor_data::model::{
    BezierPath, BezierVertex, EllipseShape, PathShape, PolystarKind, PolystarShape, RectangleShape,
};

/// Cubic-bezier approximation constant for a quarter circle.
pub const CIRCLE_KAPPA: f64 = 0.551_915_024_493_510_6;

fn maybe_reverse(path: BezierPath, reversed: bool) -> BezierPath {
    if reversed {
        path.reversed()
    } else {
        path
    }
}

/// Center-anchored rectangle with per-corner radii (clockwise from top-left).
/// A zero radius keeps the sharp corner vertex; a positive radius replaces it
/// with a circular-arc pair.
pub fn generate_rectangle(shape: &RectangleShape, frame: i64) -> BezierPath {
    let [cx, cy] = Animator::resolve(&shape.position, frame);
    let [w, h] = Animator::resolve(&shape.size, frame);
    let radii = Animator::resolve(&shape.corner_radii, frame);

    let hw = w.abs() / 2.0;
    let hh = h.abs() / 2.0;
    let max_radius = hw.min(hh);

    // Clockwise in Y-down authoring space, starting top-left.
    let corners = [
        [cx - hw, cy - hh],
        [cx + hw, cy - hh],
        [cx + hw, cy + hh],
        [cx - hw, cy + hh],
    ];
    // Direction of travel arriving at each corner.
    let incoming = [[0.0, -1.0], [1.0, 0.0], [0.0, 1.0], [-1.0, 0.0]];

    let mut vertices = Vec::with_capacity(8);
    for i in 0..4 {
        let r = radii[i].max(0.0).min(max_radius);
        let corner = corners[i];
        if r <= 0.0 {
            vertices.push(BezierVertex::corner(corner[0], corner[1]));
            continue;
        }

        let din = incoming[i];
        let dout = incoming[(i + 1) % 4];
        let k = r * CIRCLE_KAPPA;
        // Arc entry: r back along the incoming edge, handle toward the corner.
        vertices.push(BezierVertex {
            point: [corner[0] - din[0] * r, corner[1] - din[1] * r],
            in_handle: [0.0, 0.0],
            out_handle: [din[0] * k, din[1] * k],
        });
        // Arc exit: r ahead along the outgoing edge.
        vertices.push(BezierVertex {
            point: [corner[0] + dout[0] * r, corner[1] + dout[1] * r],
            in_handle: [-dout[0] * k, -dout[1] * k],
            out_handle: [0.0, 0.0],
        });
    }

    maybe_reverse(
        BezierPath {
            vertices,
            closed: true,
        },
        shape.reversed,
    )
}

/// Ellipse as four cubic quarter-arcs, starting at the top and travelling
/// clockwise in Y-down space.
pub fn generate_ellipse(shape: &EllipseShape, frame: i64) -> BezierPath {
    let [cx, cy] = Animator::resolve(&shape.position, frame);
    let [w, h] = Animator::resolve(&shape.size, frame);
    let rx = w.abs() / 2.0;
    let ry = h.abs() / 2.0;
    let kx = rx * CIRCLE_KAPPA;
    let ky = ry * CIRCLE_KAPPA;

    let vertices = vec![
        BezierVertex {
            point: [cx, cy - ry],
            in_handle: [-kx, 0.0],
            out_handle: [kx, 0.0],
        },
        BezierVertex {
            point: [cx + rx, cy],
            in_handle: [0.0, -ky],
            out_handle: [0.0, ky],
        },
        BezierVertex {
            point: [cx, cy + ry],
            in_handle: [kx, 0.0],
            out_handle: [-kx, 0.0],
        },
        BezierVertex {
            point: [cx - rx, cy],
            in_handle: [0.0, ky],
            out_handle: [0.0, -ky],
        },
    ];

    maybe_reverse(
        BezierPath {
            vertices,
            closed: true,
        },
        shape.reversed,
    )
}

/// Star/polygon generator. Stars alternate outer and inner radii; polygons
/// use outer vertices only. Roundness is a percentage that bends each vertex's
/// tangents along the circumscribing circle.
pub fn generate_polystar(shape: &PolystarShape, frame: i64) -> BezierPath {
    let [cx, cy] = Animator::resolve(&shape.position, frame);
    let points = Animator::resolve(&shape.points, frame).round().max(3.0) as usize;
    let outer_radius = Animator::resolve(&shape.outer_radius, frame);
    let outer_roundness = Animator::resolve(&shape.outer_roundness, frame);
    let rotation = Animator::resolve(&shape.rotation, frame).to_radians();

    let is_star = shape.kind == PolystarKind::Star;
    let vertex_count = if is_star { points * 2 } else { points };
    let angle_step = std::f64::consts::TAU / vertex_count as f64;

    let (inner_radius, inner_roundness) = if is_star {
        (
            Animator::resolve(&shape.inner_radius, frame),
            Animator::resolve(&shape.inner_roundness, frame),
        )
    } else {
        (0.0, 0.0)
    };

    let mut vertices = Vec::with_capacity(vertex_count);
    // First vertex points straight up; Y-down means -PI/2.
    let mut angle = -std::f64::consts::FRAC_PI_2 + rotation;
    for i in 0..vertex_count {
        let (radius, roundness) = if is_star && i % 2 == 1 {
            (inner_radius, inner_roundness)
        } else {
            (outer_radius, outer_roundness)
        };

        let (sin, cos) = angle.sin_cos();
        let point = [cx + radius * cos, cy + radius * sin];

        // Tangent follows the circumscribing circle in the direction of
        // travel; scaled by the roundness percentage and the angular span.
        let tangent_len = radius * roundness * 0.01 * angle_step * 0.5;
        let tangent = [-sin * tangent_len, cos * tangent_len];

        vertices.push(BezierVertex {
            point,
            in_handle: [-tangent[0], -tangent[1]],
            out_handle: tangent,
        });
        angle += angle_step;
    }

    maybe_reverse(
        BezierPath {
            vertices,
            closed: true,
        },
        shape.reversed,
    )
}

/// Authored-path generator: a deep copy of the resolved path so downstream
/// operators can never reach back into the declarative model.
pub fn generate_path(shape: &PathShape, frame: i64) -> BezierPath {
    Animator::resolve(&shape.path, frame)
}
