//! Conversions between the relative-handle vertex model and absolute cubic
//! segments, plus arc-length walking.
//!
//! The core data model stores handles relative to their owning vertex.
//! Everything that needs absolute control points goes through the named
//! conversions here; no component guesses the convention.

use compositor_data::model::{BezierPath, BezierVertex};
use kurbo::{BezPath, CubicBez, ParamCurve, ParamCurveArclen, ParamCurveDeriv, Point, Vec2};

/// Arc-length accuracy for trim/zig-zag sampling.
pub const ARCLEN_ACCURACY: f64 = 1e-4;

fn pt(p: [f64; 2]) -> Point {
    Point::new(p[0], p[1])
}

/// Absolute cubic segments of a path. Vertex `i`'s out-handle and vertex
/// `i+1`'s in-handle become the interior control points; closed paths get a
/// wrap-around segment.
pub fn cubic_segments(path: &BezierPath) -> Vec<CubicBez> {
    let n = path.vertices.len();
    if n < 2 {
        return Vec::new();
    }
    let seg_count = if path.closed { n } else { n - 1 };
    let mut segments = Vec::with_capacity(seg_count);
    for i in 0..seg_count {
        let a = &path.vertices[i];
        let b = &path.vertices[(i + 1) % n];
        let p0 = pt(a.point);
        let p3 = pt(b.point);
        let p1 = Point::new(p0.x + a.out_handle[0], p0.y + a.out_handle[1]);
        let p2 = Point::new(p3.x + b.in_handle[0], p3.y + b.in_handle[1]);
        segments.push(CubicBez::new(p0, p1, p2, p3));
    }
    segments
}

/// Converts to an absolute-coordinate `kurbo::BezPath` for consumers that
/// speak kurbo (renderer seams, bounding boxes).
pub fn to_kurbo(path: &BezierPath) -> BezPath {
    let mut bp = BezPath::new();
    if path.vertices.is_empty() {
        return bp;
    }
    bp.move_to(pt(path.vertices[0].point));
    for seg in cubic_segments(path) {
        bp.curve_to(seg.p1, seg.p2, seg.p3);
    }
    if path.closed {
        bp.close_path();
    }
    bp
}

/// Rebuilds a relative-handle path from a run of contiguous absolute cubics.
/// The result is open; trim slices and offset contours use this.
pub fn from_cubic_run(cubics: &[CubicBez]) -> BezierPath {
    if cubics.is_empty() {
        return BezierPath::default();
    }
    let mut vertices = Vec::with_capacity(cubics.len() + 1);
    for (i, seg) in cubics.iter().enumerate() {
        let in_handle = if i == 0 {
            [0.0, 0.0]
        } else {
            let prev = &cubics[i - 1];
            [prev.p2.x - prev.p3.x, prev.p2.y - prev.p3.y]
        };
        vertices.push(BezierVertex {
            point: [seg.p0.x, seg.p0.y],
            in_handle,
            out_handle: [seg.p1.x - seg.p0.x, seg.p1.y - seg.p0.y],
        });
    }
    let last = cubics[cubics.len() - 1];
    vertices.push(BezierVertex {
        point: [last.p3.x, last.p3.y],
        in_handle: [last.p2.x - last.p3.x, last.p2.y - last.p3.y],
        out_handle: [0.0, 0.0],
    });
    BezierPath {
        vertices,
        closed: false,
    }
}

/// Total arc length.
pub fn path_length(path: &BezierPath) -> f64 {
    cubic_segments(path)
        .iter()
        .map(|seg| seg.arclen(ARCLEN_ACCURACY))
        .sum()
}

/// Position and unit tangent at `dist` along the path. Clamped to the ends.
pub fn sample_at(path: &BezierPath, dist: f64) -> Option<(Point, Vec2)> {
    let segments = cubic_segments(path);
    if segments.is_empty() {
        return None;
    }

    let mut walked = 0.0;
    let mut last_seg = None;
    for seg in &segments {
        let seg_len = seg.arclen(ARCLEN_ACCURACY);
        if walked + seg_len >= dist {
            let t = if seg_len > 0.0 {
                seg.inv_arclen(dist - walked, ARCLEN_ACCURACY)
            } else {
                0.0
            };
            return Some((seg.eval(t), unit_tangent(seg, t)));
        }
        walked += seg_len;
        last_seg = Some(seg);
    }

    // Past the end: clamp to the final point.
    last_seg.map(|seg| (seg.eval(1.0), unit_tangent(seg, 1.0)))
}

fn unit_tangent(seg: &CubicBez, t: f64) -> Vec2 {
    let d = seg.deriv().eval(t);
    let v = Vec2::new(d.x, d.y);
    let len = v.hypot();
    if len > 1e-10 {
        v / len
    } else {
        Vec2::ZERO
    }
}

/// Extracts the arc-length range `[start, end]` as an open path. Both bounds
/// clamp to `[0, length]`; a degenerate or inverted span yields an empty path.
pub fn slice(path: &BezierPath, start: f64, end: f64) -> BezierPath {
    let segments = cubic_segments(path);
    if segments.is_empty() || end <= start {
        return BezierPath::default();
    }

    let mut out: Vec<CubicBez> = Vec::new();
    let mut walked = 0.0;
    for seg in &segments {
        let seg_len = seg.arclen(ARCLEN_ACCURACY);
        let seg_start = walked;
        let seg_end = walked + seg_len;
        walked = seg_end;
        if seg_len <= 0.0 || seg_end <= start {
            continue;
        }
        if seg_start >= end {
            break;
        }

        let t0 = if start > seg_start {
            seg.inv_arclen(start - seg_start, ARCLEN_ACCURACY)
        } else {
            0.0
        };
        let t1 = if end < seg_end {
            seg.inv_arclen(end - seg_start, ARCLEN_ACCURACY)
        } else {
            1.0
        };
        if t1 > t0 {
            out.push(seg.subsegment(t0..t1));
        }
    }

    from_cubic_run(&out)
}

/// Axis-aligned bounds over vertices and absolute handle positions.
pub fn handle_bounds(path: &BezierPath) -> Option<kurbo::Rect> {
    let mut points = Vec::new();
    for v in &path.vertices {
        let p = pt(v.point);
        points.push(p);
        points.push(Point::new(p.x + v.in_handle[0], p.y + v.in_handle[1]));
        points.push(Point::new(p.x + v.out_handle[0], p.y + v.out_handle[1]));
    }
    let first = points.first()?;
    let mut rect = kurbo::Rect::new(first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        rect = rect.union_pt(*p);
    }
    Some(rect)
}
