//! Path operators. Each is a pure function from a path set to a path set and
//! runs in declared order; nothing here mutates the declarative shape tree.

use crate::animatable::Animator;
use crate::geometry::{self, cubic_segments, handle_bounds, path_length};
use compositor_data::model::{
    BezierPath, BezierVertex, LineJoin, MergeMode, MergeOp, OffsetOp, PuckerBloatOp,
    RoundCornersOp, TrimMode, TrimOp, TwistOp, WiggleOp, ZigZagOp,
};
use kurbo::{ParamCurve, ParamCurveArclen, ParamCurveDeriv, Point, Vec2};

use crate::shapes::CIRCLE_KAPPA;

// ================================================================================================
// Trim
// ================================================================================================

/// Trim parameters resolved at a frame. Kept as a separate step so callers
/// that track per-path metadata can trim path-by-path with the right stagger.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTrim {
    lo: f64,
    span: f64,
    offset: f64,
    mode: TrimMode,
}

pub fn resolve_trim(op: &TrimOp, frame: i64) -> ResolvedTrim {
    let start = Animator::resolve(&op.start, frame);
    let end = Animator::resolve(&op.end, frame);
    let lo = start.min(end);
    ResolvedTrim {
        lo,
        span: (start.max(end) - lo).clamp(0.0, 100.0),
        offset: Animator::resolve(&op.offset, frame),
        mode: op.mode,
    }
}

impl ResolvedTrim {
    pub fn span(&self) -> f64 {
        self.span
    }

    /// Percentage window for path `index` of `count`. `Individually` staggers
    /// each path by `(100 / count) * index`, wrapping modulo 100, which
    /// produces the chase effect across multiple paths.
    pub fn window(&self, index: usize, count: usize) -> (f64, f64) {
        let stagger = match self.mode {
            TrimMode::Simultaneously => 0.0,
            TrimMode::Individually => (100.0 / count.max(1) as f64) * index as f64,
        };
        ((self.lo + self.offset + stagger).rem_euclid(100.0), self.span)
    }
}

/// Trims one path to a percentage window of its own arc length. Windows that
/// wrap past 100% join across the seam on closed paths and split in two on
/// open ones.
pub fn trim_one(path: &BezierPath, window_start: f64, span: f64) -> Vec<BezierPath> {
    if span <= 0.0 {
        return Vec::new();
    }
    if span >= 100.0 {
        return vec![path.clone()];
    }

    let len = path_length(path);
    if len <= 0.0 {
        return Vec::new();
    }
    let window_end = window_start + span;

    if window_end <= 100.0 {
        let sliced = geometry::slice(path, window_start / 100.0 * len, window_end / 100.0 * len);
        if sliced.vertices.is_empty() {
            Vec::new()
        } else {
            vec![sliced]
        }
    } else {
        let head = geometry::slice(path, window_start / 100.0 * len, len);
        let tail = geometry::slice(path, 0.0, (window_end - 100.0) / 100.0 * len);
        if path.closed {
            // A closed path is continuous across the seam, so the two pieces
            // join into one open run.
            concat_open(head, tail).into_iter().collect()
        } else {
            [head, tail]
                .into_iter()
                .filter(|p| !p.vertices.is_empty())
                .collect()
        }
    }
}

/// Trims every path to its window.
pub fn trim_paths(paths: Vec<BezierPath>, op: &TrimOp, frame: i64) -> Vec<BezierPath> {
    let trim = resolve_trim(op, frame);
    let count = paths.len();
    let mut out = Vec::with_capacity(count);
    for (index, path) in paths.iter().enumerate() {
        let (window_start, span) = trim.window(index, count);
        out.extend(trim_one(path, window_start, span));
    }
    out
}

fn concat_open(mut head: BezierPath, tail: BezierPath) -> Option<BezierPath> {
    if head.vertices.is_empty() {
        return (!tail.vertices.is_empty()).then_some(tail);
    }
    if tail.vertices.is_empty() {
        return Some(head);
    }
    // The seam vertex appears at the end of `head` and the start of `tail`;
    // merge it, keeping the inbound handle from one side and the outbound
    // from the other.
    let junction = head.vertices.len() - 1;
    head.vertices[junction].out_handle = tail.vertices[0].out_handle;
    head.vertices.extend_from_slice(&tail.vertices[1..]);
    Some(head)
}

// ================================================================================================
// Merge
// ================================================================================================

/// Combines the path set for a single fill. `Add` keeps windings as authored
/// (a `nonzero` fill unions them); `Subtract` reverses every path after the
/// first so the fill carves them out. `Intersect` and `Exclude` pass through
/// unchanged; rasterized boolean ops live in the renderer.
pub fn merge_paths(paths: Vec<BezierPath>, op: &MergeOp) -> Vec<BezierPath> {
    match op.mode {
        MergeMode::Add | MergeMode::Intersect | MergeMode::Exclude => paths,
        MergeMode::Subtract => paths
            .into_iter()
            .enumerate()
            .map(|(i, p)| if i == 0 { p } else { p.reversed() })
            .collect(),
    }
}

// ================================================================================================
// Offset
// ================================================================================================

/// Insets/outsets each path by a signed distance. Positive amounts push
/// outward for the clockwise winding the generators emit. `copies > 1` emits
/// concentric contours separated by `copy_offset`.
pub fn offset_paths(paths: Vec<BezierPath>, op: &OffsetOp, frame: i64) -> Vec<BezierPath> {
    let amount = Animator::resolve(&op.amount, frame);
    let copies = Animator::resolve(&op.copies, frame).round().max(1.0) as usize;
    let copy_offset = Animator::resolve(&op.copy_offset, frame);

    if amount == 0.0 && (copies <= 1 || copy_offset == 0.0) {
        return paths;
    }

    let mut out = Vec::with_capacity(paths.len() * copies);
    for path in &paths {
        for k in 0..copies {
            let distance = amount + copy_offset * k as f64;
            if distance == 0.0 {
                out.push(path.clone());
            } else if let Some(contour) =
                offset_contour(path, distance, op.join, op.miter_limit)
            {
                out.push(contour);
            }
        }
    }
    out
}

/// Samples the path into a polyline with normals, then rebuilds the displaced
/// contour with the requested join behavior at direction changes.
fn offset_contour(
    path: &BezierPath,
    distance: f64,
    join: LineJoin,
    miter_limit: f64,
) -> Option<BezierPath> {
    let segments = cubic_segments(path);
    if segments.is_empty() {
        return None;
    }

    // (position, outward normal) samples. Straight segments contribute their
    // endpoints; curved ones are sampled by arc length.
    let mut samples: Vec<(Point, Vec2)> = Vec::new();
    for seg in &segments {
        let chord = (seg.p3 - seg.p0).hypot();
        let arclen = seg.arclen(0.01);
        let is_line = (arclen - chord).abs() < 1e-6;
        let steps = if is_line {
            1
        } else {
            10usize.max((arclen / 5.0) as usize)
        };
        // The segment start is pushed even when it coincides with the previous
        // segment's end: the join logic needs both the incoming and outgoing
        // normal at a corner.
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let d = seg.deriv().eval(t);
            let tangent = Vec2::new(d.x, d.y);
            let len = tangent.hypot();
            if len <= 1e-10 {
                continue;
            }
            let tangent = tangent / len;
            // Outward for clockwise winding in Y-down space.
            let normal = Vec2::new(tangent.y, -tangent.x);
            samples.push((seg.eval(t), normal));
        }
    }
    if samples.len() < 2 {
        return None;
    }

    let mut points: Vec<Point> = Vec::new();
    points.push(samples[0].0 + samples[0].1 * distance);
    for i in 1..samples.len() {
        let (prev_pos, prev_normal) = samples[i - 1];
        let (curr_pos, curr_normal) = samples[i];
        let curr_offset = curr_pos + curr_normal * distance;

        let normal_dot = prev_normal.dot(curr_normal);
        if normal_dot > 0.99 {
            points.push(curr_offset);
            continue;
        }

        match join {
            LineJoin::Round => {
                let cross = prev_normal.x * curr_normal.y - prev_normal.y * curr_normal.x;
                let angle = cross.atan2(normal_dot);
                let arc_steps = 5usize.max((angle.abs() * 10.0) as usize);
                for j in 1..=arc_steps {
                    let t = j as f64 / arc_steps as f64;
                    let blended = Vec2::new(
                        prev_normal.x + (curr_normal.x - prev_normal.x) * t,
                        prev_normal.y + (curr_normal.y - prev_normal.y) * t,
                    );
                    let len = blended.hypot();
                    if len > 1e-10 {
                        points.push(curr_pos + (blended / len) * distance);
                    }
                }
                points.push(curr_offset);
            }
            LineJoin::Bevel => points.push(curr_offset),
            LineJoin::Miter => {
                let prev_offset = prev_pos + prev_normal * distance;
                let prev_tangent = Vec2::new(prev_normal.y, -prev_normal.x);
                let curr_tangent = Vec2::new(curr_normal.y, -curr_normal.x);
                let det = prev_tangent.x * curr_tangent.y - prev_tangent.y * curr_tangent.x;
                if det.abs() > 1e-10 {
                    let dx = curr_offset.x - prev_offset.x;
                    let dy = curr_offset.y - prev_offset.y;
                    let t1 = (dx * curr_tangent.y - dy * curr_tangent.x) / det;
                    let miter_point = prev_offset + prev_tangent * t1;
                    if (miter_point - curr_pos).hypot() < miter_limit * distance.abs() {
                        points.push(miter_point);
                    }
                }
                points.push(curr_offset);
            }
        }
    }

    let vertices: Vec<BezierVertex> = points
        .iter()
        .map(|p| BezierVertex::corner(p.x, p.y))
        .collect();
    Some(BezierPath {
        vertices,
        closed: path.closed,
    })
}

// ================================================================================================
// Pucker & Bloat
// ================================================================================================

/// Scales vertex points and tangent handles in opposite directions around the
/// path's bounds center. Positive amounts push vertices out and pull tangents
/// in (bloat); negative amounts invert both (pucker).
pub fn pucker_bloat_paths(
    mut paths: Vec<BezierPath>,
    op: &PuckerBloatOp,
    frame: i64,
) -> Vec<BezierPath> {
    let amount = Animator::resolve(&op.amount, frame);
    if amount == 0.0 {
        return paths;
    }

    let factor = amount / 100.0;
    let point_scale = 1.0 + factor;
    let handle_scale = 1.0 - factor;

    for path in &mut paths {
        let Some(bounds) = handle_bounds(path) else {
            continue;
        };
        let center = bounds.center();
        for v in &mut path.vertices {
            let p = Point::new(v.point[0], v.point[1]);
            // Handles are scaled as absolute control points, then re-expressed
            // relative to the moved vertex.
            let in_abs = Point::new(p.x + v.in_handle[0], p.y + v.in_handle[1]);
            let out_abs = Point::new(p.x + v.out_handle[0], p.y + v.out_handle[1]);

            let new_p = center + (p - center) * point_scale;
            let new_in = center + (in_abs - center) * handle_scale;
            let new_out = center + (out_abs - center) * handle_scale;

            v.point = [new_p.x, new_p.y];
            v.in_handle = [new_in.x - new_p.x, new_in.y - new_p.y];
            v.out_handle = [new_out.x - new_p.x, new_out.y - new_p.y];
        }
    }
    paths
}

// ================================================================================================
// Wiggle
// ================================================================================================

/// Displaces each vertex by deterministic hash noise. The noise input is the
/// temporal phase (`temporal_phase + frame * 0.1`) and a seed offset by the
/// path index, so multiple paths wiggle out of phase while identical inputs
/// always reproduce identical geometry.
pub fn wiggle_paths(mut paths: Vec<BezierPath>, op: &WiggleOp, frame: i64) -> Vec<BezierPath> {
    let amount = Animator::resolve(&op.amount, frame);
    if amount == 0.0 {
        return paths;
    }
    let phase = Animator::resolve(&op.temporal_phase, frame) + frame as f64 * 0.1;

    for (path_index, path) in paths.iter_mut().enumerate() {
        let path_seed = op.seed + path_index as f64 * 7.13;
        for (j, v) in path.vertices.iter_mut().enumerate() {
            let d = vertex_noise(phase, path_seed, j);
            v.point[0] += d.x * amount;
            v.point[1] += d.y * amount;
        }
    }
    paths
}

/// Value noise in [-1, 1] per axis: hash the integer phase steps and lerp by
/// the fractional part so the motion is continuous over phase.
fn vertex_noise(phase: f64, seed: f64, vertex: usize) -> Vec2 {
    let t_i = phase.floor();
    let t_f = phase - t_i;

    let hx = |k: f64| ((k * 12.9898 + seed + vertex as f64 * 1.1).sin() * 43758.5453).fract();
    let hy = |k: f64| ((k * 78.233 + seed + vertex as f64 * 1.7).sin() * 43758.5453).fract();

    let rx = hx(t_i) + (hx(t_i + 1.0) - hx(t_i)) * t_f;
    let ry = hy(t_i) + (hy(t_i + 1.0) - hy(t_i)) * t_f;

    Vec2::new((rx - 0.5) * 2.0, (ry - 0.5) * 2.0)
}

// ================================================================================================
// Zig Zag
// ================================================================================================

/// Resamples each path into `ridges` full waves, pushing alternate samples to
/// either side of the source contour. Pointy mode emits corner vertices;
/// smooth mode rounds each sample with tangent handles.
pub fn zigzag_paths(paths: Vec<BezierPath>, op: &ZigZagOp, frame: i64) -> Vec<BezierPath> {
    let ridges = Animator::resolve(&op.ridges, frame).round();
    let size = Animator::resolve(&op.size, frame);
    if ridges < 1.0 || size == 0.0 {
        return paths;
    }

    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let len = path_length(&path);
        if len <= 0.0 {
            out.push(path);
            continue;
        }

        // Two samples per ridge: one peak, one valley.
        let sample_count = (ridges as usize) * 2;
        let last = if path.closed {
            sample_count
        } else {
            sample_count + 1
        };

        let mut displaced: Vec<Point> = Vec::with_capacity(last);
        for i in 0..last {
            let dist = (i as f64 / sample_count as f64) * len;
            let Some((pos, tangent)) = geometry::sample_at(&path, dist.min(len)) else {
                continue;
            };
            let normal = Vec2::new(tangent.y, -tangent.x);
            let side = if i % 2 == 0 { 1.0 } else { -1.0 };
            displaced.push(pos + normal * (size * side));
        }
        if displaced.len() < 2 {
            out.push(path);
            continue;
        }

        let vertices = if op.smooth {
            smooth_wave_vertices(&displaced, path.closed)
        } else {
            displaced
                .iter()
                .map(|p| BezierVertex::corner(p.x, p.y))
                .collect()
        };
        out.push(BezierPath {
            vertices,
            closed: path.closed,
        });
    }
    out
}

/// Tangent handles aimed at the neighbouring samples turn the sawtooth into a
/// rounded wave.
fn smooth_wave_vertices(points: &[Point], closed: bool) -> Vec<BezierVertex> {
    let n = points.len();
    let mut vertices = Vec::with_capacity(n);
    for i in 0..n {
        let prev = if i > 0 {
            Some(points[i - 1])
        } else if closed {
            Some(points[n - 1])
        } else {
            None
        };
        let next = if i + 1 < n {
            Some(points[i + 1])
        } else if closed {
            Some(points[0])
        } else {
            None
        };

        let p = points[i];
        let dir = match (prev, next) {
            (Some(a), Some(b)) => {
                let d = b - a;
                let len = d.hypot();
                if len > 1e-10 {
                    d / len
                } else {
                    Vec2::ZERO
                }
            }
            _ => Vec2::ZERO,
        };

        let reach_in = prev.map(|a| (p - a).hypot() * CIRCLE_KAPPA * 0.5).unwrap_or(0.0);
        let reach_out = next.map(|b| (b - p).hypot() * CIRCLE_KAPPA * 0.5).unwrap_or(0.0);
        vertices.push(BezierVertex {
            point: [p.x, p.y],
            in_handle: [-dir.x * reach_in, -dir.y * reach_in],
            out_handle: [dir.x * reach_out, dir.y * reach_out],
        });
    }
    vertices
}

// ================================================================================================
// Twist
// ================================================================================================

/// Rotates points around the twist center by an angle proportional to their
/// distance from it, so the rim turns the full angle while the center stays
/// put.
pub fn twist_paths(mut paths: Vec<BezierPath>, op: &TwistOp, frame: i64) -> Vec<BezierPath> {
    let angle = Animator::resolve(&op.angle, frame);
    if angle == 0.0 {
        return paths;
    }
    let [cx, cy] = Animator::resolve(&op.center, frame);
    let center = Point::new(cx, cy);
    let angle_rad = angle.to_radians();

    // Full rotation at the farthest point from the center.
    let mut max_dist = 0.0f64;
    for path in &paths {
        for v in &path.vertices {
            let d = (Point::new(v.point[0], v.point[1]) - center).hypot();
            max_dist = max_dist.max(d);
        }
    }
    if max_dist <= 1e-9 {
        return paths;
    }

    let twist_point = |p: Point| -> Point {
        let vec = p - center;
        let dist = vec.hypot();
        if dist < 1e-9 {
            return p;
        }
        let theta = angle_rad * (dist / max_dist);
        let (sin, cos) = theta.sin_cos();
        center + Vec2::new(vec.x * cos - vec.y * sin, vec.x * sin + vec.y * cos)
    };

    for path in &mut paths {
        for v in &mut path.vertices {
            let p = Point::new(v.point[0], v.point[1]);
            let in_abs = twist_point(Point::new(p.x + v.in_handle[0], p.y + v.in_handle[1]));
            let out_abs = twist_point(Point::new(p.x + v.out_handle[0], p.y + v.out_handle[1]));
            let new_p = twist_point(p);
            v.point = [new_p.x, new_p.y];
            v.in_handle = [in_abs.x - new_p.x, in_abs.y - new_p.y];
            v.out_handle = [out_abs.x - new_p.x, out_abs.y - new_p.y];
        }
    }
    paths
}

// ================================================================================================
// Round Corners
// ================================================================================================

/// Replaces each sharp corner vertex with a circular-arc pair. Vertices that
/// already carry tangent handles are left alone; the radius clamps to half of
/// each adjacent edge.
pub fn round_corners_paths(
    paths: Vec<BezierPath>,
    op: &RoundCornersOp,
    frame: i64,
) -> Vec<BezierPath> {
    let radius = Animator::resolve(&op.radius, frame);
    if radius <= 0.0 {
        return paths;
    }

    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let n = path.vertices.len();
        if n < 3 {
            out.push(path);
            continue;
        }

        let mut vertices: Vec<BezierVertex> = Vec::with_capacity(n * 2);
        for i in 0..n {
            let v = &path.vertices[i];
            let is_corner = v.in_handle == [0.0, 0.0] && v.out_handle == [0.0, 0.0];
            let has_prev = i > 0 || path.closed;
            let has_next = i + 1 < n || path.closed;
            if !is_corner || !has_prev || !has_next {
                vertices.push(v.clone());
                continue;
            }

            let p = Point::new(v.point[0], v.point[1]);
            let prev = &path.vertices[(i + n - 1) % n];
            let next = &path.vertices[(i + 1) % n];
            let to_prev = Point::new(prev.point[0], prev.point[1]) - p;
            let to_next = Point::new(next.point[0], next.point[1]) - p;
            let len_prev = to_prev.hypot();
            let len_next = to_next.hypot();
            if len_prev <= 1e-9 || len_next <= 1e-9 {
                vertices.push(v.clone());
                continue;
            }

            let r = radius.min(len_prev / 2.0).min(len_next / 2.0);
            let dir_prev = to_prev / len_prev;
            let dir_next = to_next / len_next;
            let k = r * CIRCLE_KAPPA;

            vertices.push(BezierVertex {
                point: [p.x + dir_prev.x * r, p.y + dir_prev.y * r],
                in_handle: [0.0, 0.0],
                out_handle: [-dir_prev.x * k, -dir_prev.y * k],
            });
            vertices.push(BezierVertex {
                point: [p.x + dir_next.x * r, p.y + dir_next.y * r],
                in_handle: [-dir_next.x * k, -dir_next.y * k],
                out_handle: [0.0, 0.0],
            });
        }
        out.push(BezierPath {
            vertices,
            closed: path.closed,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use compositor_data::model::AnimatableProperty;

    fn horizontal_line() -> BezierPath {
        BezierPath {
            vertices: vec![
                BezierVertex::corner(0.0, 0.0),
                BezierVertex::corner(100.0, 0.0),
            ],
            closed: false,
        }
    }

    fn square(half: f64) -> BezierPath {
        BezierPath {
            vertices: vec![
                BezierVertex::corner(-half, -half),
                BezierVertex::corner(half, -half),
                BezierVertex::corner(half, half),
                BezierVertex::corner(-half, half),
            ],
            closed: true,
        }
    }

    fn trim_op(start: f64, end: f64, mode: TrimMode) -> TrimOp {
        TrimOp {
            start: AnimatableProperty::fixed(start),
            end: AnimatableProperty::fixed(end),
            offset: AnimatableProperty::fixed(0.0),
            mode,
        }
    }

    #[test]
    fn trim_simultaneous_window() {
        let out = trim_paths(
            vec![horizontal_line()],
            &trim_op(25.0, 75.0, TrimMode::Simultaneously),
            0,
        );
        assert_eq!(out.len(), 1);
        assert!((out[0].vertices[0].point[0] - 25.0).abs() < 1e-3);
        assert!((out[0].vertices.last().unwrap().point[0] - 75.0).abs() < 1e-3);
    }

    #[test]
    fn trim_individually_staggers_by_quarter() {
        let paths = vec![
            horizontal_line(),
            horizontal_line(),
            horizontal_line(),
            horizontal_line(),
        ];
        let out = trim_paths(paths, &trim_op(0.0, 25.0, TrimMode::Individually), 0);
        assert_eq!(out.len(), 4);
        for (i, path) in out.iter().enumerate() {
            let expected_start = (25.0 * i as f64) % 100.0;
            assert!(
                (path.vertices[0].point[0] - expected_start).abs() < 1e-3,
                "path {i} starts at {}",
                path.vertices[0].point[0]
            );
        }
    }

    #[test]
    fn trim_wrap_on_closed_path_joins_across_seam() {
        let op = TrimOp {
            start: AnimatableProperty::fixed(0.0),
            end: AnimatableProperty::fixed(50.0),
            offset: AnimatableProperty::fixed(75.0),
            mode: TrimMode::Simultaneously,
        };
        let out = trim_paths(vec![square(10.0)], &op, 0);
        // One continuous open run covering [75%, 125%] of the perimeter.
        assert_eq!(out.len(), 1);
        assert!(!out[0].closed);
        let total: f64 = path_length(&out[0]);
        assert!((total - 40.0).abs() < 1e-2);
    }

    #[test]
    fn trim_zero_span_drops_everything() {
        let out = trim_paths(
            vec![horizontal_line()],
            &trim_op(40.0, 40.0, TrimMode::Simultaneously),
            0,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn merge_subtract_reverses_later_paths() {
        let op = MergeOp {
            mode: MergeMode::Subtract,
        };
        let out = merge_paths(vec![square(10.0), square(5.0)], &op);
        assert_eq!(out[0].vertices[0].point, [-10.0, -10.0]);
        // Inner square now winds the other way.
        assert_eq!(out[1].vertices[0].point, [-5.0, 5.0]);
        assert_eq!(out[1].vertices[1].point, [5.0, 5.0]);
    }

    #[test]
    fn offset_outsets_clockwise_shape() {
        let op = OffsetOp {
            amount: AnimatableProperty::fixed(5.0),
            join: LineJoin::Miter,
            miter_limit: 4.0,
            copies: AnimatableProperty::fixed(1.0),
            copy_offset: AnimatableProperty::fixed(0.0),
        };
        let out = offset_paths(vec![square(10.0)], &op, 0);
        assert_eq!(out.len(), 1);
        let bounds = handle_bounds(&out[0]).unwrap();
        assert!(bounds.min_x() <= -14.9);
        assert!(bounds.max_x() >= 14.9);
    }

    #[test]
    fn offset_copies_are_concentric() {
        let op = OffsetOp {
            amount: AnimatableProperty::fixed(2.0),
            join: LineJoin::Bevel,
            miter_limit: 4.0,
            copies: AnimatableProperty::fixed(3.0),
            copy_offset: AnimatableProperty::fixed(2.0),
        };
        let out = offset_paths(vec![square(10.0)], &op, 0);
        assert_eq!(out.len(), 3);
        let w0 = handle_bounds(&out[0]).unwrap().width();
        let w2 = handle_bounds(&out[2]).unwrap().width();
        assert!(w2 > w0);
    }

    #[test]
    fn pucker_bloat_moves_points_and_handles_oppositely() {
        let op = PuckerBloatOp {
            amount: AnimatableProperty::fixed(50.0),
        };
        let out = pucker_bloat_paths(vec![square(10.0)], &op, 0);
        // Points scale out by 1.5 around the center.
        assert_eq!(out[0].vertices[0].point, [-15.0, -15.0]);
    }

    #[test]
    fn wiggle_is_deterministic_and_per_path_phased() {
        let op = WiggleOp {
            amount: AnimatableProperty::fixed(5.0),
            temporal_phase: AnimatableProperty::fixed(0.0),
            seed: 3.0,
        };
        let a = wiggle_paths(vec![square(10.0), square(10.0)], &op, 12);
        let b = wiggle_paths(vec![square(10.0), square(10.0)], &op, 12);
        assert_eq!(a[0].vertices[0].point, b[0].vertices[0].point);
        // Same geometry, different path index: displaced differently.
        assert_ne!(a[0].vertices[0].point, a[1].vertices[0].point);
    }

    #[test]
    fn wiggle_varies_with_frame() {
        let op = WiggleOp {
            amount: AnimatableProperty::fixed(5.0),
            temporal_phase: AnimatableProperty::fixed(0.0),
            seed: 3.0,
        };
        let a = wiggle_paths(vec![square(10.0)], &op, 1);
        let b = wiggle_paths(vec![square(10.0)], &op, 2);
        assert_ne!(a[0].vertices[0].point, b[0].vertices[0].point);
    }

    #[test]
    fn zigzag_sample_count_follows_ridges() {
        let op = ZigZagOp {
            ridges: AnimatableProperty::fixed(4.0),
            size: AnimatableProperty::fixed(3.0),
            smooth: false,
        };
        let out = zigzag_paths(vec![horizontal_line()], &op, 0);
        // 2 samples per ridge plus the endpoint on an open path.
        assert_eq!(out[0].vertices.len(), 9);
        // Alternating sides of the source line.
        assert!(out[0].vertices[0].point[1] < 0.0);
        assert!(out[0].vertices[1].point[1] > 0.0);
    }

    #[test]
    fn zigzag_smooth_emits_tangents() {
        let op = ZigZagOp {
            ridges: AnimatableProperty::fixed(2.0),
            size: AnimatableProperty::fixed(3.0),
            smooth: true,
        };
        let out = zigzag_paths(vec![horizontal_line()], &op, 0);
        assert!(out[0].vertices[1].out_handle != [0.0, 0.0]);
    }

    #[test]
    fn twist_turns_rim_by_full_angle() {
        let op = TwistOp {
            angle: AnimatableProperty::fixed(90.0),
            center: AnimatableProperty::fixed([0.0, 0.0]),
        };
        let path = BezierPath {
            vertices: vec![
                BezierVertex::corner(10.0, 0.0),
                BezierVertex::corner(5.0, 0.0),
            ],
            closed: false,
        };
        let out = twist_paths(vec![path], &op, 0);
        // Farthest vertex rotates the full 90 degrees.
        assert!(out[0].vertices[0].point[0].abs() < 1e-9);
        assert!((out[0].vertices[0].point[1] - 10.0).abs() < 1e-9);
        // Halfway out rotates 45 degrees.
        let v1 = out[0].vertices[1].point;
        let expected = 5.0 * std::f64::consts::FRAC_1_SQRT_2;
        assert!((v1[0] - expected).abs() < 1e-9);
        assert!((v1[1] - expected).abs() < 1e-9);
    }

    #[test]
    fn round_corners_doubles_square_vertices() {
        let op = RoundCornersOp {
            radius: AnimatableProperty::fixed(2.0),
        };
        let out = round_corners_paths(vec![square(10.0)], &op, 0);
        assert_eq!(out[0].vertices.len(), 8);
        assert!(out[0].closed);
    }

    #[test]
    fn round_corners_skips_smooth_vertices() {
        let op = RoundCornersOp {
            radius: AnimatableProperty::fixed(2.0),
        };
        let mut path = square(10.0);
        path.vertices[0].out_handle = [3.0, 0.0];
        let out = round_corners_paths(vec![path], &op, 0);
        // Three corners split, one smooth vertex kept.
        assert_eq!(out[0].vertices.len(), 7);
    }
}
