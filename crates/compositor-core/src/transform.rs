use glam::{DMat4, DVec3};

/// Renderer-ready transform for one layer at one frame. A fresh value object
/// per evaluation; never aliases the inputs it was composed from.
///
/// The composer owns the screen-coordinate convention: the scene is authored
/// Y-down while the renderer is Y-up, so vertical position and Z rotation are
/// sign-flipped on the way out. Consumers that read the transform back (e.g.
/// motion-blur velocity) must use the `scene_*` accessors, which apply the
/// inverse flips.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderTransform {
    pub position: DVec3,
    /// Multiplier, not percent (100% scale arrives here as 1.0).
    pub scale: DVec3,
    /// Euler angles in degrees, already sign-adjusted for screen space.
    pub rotation: DVec3,
}

impl RenderTransform {
    /// Vertical position in authoring (Y-down) space.
    pub fn scene_y(&self) -> f64 {
        -self.position.y
    }

    /// Z rotation in authoring space, degrees.
    pub fn scene_rotation_z(&self) -> f64 {
        -self.rotation.z
    }

    /// Column-major matrix (`T * Rz * Ry * Rx * S`) for scene-graph
    /// consumers that combine parent transforms.
    pub fn matrix(&self) -> DMat4 {
        let t = DMat4::from_translation(self.position);
        let rx = DMat4::from_rotation_x(self.rotation.x.to_radians());
        let ry = DMat4::from_rotation_y(self.rotation.y.to_radians());
        let rz = DMat4::from_rotation_z(self.rotation.z.to_radians());
        let s = DMat4::from_scale(self.scale);
        t * rz * ry * rx * s
    }
}

/// Composes independently-evaluated channels into a [`RenderTransform`].
///
/// - origin (anchor) offsets position before the sign flip: `pos - origin`
///   per axis, Z unflipped
/// - scale is authored as percent and divided by 100 here
/// - 2D mode zeroes the X/Y rotation channels; the single 2D rotation scalar
///   arrives as `rotation.z`
pub fn compose(
    position: DVec3,
    scale_percent: DVec3,
    rotation_degrees: DVec3,
    origin: DVec3,
    is_3d: bool,
) -> RenderTransform {
    let anchored = position - origin;

    let rotation = if is_3d {
        DVec3::new(
            rotation_degrees.x,
            rotation_degrees.y,
            -rotation_degrees.z,
        )
    } else {
        DVec3::new(0.0, 0.0, -rotation_degrees.z)
    };

    RenderTransform {
        position: DVec3::new(anchored.x, -anchored.y, anchored.z),
        scale: scale_percent / 100.0,
        rotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_and_rotation_are_sign_flipped() {
        let t = compose(
            DVec3::new(10.0, 20.0, 5.0),
            DVec3::splat(100.0),
            DVec3::new(0.0, 0.0, 90.0),
            DVec3::ZERO,
            false,
        );
        assert_eq!(t.position, DVec3::new(10.0, -20.0, 5.0));
        assert_eq!(t.rotation.z, -90.0);
        assert_eq!(t.scene_y(), 20.0);
        assert_eq!(t.scene_rotation_z(), 90.0);
    }

    #[test]
    fn origin_offsets_before_flip() {
        let t = compose(
            DVec3::new(100.0, 60.0, 0.0),
            DVec3::splat(100.0),
            DVec3::ZERO,
            DVec3::new(40.0, 10.0, 0.0),
            false,
        );
        assert_eq!(t.position, DVec3::new(60.0, -50.0, 0.0));
    }

    #[test]
    fn percent_scale_becomes_multiplier() {
        let t = compose(
            DVec3::ZERO,
            DVec3::new(100.0, 50.0, 200.0),
            DVec3::ZERO,
            DVec3::ZERO,
            true,
        );
        assert_eq!(t.scale, DVec3::new(1.0, 0.5, 2.0));
    }

    #[test]
    fn two_d_mode_zeroes_tilt_channels() {
        let t = compose(
            DVec3::ZERO,
            DVec3::splat(100.0),
            DVec3::new(45.0, 30.0, 15.0),
            DVec3::ZERO,
            false,
        );
        assert_eq!(t.rotation, DVec3::new(0.0, 0.0, -15.0));

        let t3 = compose(
            DVec3::ZERO,
            DVec3::splat(100.0),
            DVec3::new(45.0, 30.0, 15.0),
            DVec3::ZERO,
            true,
        );
        assert_eq!(t3.rotation, DVec3::new(45.0, 30.0, -15.0));
    }
}
