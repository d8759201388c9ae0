use cubegrid_common::{LookConfig, Variant, ViewMode};
use glam::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Mouse deltas are divided by this before any tuning applies.
pub const LOOK_DIVISOR: f32 = 100.0;
/// Fixed yaw offset folded into the oriented view.
pub const YAW_OFFSET_DEGREES: f32 = -45.0;
pub const PITCH_LIMIT: f32 = FRAC_PI_2;

/// Scaling applied to mouse-look deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookTuning {
    pub multiplier: f32,
    pub adder: f32,
}

impl Default for LookTuning {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            adder: 0.0,
        }
    }
}

impl From<&LookConfig> for LookTuning {
    fn from(config: &LookConfig) -> Self {
        Self {
            multiplier: config.multiplier,
            adder: config.adder,
        }
    }
}

/// Look-at camera with accumulated yaw and pitch.
///
/// Keyboard input dollies eye and target together. Mouse input rotates and also
/// shifts the target, so a horizontal drag both yaws and pans the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    yaw: f32,
    pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::for_variant(Variant::Textured)
    }
}

impl Camera {
    pub fn new(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Stock placement for each variant; both look at the origin.
    pub fn for_variant(variant: Variant) -> Self {
        let eye = match variant {
            Variant::Textured => Vec3::new(0.0, 10.0, 30.0),
            Variant::Flat => Vec3::new(0.0, 4.0, 10.0),
        };
        Self::new(eye, Vec3::ZERO)
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Eye-to-target vector. Unchanged by [`Camera::dolly`].
    pub fn offset(&self) -> Vec3 {
        self.target - self.eye
    }

    /// Move eye and target by the same offset.
    pub fn dolly(&mut self, offset: Vec3) {
        self.eye += offset;
        self.target += offset;
    }

    /// Apply one mouse delta.
    pub fn look(&mut self, dx: f32, dy: f32, tuning: LookTuning) {
        let sx = dx / LOOK_DIVISOR;
        let sy = dy / LOOK_DIVISOR;

        self.yaw += sx * tuning.multiplier;
        self.pitch = (self.pitch - sy * tuning.multiplier).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        // The target shift reuses the rotation deltas; a drag shears the view
        // rather than orbiting it.
        self.target.x += sx + tuning.adder;
        self.target.y -= sy + tuning.adder;
    }

    /// Right-handed look-at from eye to target, up = +Y.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    /// Look-at composed with the fixed yaw offset, then yaw, then pitch.
    ///
    /// The accumulated angles are read as degrees here, like the offset,
    /// while the clamp on the stored pitch stays at +/- pi/2.
    pub fn oriented_view_matrix(&self) -> Mat4 {
        self.view_matrix()
            * Mat4::from_rotation_y(YAW_OFFSET_DEGREES.to_radians())
            * Mat4::from_rotation_y(self.yaw.to_radians())
            * Mat4::from_rotation_x(self.pitch.to_radians())
    }

    pub fn view_for(&self, mode: ViewMode) -> Mat4 {
        match mode {
            ViewMode::LookAt => self.view_matrix(),
            ViewMode::Oriented => self.oriented_view_matrix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_defaults() {
        let textured = Camera::for_variant(Variant::Textured);
        assert_eq!(textured.eye, Vec3::new(0.0, 10.0, 30.0));
        assert_eq!(textured.target, Vec3::ZERO);
        assert_eq!(textured.yaw(), 0.0);
        assert_eq!(textured.pitch(), 0.0);

        let flat = Camera::for_variant(Variant::Flat);
        assert_eq!(flat.eye, Vec3::new(0.0, 4.0, 10.0));
        assert_eq!(Camera::default(), textured);
    }

    #[test]
    fn dolly_keeps_offset() {
        let mut cam = Camera::default();
        let before = cam.offset();
        for _ in 0..10 {
            cam.dolly(Vec3::new(0.15, 0.0, 0.0));
        }
        assert!((cam.eye.x - 1.5).abs() < 1e-5);
        assert!((cam.target.x - 1.5).abs() < 1e-5);
        assert!(cam.offset().abs_diff_eq(before, 1e-5));
    }

    #[test]
    fn look_scales_deltas() {
        let mut cam = Camera::default();
        cam.look(50.0, -20.0, LookTuning::default());
        assert!((cam.yaw() - 0.5).abs() < 1e-6);
        assert!((cam.pitch() - 0.2).abs() < 1e-6);
        assert!((cam.target.x - 0.5).abs() < 1e-6);
        assert!((cam.target.y - 0.2).abs() < 1e-6);
        assert_eq!(cam.eye, Vec3::new(0.0, 10.0, 30.0));
    }

    #[test]
    fn look_applies_multiplier_and_adder() {
        let mut cam = Camera::default();
        let tuning = LookTuning {
            multiplier: 2.0,
            adder: 0.1,
        };
        cam.look(10.0, 10.0, tuning);
        assert!((cam.yaw() - 0.2).abs() < 1e-6);
        assert!((cam.pitch() + 0.2).abs() < 1e-6);
        // Multiplier does not touch the target shift; adder does.
        assert!((cam.target.x - 0.2).abs() < 1e-6);
        assert!((cam.target.y + 0.2).abs() < 1e-6);
    }

    #[test]
    fn pitch_stays_clamped() {
        let mut cam = Camera::default();
        let deltas = [-900.0, 400.0, 1200.0, -3.0, 5000.0, -10000.0, 77.0];
        for dy in deltas {
            cam.look(0.0, dy, LookTuning::default());
            assert!(cam.pitch() >= -PITCH_LIMIT && cam.pitch() <= PITCH_LIMIT);
        }
        cam.look(0.0, -1.0e6, LookTuning::default());
        assert_eq!(cam.pitch(), PITCH_LIMIT);
        cam.look(0.0, 1.0e6, LookTuning::default());
        assert_eq!(cam.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn view_matrix_maps_target_onto_forward_axis() {
        let cam = Camera::default();
        let target_in_view = cam.view_matrix().transform_point3(cam.target);
        assert!(target_in_view.x.abs() < 1e-4);
        assert!(target_in_view.y.abs() < 1e-4);
        assert!(target_in_view.z < 0.0);
        let eye_in_view = cam.view_matrix().transform_point3(cam.eye);
        assert!(eye_in_view.abs_diff_eq(Vec3::ZERO, 1e-4));
    }

    #[test]
    fn oriented_view_rotates_world() {
        let cam = Camera::default();
        let plain = cam.view_for(ViewMode::LookAt);
        let oriented = cam.view_for(ViewMode::Oriented);
        assert_eq!(plain, cam.view_matrix());
        assert!(!plain.abs_diff_eq(oriented, 1e-4));
        // The origin is a fixed point of the extra rotations.
        assert!(plain
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(oriented.transform_point3(Vec3::ZERO), 1e-4));
    }

    #[test]
    fn oriented_view_turns_by_degrees() {
        let mut cam = Camera::default();
        cam.look(50.0, 0.0, LookTuning::default());
        assert!((cam.yaw() - 0.5).abs() < 1e-6);

        let expected = cam.view_matrix()
            * Mat4::from_rotation_y((-45.0f32).to_radians())
            * Mat4::from_rotation_y(0.5f32.to_radians());
        assert!(cam.oriented_view_matrix().abs_diff_eq(expected, 1e-5));

        let point = Vec3::new(10.0, 0.0, 0.0);
        let turned = cam.oriented_view_matrix().transform_point3(point);
        let wrong = (cam.view_matrix()
            * Mat4::from_rotation_y((-45.0f32).to_radians())
            * Mat4::from_rotation_y(0.5))
        .transform_point3(point);
        assert!(!turned.abs_diff_eq(wrong, 1e-2));
    }

    #[test]
    fn tuning_from_config() {
        let config = LookConfig {
            multiplier: 3.0,
            adder: 0.5,
        };
        let tuning = LookTuning::from(&config);
        assert_eq!(tuning.multiplier, 3.0);
        assert_eq!(tuning.adder, 0.5);
    }
}
