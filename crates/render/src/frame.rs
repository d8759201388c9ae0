use cubegrid_common::{ProjectionConfig, SceneConfig, ViewMode};
use cubegrid_input::{Action, Key, LookMailbox, MouseDelta, PointerLock};
use cubegrid_kernel::{cells, mesh::CUBE_INDICES, Camera, GridCell, LookTuning, CELL_COUNT};
use glam::{Mat4, Vec3, Vec4};

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self::from(&ProjectionConfig::default())
    }
}

impl From<&ProjectionConfig> for Projection {
    fn from(config: &ProjectionConfig) -> Self {
        Self {
            fov_degrees: config.fov_degrees,
            near: config.near,
            far: config.far,
        }
    }
}

impl Projection {
    /// Right-handed perspective with a 0..1 depth range.
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }
}

/// Width over height, with height clamped to at least one pixel.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// One indexed draw of the shared cube mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub cell: GridCell,
    pub model_view: Mat4,
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone)]
pub struct FramePlan {
    pub frame: u64,
    pub camera: Camera,
    pub projection: Mat4,
    pub view: Mat4,
    pub draws: Vec<DrawCall>,
    /// Indices per draw (one cube).
    pub index_count: u32,
}

impl FramePlan {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn clip_position(&self, world: Vec3) -> Vec4 {
        self.view_projection() * world.extend(1.0)
    }

    /// Whether a world-space point lands inside the view frustum.
    pub fn is_visible(&self, world: Vec3) -> bool {
        let clip = self.clip_position(world);
        if clip.w <= 0.0 {
            return false;
        }
        let ndc = clip.truncate() / clip.w;
        (-1.0..=1.0).contains(&ndc.x) && (-1.0..=1.0).contains(&ndc.y) && (0.0..=1.0).contains(&ndc.z)
    }

    /// Number of cube centers inside the frustum.
    pub fn visible_count(&self) -> usize {
        self.draws
            .iter()
            .filter(|d| self.is_visible(d.cell.position()))
            .count()
    }
}

/// Scene state driven once per host animation frame.
///
/// Owns the camera and the input buffers; hosts feed events in and call
/// [`FrameLoop::tick`] from their frame callback.
#[derive(Debug)]
pub struct FrameLoop {
    camera: Camera,
    look: LookMailbox,
    pointer: PointerLock,
    tuning: LookTuning,
    projection: Projection,
    view_mode: ViewMode,
    frame: u64,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(&SceneConfig::default())
    }
}

impl FrameLoop {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            camera: Camera::for_variant(config.variant),
            look: LookMailbox::new(),
            pointer: PointerLock::default(),
            tuning: LookTuning::from(&config.look),
            projection: Projection::from(&config.projection),
            view_mode: config.view,
            frame: 0,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn pointer(&self) -> &PointerLock {
        &self.pointer
    }

    pub fn pointer_mut(&mut self) -> &mut PointerLock {
        &mut self.pointer
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn look_pending(&self) -> bool {
        self.look.is_pending()
    }

    /// Apply a key press. Dolly steps take effect immediately.
    pub fn handle_key(&mut self, key: Key) -> Action {
        let action = key.action();
        match action {
            Action::Dolly(offset) => self.camera.dolly(offset),
            Action::TogglePointerLock => {
                self.pointer.toggle();
            }
        }
        tracing::debug!(%key, eye = ?self.camera.eye, "key handled");
        action
    }

    /// Buffer a relative motion event. Ignored unless the pointer is locked.
    pub fn handle_mouse_motion(&mut self, dx: f32, dy: f32) {
        if self.pointer.is_locked() {
            self.look.post(MouseDelta::new(dx, dy));
        }
    }

    /// Advance one frame: projection, pending look, view, then one draw per cell.
    pub fn tick(&mut self, aspect: f32) -> FramePlan {
        let _span = tracing::trace_span!("frame_tick", frame = self.frame).entered();

        let projection = self.projection.matrix(aspect);

        if let Some(delta) = self.look.take() {
            self.camera.look(delta.dx, delta.dy, self.tuning);
            tracing::trace!(
                yaw = self.camera.yaw(),
                pitch = self.camera.pitch(),
                "mouse look applied"
            );
        }

        let view = self.camera.view_for(self.view_mode);

        let mut draws = Vec::with_capacity(CELL_COUNT);
        for cell in cells() {
            draws.push(DrawCall {
                cell,
                model_view: view * Mat4::from_translation(cell.position()),
            });
        }

        let plan = FramePlan {
            frame: self.frame,
            camera: self.camera,
            projection,
            view,
            draws,
            index_count: CUBE_INDICES.len() as u32,
        };
        self.frame += 1;
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubegrid_common::Variant;
    use std::f32::consts::FRAC_PI_2;

    fn locked_loop() -> FrameLoop {
        let mut frame_loop = FrameLoop::default();
        frame_loop.handle_key(Key::P);
        assert!(frame_loop.pointer().is_locked());
        frame_loop
    }

    #[test]
    fn tick_draws_every_cell_once() {
        let mut frame_loop = FrameLoop::default();
        let plan = frame_loop.tick(16.0 / 9.0);
        assert_eq!(plan.draws.len(), CELL_COUNT);
        assert_eq!(plan.index_count, 36);
        assert_eq!(plan.draws[0].cell, GridCell::new(0, 0));
        assert_eq!(plan.draws[CELL_COUNT - 1].cell, GridCell::new(24, 24));
    }

    #[test]
    fn model_view_is_view_times_translation() {
        let mut frame_loop = FrameLoop::default();
        let plan = frame_loop.tick(1.0);
        for draw in &plan.draws {
            let expected = plan.view * Mat4::from_translation(draw.cell.position());
            assert!(draw.model_view.abs_diff_eq(expected, 1e-5));
            let center = draw.model_view.transform_point3(Vec3::ZERO);
            assert!(center.abs_diff_eq(plan.view.transform_point3(draw.cell.position()), 1e-4));
        }
    }

    #[test]
    fn frame_counter_advances() {
        let mut frame_loop = FrameLoop::default();
        assert_eq!(frame_loop.tick(1.0).frame, 0);
        assert_eq!(frame_loop.tick(1.0).frame, 1);
        assert_eq!(frame_loop.frame(), 2);
    }

    #[test]
    fn arrow_right_moves_eye_and_target() {
        let mut frame_loop = FrameLoop::default();
        let start = *frame_loop.camera();
        let n = 7;
        for _ in 0..n {
            frame_loop.handle_key(Key::ArrowRight);
        }
        let cam = frame_loop.camera();
        assert!((cam.eye.x - start.eye.x - 0.15 * n as f32).abs() < 1e-5);
        assert!((cam.target.x - start.target.x - 0.15 * n as f32).abs() < 1e-5);
        assert!(cam.offset().abs_diff_eq(start.offset(), 1e-5));
    }

    #[test]
    fn motion_ignored_while_unlocked() {
        let mut frame_loop = FrameLoop::default();
        frame_loop.handle_mouse_motion(40.0, 40.0);
        assert!(!frame_loop.look_pending());
        let plan = frame_loop.tick(1.0);
        assert_eq!(plan.camera.yaw(), 0.0);
        assert_eq!(plan.camera.target, Vec3::ZERO);
    }

    #[test]
    fn look_consumed_at_most_once() {
        let mut frame_loop = locked_loop();
        frame_loop.handle_mouse_motion(10.0, 0.0);
        frame_loop.handle_mouse_motion(30.0, 0.0);
        let first = frame_loop.tick(1.0);
        // Only the last delta before the tick is applied.
        assert!((first.camera.yaw() - 0.3).abs() < 1e-6);
        assert!(!frame_loop.look_pending());
        let second = frame_loop.tick(1.0);
        assert_eq!(second.camera.yaw(), first.camera.yaw());
    }

    #[test]
    fn pitch_clamped_through_frames() {
        let mut frame_loop = locked_loop();
        for dy in [-500.0, -500.0, -500.0, 2000.0, 2000.0, -90.0] {
            frame_loop.handle_mouse_motion(0.0, dy);
            let plan = frame_loop.tick(1.0);
            assert!(plan.camera.pitch().abs() <= FRAC_PI_2);
        }
    }

    #[test]
    fn unsupported_pointer_blocks_look() {
        let mut frame_loop = FrameLoop::default();
        frame_loop.pointer_mut().mark_unsupported();
        assert_eq!(frame_loop.handle_key(Key::P), Action::TogglePointerLock);
        frame_loop.handle_mouse_motion(100.0, 0.0);
        assert_eq!(frame_loop.tick(1.0).camera.yaw(), 0.0);
    }

    #[test]
    fn origin_cube_visible_from_default_cameras() {
        for variant in [Variant::Textured, Variant::Flat] {
            let config = SceneConfig {
                variant,
                ..SceneConfig::default()
            };
            let mut frame_loop = FrameLoop::new(&config);
            let plan = frame_loop.tick(aspect_ratio(1280, 720));
            assert!(plan.is_visible(Vec3::ZERO), "{variant:?}");
            assert!(plan.visible_count() > 0);
        }
    }

    #[test]
    fn point_behind_camera_not_visible() {
        let mut frame_loop = FrameLoop::default();
        let plan = frame_loop.tick(1.0);
        assert!(!plan.is_visible(Vec3::new(0.0, 10.0, 60.0)));
        // Beyond the far plane.
        assert!(!plan.is_visible(Vec3::new(0.0, 0.0, -400.0)));
    }

    #[test]
    fn oriented_view_mode_changes_view() {
        let config = SceneConfig {
            view: ViewMode::Oriented,
            ..SceneConfig::default()
        };
        let oriented = FrameLoop::new(&config).tick(1.0);
        let plain = FrameLoop::default().tick(1.0);
        assert!(!oriented.view.abs_diff_eq(plain.view, 1e-4));
        assert_eq!(oriented.view, oriented.camera.oriented_view_matrix());
    }

    #[test]
    fn aspect_ratio_guards_zero_height() {
        assert_eq!(aspect_ratio(800, 0), 800.0);
        assert_eq!(aspect_ratio(1280, 720), 1280.0 / 720.0);
    }

    #[test]
    fn projection_uses_config() {
        let projection = Projection::default();
        assert_eq!(projection.fov_degrees, 60.0);
        let m = projection.matrix(1.0);
        let expected = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 200.0);
        assert_eq!(m, expected);
    }
}
