use crate::frame::FramePlan;
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads a frame plan and produces output. It never mutates the
/// scene; camera state is owned by the frame loop.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, frame: &FramePlan) -> Self::Output;
}

/// Text renderer for headless runs.
///
/// Produces a human-readable summary of a frame plan. Useful for CLI output,
/// logging, and testing the render interface without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// List every draw instead of the first and last.
    pub list_all: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listing_all() -> Self {
        Self { list_all: true }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, frame: &FramePlan) -> String {
        let mut out = String::new();
        let cam = &frame.camera;
        let _ = writeln!(out, "=== Frame {} ===", frame.frame);
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) yaw={:.3} pitch={:.3}",
            cam.eye.x,
            cam.eye.y,
            cam.eye.z,
            cam.target.x,
            cam.target.y,
            cam.target.z,
            cam.yaw(),
            cam.pitch()
        );
        let _ = writeln!(
            out,
            "Draws: {} x {} indices, visible: {}",
            frame.draws.len(),
            frame.index_count,
            frame.visible_count()
        );

        let shown: Vec<_> = if self.list_all || frame.draws.len() <= 2 {
            frame.draws.iter().collect()
        } else {
            vec![&frame.draws[0], &frame.draws[frame.draws.len() - 1]]
        };
        for draw in shown {
            let t = draw.model_view.w_axis;
            let _ = writeln!(
                out,
                "  [{:>2},{:>2}] view-space center=({:.2}, {:.2}, {:.2})",
                draw.cell.row, draw.cell.column, t.x, t.y, t.z
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameLoop;
    use cubegrid_input::Key;

    #[test]
    fn summary_for_default_frame() {
        let mut frame_loop = FrameLoop::default();
        let plan = frame_loop.tick(1.0);
        let output = DebugTextRenderer::new().render(&plan);

        assert!(output.contains("Frame 0"));
        assert!(output.contains("eye=(0.00, 10.00, 30.00)"));
        assert!(output.contains("Draws: 625 x 36 indices"));
        assert!(output.contains("[ 0, 0]"));
        assert!(output.contains("[24,24]"));
        assert_eq!(output.lines().count(), 5);
    }

    #[test]
    fn listing_all_prints_every_cell() {
        let mut frame_loop = FrameLoop::default();
        let plan = frame_loop.tick(1.0);
        let output = DebugTextRenderer::listing_all().render(&plan);
        assert_eq!(output.lines().count(), 3 + 625);
    }

    #[test]
    fn reflects_camera_moves() {
        let mut frame_loop = FrameLoop::default();
        frame_loop.handle_key(Key::PageUp);
        frame_loop.handle_key(Key::PageUp);
        let plan = frame_loop.tick(1.0);
        let output = DebugTextRenderer::new().render(&plan);
        assert!(output.contains("eye=(0.00, 10.50, 30.00)"));
        assert!(output.contains("target=(0.00, 0.50, 0.00)"));
    }
}
