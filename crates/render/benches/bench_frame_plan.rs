use std::hint::black_box;
use std::time::Instant;

use cubegrid_input::Key;
use cubegrid_render::{DebugTextRenderer, FrameLoop, Renderer};

fn bench_tick(iterations: usize) {
    let mut frame_loop = FrameLoop::default();
    frame_loop.handle_key(Key::P);

    let start = Instant::now();
    for i in 0..iterations {
        frame_loop.handle_mouse_motion(black_box((i % 7) as f32), black_box(-((i % 5) as f32)));
        black_box(frame_loop.tick(16.0 / 9.0));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  tick ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_visibility(iterations: usize) {
    let mut frame_loop = FrameLoop::default();
    let plan = frame_loop.tick(16.0 / 9.0);

    let start = Instant::now();
    let mut visible = 0;
    for _ in 0..iterations {
        visible = black_box(plan.visible_count());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  visible_count ({visible} visible, {iterations} iters): {per_iter:?}/iter");
}

fn bench_debug_text(iterations: usize) {
    let mut frame_loop = FrameLoop::default();
    let plan = frame_loop.tick(16.0 / 9.0);
    let renderer = DebugTextRenderer::listing_all();

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(renderer.render(black_box(&plan)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  debug text ({iterations} iters): {per_iter:?}/iter");
}

fn main() {
    println!("frame plan benchmarks");
    bench_tick(10_000);
    bench_visibility(10_000);
    bench_debug_text(1_000);
}
