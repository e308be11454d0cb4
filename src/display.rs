// THEORY:
// The `display` module is the Presenter stage plus the seam it renders
// through. `RenderSurface` is the only trait boundary in the system and
// exists so the render loop can be exercised headlessly; the concrete
// `WindowSurface` is a thin adapter over the window library (BGR bytes
// in, packed 0RGB words out) with no pipeline logic. The Presenter is a
// polling loop on its own OS thread, because surface updates are
// blocking calls: snapshot the shared buffer, push it to the surface,
// yield, repeat.

use crate::core_modules::frame_buffer::{BYTES_PER_PIXEL, SharedFrameBuffer};
use crate::core_modules::shutdown::ShutdownFlag;
use crate::error::StreamError;
use crate::pipeline::StageState;
use minifb::{Window, WindowOptions};
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// Render cadence; the sleep is the Presenter's scheduler yield.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Seam between the Presenter loop and the concrete window library.
pub trait RenderSurface {
    /// False once the user has closed the surface.
    fn is_open(&self) -> bool;
    /// Pushes one BGR frame to the screen.
    fn present(&mut self, bgr: &[u8]) -> Result<(), StreamError>;
}

/// A single titled window, updated in place.
pub struct WindowSurface {
    window: Window,
    pixels: Vec<u32>,
    width: usize,
    height: usize,
}

impl WindowSurface {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, StreamError> {
        let width = width as usize;
        let height = height as usize;
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| StreamError::Render(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self {
            window,
            pixels: vec![0; width * height],
            width,
            height,
        })
    }
}

impl RenderSurface for WindowSurface {
    fn is_open(&self) -> bool {
        self.window.is_open()
    }

    fn present(&mut self, bgr: &[u8]) -> Result<(), StreamError> {
        for (word, chunk) in self.pixels.iter_mut().zip(bgr.chunks_exact(BYTES_PER_PIXEL)) {
            *word = (u32::from(chunk[2]) << 16) | (u32::from(chunk[1]) << 8) | u32::from(chunk[0]);
        }
        self.window
            .update_with_buffer(&self.pixels, self.width, self.height)
            .map_err(|e| StreamError::Render(e.to_string()))
    }
}

/// Headless surface for tests and displayless runs: accepts every frame
/// and stays open until cancelled.
#[derive(Debug, Default)]
pub struct NullSurface {
    pub presented: usize,
}

impl RenderSurface for NullSurface {
    fn is_open(&self) -> bool {
        true
    }

    fn present(&mut self, _bgr: &[u8]) -> Result<(), StreamError> {
        self.presented += 1;
        Ok(())
    }
}

/// Stage three: polls the shared frame buffer and renders it until
/// cancellation, or until the surface is closed under it.
pub fn run_presenter<S: RenderSurface>(
    surface: &mut S,
    frame_buffer: &SharedFrameBuffer,
    shutdown: &ShutdownFlag,
    state: &watch::Sender<StageState>,
) -> Result<(), StreamError> {
    let _ = state.send(StageState::Running);
    let result = presenter_loop(surface, frame_buffer, shutdown);
    let _ = state.send(StageState::Draining);
    let _ = state.send(StageState::Stopped);
    result
}

fn presenter_loop<S: RenderSurface>(
    surface: &mut S,
    frame_buffer: &SharedFrameBuffer,
    shutdown: &ShutdownFlag,
) -> Result<(), StreamError> {
    let capacity = frame_buffer.height() as usize * frame_buffer.width() as usize * BYTES_PER_PIXEL;
    let mut scratch = Vec::with_capacity(capacity);
    while !shutdown.is_triggered() {
        if !surface.is_open() {
            info!("render surface closed, presenter stopping early");
            break;
        }
        frame_buffer.snapshot(&mut scratch);
        surface.present(&scratch)?;
        std::thread::sleep(FRAME_INTERVAL);
    }
    Ok(())
}
