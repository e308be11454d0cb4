// THEORY:
// The `pipeline` module is the top-level API for the swatch engine: the
// `PipelineConfig` every stage is cloned from, the shared lifecycle
// `Idle -> Running -> Draining -> Stopped` (published through a `watch`
// channel so the controller and the tests can observe progress), and the
// two background stages. Hand-off is by value over bounded channels; a
// full channel suspends the sender, which is the system's only
// backpressure. End-of-stream is the sender dropping, so a consumer's
// `recv()` returning `None` always means permanently empty, never a
// timing race. `Draining` covers the window between a stage leaving its
// main loop and releasing its channel endpoints.

use crate::core_modules::annotator;
use crate::core_modules::factory::{self, Frame};
use crate::core_modules::palette::{self, Color, ColorPicker};
use crate::core_modules::shutdown::ShutdownFlag;
use crate::error::StreamError;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Bound for both hand-off channels. A full channel suspends the sender.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 8;

/// How long the final image stays on screen before teardown.
const DEFAULT_FINAL_DWELL: Duration = Duration::from_secs(1);

/// Configuration for one pipeline session, allowing for tunable behavior.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub image_count: u32,
    pub image_height: u32,
    pub image_width: u32,
    /// Palette the Generator draws from; injected here, never a global.
    pub palette: Vec<Color>,
    /// Capacity of Channel A and Channel B.
    pub channel_capacity: usize,
    /// Seed for the color picker; `None` draws from entropy.
    pub picker_seed: Option<u64>,
    /// Dwell on the last image before the session tears down.
    pub final_dwell: Duration,
}

impl PipelineConfig {
    pub fn new(image_count: u32, image_height: u32, image_width: u32) -> Self {
        Self {
            image_count,
            image_height,
            image_width,
            palette: palette::default_palette(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            picker_seed: None,
            final_dwell: DEFAULT_FINAL_DWELL,
        }
    }

    /// Rejects non-positive counts or dimensions and an unusable palette.
    pub fn validate(&self) -> Result<(), StreamError> {
        for (value, what) in [
            (self.image_count as usize, "image count"),
            (self.image_height as usize, "image height"),
            (self.image_width as usize, "image width"),
            (self.channel_capacity, "channel capacity"),
        ] {
            if value == 0 {
                return Err(StreamError::InvalidInput(format!("{what} must be positive")));
            }
        }
        if self.palette.is_empty() {
            return Err(StreamError::EmptyPalette);
        }
        Ok(())
    }
}

/// Lifecycle of one independently scheduled stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Idle,
    Running,
    /// Out of the main loop, releasing channel endpoints.
    Draining,
    Stopped,
}

/// One publisher/observer pair for a stage's lifecycle.
pub fn stage_monitor() -> (watch::Sender<StageState>, watch::Receiver<StageState>) {
    watch::channel(StageState::Idle)
}

/// Stage one: produces exactly `image_count` solid frames and pushes them
/// into Channel A, then closes the channel by dropping its sender.
/// Cancellation is checked between iterations, never mid-frame.
pub async fn run_generator(
    config: PipelineConfig,
    mut picker: ColorPicker,
    output: mpsc::Sender<Frame>,
    shutdown: ShutdownFlag,
    state: watch::Sender<StageState>,
) -> Result<(), StreamError> {
    let _ = state.send(StageState::Running);
    for produced in 0..config.image_count {
        if shutdown.is_triggered() {
            info!(produced, "generator cancelled");
            break;
        }
        let color = picker.pick();
        let frame = factory::solid(config.image_height, config.image_width, color);
        debug!(index = produced, color = %color, "generated solid frame");
        if output.send(frame).await.is_err() {
            // Receiver gone: the compositor stopped first.
            break;
        }
    }
    let _ = state.send(StageState::Draining);
    drop(output);
    let _ = state.send(StageState::Stopped);
    Ok(())
}

/// Stage two: annotates every frame from Channel A with its color name
/// and a complementary filled circle, forwarding to Channel B. Ends when
/// Channel A closes and drains, or on cancellation; an unnameable color
/// aborts the stage and the session controller cancels the others.
pub async fn run_compositor(
    mut input: mpsc::Receiver<Frame>,
    output: mpsc::Sender<Frame>,
    shutdown: ShutdownFlag,
    state: watch::Sender<StageState>,
) -> Result<(), StreamError> {
    let _ = state.send(StageState::Running);
    let result = compositor_loop(&mut input, &output, &shutdown).await;
    let _ = state.send(StageState::Draining);
    drop(output);
    let _ = state.send(StageState::Stopped);
    result
}

async fn compositor_loop(
    input: &mut mpsc::Receiver<Frame>,
    output: &mpsc::Sender<Frame>,
    shutdown: &ShutdownFlag,
) -> Result<(), StreamError> {
    while let Some(mut frame) = input.recv().await {
        if shutdown.is_triggered() {
            debug!("compositor cancelled, dropping in-flight frames");
            break;
        }
        let color = annotator::detect_color(&frame);
        let label = palette::name_of(color)?;
        let circle_color = color.complement();
        annotator::annotate(&mut frame, label, circle_color);
        debug!(label, circle = %circle_color, "composited frame");
        if output.send(frame).await.is_err() {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::annotator::detect_color;
    use crate::core_modules::factory::solid;
    use crate::core_modules::palette::default_palette;
    use pretty_assertions::assert_eq;

    fn test_config(image_count: u32) -> PipelineConfig {
        PipelineConfig {
            picker_seed: Some(1),
            final_dwell: Duration::ZERO,
            ..PipelineConfig::new(image_count, 32, 32)
        }
    }

    #[test]
    fn validation_catches_bad_configs() {
        assert!(matches!(
            test_config(0).validate(),
            Err(StreamError::InvalidInput(_))
        ));
        let mut no_palette = test_config(3);
        no_palette.palette.clear();
        assert!(matches!(
            no_palette.validate(),
            Err(StreamError::EmptyPalette)
        ));
        let mut no_capacity = test_config(3);
        no_capacity.channel_capacity = 0;
        assert!(matches!(
            no_capacity.validate(),
            Err(StreamError::InvalidInput(_))
        ));
        assert!(test_config(3).validate().is_ok());
    }

    #[tokio::test]
    async fn generator_emits_exactly_n_frames_then_closes() {
        let config = test_config(5);
        let picker = ColorPicker::with_seed(default_palette(), 3).unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        let (state_tx, state_rx) = stage_monitor();

        run_generator(config, picker, tx, ShutdownFlag::new(), state_tx)
            .await
            .unwrap();

        let mut frames = Vec::new();
        while let Some(frame) = rx.recv().await {
            frames.push(frame);
        }
        assert_eq!(frames.len(), 5);
        assert!(frames.iter().all(|f| f.dimensions() == (32, 32)));
        assert_eq!(*state_rx.borrow(), StageState::Stopped);
    }

    #[tokio::test]
    async fn generator_stops_on_cancellation() {
        let picker = ColorPicker::with_seed(default_palette(), 3).unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        let (state_tx, state_rx) = stage_monitor();
        let shutdown = ShutdownFlag::new();
        shutdown.trigger();

        run_generator(test_config(5), picker, tx, shutdown, state_tx)
            .await
            .unwrap();

        assert!(rx.recv().await.is_none());
        assert_eq!(*state_rx.borrow(), StageState::Stopped);
    }

    #[tokio::test]
    async fn compositor_annotates_and_preserves_order() {
        let red = Color::new(255, 0, 0);
        let blue = Color::new(0, 0, 255);
        let (tx_a, rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        tx_a.send(solid(64, 64, red)).await.unwrap();
        tx_a.send(solid(64, 64, blue)).await.unwrap();
        drop(tx_a);
        let (state_tx, state_rx) = stage_monitor();

        run_compositor(rx_a, tx_b, ShutdownFlag::new(), state_tx)
            .await
            .unwrap();

        let first = rx_b.recv().await.unwrap();
        assert_eq!(detect_color(&first), red);
        assert_eq!(Color::from(*first.get_pixel(32, 32)), red.complement());
        let second = rx_b.recv().await.unwrap();
        assert_eq!(detect_color(&second), blue);
        assert!(rx_b.recv().await.is_none(), "channel B should be closed");
        assert_eq!(*state_rx.borrow(), StageState::Stopped);
    }

    #[tokio::test]
    async fn compositor_surfaces_unknown_colors() {
        let (tx_a, rx_a) = mpsc::channel(4);
        let (tx_b, _rx_b) = mpsc::channel(4);
        tx_a.send(solid(16, 16, Color::new(7, 7, 7))).await.unwrap();
        drop(tx_a);
        let (state_tx, state_rx) = stage_monitor();

        let result = run_compositor(rx_a, tx_b, ShutdownFlag::new(), state_tx).await;
        assert!(matches!(result, Err(StreamError::UnknownColor(_))));
        assert_eq!(*state_rx.borrow(), StageState::Stopped);
    }
}
