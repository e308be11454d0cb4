// THEORY:
// The `session` module is the controller around the pipeline: startup
// validation, stage spawn, the interactive foreground loop, and
// teardown. Nothing is spawned until every parameter validates, so a bad
// session leaks no resources. Teardown is identical on every path:
// set the shutdown flag, drop the downstream receiver so channel closure
// propagates back through the pipeline, then join every stage. A stage
// blocked in a channel send is unblocked by its peer's endpoint
// dropping, never by preemption. Foreground commands arrive over a
// channel rather than a direct stdin read, so tests drive the session
// the same way a user does.

use crate::core_modules::factory::Frame;
use crate::core_modules::frame_buffer::SharedFrameBuffer;
use crate::core_modules::palette::ColorPicker;
use crate::core_modules::shutdown::ShutdownFlag;
use crate::display::{self, RenderSurface};
use crate::error::StreamError;
use crate::pipeline::{self, PipelineConfig, StageState};
use futures::future::join_all;
use std::io::{BufRead as _, Write as _};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Startup parameters after validation; immutable for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionParams {
    pub image_count: u32,
    pub image_height: u32,
    pub image_width: u32,
}

/// Validates the three raw startup inputs. Any failure aborts the session
/// before a stage exists.
pub fn parse_params(count: &str, height: &str, width: &str) -> Result<SessionParams, StreamError> {
    Ok(SessionParams {
        image_count: parse_positive("number of images", count)?,
        image_height: parse_positive("height", height)?,
        image_width: parse_positive("width", width)?,
    })
}

fn parse_positive(field: &str, raw: &str) -> Result<u32, StreamError> {
    let trimmed = raw.trim();
    let value: i64 = trimmed.parse().map_err(|_| {
        StreamError::InvalidInput(format!("{field} must be an integer, got {trimmed:?}"))
    })?;
    if value <= 0 {
        return Err(StreamError::InvalidInput(format!(
            "{field} must be a positive number"
        )));
    }
    u32::try_from(value)
        .map_err(|_| StreamError::InvalidInput(format!("{field} is out of range")))
}

/// One foreground command between displayed images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Advance,
    Quit,
}

/// Empty input advances, exactly `q` quits. Anything else advances too,
/// with a warning, instead of being silently swallowed.
pub fn parse_command(line: &str) -> Command {
    match line.trim() {
        "" => Command::Advance,
        "q" => Command::Quit,
        other => {
            warn!(input = other, "unrecognized command, treating as continue");
            Command::Advance
        }
    }
}

/// Feeds stdin lines to the foreground loop as commands from a dedicated
/// thread. Closing stdin closes the channel; the session treats that as quit.
pub fn spawn_stdin_commands() -> mpsc::Receiver<Command> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut line = String::new();
        loop {
            line.clear();
            match input.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.blocking_send(parse_command(&line)).is_err() {
                        break;
                    }
                }
            }
        }
    });
    rx
}

/// How the foreground loop ended: all N images shown, or an early quit
/// that discards whatever was still in flight.
enum EndReason {
    Completed,
    Quit,
}

/// Orchestrates startup, the interactive main loop, and teardown.
pub struct Session {
    config: PipelineConfig,
}

impl Session {
    /// Validates the configuration before anything is spawned.
    pub fn new(config: PipelineConfig) -> Result<Self, StreamError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Runs the pipeline to completion. `commands` drives the foreground
    /// loop; `make_surface` builds the render surface on the Presenter's
    /// own thread.
    pub async fn run<S, F>(
        self,
        mut commands: mpsc::Receiver<Command>,
        make_surface: F,
    ) -> Result<(), StreamError>
    where
        S: RenderSurface + 'static,
        F: FnOnce() -> Result<S, StreamError> + Send + 'static,
    {
        let config = self.config;
        let picker = match config.picker_seed {
            Some(seed) => ColorPicker::with_seed(config.palette.clone(), seed)?,
            None => ColorPicker::new(config.palette.clone())?,
        };

        let (tx_a, rx_a) = mpsc::channel::<Frame>(config.channel_capacity);
        let (tx_b, mut rx_b) = mpsc::channel::<Frame>(config.channel_capacity);
        let frame_buffer = SharedFrameBuffer::new(config.image_height, config.image_width);
        let shutdown = ShutdownFlag::new();

        let (generator_state, generator_watch) = pipeline::stage_monitor();
        let (compositor_state, compositor_watch) = pipeline::stage_monitor();
        let (presenter_state, presenter_watch) = pipeline::stage_monitor();

        info!(count = config.image_count, "starting pipeline stages");

        let generator = tokio::spawn(pipeline::run_generator(
            config.clone(),
            picker,
            tx_a,
            shutdown.clone(),
            generator_state,
        ));
        let compositor = tokio::spawn(pipeline::run_compositor(
            rx_a,
            tx_b,
            shutdown.clone(),
            compositor_state,
        ));
        let presenter = {
            let frame_buffer = frame_buffer.clone();
            let shutdown = shutdown.clone();
            tokio::task::spawn_blocking(move || {
                let mut surface = match make_surface() {
                    Ok(surface) => surface,
                    Err(error) => {
                        // The stage never ran; still report a terminal state.
                        let _ = presenter_state.send(StageState::Stopped);
                        return Err(error);
                    }
                };
                display::run_presenter(&mut surface, &frame_buffer, &shutdown, &presenter_state)
            })
        };

        let outcome =
            foreground_loop(&config, &mut rx_b, &mut commands, &frame_buffer, &shutdown).await;

        if matches!(outcome, Ok(EndReason::Completed)) && !config.final_dwell.is_zero() {
            // Let the last image stay visible before the window goes away.
            tokio::time::sleep(config.final_dwell).await;
        }

        shutdown.trigger();
        // Closing our end of Channel B unblocks a compositor suspended in
        // send; the compositor's exit then closes Channel A under the
        // generator the same way.
        drop(rx_b);

        let mut first_error = None;
        for joined in join_all([generator, compositor, presenter]).await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(stage_error)) => {
                    first_error.get_or_insert(stage_error);
                }
                Err(join_error) => warn!(%join_error, "stage task did not join cleanly"),
            }
        }
        let first_error = first_error.or(outcome.err());

        debug!(
            generator = ?*generator_watch.borrow(),
            compositor = ?*compositor_watch.borrow(),
            presenter = ?*presenter_watch.borrow(),
            "final stage states"
        );
        info!("all stages joined");

        first_error.map_or(Ok(()), Err)
    }
}

/// Displays the first image immediately, then one more per `Advance`
/// command until all N are shown or the user quits.
async fn foreground_loop(
    config: &PipelineConfig,
    frames: &mut mpsc::Receiver<Frame>,
    commands: &mut mpsc::Receiver<Command>,
    frame_buffer: &SharedFrameBuffer,
    shutdown: &ShutdownFlag,
) -> Result<EndReason, StreamError> {
    show_next(frames, frame_buffer, 1, config.image_count).await?;

    for shown in 1..config.image_count {
        print!("press enter or q to quit: ");
        let _ = std::io::stdout().flush();
        match commands.recv().await {
            Some(Command::Advance) => {}
            Some(Command::Quit) | None => {
                info!("quit requested, cancelling all stages");
                shutdown.trigger();
                return Ok(EndReason::Quit);
            }
        }
        show_next(frames, frame_buffer, shown + 1, config.image_count).await?;
    }
    Ok(EndReason::Completed)
}

/// Pops the next annotated frame into the display buffer.
async fn show_next(
    frames: &mut mpsc::Receiver<Frame>,
    frame_buffer: &SharedFrameBuffer,
    shown: u32,
    total: u32,
) -> Result<(), StreamError> {
    match frames.recv().await {
        Some(frame) => {
            frame_buffer.blit(&frame);
            info!(shown, total, "displaying image");
            Ok(())
        }
        None => Err(StreamError::ChannelClosed("annotated frame")),
    }
}
