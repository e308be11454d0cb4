use crate::core_modules::palette::Color;
use thiserror::Error;

/// Everything that can go wrong across the pipeline, from startup
/// validation to a stage dying mid-stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A startup parameter was non-numeric or non-positive.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The color picker was constructed with no candidates; fatal.
    #[error("color palette is empty")]
    EmptyPalette,

    /// A color reached the naming table with no exact match.
    #[error("no name for color {0}")]
    UnknownColor(Color),

    /// A hand-off channel closed before its expected element count.
    #[error("{0} channel closed before the stream completed")]
    ChannelClosed(&'static str),

    /// The render surface could not be created or refused a frame.
    #[error("render surface error: {0}")]
    Render(String),
}
