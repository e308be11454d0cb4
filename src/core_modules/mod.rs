pub mod annotator;
pub mod factory;
pub mod font;
pub mod frame_buffer;
pub mod palette;
pub mod shutdown;
