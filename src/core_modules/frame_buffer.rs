// THEORY:
// The single piece of truly shared mutable memory in the system: a
// fixed-size byte region holding the image currently on screen. The
// foreground loop writes new frames, the Presenter reads on every render
// tick, and every access goes through one `RwLock`. Sized once at
// construction (height * width * 3, BGR order, the render surface's
// native layout), mutated only by whole-buffer copy, never resized.

use crate::core_modules::factory::Frame;
use std::sync::{Arc, RwLock};

pub const BYTES_PER_PIXEL: usize = 3;

/// Shared, lock-protected display buffer in BGR byte order.
#[derive(Clone)]
pub struct SharedFrameBuffer {
    bytes: Arc<RwLock<Vec<u8>>>,
    height: u32,
    width: u32,
}

impl SharedFrameBuffer {
    /// Allocates a zeroed buffer of height * width * 3 bytes.
    pub fn new(height: u32, width: u32) -> Self {
        let len = height as usize * width as usize * BYTES_PER_PIXEL;
        Self {
            bytes: Arc::new(RwLock::new(vec![0u8; len])),
            height,
            width,
        }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Copies `frame` in under the write lock, converting RGB to the
    /// buffer's BGR order. The frame must match the fixed dimensions.
    pub fn blit(&self, frame: &Frame) {
        debug_assert_eq!(frame.dimensions(), (self.width, self.height));
        let mut bytes = self.bytes.write().expect("frame buffer lock poisoned");
        for (slot, pixel) in bytes.chunks_exact_mut(BYTES_PER_PIXEL).zip(frame.pixels()) {
            slot[0] = pixel[2];
            slot[1] = pixel[1];
            slot[2] = pixel[0];
        }
    }

    /// Copies the current contents into `out` under the read lock.
    pub fn snapshot(&self, out: &mut Vec<u8>) {
        let bytes = self.bytes.read().expect("frame buffer lock poisoned");
        out.clear();
        out.extend_from_slice(&bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::factory::solid;
    use crate::core_modules::palette::Color;

    #[test]
    fn starts_zeroed_at_the_fixed_size() {
        let buffer = SharedFrameBuffer::new(4, 6);
        let mut out = Vec::new();
        buffer.snapshot(&mut out);
        assert_eq!(out.len(), 4 * 6 * BYTES_PER_PIXEL);
        assert!(out.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn blit_converts_rgb_to_bgr() {
        let buffer = SharedFrameBuffer::new(2, 2);
        buffer.blit(&solid(2, 2, Color::new(10, 20, 30)));
        let mut out = Vec::new();
        buffer.snapshot(&mut out);
        assert_eq!(&out[..3], &[30, 20, 10]);
        assert_eq!(out.len(), 2 * 2 * BYTES_PER_PIXEL);
    }

    #[test]
    fn blit_replaces_the_previous_frame_in_place() {
        let buffer = SharedFrameBuffer::new(3, 3);
        buffer.blit(&solid(3, 3, Color::new(1, 1, 1)));
        buffer.blit(&solid(3, 3, Color::new(200, 0, 0)));
        let mut out = Vec::new();
        buffer.snapshot(&mut out);
        assert!(out.chunks_exact(3).all(|bgr| bgr == [0, 0, 200]));
    }
}
