//! Animated test pattern
//!
//! Renders a horizontal colour gradient scrolling with time, plus a white bar
//! whose position encodes the frame number so dropped or reordered frames are
//! visible in the encoded output.

use crate::recorder::frame::Frame;

#[derive(Debug, Clone, Copy)]
pub struct TestPattern {
    width: u32,
    height: u32,
    channels: u8,
}

impl TestPattern {
    pub fn new(width: u32, height: u32, channels: u8) -> Self {
        Self {
            width,
            height,
            channels,
        }
    }

    /// Render the frame for `index` at `time_secs`
    pub fn render(&self, index: u64, time_secs: f64) -> Frame {
        let mut frame = Frame::new(self.width, self.height, self.channels);
        let channels = self.channels as usize;
        let stride = frame.stride();
        let width = self.width.max(1) as f64;
        let shift = (time_secs * 0.25).fract();
        let bar_x = (index % self.width.max(1) as u64) as usize;

        for (y, row) in frame.as_bytes_mut().chunks_exact_mut(stride).enumerate() {
            let v = (y as f64 / self.height.max(1) as f64 * 255.0) as u8;
            for (x, pixel) in row.chunks_exact_mut(channels).enumerate() {
                let rgb = if x == bar_x {
                    [255, 255, 255]
                } else {
                    let u = ((x as f64 / width + shift).fract() * 255.0) as u8;
                    [u, v, 255 - u]
                };
                write_pixel(pixel, rgb);
            }
        }

        frame
    }
}

fn write_pixel(pixel: &mut [u8], rgb: [u8; 3]) {
    match pixel.len() {
        1 => pixel[0] = ((rgb[0] as u16 + rgb[1] as u16 + rgb[2] as u16) / 3) as u8,
        3 => pixel.copy_from_slice(&rgb),
        _ => {
            pixel[..3].copy_from_slice(&rgb);
            pixel[3..].fill(255);
        }
    }
}
