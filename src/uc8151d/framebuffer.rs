//! Packed 1bpp framebuffer and the full-extent region rounder
//!
//! The UC8151D wants rows of MSB-first packed bits, one bit per pixel, with
//! a set bit meaning white. [`Framebuffer`] keeps exactly one panel's worth
//! of bytes, implements `embedded_graphics::DrawTarget` so text and
//! primitives render straight into it, and hands the packed bytes to
//! [`Uc8151d::full_update`] via [`Framebuffer::data`].
//!
//! [`Uc8151d::full_update`]: crate::uc8151d::driver::Uc8151d::full_update

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::config::PanelConfig;

/// Inclusive pixel rectangle, in panel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl Region {
    /// Expands any requested region to the whole panel. The controller has
    /// no partial refresh, so every update covers the full extent no matter
    /// how small the dirtied area was.
    pub fn rounded(self, panel: &PanelConfig) -> Region {
        Region {
            x1: 0,
            y1: 0,
            x2: panel.width - 1,
            y2: panel.height - 1,
        }
    }
}

/// One panel's worth of packed pixels, white-initialised.
pub struct Framebuffer {
    width: u16,
    height: u16,
    row_length: usize,
    buffer: Vec<u8>,
}

impl Framebuffer {
    pub fn new(panel: &PanelConfig) -> Self {
        Framebuffer {
            width: panel.width,
            height: panel.height,
            row_length: panel.row_length(),
            // all bits set: a blank white panel
            buffer: vec![0xFF; panel.frame_bytes()],
        }
    }

    /// The packed frame, row-major, ready for the driver.
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Reset every pixel to white.
    pub fn clear_white(&mut self) {
        self.buffer.fill(0xFF);
    }

    /// Set one pixel; out-of-bounds coordinates are ignored.
    pub fn set_pixel(&mut self, x: u16, y: u16, color: BinaryColor) {
        if x >= self.width || y >= self.height {
            return;
        }

        let (index, mask) = self.locate(x, y);
        match color {
            // On is ink: drive the bit low for black
            BinaryColor::On => self.buffer[index] &= !mask,
            BinaryColor::Off => self.buffer[index] |= mask,
        }
    }

    /// Read one pixel back; `None` out of bounds.
    pub fn pixel(&self, x: u16, y: u16) -> Option<BinaryColor> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let (index, mask) = self.locate(x, y);
        if self.buffer[index] & mask == 0 {
            Some(BinaryColor::On)
        } else {
            Some(BinaryColor::Off)
        }
    }

    fn locate(&self, x: u16, y: u16) -> (usize, u8) {
        let index = usize::from(x >> 3) + usize::from(y) * self.row_length;
        // MSB first: x=0 lands in bit 7
        let mask = 0x80u8 >> (x & 0x07);
        (index, mask)
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width), u32::from(self.height))
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_pixel(point.x as u16, point.y as u16, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    use super::*;

    fn panel() -> PanelConfig {
        PanelConfig::default()
    }

    #[test]
    fn a_fresh_buffer_is_all_white() {
        let fb = Framebuffer::new(&panel());
        assert_eq!(fb.data().len(), 5000);
        assert!(fb.data().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn pixels_pack_msb_first() {
        let mut fb = Framebuffer::new(&panel());

        fb.set_pixel(0, 0, BinaryColor::On);
        assert_eq!(fb.data()[0], 0b0111_1111);

        fb.set_pixel(7, 0, BinaryColor::On);
        assert_eq!(fb.data()[0], 0b0111_1110);

        fb.set_pixel(8, 0, BinaryColor::On);
        assert_eq!(fb.data()[1], 0b0111_1111);

        // second row starts 25 bytes in
        fb.set_pixel(0, 1, BinaryColor::On);
        assert_eq!(fb.data()[25], 0b0111_1111);
    }

    #[test]
    fn x_nine_lands_in_bit_six_of_byte_one() {
        let mut fb = Framebuffer::new(&panel());
        fb.set_pixel(9, 0, BinaryColor::On);

        assert_eq!(fb.data()[1], 0b1011_1111);
        assert_eq!(fb.pixel(9, 0), Some(BinaryColor::On));
        // neighbors untouched
        assert_eq!(fb.pixel(8, 0), Some(BinaryColor::Off));
        assert_eq!(fb.pixel(10, 0), Some(BinaryColor::Off));
        assert_eq!(fb.pixel(9, 1), Some(BinaryColor::Off));
    }

    #[test]
    fn pixel_readback_is_none_out_of_bounds() {
        let fb = Framebuffer::new(&panel());
        assert_eq!(fb.pixel(200, 0), None);
        assert_eq!(fb.pixel(0, 200), None);
    }

    #[test]
    fn drawing_white_over_black_restores_the_bit() {
        let mut fb = Framebuffer::new(&panel());
        fb.set_pixel(3, 5, BinaryColor::On);
        fb.set_pixel(3, 5, BinaryColor::Off);
        assert!(fb.data().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn out_of_bounds_pixels_are_dropped() {
        let mut fb = Framebuffer::new(&panel());
        fb.set_pixel(200, 0, BinaryColor::On);
        fb.set_pixel(0, 200, BinaryColor::On);
        fb.set_pixel(u16::MAX, u16::MAX, BinaryColor::On);
        assert!(fb.data().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn embedded_graphics_primitives_render_into_the_buffer() {
        let mut fb = Framebuffer::new(&panel());

        Rectangle::new(Point::new(0, 0), Size::new(8, 2))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();

        assert_eq!(fb.data()[0], 0x00);
        assert_eq!(fb.data()[25], 0x00);
        assert_eq!(fb.data()[1], 0xFF);
    }

    #[test]
    fn negative_coordinates_are_dropped_by_the_draw_target() {
        let mut fb = Framebuffer::new(&panel());
        Pixel(Point::new(-1, -1), BinaryColor::On)
            .draw(&mut fb)
            .unwrap();
        assert!(fb.data().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn every_region_rounds_to_the_full_panel() {
        let p = panel();
        let tiny = Region {
            x1: 10,
            y1: 10,
            x2: 12,
            y2: 12,
        };
        assert_eq!(
            tiny.rounded(&p),
            Region {
                x1: 0,
                y1: 0,
                x2: 199,
                y2: 199
            }
        );
    }

    #[test]
    fn clear_white_wipes_previous_drawing() {
        let mut fb = Framebuffer::new(&panel());
        fb.set_pixel(42, 42, BinaryColor::On);
        fb.clear_white();
        assert!(fb.data().iter().all(|&b| b == 0xFF));
    }
}
