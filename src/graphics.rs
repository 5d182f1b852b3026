//! Graphics support via embedded-graphics
//!
//! [`FrameBuffers`] implements the [`DrawTarget`] trait from the
//! embedded-graphics ecosystem. Drawing always lands in the pending image;
//! send it with [`Display::full_update`](crate::Display::full_update).
//!
//! [`BinaryColor::On`] is a dark pixel.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::{
//!     pixelcolor::BinaryColor,
//!     prelude::*,
//!     primitives::{Circle, PrimitiveStyle, Rectangle},
//! };
//! use epd_cog::{FrameBuffers, PanelProfile, PanelSize};
//!
//! let mut buffers = FrameBuffers::new(PanelProfile::new(PanelSize::Epd2_7));
//!
//! let _ = Rectangle::new(Point::new(10, 10), Size::new(50, 30))
//!     .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
//!     .draw(&mut buffers);
//!
//! let _ = Circle::new(Point::new(100, 50), 40)
//!     .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 2))
//!     .draw(&mut buffers);
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::BinaryColor,
    prelude::Pixel,
};

use crate::buffer::FrameBuffers;

impl FrameBuffers {
    /// Set one pixel of the pending image
    ///
    /// Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: BinaryColor) {
        let profile = *self.profile();
        if x >= u32::from(profile.dots_per_line) || y >= u32::from(profile.lines_per_display) {
            return;
        }
        let index = y as usize * profile.bytes_per_line + x as usize / 8;
        let mask = 1u8 << (x % 8);
        if let Some(byte) = self.pending_mut().get_mut(index) {
            match color {
                BinaryColor::On => *byte |= mask,
                BinaryColor::Off => *byte &= !mask,
            }
        }
    }

    /// Read one pixel of the pending image
    pub fn pixel(&self, x: u32, y: u32) -> Option<BinaryColor> {
        let profile = self.profile();
        if x >= u32::from(profile.dots_per_line) || y >= u32::from(profile.lines_per_display) {
            return None;
        }
        let index = y as usize * profile.bytes_per_line + x as usize / 8;
        let byte = *self.pending().get(index)?;
        Some(if byte & (1 << (x % 8)) != 0 {
            BinaryColor::On
        } else {
            BinaryColor::Off
        })
    }
}

impl DrawTarget for FrameBuffers {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 {
                continue;
            }
            self.set_pixel(x as u32, y as u32, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = match color {
            BinaryColor::On => 0xff,
            BinaryColor::Off => 0x00,
        };
        self.pending_mut().fill(fill);
        Ok(())
    }
}

impl OriginDimensions for FrameBuffers {
    fn size(&self) -> Size {
        let profile = self.profile();
        Size::new(
            u32::from(profile.dots_per_line),
            u32::from(profile.lines_per_display),
        )
    }
}
