//! Line encoder
//!
//! Turns one row of a 1-bit image (or a fixed fill value) into the byte
//! stream the COG expects for a line write:
//!
//! | Section | Bytes | Content |
//! |---------|-------|---------|
//! | Header  | 2 | data header, border byte |
//! | Odd     | `bytes_per_line` | odd pixels, last source byte first |
//! | Scan    | `bytes_per_scan` | one-hot scan address |
//! | Even    | `bytes_per_line` | even pixels, first source byte first |
//!
//! Every pixel is sent as a 2-bit drive code with the high bit set: `0b10`
//! leaves the pixel alone and `0b11` drives it, so a fill of `0xaa` is the
//! idle signal.
//!
//! ## Example
//!
//! ```
//! use epd_cog::line::{LineBuffer, LineRow, LineSource, Polarity};
//! use epd_cog::{PanelProfile, PanelSize};
//!
//! let profile = PanelProfile::new(PanelSize::Epd1_44);
//! let mut buffer = match LineBuffer::new(&profile) {
//!     Ok(buffer) => buffer,
//!     Err(_) => return,
//! };
//! let row = [0u8; 16];
//! let payload = buffer.encode(
//!     &profile,
//!     LineRow::Row(0),
//!     LineSource::Image(&row),
//!     Polarity::Normal,
//!     0x00,
//! );
//! assert_eq!(payload.len(), profile.line_payload_size());
//! ```

use crate::command::DATA;
use crate::error::BuilderError;
use crate::panel::{PanelProfile, PanelSize};

/// Capacity of the scratch line buffer, sized for the largest panel
pub const LINE_BUFFER_CAPACITY: usize = max_line_buffer_size();

const fn max_line_buffer_size() -> usize {
    let mut max = 0;
    let mut i = 0;
    while i < PanelSize::ALL.len() {
        let size = PanelProfile::new(PanelSize::ALL[i]).line_buffer_size();
        if size > max {
            max = size;
        }
        i += 1;
    }
    max
}

/// Drive polarity of a line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Polarity {
    /// Drive every pixel toward the opposite of the image (erase)
    Inverse,
    /// Drive every pixel toward the image
    #[default]
    Normal,
}

/// Row addressed by a line write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineRow {
    /// A physical row, `0..lines_per_display`
    Row(u16),
    /// No row: all scan bytes are zero
    ///
    /// Used to keep the line cadence while addressing nothing.
    Blank,
}

/// Pixel data for a line write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineSource<'a> {
    /// Every pixel byte is this value, sent unmodified
    Fixed(u8),
    /// One image row of `bytes_per_line` bytes
    Image(&'a [u8]),
}

/// Scratch buffer for one line payload
///
/// Sized once from the panel profile and reused for every line.
#[derive(Clone, Debug)]
pub struct LineBuffer {
    bytes: [u8; LINE_BUFFER_CAPACITY],
    len: usize,
}

impl LineBuffer {
    /// Create a line buffer for a panel
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::LineBufferCapacity`] if the panel's line does
    /// not fit.
    pub fn new(profile: &PanelProfile) -> Result<Self, BuilderError> {
        let required = profile.line_buffer_size();
        if required > LINE_BUFFER_CAPACITY {
            return Err(BuilderError::LineBufferCapacity {
                required,
                capacity: LINE_BUFFER_CAPACITY,
            });
        }
        Ok(Self {
            bytes: [0; LINE_BUFFER_CAPACITY],
            len: required,
        })
    }

    /// Buffer size for this panel, including the filler byte
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a line buffer holds at least the header
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Encode one line and return the payload to send
    ///
    /// An image row shorter than `bytes_per_line` leaves the missing pixels
    /// at the idle level.
    pub fn encode(
        &mut self,
        profile: &PanelProfile,
        row: LineRow,
        source: LineSource<'_>,
        polarity: Polarity,
        border: u8,
    ) -> &[u8] {
        let bytes_per_line = profile.bytes_per_line;
        let payload = &mut self.bytes[..profile.line_payload_size()];
        let (header, rest) = payload.split_at_mut(2);
        let (odd, rest) = rest.split_at_mut(bytes_per_line);
        let (scan, even) = rest.split_at_mut(profile.bytes_per_scan);

        header[0] = DATA;
        header[1] = border;

        match source {
            LineSource::Fixed(value) => {
                odd.fill(value);
                even.fill(value);
            }
            LineSource::Image(data) => {
                odd.fill(0xaa);
                even.fill(0xaa);
                for (i, out) in odd.iter_mut().enumerate() {
                    if let Some(&pixels) = data.get(bytes_per_line - 1 - i) {
                        *out = odd_pixels(pixels, polarity);
                    }
                }
                for (out, &pixels) in even.iter_mut().zip(data) {
                    *out = even_pixels(pixels, polarity);
                }
            }
        }

        scan.fill(0);
        if let LineRow::Row(row) = row {
            if let Some((index, value)) = scan_address(profile, row) {
                scan[index] = value;
            }
        }

        &self.bytes[..profile.line_payload_size()]
    }
}

/// Scan byte index and value addressing `row`, or `None` if the row is off the panel
pub fn scan_address(profile: &PanelProfile, row: u16) -> Option<(usize, u8)> {
    if row >= profile.lines_per_display {
        return None;
    }
    let index = (profile.lines_per_display - row - 1) as usize / 4;
    let shift = 2 * (row & 0x03);
    Some((index, 0x03 << shift))
}

/// Odd pixel byte for one source byte
pub const fn odd_pixels(source: u8, polarity: Polarity) -> u8 {
    let pixels = source & 0x55;
    match polarity {
        Polarity::Inverse => 0xaa | (pixels ^ 0x55),
        Polarity::Normal => 0xaa | pixels,
    }
}

/// Even pixel byte for one source byte
///
/// The four 2-bit codes are sent in reverse order.
pub const fn even_pixels(source: u8, polarity: Polarity) -> u8 {
    let pixels = source & 0xaa;
    let pixels = match polarity {
        Polarity::Inverse => 0xaa | ((pixels ^ 0xaa) >> 1),
        Polarity::Normal => 0xaa | (pixels >> 1),
    };
    let p1 = (pixels >> 6) & 0x03;
    let p2 = (pixels >> 4) & 0x03;
    let p3 = (pixels >> 2) & 0x03;
    let p4 = pixels & 0x03;
    p1 | (p2 << 2) | (p3 << 4) | (p4 << 6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn sections(profile: &PanelProfile, payload: &[u8]) -> (u8, u8, Vec<u8>, Vec<u8>, Vec<u8>) {
        let bpl = profile.bytes_per_line;
        let bps = profile.bytes_per_scan;
        (
            payload[0],
            payload[1],
            payload[2..2 + bpl].to_vec(),
            payload[2 + bpl..2 + bpl + bps].to_vec(),
            payload[2 + bpl + bps..].to_vec(),
        )
    }

    #[test]
    fn test_capacity_fits_largest_panel() {
        assert_eq!(LINE_BUFFER_CAPACITY, 2 * 33 + 44 + 3);
        for size in PanelSize::ALL {
            let profile = PanelProfile::new(size);
            let buffer = LineBuffer::new(&profile).unwrap();
            assert_eq!(buffer.len(), profile.line_buffer_size());
        }
    }

    #[test]
    fn test_blank_row_normal_is_idle() {
        for size in PanelSize::ALL {
            let profile = PanelProfile::new(size);
            let mut buffer = LineBuffer::new(&profile).unwrap();
            let row = alloc::vec![0x00u8; profile.bytes_per_line];
            let payload =
                buffer.encode(&profile, LineRow::Row(3), LineSource::Image(&row), Polarity::Normal, 0);
            let (_, _, odd, _, even) = sections(&profile, payload);
            assert!(odd.iter().all(|&b| b == 0xaa));
            assert!(even.iter().all(|&b| b == 0xaa));
        }
    }

    #[test]
    fn test_full_row_inverse_is_idle_and_normal_is_dark() {
        let profile = PanelProfile::new(PanelSize::Epd2_0);
        let mut buffer = LineBuffer::new(&profile).unwrap();
        let row = alloc::vec![0xffu8; profile.bytes_per_line];

        let payload =
            buffer.encode(&profile, LineRow::Row(0), LineSource::Image(&row), Polarity::Inverse, 0);
        let (_, _, odd, _, even) = sections(&profile, payload);
        assert!(odd.iter().chain(&even).all(|&b| b == 0xaa));

        let payload =
            buffer.encode(&profile, LineRow::Row(0), LineSource::Image(&row), Polarity::Normal, 0);
        let (_, _, odd, _, even) = sections(&profile, payload);
        assert!(odd.iter().chain(&even).all(|&b| b == 0xff));
    }

    #[test]
    fn test_empty_row_inverse_is_complement_of_normal_full() {
        let profile = PanelProfile::new(PanelSize::Epd1_44);
        let mut buffer = LineBuffer::new(&profile).unwrap();
        let empty = alloc::vec![0x00u8; profile.bytes_per_line];
        let payload = buffer
            .encode(&profile, LineRow::Row(0), LineSource::Image(&empty), Polarity::Inverse, 0)
            .to_vec();
        let (_, _, odd, _, even) = sections(&profile, &payload);
        assert!(odd.iter().chain(&even).all(|&b| b == 0xff));
    }

    #[test]
    fn test_header_carries_border() {
        let profile = PanelProfile::new(PanelSize::Epd2_7);
        let mut buffer = LineBuffer::new(&profile).unwrap();
        let payload = buffer.encode(&profile, LineRow::Blank, LineSource::Fixed(0), Polarity::Normal, 0xaa);
        assert_eq!(payload[0], DATA);
        assert_eq!(payload[1], 0xaa);
        assert_eq!(payload.len(), profile.line_payload_size());
    }

    #[test]
    fn test_fixed_value_is_sent_unmodified() {
        let profile = PanelProfile::new(PanelSize::Epd2_0);
        let mut buffer = LineBuffer::new(&profile).unwrap();
        let payload =
            buffer.encode(&profile, LineRow::Row(10), LineSource::Fixed(0x5a), Polarity::Inverse, 0);
        let (_, _, odd, _, even) = sections(&profile, payload);
        assert!(odd.iter().chain(&even).all(|&b| b == 0x5a));
    }

    #[test]
    fn test_scan_address_is_one_hot() {
        for size in PanelSize::ALL {
            let profile = PanelProfile::new(size);
            let mut buffer = LineBuffer::new(&profile).unwrap();
            for row in 0..profile.lines_per_display {
                let payload =
                    buffer.encode(&profile, LineRow::Row(row), LineSource::Fixed(0), Polarity::Normal, 0);
                let (_, _, _, scan, _) = sections(&profile, payload);
                let set: Vec<(usize, u8)> = scan
                    .iter()
                    .copied()
                    .enumerate()
                    .filter(|&(_, b)| b != 0)
                    .collect();
                let index = (profile.lines_per_display - row - 1) as usize / 4;
                assert_eq!(set, alloc::vec![(index, 0x03 << (2 * (row % 4)))]);
            }
        }
    }

    #[test]
    fn test_blank_row_has_no_scan_bits() {
        let profile = PanelProfile::new(PanelSize::Epd2_0);
        let mut buffer = LineBuffer::new(&profile).unwrap();
        buffer.encode(&profile, LineRow::Row(5), LineSource::Fixed(0), Polarity::Normal, 0);
        let payload = buffer.encode(&profile, LineRow::Blank, LineSource::Fixed(0), Polarity::Normal, 0);
        let (_, _, _, scan, _) = sections(&profile, payload);
        assert!(scan.iter().all(|&b| b == 0));
        assert_eq!(scan_address(&profile, profile.lines_per_display), None);
    }

    #[test]
    fn test_odd_pixels_are_reversed_by_byte() {
        let profile = PanelProfile::new(PanelSize::Epd1_44);
        let mut buffer = LineBuffer::new(&profile).unwrap();
        let mut row = alloc::vec![0x00u8; profile.bytes_per_line];
        row[0] = 0x01;
        let payload =
            buffer.encode(&profile, LineRow::Row(0), LineSource::Image(&row), Polarity::Normal, 0);
        let (_, _, odd, _, even) = sections(&profile, payload);
        assert_eq!(odd[profile.bytes_per_line - 1], 0xab);
        assert!(odd[..profile.bytes_per_line - 1].iter().all(|&b| b == 0xaa));
        assert!(even.iter().all(|&b| b == 0xaa));
    }

    #[test]
    fn test_even_pixels_reverse_pair_order() {
        // bit 7 set: after the shift it lands in the top pair, which moves to the bottom
        assert_eq!(even_pixels(0x80, Polarity::Normal), 0xab);
        // bit 1 set: bottom pair moves to the top
        assert_eq!(even_pixels(0x02, Polarity::Normal), 0xea);
        assert_eq!(even_pixels(0x80, Polarity::Inverse), 0xfe);
    }

    #[test]
    fn test_odd_pixel_polarity() {
        assert_eq!(odd_pixels(0x00, Polarity::Normal), 0xaa);
        assert_eq!(odd_pixels(0x01, Polarity::Normal), 0xab);
        assert_eq!(odd_pixels(0x01, Polarity::Inverse), 0xfe);
        assert_eq!(odd_pixels(0xaa, Polarity::Inverse), 0xff);
    }
}
